//! Bridges the batch run's synchronous API onto `tokio`: a minimal
//! current-thread runtime drives a `Semaphore`-bounded fan-out of
//! `spawn_blocking` tasks, one per file, and `block_on` collects them
//! before returning.

use std::sync::Arc;

use recspec_types::RecspecError;
use tokio::sync::Semaphore;

use crate::counters::BatchSummary;
use crate::options::{BatchInput, BatchOptions};
use crate::pipeline::{self, FileTaskContext};

/// Everything a batch run produces: ordered reports plus the aggregate
/// counters.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub reports: Vec<recspec_types::Report>,
    pub summary: BatchSummary,
}

/// Runs the pipeline over `inputs` with bounded concurrency, preserving
/// input order in the returned sequence; results may complete out of order
/// but are sorted back into place before emission.
///
/// Cancelling before any file is dispatched yields zero reports. Cancelling
/// mid-run stops new dispatch; files already in flight either finish
/// normally or detect the cancellation inside a DSP pass and surface as
/// `error = cancelled` — either way the returned sequence only ever
/// contains the files that were actually started.
pub fn run_batch(
    inputs: Vec<BatchInput>,
    options: BatchOptions,
) -> recspec_types::RecspecResult<BatchOutcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| RecspecError::InternalInvariant {
            message: format!("failed to create batch runtime: {e}"),
        })?;
    runtime.block_on(run_batch_async(inputs, options))
}

async fn run_batch_async(
    inputs: Vec<BatchInput>,
    options: BatchOptions,
) -> recspec_types::RecspecResult<BatchOutcome> {
    let concurrency = options.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let ctx = FileTaskContext {
        preset: options.preset.clone(),
        analysis_mode: options.analysis_mode,
        decoder: options.decoder.clone(),
        script_match: options.script_match.clone(),
        catalogue: options.catalogue.clone(),
    };

    let mut handles = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        if options.cancellation_token.is_cancelled() {
            break;
        }
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed during a batch run");
        let ctx = ctx.clone();
        let token = options.cancellation_token.clone();
        let sink = options.progress_sink.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let report = pipeline::run_one(&input, &ctx, &token, sink.as_ref(), index);
            (index, report)
        }));
    }

    let mut indexed_reports = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(pair) => indexed_reports.push(pair),
            Err(join_err) => {
                return Err(RecspecError::InternalInvariant {
                    message: format!("batch worker task panicked: {join_err}"),
                });
            }
        }
    }
    indexed_reports.sort_by_key(|(index, _)| *index);

    let reports: Vec<_> = indexed_reports.into_iter().map(|(_, report)| report).collect();
    let summary = BatchSummary::from_reports(&reports);
    Ok(BatchOutcome { reports, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::{AnalysisMode, CancellationToken, NullProgressSink};
    use recspec_validate::PresetRegistry;
    use recspec_wav::testutil::write_pcm_wav;
    use std::sync::Arc;

    struct MemorySource {
        bytes: Vec<u8>,
    }

    impl recspec_types::InputSource for MemorySource {
        fn read_header(&self, max_bytes: usize) -> recspec_types::RecspecResult<Vec<u8>> {
            Ok(self.bytes[..self.bytes.len().min(max_bytes)].to_vec())
        }
        fn read_all(&self) -> recspec_types::RecspecResult<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }

    fn wav_input(name: &str) -> BatchInput {
        let bytes = write_pcm_wav(8_000, 16, &[vec![0.05f32; 8_000]]);
        BatchInput::new(name, Arc::new(MemorySource { bytes }))
    }

    fn options() -> BatchOptions {
        let registry = PresetRegistry::default_presets();
        let preset = registry.lookup("character-recordings").unwrap().clone();
        BatchOptions::new(preset, Arc::new(NullProgressSink))
            .with_analysis_mode(AnalysisMode::Standard)
            .with_concurrency(2)
    }

    #[test]
    fn preserves_input_order_across_concurrent_workers() {
        let inputs = vec![wav_input("a.wav"), wav_input("b.wav"), wav_input("c.wav")];
        let outcome = run_batch(inputs, options()).unwrap();
        assert_eq!(outcome.reports.len(), 3);
        assert_eq!(outcome.summary.pass + outcome.summary.warning + outcome.summary.fail, 3);
    }

    #[test]
    fn cancelling_before_start_yields_zero_reports() {
        let token = CancellationToken::new();
        token.cancel();
        let inputs = vec![wav_input("a.wav"), wav_input("b.wav")];
        let outcome = run_batch(inputs, options().with_cancellation_token(token)).unwrap();
        assert!(outcome.reports.is_empty());
    }
}
