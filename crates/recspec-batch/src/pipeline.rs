//! Per-file pipeline: parse the header, decode samples, run the DSP
//! passes (level always, reverb/silence/stereo/bleed when experimental),
//! then validate criteria and filename, assembling one report.

use std::sync::Arc;

use recspec_dsp::analyze;
use recspec_types::{
    AnalysisMode, AudioBuffer, AudioDecoder, BitDepth, CancellationToken, FileProperties,
    ProgressSink, RecspecError, Report,
};
use recspec_validate::{evaluate, Catalogue, FilenameContext, Preset, ScriptMatchConfig};
use recspec_wav::{extract_wav_samples, parse_wav_header};

use crate::options::BatchInput;

/// Cloned out of [`crate::BatchOptions`] once per dispatched file so a
/// `spawn_blocking` closure can own it without borrowing the batch-wide
/// options for the lifetime of the whole run.
#[derive(Clone)]
pub(crate) struct FileTaskContext {
    pub preset: Arc<Preset>,
    pub analysis_mode: AnalysisMode,
    pub decoder: Option<Arc<dyn AudioDecoder>>,
    pub script_match: Option<Arc<ScriptMatchConfig>>,
    pub catalogue: Arc<Catalogue>,
}

/// Fixed extension → label map, case-insensitive; an unrecognized
/// extension is uppercased as-is rather than rejected.
fn file_type_for_extension(name: &str) -> String {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "mp3" => "MP3".to_string(),
        "m4a" => "M4A".to_string(),
        "aac" => "AAC".to_string(),
        "flac" => "FLAC".to_string(),
        "ogg" => "OGG".to_string(),
        "wma" => "WMA".to_string(),
        "" => "UNKNOWN".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

fn is_wav_name(name: &str) -> bool {
    name.rsplit('.').next().map(|e| e.eq_ignore_ascii_case("wav")).unwrap_or(false)
}

fn unknown_properties(name: &str, file_size_bytes: u64) -> FileProperties {
    FileProperties {
        file_type: file_type_for_extension(name),
        sample_rate_hz: None,
        bit_depth: BitDepth::Unknown,
        channel_count: None,
        duration_s: None,
        file_size_bytes,
    }
}

fn bit_depth_from_tag(tag: recspec_types::AudioFormatTag, bits_per_sample: u16) -> BitDepth {
    use recspec_types::AudioFormatTag;
    match tag {
        AudioFormatTag::Compressed(_) => BitDepth::Compressed,
        AudioFormatTag::Pcm | AudioFormatTag::IeeeFloat => {
            if bits_per_sample == 0 {
                BitDepth::Unknown
            } else {
                BitDepth::Known(bits_per_sample)
            }
        }
    }
}

/// Runs the full per-file pipeline, never panicking: any failure short of
/// an I/O error while first reading the header still yields a `Report`
/// with `error` populated and as much of `FileProperties` filled in as was
/// recoverable.
pub(crate) fn run_one(
    input: &BatchInput,
    ctx: &FileTaskContext,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> Report {
    let header_bytes = match input.source.read_header(100 * 1024) {
        Ok(bytes) => bytes,
        Err(err) => {
            let mut report = Report::new(unknown_properties(&input.name, 0));
            report.mark_error(err.to_string());
            return report;
        }
    };

    if is_wav_name(&input.name) {
        run_wav(input, &header_bytes, ctx, token, sink, index)
    } else {
        run_decoded(input, ctx, token, sink, index)
    }
}

fn run_wav(
    input: &BatchInput,
    header_bytes: &[u8],
    ctx: &FileTaskContext,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> Report {
    let format = match parse_wav_header(header_bytes) {
        Ok(format) => format,
        Err(err) => {
            let mut report = Report::new(unknown_properties(&input.name, header_bytes.len() as u64));
            run_filename_only(&mut report, input, ctx);
            report.mark_error(err.to_string());
            return report;
        }
    };

    let full_bytes = match input.source.read_all() {
        Ok(bytes) => bytes,
        Err(err) => {
            let properties = properties_from_format(&format, header_bytes.len() as u64);
            let mut report = Report::new(properties);
            run_filename_only(&mut report, input, ctx);
            report.mark_error(err.to_string());
            return report;
        }
    };

    let properties = properties_from_format(&format, full_bytes.len() as u64);

    let buffer = match extract_wav_samples(&full_bytes) {
        Ok(buffer) => buffer,
        Err(err) => {
            let mut report = Report::new(properties);
            run_filename_only(&mut report, input, ctx);
            report.mark_error(err.to_string());
            return report;
        }
    };

    finish_with_buffer(input, properties, buffer, ctx, token, sink, index)
}

fn run_decoded(
    input: &BatchInput,
    ctx: &FileTaskContext,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> Report {
    let Some(decoder) = &ctx.decoder else {
        let mut report = Report::new(unknown_properties(&input.name, 0));
        run_filename_only(&mut report, input, ctx);
        report.mark_error(
            RecspecError::DecodeFailed {
                message: "no AudioDecoder configured for a non-WAV input".to_string(),
            }
            .to_string(),
        );
        return report;
    };

    let full_bytes = match input.source.read_all() {
        Ok(bytes) => bytes,
        Err(err) => {
            let mut report = Report::new(unknown_properties(&input.name, 0));
            run_filename_only(&mut report, input, ctx);
            report.mark_error(err.to_string());
            return report;
        }
    };

    let buffer = match decoder.decode(&full_bytes) {
        Ok(buffer) => buffer,
        Err(err) => {
            let mut report = Report::new(unknown_properties(&input.name, full_bytes.len() as u64));
            run_filename_only(&mut report, input, ctx);
            report.mark_error(err.to_string());
            return report;
        }
    };

    let properties = FileProperties {
        file_type: file_type_for_extension(&input.name),
        sample_rate_hz: Some(buffer.sample_rate_hz()),
        bit_depth: BitDepth::Unknown,
        channel_count: Some(buffer.channel_count()),
        duration_s: duration_from_buffer(&buffer),
        file_size_bytes: full_bytes.len() as u64,
    };

    finish_with_buffer(input, properties, buffer, ctx, token, sink, index)
}

fn duration_from_buffer(buffer: &AudioBuffer) -> Option<f64> {
    if buffer.sample_rate_hz() == 0 {
        return None;
    }
    Some(buffer.length_frames() as f64 / buffer.sample_rate_hz() as f64)
}

fn properties_from_format(format: &recspec_types::WavFormat, file_size_bytes: u64) -> FileProperties {
    FileProperties {
        file_type: format.audio_format_tag.label(),
        sample_rate_hz: if format.sample_rate_hz == 0 {
            None
        } else {
            Some(format.sample_rate_hz)
        },
        bit_depth: bit_depth_from_tag(format.audio_format_tag, format.bits_per_sample),
        channel_count: if format.channel_count == 0 {
            None
        } else {
            Some(format.channel_count)
        },
        duration_s: format.duration_s(),
        file_size_bytes,
    }
}

/// Runs the DSP passes, then criteria and filename validation, over
/// an already-decoded buffer.
fn finish_with_buffer(
    input: &BatchInput,
    properties: FileProperties,
    buffer: AudioBuffer,
    ctx: &FileTaskContext,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> Report {
    let mut report = Report::new(properties.clone());

    let outcome = match analyze(&buffer, ctx.analysis_mode, token, sink, index) {
        Ok(outcome) => outcome,
        Err(RecspecError::AnalysisCancelled { .. }) => {
            report.mark_error("cancelled");
            return report;
        }
        Err(err) => {
            run_filename_only(&mut report, input, ctx);
            report.mark_error(err.to_string());
            return report;
        }
    };

    report.level = Some(outcome.level);
    report.reverb = outcome.reverb;
    report.silence = outcome.silence;
    report.stereo = outcome.stereo;
    report.bleed = outcome.bleed;
    report.conversational = outcome.conversational;

    let filename_ctx = filename_context(input, ctx);
    match evaluate(
        &properties,
        report.stereo.as_ref(),
        report.conversational.as_ref(),
        &ctx.preset,
        &filename_ctx,
        &ctx.catalogue,
    ) {
        Ok(validations) => {
            report.validations = validations;
            report.finalize_verdict();
        }
        Err(err) => report.mark_error(err.to_string()),
    }

    report
}

fn filename_context(input: &BatchInput, ctx: &FileTaskContext) -> FilenameContext {
    FilenameContext {
        filename: Some(input.name.clone()),
        script_match: ctx.script_match.as_deref().cloned(),
    }
}

/// Evaluates just the `filename` rule when audio decoding failed before any
/// findings were available — the filename check does not depend on
/// decoded samples, so it still runs even when everything else could not.
fn run_filename_only(report: &mut Report, input: &BatchInput, ctx: &FileTaskContext) {
    let filename_ctx = filename_context(input, ctx);
    if let Ok(validations) = evaluate(
        &report.file_properties,
        None,
        None,
        &ctx.preset,
        &filename_ctx,
        &ctx.catalogue,
    ) {
        if let Some(filename_result) = validations.get("filename") {
            report.validations.insert("filename".to_string(), filename_result.clone());
        }
    }
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

    fn ctx() -> FileTaskContext {
        let registry = PresetRegistry::default_presets();
        FileTaskContext {
            preset: Arc::new(registry.lookup("p2b2-pairs-stereo").unwrap().clone()),
            analysis_mode: AnalysisMode::Standard,
            decoder: None,
            script_match: None,
            catalogue: Arc::new(Catalogue::embedded()),
        }
    }

    #[test]
    fn happy_path_wav_produces_pass_report() {
        let bytes = write_pcm_wav(48_000, 16, &[vec![0.1f32; 48_000], vec![0.1f32; 48_000]]);
        let input = BatchInput::new(
            "take01.wav",
            Arc::new(MemorySource { bytes }) as Arc<dyn recspec_types::InputSource>,
        );
        let report = run_one(&input, &ctx(), &CancellationToken::new(), &NullProgressSink, 0);
        assert!(report.error.is_none());
        assert_eq!(report.file_properties.sample_rate_hz, Some(48_000));
        assert_eq!(report.file_properties.channel_count, Some(2));
    }

    #[test]
    fn malformed_wav_marks_error_but_still_has_file_properties() {
        let input = BatchInput::new(
            "broken.wav",
            Arc::new(MemorySource {
                bytes: b"not a wav file".to_vec(),
            }) as Arc<dyn recspec_types::InputSource>,
        );
        let report = run_one(&input, &ctx(), &CancellationToken::new(), &NullProgressSink, 0);
        assert!(report.error.is_some());
        assert_eq!(report.overall, recspec_types::OverallVerdict::Error);
    }

    #[test]
    fn non_wav_without_decoder_is_decode_failed() {
        let input = BatchInput::new(
            "clip.mp3",
            Arc::new(MemorySource { bytes: vec![0u8; 16] }) as Arc<dyn recspec_types::InputSource>,
        );
        let report = run_one(&input, &ctx(), &CancellationToken::new(), &NullProgressSink, 0);
        assert!(report.error.is_some());
        assert_eq!(report.file_properties.file_type, "MP3");
    }
}
