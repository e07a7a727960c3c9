use recspec_types::{
    AnalysisStage, CancellationToken, ProgressSink, RecspecResult, SilenceFindings,
};

use crate::common::{amplitude_to_db, check_cancelled, rescale, ranges};

const FRAME_S: f64 = 0.005;
const MIN_RUN_S: f32 = 0.150;

struct Run {
    start_frame: usize,
    len_frames: usize,
}

/// Dynamic-threshold silence segmentation with tick rejection.
///
/// `longest_gap_s` is the longest qualifying (≥150 ms) silent run that sits
/// strictly *inside* the take, distinct from `leading_s`/`trailing_s` which
/// cover the flanking runs. When no interior run qualifies (e.g. a single
/// mid-file impulse leaves only the two flanking runs), it falls back to
/// whichever flanking run is larger, so the field still reports something
/// rather than silently reading zero.
pub fn analyze_silence(
    mono: &[f32],
    sample_rate_hz: u32,
    peak_db: f32,
    noise_floor_db: f32,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<SilenceFindings> {
    let threshold_db = noise_floor_db + 0.25 * (peak_db - noise_floor_db);
    let frame_samples = (FRAME_S * sample_rate_hz as f64).round().max(1.0) as usize;
    let frame_count = mono.len().div_ceil(frame_samples).max(1);

    let mut silent = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let start = frame * frame_samples;
        let end = (start + frame_samples).min(mono.len());
        let slice = &mono[start..end];
        let rms = if slice.is_empty() {
            0.0
        } else {
            let sum_sq: f64 = slice.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / slice.len() as f64).sqrt() as f32
        };
        silent.push(amplitude_to_db(rms) < threshold_db);
    }

    let mut runs = Vec::new();
    let mut current_start: Option<usize> = None;
    for (i, &is_silent) in silent.iter().enumerate() {
        if is_silent {
            if current_start.is_none() {
                current_start = Some(i);
            }
        } else if let Some(start) = current_start.take() {
            runs.push(Run {
                start_frame: start,
                len_frames: i - start,
            });
            check_cancelled(token, AnalysisStage::Silence)?;
            sink.report(index, "silence", rescale(i as f32 / frame_count as f32, ranges::SILENCE));
        }
    }
    if let Some(start) = current_start {
        runs.push(Run {
            start_frame: start,
            len_frames: frame_count - start,
        });
    }

    let frame_s = frame_samples as f32 / sample_rate_hz as f32;
    let qualifies = |run: &Run| run.len_frames as f32 * frame_s >= MIN_RUN_S;

    let leading_s = runs
        .first()
        .filter(|r| r.start_frame == 0 && qualifies(r))
        .map(|r| r.len_frames as f32 * frame_s)
        .unwrap_or(0.0);

    let trailing_s = runs
        .last()
        .filter(|r| r.start_frame + r.len_frames == frame_count && qualifies(r))
        .map(|r| r.len_frames as f32 * frame_s)
        .unwrap_or(0.0);

    let first_is_edge = runs.first().map(|r| r.start_frame == 0).unwrap_or(false);
    let last_is_edge = runs
        .last()
        .map(|r| r.start_frame + r.len_frames == frame_count)
        .unwrap_or(false);
    let interior_start = if first_is_edge { 1 } else { 0 };
    let interior_end = if last_is_edge {
        runs.len().saturating_sub(1)
    } else {
        runs.len()
    };
    let interior_runs: &[Run] = if interior_start < interior_end {
        &runs[interior_start..interior_end]
    } else {
        &[]
    };

    let interior_longest = interior_runs
        .iter()
        .filter(|r| qualifies(r))
        .map(|r| r.len_frames as f32 * frame_s)
        .fold(0.0f32, f32::max);

    let longest_gap_s = if interior_longest > 0.0 {
        interior_longest
    } else {
        leading_s.max(trailing_s)
    };

    sink.report(index, "silence", ranges::SILENCE.1);

    Ok(SilenceFindings {
        leading_s,
        trailing_s,
        longest_gap_s,
        threshold_db,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::NullProgressSink;

    fn signal(sample_rate: u32, seconds_silent_before: f32, impulse_s: f32, seconds_silent_after: f32) -> Vec<f32> {
        let mut out = vec![0.0f32; (seconds_silent_before * sample_rate as f32) as usize];
        out.extend(vec![0.8f32; (impulse_s * sample_rate as f32) as usize]);
        out.extend(vec![0.0f32; (seconds_silent_after * sample_rate as f32) as usize]);
        out
    }

    #[test]
    fn tick_does_not_erase_flanking_silence() {
        let sample_rate = 48_000;
        let mono = signal(sample_rate, 2.45, 0.1, 2.45);
        let findings = analyze_silence(
            &mono,
            sample_rate,
            amplitude_to_db(0.8),
            -80.0,
            &CancellationToken::new(),
            &NullProgressSink,
            0,
        )
        .unwrap();
        assert!(findings.leading_s + findings.trailing_s >= 4.9);
        // No interior run qualifies here, so longest_gap_s falls back to
        // the larger flanking run instead of reading zero.
        assert!(findings.longest_gap_s >= findings.leading_s.max(findings.trailing_s) - 0.01);
    }

    #[test]
    fn interior_dropout_is_reported_over_larger_flanking_silence() {
        let sample_rate = 48_000;
        let mut mono = vec![0.0f32; (5.0 * sample_rate as f32) as usize];
        mono.extend(vec![0.8f32; (3.0 * sample_rate as f32) as usize]);
        mono.extend(vec![0.0f32; (0.3 * sample_rate as f32) as usize]);
        mono.extend(vec![0.8f32; (3.0 * sample_rate as f32) as usize]);
        mono.extend(vec![0.0f32; (5.0 * sample_rate as f32) as usize]);
        let findings = analyze_silence(
            &mono,
            sample_rate,
            amplitude_to_db(0.8),
            -80.0,
            &CancellationToken::new(),
            &NullProgressSink,
            0,
        )
        .unwrap();
        assert!(findings.leading_s >= 4.9);
        assert!(findings.trailing_s >= 4.9);
        // The 300ms interior dropout, not the 5s flanking runs, is the
        // meaningful longest_gap_s here.
        assert!(findings.longest_gap_s < 1.0);
        assert!(findings.longest_gap_s >= 0.25);
    }

    #[test]
    fn short_ticks_are_rejected_from_qualifying_runs() {
        let run = Run {
            start_frame: 0,
            len_frames: 10,
        };
        let frame_s = 0.005f32;
        assert!((run.len_frames as f32 * frame_s) < MIN_RUN_S);
    }
}
