use recspec_types::{AnalysisStage, CancellationToken, ProgressSink, RecspecError, RecspecResult};

/// `20·log10(|x|)`, `-∞` (as `f32::NEG_INFINITY`) when `x == 0.0`.
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * amplitude.log10()
    }
}

/// Raises `AnalysisCancelled{stage}` if `token` has been set. Call sites
/// poll at a fixed interval rather than every sample (e.g. every 10,000
/// samples for per-sample scans, every 1,000 windows for window series)
/// to keep the check's overhead off the hot loop.
pub fn check_cancelled(token: &CancellationToken, stage: AnalysisStage) -> RecspecResult<()> {
    if token.is_cancelled() {
        Err(RecspecError::AnalysisCancelled { stage })
    } else {
        Ok(())
    }
}

/// Rescales a pass-local `[0,1]` progress value into one of the fixed
/// sub-ranges a multi-pass analysis reports against, so a caller watching
/// overall progress sees a monotonic sequence across passes.
pub fn rescale(local_progress: f32, range: (f32, f32)) -> f32 {
    let (lo, hi) = range;
    lo + local_progress.clamp(0.0, 1.0) * (hi - lo)
}

pub mod ranges {
    pub const PEAK: (f32, f32) = (0.00, 0.20);
    pub const NOISE_FLOOR: (f32, f32) = (0.20, 0.45);
    pub const NORMALIZATION: (f32, f32) = (0.45, 0.50);
    pub const REVERB: (f32, f32) = (0.50, 0.65);
    pub const SILENCE: (f32, f32) = (0.65, 0.80);
    pub const CLIPPING: (f32, f32) = (0.80, 0.90);
    pub const STEREO: (f32, f32) = (0.90, 0.95);
    pub const BLEED_CONVERSATIONAL: (f32, f32) = (0.95, 1.00);
}

/// RMS of a sample window, from the mean-across-channels of squared
/// samples at each frame.
pub fn window_rms(channels: &[Vec<f32>], start: usize, end: usize) -> f32 {
    let channel_count = channels.len() as f64;
    if channel_count == 0.0 {
        return 0.0;
    }
    let len = channels[0].len();
    let end = end.min(len);
    if end <= start {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for t in start..end {
        let mut frame_sq = 0.0f64;
        for channel in channels {
            let s = channel[t] as f64;
            frame_sq += s * s;
        }
        sum += frame_sq / channel_count;
    }
    (sum / (end - start) as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_to_db_zero_is_neg_infinity() {
        assert_eq!(amplitude_to_db(0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn amplitude_to_db_full_scale_is_zero_db() {
        assert!((amplitude_to_db(1.0)).abs() < 1e-4);
    }

    #[test]
    fn rescale_maps_into_sub_range() {
        assert_eq!(rescale(0.0, ranges::REVERB), 0.50);
        assert_eq!(rescale(1.0, ranges::REVERB), 0.65);
    }
}
