use recspec_types::{
    AnalysisStage, CancellationToken, ClippingFindings, NormalizationFindings,
    NormalizationStatus, ProgressSink, RecspecResult,
};

use crate::common::{amplitude_to_db, check_cancelled, rescale, ranges, window_rms};

const NORMALIZATION_TARGET_DB: f32 = -6.0;
const NORMALIZATION_TOLERANCE_DB: f32 = 0.3;
const CLIP_THRESHOLD: f32 = 0.999;
const NEAR_CLIP_THRESHOLD: f32 = 0.98;
const CLIP_EVENT_MIN_RUN: usize = 3;
const CANCEL_POLL_SAMPLES: usize = 10_000;
const CANCEL_POLL_WINDOWS: usize = 1_000;

/// Peak amplitude in dBFS across all channels.
pub fn compute_peak(
    channels: &[Vec<f32>],
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<f32> {
    let len = channels.first().map(|c| c.len()).unwrap_or(0);
    let mut peak = 0.0f32;
    let mut scanned = 0usize;
    for t in 0..len {
        for channel in channels {
            peak = peak.max(channel[t].abs());
        }
        scanned += 1;
        if scanned % CANCEL_POLL_SAMPLES == 0 {
            check_cancelled(token, AnalysisStage::PeakLevels)?;
            sink.report(
                index,
                "peak-levels",
                rescale(scanned as f32 / len.max(1) as f32, ranges::PEAK),
            );
        }
    }
    sink.report(index, "peak-levels", ranges::PEAK.1);
    Ok(amplitude_to_db(peak))
}

/// Non-overlapping 50 ms RMS window series, in dBFS. Shared by the
/// noise-floor estimator and (per-channel) by the reverb/silence passes'
/// own derived windows.
pub fn rms_window_series_db(channels: &[Vec<f32>], sample_rate_hz: u32) -> Vec<f32> {
    let window = (0.05 * sample_rate_hz as f64).round().max(1.0) as usize;
    let len = channels.first().map(|c| c.len()).unwrap_or(0);
    let mut series = Vec::with_capacity(len / window + 1);
    let mut start = 0;
    while start < len {
        let end = (start + window).min(len);
        series.push(amplitude_to_db(window_rms(channels, start, end)));
        start += window;
    }
    series
}

/// Histogram-mode noise floor with bottom-20%-RMS fallback for sparse
/// histograms.
fn estimate_noise_floor(series_db: &[f32], peak_db: f32) -> f32 {
    const BIN_LO: i32 = -120;
    const BIN_HI: i32 = 0;
    let mut histogram = vec![0u32; (BIN_HI - BIN_LO) as usize];
    let ceiling = peak_db - 3.0;

    let mut populated = 0usize;
    for &db in series_db {
        if !db.is_finite() || db > ceiling {
            continue;
        }
        let bin = (db.round() as i32).clamp(BIN_LO, BIN_HI - 1) - BIN_LO;
        if histogram[bin as usize] == 0 {
            populated += 1;
        }
        histogram[bin as usize] += 1;
    }

    if populated >= 8 {
        let (mode_bin, _) = histogram
            .iter()
            .enumerate()
            .max_by_key(|(_, count)| **count)
            .unwrap();
        (mode_bin as i32 + BIN_LO) as f32 + 0.5
    } else {
        let mut sorted: Vec<f32> = series_db.iter().copied().filter(|d| d.is_finite()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        if sorted.is_empty() {
            return f32::NEG_INFINITY;
        }
        let take = ((sorted.len() as f32) * 0.2).ceil().max(1.0) as usize;
        let take = take.min(sorted.len());
        sorted[..take].iter().sum::<f32>() / take as f32
    }
}

/// Noise floor, computed globally and per channel.
pub fn compute_noise_floor(
    channels: &[Vec<f32>],
    sample_rate_hz: u32,
    peak_db: f32,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<(f32, Vec<f32>)> {
    let global_series = rms_window_series_db(channels, sample_rate_hz);
    for (i, _) in global_series.iter().enumerate() {
        if i % CANCEL_POLL_WINDOWS == 0 {
            check_cancelled(token, AnalysisStage::NoiseFloor)?;
            sink.report(
                index,
                "noise-floor",
                rescale(
                    i as f32 / global_series.len().max(1) as f32 * 0.5,
                    ranges::NOISE_FLOOR,
                ),
            );
        }
    }
    let noise_floor_db = estimate_noise_floor(&global_series, peak_db);

    let mut per_channel = Vec::with_capacity(channels.len());
    for (ch_idx, channel) in channels.iter().enumerate() {
        let series = rms_window_series_db(std::slice::from_ref(channel), sample_rate_hz);
        per_channel.push(estimate_noise_floor(&series, peak_db));
        check_cancelled(token, AnalysisStage::NoiseFloor)?;
        sink.report(
            index,
            "noise-floor",
            rescale(
                0.5 + (ch_idx + 1) as f32 / channels.len().max(1) as f32 * 0.5,
                ranges::NOISE_FLOOR,
            ),
        );
    }
    sink.report(index, "noise-floor", ranges::NOISE_FLOOR.1);
    Ok((noise_floor_db, per_channel))
}

/// `normalized` iff `peak_db` falls within tolerance of the target.
pub fn compute_normalization(
    peak_db: f32,
    sink: &dyn ProgressSink,
    index: usize,
) -> NormalizationFindings {
    let lo = NORMALIZATION_TARGET_DB - NORMALIZATION_TOLERANCE_DB;
    let hi = NORMALIZATION_TARGET_DB + NORMALIZATION_TOLERANCE_DB;
    let status = if peak_db >= lo && peak_db <= hi {
        NormalizationStatus::Normalized
    } else {
        NormalizationStatus::NotNormalized
    };
    sink.report(index, "normalization", ranges::NORMALIZATION.1);
    NormalizationFindings {
        status,
        peak_db,
        target_db: NORMALIZATION_TARGET_DB,
    }
}

/// Clipping-event detection: a maximal run of >=3 consecutive clipped
/// samples in any channel is one event.
pub fn compute_clipping(
    channels: &[Vec<f32>],
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<ClippingFindings> {
    let len = channels.first().map(|c| c.len()).unwrap_or(0);
    let total_samples = (len * channels.len()).max(1);
    let mut clipped_samples = 0u64;
    let mut near_clipping_samples = 0u64;
    let mut event_count = 0u32;
    let mut scanned = 0usize;

    for channel in channels {
        let mut run = 0usize;
        for &s in channel {
            let a = s.abs();
            if a >= CLIP_THRESHOLD {
                clipped_samples += 1;
                run += 1;
            } else {
                if run >= CLIP_EVENT_MIN_RUN {
                    event_count += 1;
                }
                run = 0;
            }
            if a >= NEAR_CLIP_THRESHOLD && a < CLIP_THRESHOLD {
                near_clipping_samples += 1;
            }
            scanned += 1;
            if scanned % CANCEL_POLL_SAMPLES == 0 {
                check_cancelled(token, AnalysisStage::Clipping)?;
                sink.report(
                    index,
                    "clipping",
                    rescale(scanned as f32 / total_samples as f32, ranges::CLIPPING),
                );
            }
        }
        if run >= CLIP_EVENT_MIN_RUN {
            event_count += 1;
        }
    }

    sink.report(index, "clipping", ranges::CLIPPING.1);
    Ok(ClippingFindings {
        event_count,
        clipped_pct: clipped_samples as f32 / total_samples as f32 * 100.0,
        near_clipping_pct: near_clipping_samples as f32 / total_samples as f32 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::NullProgressSink;

    #[test]
    fn peak_of_silence_is_negative_infinity() {
        let channels = vec![vec![0.0f32; 1000]];
        let db = compute_peak(&channels, &CancellationToken::new(), &NullProgressSink, 0).unwrap();
        assert_eq!(db, f32::NEG_INFINITY);
    }

    #[test]
    fn peak_just_inside_normalized_threshold_is_normalized() {
        let peak_db = amplitude_to_db(0.501_187);
        let findings = compute_normalization(peak_db, &NullProgressSink, 0);
        assert_eq!(findings.status, NormalizationStatus::Normalized);
    }

    #[test]
    fn clipping_requires_three_consecutive_samples() {
        let channels = vec![vec![1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0]];
        let findings =
            compute_clipping(&channels, &CancellationToken::new(), &NullProgressSink, 0).unwrap();
        assert_eq!(findings.event_count, 1);
    }

    #[test]
    fn clipping_event_at_end_of_buffer_is_counted() {
        let channels = vec![vec![0.0, 1.0, 1.0, 1.0]];
        let findings =
            compute_clipping(&channels, &CancellationToken::new(), &NullProgressSink, 0).unwrap();
        assert_eq!(findings.event_count, 1);
    }

    #[test]
    fn cancellation_during_peak_scan_raises_analysis_cancelled() {
        let channels = vec![vec![0.0f32; 50_000]];
        let token = CancellationToken::new();
        token.cancel();
        let err = compute_peak(&channels, &token, &NullProgressSink, 0).unwrap_err();
        assert!(matches!(
            err,
            recspec_types::RecspecError::AnalysisCancelled {
                stage: AnalysisStage::PeakLevels
            }
        ));
    }
}
