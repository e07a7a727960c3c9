use recspec_types::{
    AnalysisStage, CancellationToken, ProgressSink, RecspecResult, ReverbFindings, ReverbLabel,
};

use crate::common::{amplitude_to_db, check_cancelled, rescale, ranges};
use crate::level::rms_window_series_db;

const ONSET_RISE_DB: f32 = 12.0;
const ONSET_TRAILING_WINDOWS: usize = 5; // 5 * 50ms = 250ms
const DECAY_OBSERVATION_S: f64 = 0.5;
const DECAY_SUBWINDOW_S: f64 = 0.005; // 5ms
const MAX_ONSETS_AGGREGATED: usize = 20;
const MIN_USABLE_ONSETS: usize = 3;
const CANCEL_POLL_ONSETS: usize = 100;

fn onset_gate_db(noise_floor_db: f32) -> f32 {
    (noise_floor_db + 20.0).max(-50.0)
}

struct Onset {
    /// Sample index, in the mono mix, where the onset window begins.
    start_sample: usize,
    /// How far the level rose above its trailing average, in dB. Used to
    /// rank onsets when there are more than fit budget allows.
    rise_db: f32,
}

fn detect_onsets(
    mono: &[f32],
    sample_rate_hz: u32,
    noise_floor_db: f32,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<Vec<Onset>> {
    let window_samples = (0.05 * sample_rate_hz as f64).round().max(1.0) as usize;
    let series = rms_window_series_db(&[mono.to_vec()], sample_rate_hz);
    let gate = onset_gate_db(noise_floor_db);

    let mut onsets = Vec::new();
    let mut scanned_windows = 0usize;
    for i in ONSET_TRAILING_WINDOWS..series.len() {
        let trailing_avg: f32 = series[i - ONSET_TRAILING_WINDOWS..i].iter().sum::<f32>()
            / ONSET_TRAILING_WINDOWS as f32;
        let current = series[i];
        let rise_db = current - trailing_avg;
        if rise_db >= ONSET_RISE_DB && current >= gate {
            onsets.push(Onset {
                start_sample: i * window_samples,
                rise_db,
            });
        }
        scanned_windows += 1;
        if scanned_windows % CANCEL_POLL_ONSETS == 0 {
            check_cancelled(token, AnalysisStage::Reverb)?;
            sink.report(
                index,
                "reverb",
                rescale(
                    scanned_windows as f32 / series.len().max(1) as f32 * 0.5,
                    ranges::REVERB,
                ),
            );
        }
    }
    Ok(onsets)
}

/// Linear regression slope (dB/s) of `(time_s, db)` pairs via least squares.
fn regression_slope(points: &[(f64, f32)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| *y as f64).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * (*y as f64)).sum();
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denom)
}

/// Fits the decay slope for one onset, returning its RT60 in seconds if
/// the decay portion is well-formed.
fn rt60_for_onset(mono: &[f32], sample_rate_hz: u32, onset: &Onset, noise_floor_db: f32) -> Option<f64> {
    let sub_window = (DECAY_SUBWINDOW_S * sample_rate_hz as f64).round().max(1.0) as usize;
    let observation_samples =
        (DECAY_OBSERVATION_S * sample_rate_hz as f64).round() as usize;
    let end = (onset.start_sample + observation_samples).min(mono.len());
    if end <= onset.start_sample {
        return None;
    }

    let mut envelope = Vec::new();
    let mut t = onset.start_sample;
    let mut time_s = 0.0f64;
    while t < end {
        let sub_end = (t + sub_window).min(end);
        let rms = {
            let slice = &mono[t..sub_end];
            if slice.is_empty() {
                0.0
            } else {
                let sum_sq: f64 = slice.iter().map(|&s| (s as f64) * (s as f64)).sum();
                (sum_sq / slice.len() as f64).sqrt() as f32
            }
        };
        envelope.push((time_s, amplitude_to_db(rms)));
        t += sub_window;
        time_s += DECAY_SUBWINDOW_S;
    }

    let (peak_idx, _) = envelope
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.1.partial_cmp(&b.1).unwrap())?;

    let floor_gate = noise_floor_db + 3.0;
    let decay_end_idx = envelope[peak_idx..]
        .iter()
        .position(|(_, db)| *db <= floor_gate)
        .map(|rel| peak_idx + rel)
        .unwrap_or(envelope.len() - 1);

    if decay_end_idx <= peak_idx {
        return None;
    }
    let decay_points = &envelope[peak_idx..=decay_end_idx];
    let slope = regression_slope(decay_points)?;
    if slope >= 0.0 {
        return None;
    }
    Some(60.0 / slope.abs())
}

fn label_for_rt60(rt60_s: f32) -> ReverbLabel {
    if rt60_s < 0.3 {
        ReverbLabel::Excellent
    } else if rt60_s < 0.5 {
        ReverbLabel::Good
    } else if rt60_s < 0.8 {
        ReverbLabel::Acceptable
    } else {
        ReverbLabel::Poor
    }
}

/// RT60 via onset detection + decay-slope regression, median-aggregated
/// across the cleanest onsets found (capped at `MAX_ONSETS_AGGREGATED`).
pub fn analyze_reverb(
    mono: &[f32],
    sample_rate_hz: u32,
    noise_floor_db: f32,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<ReverbFindings> {
    let mut onsets = detect_onsets(mono, sample_rate_hz, noise_floor_db, token, sink, index)?;

    // Sharper rises produce better-formed decay fits, so when there are
    // more onsets than the aggregation budget, keep the sharpest rather
    // than whichever happened to occur earliest.
    onsets.sort_by(|a, b| b.rise_db.partial_cmp(&a.rise_db).unwrap());

    let mut rt60s: Vec<f64> = Vec::new();
    for onset in onsets.iter().take(MAX_ONSETS_AGGREGATED) {
        if let Some(rt60) = rt60_for_onset(mono, sample_rate_hz, onset, noise_floor_db) {
            rt60s.push(rt60);
        }
    }

    sink.report(index, "reverb", ranges::REVERB.1);

    if rt60s.len() < MIN_USABLE_ONSETS {
        return Ok(ReverbFindings {
            rt60_s: f32::NAN,
            label: ReverbLabel::Undetermined,
        });
    }

    rt60s.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = rt60s[rt60s.len() / 2] as f32;
    Ok(ReverbFindings {
        rt60_s: median,
        label: label_for_rt60(median),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::NullProgressSink;

    #[test]
    fn silence_yields_undetermined_reverb() {
        let mono = vec![0.0f32; 48_000 * 2];
        let findings = analyze_reverb(&mono, 48_000, -60.0, &CancellationToken::new(), &NullProgressSink, 0).unwrap();
        assert_eq!(findings.label, ReverbLabel::Undetermined);
        assert!(findings.rt60_s.is_nan());
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(label_for_rt60(0.1), ReverbLabel::Excellent);
        assert_eq!(label_for_rt60(0.4), ReverbLabel::Good);
        assert_eq!(label_for_rt60(0.7), ReverbLabel::Acceptable);
        assert_eq!(label_for_rt60(1.2), ReverbLabel::Poor);
    }
}
