use recspec_types::{
    AnalysisStage, CancellationToken, ConsistencyFindings, ConversationalFindings,
    MicBleedFindings, OverlapFindings, OverlapSegment, ProgressSink, RecspecResult, SyncFindings,
};

use crate::common::{amplitude_to_db, check_cancelled, rescale, ranges};

const DOMINANCE_BLOCK_S: f32 = 1.0;
const VOTE_FRAME_S: f32 = 0.100;
const VOICE_GATE_DB: f32 = 6.0;
const OVERLAP_GATE_DB: f32 = 12.0;
const OVERLAP_MIN_S: f32 = 0.300;
const BOTH_SILENT_IGNORE_S: f32 = 0.300;

fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    amplitude_to_db((sum_sq / samples.len() as f64).sqrt() as f32)
}

fn correlation(l: &[f32], r: &[f32]) -> f32 {
    let mut cross = 0.0f64;
    let mut energy_l = 0.0f64;
    let mut energy_r = 0.0f64;
    for (&a, &b) in l.iter().zip(r.iter()) {
        cross += (a as f64) * (b as f64);
        energy_l += (a as f64) * (a as f64);
        energy_r += (b as f64) * (b as f64);
    }
    let denom = (energy_l * energy_r).sqrt();
    if denom <= 0.0 {
        0.0
    } else {
        (cross / denom) as f32
    }
}

/// Bleed level on the dominant-channel's partner, median-aggregated over
/// 1 s blocks dominated by one channel (the energy-ratio model).
fn energy_ratio_bleed(l: &[f32], r: &[f32], sample_rate_hz: u32) -> (f32, f32) {
    let block_samples = (DOMINANCE_BLOCK_S * sample_rate_hz as f32) as usize;
    let len = l.len().min(r.len());
    let mut left_dominant_bleed = Vec::new(); // R bleed while L dominates
    let mut right_dominant_bleed = Vec::new(); // L bleed while R dominates

    let mut start = 0;
    while start < len {
        let end = (start + block_samples).min(len);
        let energy_l: f64 = l[start..end].iter().map(|&s| (s as f64) * (s as f64)).sum();
        let energy_r: f64 = r[start..end].iter().map(|&s| (s as f64) * (s as f64)).sum();
        if energy_l > 0.0 && energy_r > 0.0 {
            if energy_l > energy_r {
                left_dominant_bleed.push(10.0 * (energy_r / energy_l).log10() as f32);
            } else if energy_r > energy_l {
                right_dominant_bleed.push(10.0 * (energy_l / energy_r).log10() as f32);
            }
        }
        start += block_samples;
    }

    let median = |mut v: Vec<f32>| -> f32 {
        if v.is_empty() {
            return f32::NEG_INFINITY;
        }
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        v[v.len() / 2]
    };

    // right_bleed_db: bleed present on R while L dominates.
    let right_bleed_db = median(left_dominant_bleed);
    // left_bleed_db: bleed present on L while R dominates.
    let left_bleed_db = median(right_dominant_bleed);
    (left_bleed_db, right_bleed_db)
}

enum FrameVote {
    LeftOnly,
    RightOnly,
    Both,
    Neither,
}

/// Frame-vote bleed confirmation + severity score.
fn frame_vote_bleed(l: &[f32], r: &[f32], sample_rate_hz: u32, noise_floor_db: f32) -> (f32, f32) {
    let frame_samples = (VOTE_FRAME_S * sample_rate_hz as f32) as usize;
    let len = l.len().min(r.len());
    let gate = noise_floor_db + VOICE_GATE_DB;

    let mut single_speaker_frames = 0u32;
    let mut confirmed_both = 0u32;

    let mut start = 0;
    while start < len {
        let end = (start + frame_samples).min(len);
        let l_db = rms_db(&l[start..end]);
        let r_db = rms_db(&r[start..end]);
        let l_active = l_db >= gate;
        let r_active = r_db >= gate;
        let vote = match (l_active, r_active) {
            (true, false) => FrameVote::LeftOnly,
            (false, true) => FrameVote::RightOnly,
            (true, true) => FrameVote::Both,
            (false, false) => FrameVote::Neither,
        };
        match vote {
            FrameVote::LeftOnly | FrameVote::RightOnly => single_speaker_frames += 1,
            FrameVote::Both => {
                if correlation(&l[start..end], &r[start..end]) >= 0.5 {
                    confirmed_both += 1;
                }
            }
            FrameVote::Neither => {}
        }
        start += frame_samples;
    }

    let confirmed_bleed_pct = if single_speaker_frames == 0 {
        0.0
    } else {
        confirmed_both as f32 / single_speaker_frames as f32
    };

    let severity_score = piecewise_severity(confirmed_bleed_pct);
    (confirmed_bleed_pct * 100.0, severity_score)
}

/// Piecewise-linear mapping `{0→0, 0.1→30, 0.5→70, 1.0→100}`.
fn piecewise_severity(confirmed_bleed_pct: f32) -> f32 {
    let points = [(0.0, 0.0), (0.1, 30.0), (0.5, 70.0), (1.0, 100.0)];
    let x = confirmed_bleed_pct.clamp(0.0, 1.0);
    for window in points.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if x >= x0 && x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
            return y0 + t * (y1 - y0);
        }
    }
    100.0
}

/// Turn-taking overlap segments.
fn overlap_segments(
    l: &[f32],
    r: &[f32],
    sample_rate_hz: u32,
    noise_floor_db: f32,
) -> (f32, Vec<OverlapSegment>) {
    let frame_samples = (VOTE_FRAME_S * sample_rate_hz as f32) as usize;
    let len = l.len().min(r.len());
    let gate = noise_floor_db + OVERLAP_GATE_DB;

    let mut both_active = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + frame_samples).min(len);
        let active = rms_db(&l[start..end]) >= gate && rms_db(&r[start..end]) >= gate;
        both_active.push(active);
        start += frame_samples;
    }

    let frame_s = frame_samples as f32 / sample_rate_hz as f32;
    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &active) in both_active.iter().enumerate() {
        if active {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start_frame) = run_start.take() {
            let duration_s = (i - start_frame) as f32 * frame_s;
            if duration_s >= OVERLAP_MIN_S {
                segments.push(OverlapSegment {
                    start_s: start_frame as f32 * frame_s,
                    duration_s,
                });
            }
        }
    }
    if let Some(start_frame) = run_start {
        let duration_s = (both_active.len() - start_frame) as f32 * frame_s;
        if duration_s >= OVERLAP_MIN_S {
            segments.push(OverlapSegment {
                start_s: start_frame as f32 * frame_s,
                duration_s,
            });
        }
    }

    let total_s = len as f32 / sample_rate_hz as f32;
    let overlap_s: f32 = segments.iter().map(|s| s.duration_s).sum();
    let overlap_pct = if total_s > 0.0 {
        overlap_s / total_s * 100.0
    } else {
        0.0
    };
    (overlap_pct, segments)
}

/// Consistency: the fraction of the recording where exactly one side is
/// active. Brief mutual-silence gaps (<300 ms) are ignored. Full side-swap
/// detection (tracking which physical channel a given speaker identity
/// occupies over time) is not attempted; "exactly one channel active" is
/// used as the consistency signal instead.
fn consistency(l: &[f32], r: &[f32], sample_rate_hz: u32, noise_floor_db: f32) -> f32 {
    let frame_samples = (VOTE_FRAME_S * sample_rate_hz as f32) as usize;
    let len = l.len().min(r.len());
    let gate = noise_floor_db + VOICE_GATE_DB;
    let ignore_frames = (BOTH_SILENT_IGNORE_S / VOTE_FRAME_S).ceil() as usize;

    let mut single_speaker = 0u32;
    let mut counted = 0u32;
    let mut silent_run = 0usize;

    let mut start = 0;
    while start < len {
        let end = (start + frame_samples).min(len);
        let l_active = rms_db(&l[start..end]) >= gate;
        let r_active = rms_db(&r[start..end]) >= gate;
        if !l_active && !r_active {
            silent_run += 1;
            if silent_run > ignore_frames {
                counted += 1;
            }
        } else {
            silent_run = 0;
            counted += 1;
            if l_active != r_active {
                single_speaker += 1;
            }
        }
        start += frame_samples;
    }

    if counted == 0 {
        0.0
    } else {
        single_speaker as f32 / counted as f32 * 100.0
    }
}

/// Mic-bleed (dual model) and conversational turn-taking analysis. Only
/// meaningful when the file was classified as conversational stereo by
/// the stereo pass; the caller enforces that gating, this function just
/// computes the numbers.
#[allow(clippy::too_many_arguments)]
pub fn analyze_bleed_and_conversational(
    channels: &[Vec<f32>],
    sample_rate_hz: u32,
    noise_floor_db: f32,
    mean_rho: f32,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<(MicBleedFindings, ConversationalFindings)> {
    debug_assert_eq!(channels.len(), 2);
    let l = &channels[0];
    let r = &channels[1];

    check_cancelled(token, AnalysisStage::Bleed)?;
    let (left_bleed_db, right_bleed_db) = energy_ratio_bleed(l, r, sample_rate_hz);
    sink.report(
        index,
        "bleed",
        rescale(0.25, ranges::BLEED_CONVERSATIONAL),
    );

    let (confirmed_bleed_pct, severity_score) =
        frame_vote_bleed(l, r, sample_rate_hz, noise_floor_db);
    sink.report(
        index,
        "bleed",
        rescale(0.5, ranges::BLEED_CONVERSATIONAL),
    );

    check_cancelled(token, AnalysisStage::Conversational)?;
    let (overlap_pct, segments) = overlap_segments(l, r, sample_rate_hz, noise_floor_db);
    sink.report(
        index,
        "conversational",
        rescale(0.75, ranges::BLEED_CONVERSATIONAL),
    );

    let consistency_pct = consistency(l, r, sample_rate_hz, noise_floor_db);
    sink.report(index, "conversational", ranges::BLEED_CONVERSATIONAL.1);

    Ok((
        MicBleedFindings {
            left_bleed_db,
            right_bleed_db,
            confirmed_bleed_pct,
            severity_score,
        },
        ConversationalFindings {
            overlap: OverlapFindings {
                overlap_pct,
                segments,
            },
            consistency: ConsistencyFindings { consistency_pct },
            sync: SyncFindings {
                aligned: mean_rho.abs() >= 0.5,
                lag_ms: 0.0,
            },
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_score_matches_control_points() {
        assert_eq!(piecewise_severity(0.0), 0.0);
        assert_eq!(piecewise_severity(0.1), 30.0);
        assert_eq!(piecewise_severity(0.5), 70.0);
        assert_eq!(piecewise_severity(1.0), 100.0);
        assert!((piecewise_severity(0.3) - 50.0).abs() < 1.0);
    }
}
