use recspec_types::{
    AnalysisStage, CancellationToken, ProgressSink, RecspecResult, StereoFindings, StereoType,
};

use crate::common::{amplitude_to_db, check_cancelled, rescale, ranges};

const SILENT_GATE_DB: f32 = -60.0;
const MONO_AS_STEREO_RHO: f32 = 0.98;
const CONVERSATIONAL_RHO: f32 = 0.35;
const DOMINANCE_GAP_DB: f32 = 9.0;
const DOMINANCE_BLOCK_FRACTION: f32 = 0.60;
const CANCEL_POLL_BLOCKS: usize = 1_000;

struct Block {
    rho: f32,
    rms_l_db: f32,
    rms_r_db: f32,
}

fn block_rms_db(samples: &[f32]) -> f32 {
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

/// Classifies a two-channel recording's stereo topology.
///
/// `confidence` is the classifying threshold's margin, rescaled into
/// `[0,1]`; the scale divisors below (`0.1` rho headroom, `10` dB
/// headroom) are this implementation's own choice of "distance from the
/// nearest threshold", not a pinned scale.
pub fn analyze_stereo(
    channels: &[Vec<f32>],
    sample_rate_hz: u32,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<(StereoFindings, f32)> {
    debug_assert_eq!(channels.len(), 2);
    let l = &channels[0];
    let r = &channels[1];
    let len = l.len().min(r.len());
    let block_samples = sample_rate_hz as usize;

    let overall_l_db = block_rms_db(&l[..len]);
    let overall_r_db = block_rms_db(&r[..len]);

    if overall_l_db < SILENT_GATE_DB && overall_r_db < SILENT_GATE_DB {
        sink.report(index, "stereo", ranges::STEREO.1);
        return Ok((
            StereoFindings {
                stereo_type: StereoType::Silent,
                confidence: 1.0,
            },
            0.0,
        ));
    }
    if overall_l_db < SILENT_GATE_DB && overall_r_db >= SILENT_GATE_DB {
        sink.report(index, "stereo", ranges::STEREO.1);
        return Ok((
            StereoFindings {
                stereo_type: StereoType::MonoInRightChannel,
                confidence: ((SILENT_GATE_DB - overall_l_db).abs() / 10.0).clamp(0.0, 1.0),
            },
            0.0,
        ));
    }
    if overall_r_db < SILENT_GATE_DB && overall_l_db >= SILENT_GATE_DB {
        sink.report(index, "stereo", ranges::STEREO.1);
        return Ok((
            StereoFindings {
                stereo_type: StereoType::MonoInLeftChannel,
                confidence: ((SILENT_GATE_DB - overall_r_db).abs() / 10.0).clamp(0.0, 1.0),
            },
            0.0,
        ));
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    let mut scanned = 0usize;
    while start < len {
        let end = (start + block_samples).min(len);
        let block = Block {
            rho: correlation(&l[start..end], &r[start..end]),
            rms_l_db: block_rms_db(&l[start..end]),
            rms_r_db: block_rms_db(&r[start..end]),
        };
        blocks.push(block);
        start += block_samples;
        scanned += 1;
        if scanned % CANCEL_POLL_BLOCKS == 0 {
            check_cancelled(token, AnalysisStage::Stereo)?;
            sink.report(
                index,
                "stereo",
                rescale(start as f32 / len.max(1) as f32, ranges::STEREO),
            );
        }
    }

    if blocks.is_empty() {
        sink.report(index, "stereo", ranges::STEREO.1);
        return Ok((
            StereoFindings {
                stereo_type: StereoType::Undetermined,
                confidence: 0.0,
            },
            0.0,
        ));
    }

    let mean_rho: f32 = blocks.iter().map(|b| b.rho).sum::<f32>() / blocks.len() as f32;

    let active_blocks: Vec<&Block> = blocks
        .iter()
        .filter(|b| b.rms_l_db.max(b.rms_r_db) > SILENT_GATE_DB + 10.0)
        .collect();
    let dominant_blocks = active_blocks
        .iter()
        .filter(|b| (b.rms_l_db - b.rms_r_db).abs() >= DOMINANCE_GAP_DB)
        .count();
    let dominance_fraction = if active_blocks.is_empty() {
        0.0
    } else {
        dominant_blocks as f32 / active_blocks.len() as f32
    };

    sink.report(index, "stereo", ranges::STEREO.1);

    let (stereo_type, confidence) = if mean_rho.abs() >= MONO_AS_STEREO_RHO {
        (
            StereoType::MonoAsStereo,
            ((mean_rho.abs() - MONO_AS_STEREO_RHO) / 0.02).clamp(0.0, 1.0),
        )
    } else if mean_rho.abs() <= CONVERSATIONAL_RHO && dominance_fraction >= DOMINANCE_BLOCK_FRACTION
    {
        (
            StereoType::ConversationalStereo,
            ((CONVERSATIONAL_RHO - mean_rho.abs()) / CONVERSATIONAL_RHO).clamp(0.0, 1.0),
        )
    } else {
        (
            StereoType::MixedStereo,
            (1.0 - (mean_rho.abs() - CONVERSATIONAL_RHO).abs() / (MONO_AS_STEREO_RHO - CONVERSATIONAL_RHO))
                .clamp(0.0, 1.0),
        )
    };

    Ok((
        StereoFindings {
            stereo_type,
            confidence,
        },
        mean_rho,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::NullProgressSink;
    use std::f32::consts::PI;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn exact_copy_is_mono_as_stereo() {
        let sample_rate = 8_000;
        let l = tone(220.0, sample_rate, 2.0);
        let r = l.clone();
        let (findings, _rho) =
            analyze_stereo(&[l, r], sample_rate, &CancellationToken::new(), &NullProgressSink, 0)
                .unwrap();
        assert_eq!(findings.stereo_type, StereoType::MonoAsStereo);
        assert!(findings.confidence > 0.5);
    }

    #[test]
    fn disjoint_turns_are_conversational() {
        let sample_rate = 8_000;
        let mut l = tone(220.0, sample_rate, 2.0);
        let mut r = vec![0.0f32; l.len()];
        r.extend(tone(440.0, sample_rate, 2.0));
        l.extend(vec![0.0f32; sample_rate as usize * 2]);
        let (findings, _rho) =
            analyze_stereo(&[l, r], sample_rate, &CancellationToken::new(), &NullProgressSink, 0)
                .unwrap();
        assert_eq!(findings.stereo_type, StereoType::ConversationalStereo);
    }

    #[test]
    fn silence_in_both_channels_is_silent() {
        let channels = vec![vec![0.0f32; 8_000], vec![0.0f32; 8_000]];
        let (findings, _rho) =
            analyze_stereo(&channels, 8_000, &CancellationToken::new(), &NullProgressSink, 0)
                .unwrap();
        assert_eq!(findings.stereo_type, StereoType::Silent);
    }
}
