//! The DSP passes over decoded PCM sample frames.
//!
//! Passes run in a fixed dependency order (peak → noise floor →
//! normalization → reverb → silence → clipping → stereo →
//! bleed/conversational); [`analyze`] sequences them and applies the
//! fixed progress sub-ranges from the batch orchestrator's progress
//! table, regardless of which passes [`AnalysisMode`] skips.

mod bleed;
mod common;
mod level;
mod reverb;
mod silence;
mod stereo;

pub use level::rms_window_series_db;

use recspec_types::{
    AnalysisMode, AudioBuffer, CancellationToken, ConversationalFindings, LevelFindings,
    MicBleedFindings, ProgressSink, RecspecResult, ReverbFindings, SilenceFindings,
    StereoFindings, StereoType,
};

/// Everything the level, reverb, silence, stereo, and bleed passes can
/// produce for one file.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub level: LevelFindings,
    pub reverb: Option<ReverbFindings>,
    pub silence: Option<SilenceFindings>,
    pub stereo: Option<StereoFindings>,
    pub bleed: Option<MicBleedFindings>,
    pub conversational: Option<ConversationalFindings>,
}

/// Runs the level pass (always) and the reverb/silence/stereo/bleed passes
/// (when `mode == Experimental`) over `buffer`.
///
/// `index` identifies this file within a batch for progress attribution;
/// pass `0` for a standalone single-file analysis.
pub fn analyze(
    buffer: &AudioBuffer,
    mode: AnalysisMode,
    token: &CancellationToken,
    sink: &dyn ProgressSink,
    index: usize,
) -> RecspecResult<AnalysisOutcome> {
    let channels = buffer.channels();
    let sample_rate_hz = buffer.sample_rate_hz();

    let peak_db = level::compute_peak(channels, token, sink, index)?;
    let (noise_floor_db, noise_floor_per_channel) =
        level::compute_noise_floor(channels, sample_rate_hz, peak_db, token, sink, index)?;
    let normalization = level::compute_normalization(peak_db, sink, index);

    let mono = buffer.mono_mix();

    let reverb = if mode == AnalysisMode::Experimental {
        Some(reverb::analyze_reverb(
            &mono,
            sample_rate_hz,
            noise_floor_db,
            token,
            sink,
            index,
        )?)
    } else {
        None
    };

    let silence = if mode == AnalysisMode::Experimental {
        Some(silence::analyze_silence(
            &mono,
            sample_rate_hz,
            peak_db,
            noise_floor_db,
            token,
            sink,
            index,
        )?)
    } else {
        None
    };

    let clipping = level::compute_clipping(channels, token, sink, index)?;

    let level_findings = LevelFindings {
        peak_db,
        noise_floor_db,
        noise_floor_per_channel: Some(noise_floor_per_channel),
        normalization,
        clipping,
    };

    let stereo_pass = if mode == AnalysisMode::Experimental && channels.len() == 2 {
        Some(stereo::analyze_stereo(
            channels,
            sample_rate_hz,
            token,
            sink,
            index,
        )?)
    } else {
        None
    };
    let stereo = stereo_pass.as_ref().map(|(findings, _)| findings.clone());

    let (bleed, conversational) = if let Some((stereo_findings, mean_rho)) = &stereo_pass {
        if stereo_findings.stereo_type == StereoType::ConversationalStereo {
            // Reuses the stereo pass's own cross-correlation mean rather
            // than recomputing it, since the two channels are already in
            // hand.
            let mean_rho = *mean_rho;
            let (bleed, conversational) = bleed::analyze_bleed_and_conversational(
                channels,
                sample_rate_hz,
                noise_floor_db,
                mean_rho,
                token,
                sink,
                index,
            )?;
            (Some(bleed), Some(conversational))
        } else {
            (None, None)
        }
    } else {
        (None, None)
    };

    Ok(AnalysisOutcome {
        level: level_findings,
        reverb,
        silence,
        stereo,
        bleed,
        conversational,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::NullProgressSink;
    use recspec_wav::testutil::write_pcm_wav;

    #[test]
    fn standard_mode_skips_experimental_passes() {
        let bytes = write_pcm_wav(8_000, 16, &[vec![0.1f32; 8_000]]);
        let buffer = recspec_wav::extract_wav_samples(&bytes).unwrap();
        let outcome = analyze(
            &buffer,
            AnalysisMode::Standard,
            &CancellationToken::new(),
            &NullProgressSink,
            0,
        )
        .unwrap();
        assert!(outcome.reverb.is_none());
        assert!(outcome.silence.is_none());
        assert!(outcome.stereo.is_none());
    }

    #[test]
    fn experimental_mode_runs_mono_passes_but_not_stereo() {
        let bytes = write_pcm_wav(8_000, 16, &[vec![0.1f32; 8_000]]);
        let buffer = recspec_wav::extract_wav_samples(&bytes).unwrap();
        let outcome = analyze(
            &buffer,
            AnalysisMode::Experimental,
            &CancellationToken::new(),
            &NullProgressSink,
            0,
        )
        .unwrap();
        assert!(outcome.reverb.is_some());
        assert!(outcome.silence.is_some());
        assert!(outcome.stereo.is_none());
    }
}
