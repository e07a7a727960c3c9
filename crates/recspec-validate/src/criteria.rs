//! Reduces `FileProperties` + optional DSP findings to a `ValidationResult`
//! per applicable rule, folding `rules × findings` over a tagged-union
//! `Rule` enum so each rule kind owns its own comparison logic.

use std::collections::BTreeMap;

use recspec_types::{
    BitDepth, ConversationalFindings, FileProperties, FilenameRule, Preset, RecspecError,
    RecspecResult, RuleStatus, StereoFindings, ValidationResult,
};

use crate::catalogue::Catalogue;
use crate::filename::{validate_bilingual_pattern, validate_script_match, ScriptMatchConfig};

/// Per-file inputs the criteria validator needs beyond `FileProperties`
/// and DSP findings: the candidate filename and whatever filename-rule
/// configuration the preset's `filename_rule` requires. `script_match`
/// config is per-run, not preset-immutable, because a single `three-hour`
/// preset is reused across many distinct scripts/speakers.
#[derive(Debug, Clone, Default)]
pub struct FilenameContext {
    pub filename: Option<String>,
    pub script_match: Option<ScriptMatchConfig>,
}

/// Evaluates every rule a `preset` carries against `properties` and the
/// optional DSP findings, returning one [`ValidationResult`] per applicable
/// rule name. Rules whose preset field is absent are skipped entirely
/// rather than evaluated against a default.
pub fn evaluate(
    properties: &FileProperties,
    stereo: Option<&StereoFindings>,
    conversational: Option<&ConversationalFindings>,
    preset: &Preset,
    filename_ctx: &FilenameContext,
    catalogue: &Catalogue,
) -> RecspecResult<BTreeMap<String, ValidationResult>> {
    let mut results = BTreeMap::new();

    if let Some(allowed) = &preset.file_type {
        results.insert(
            "file_type".to_string(),
            evaluate_file_type(&properties.file_type, allowed),
        );
    }

    if !preset.skip_audio_validation {
        if let Some(allowed) = &preset.sample_rate {
            results.insert(
                "sample_rate".to_string(),
                evaluate_numeric_rule(properties.sample_rate_hz, allowed),
            );
        }
        if let Some(allowed) = &preset.bit_depth {
            results.insert("bit_depth".to_string(), evaluate_bit_depth(properties.bit_depth, allowed));
        }
        if let Some(allowed) = &preset.channels {
            results.insert(
                "channels".to_string(),
                evaluate_numeric_rule(properties.channel_count, allowed),
            );
        }
    }

    if let Some(min_duration_s) = preset.min_duration_s {
        results.insert(
            "duration".to_string(),
            evaluate_duration(properties.duration_s, min_duration_s),
        );
    }

    if let Some(allowed) = &preset.stereo_type {
        results.insert(
            "stereo_type".to_string(),
            evaluate_stereo_type(stereo, allowed),
        );
    }

    if has_overlap_thresholds(preset) {
        results.insert(
            "overlap".to_string(),
            evaluate_overlap(conversational, preset),
        );
    }

    if let Some(rule) = preset.filename_rule {
        if rule != FilenameRule::None {
            results.insert(
                "filename".to_string(),
                evaluate_filename(rule, filename_ctx, catalogue)?,
            );
        }
    }

    Ok(results)
}

/// `WAV (PCM)` matches `WAV` as `pass`; `WAV (Compressed – …)` as
/// `warning`; anything else against `WAV` is `fail`. Normalization strips
/// a trailing parenthesized suffix before the case-insensitive compare.
fn evaluate_file_type(observed: &str, allowed: &[String]) -> ValidationResult {
    let normalized_observed = strip_parenthesized_suffix(observed);
    let expected = allowed.join(", ");

    for label in allowed {
        if !normalized_observed.eq_ignore_ascii_case(label) {
            continue;
        }
        if observed.eq_ignore_ascii_case("WAV (PCM)") {
            return ValidationResult::new(RuleStatus::Pass, true, observed, expected);
        }
        if observed.to_ascii_lowercase().starts_with("wav (compressed") {
            return ValidationResult::new(RuleStatus::Warning, false, observed, expected)
                .with_message("compressed WAV; bit depth is advisory");
        }
        return ValidationResult::new(RuleStatus::Pass, true, observed, expected);
    }
    ValidationResult::new(RuleStatus::Fail, false, observed, expected)
}

fn strip_parenthesized_suffix(label: &str) -> &str {
    match label.find(" (") {
        Some(idx) => &label[..idx],
        None => label,
    }
}

fn evaluate_numeric_rule<T>(observed: Option<T>, allowed: &[T]) -> ValidationResult
where
    T: PartialEq + std::fmt::Display + Copy,
{
    let expected = allowed
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match observed {
        None => ValidationResult::new(RuleStatus::Warning, false, "Unknown", expected),
        Some(value) => {
            let matched = allowed.contains(&value);
            ValidationResult::new(
                if matched { RuleStatus::Pass } else { RuleStatus::Fail },
                matched,
                value.to_string(),
                expected,
            )
        }
    }
}

fn evaluate_bit_depth(observed: BitDepth, allowed: &[u16]) -> ValidationResult {
    let expected = allowed
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match observed {
        BitDepth::Known(bits) => {
            let matched = allowed.contains(&bits);
            ValidationResult::new(
                if matched { RuleStatus::Pass } else { RuleStatus::Fail },
                matched,
                bits.to_string(),
                expected,
            )
        }
        BitDepth::Unknown => {
            ValidationResult::new(RuleStatus::Warning, false, "Unknown", expected)
        }
        BitDepth::Compressed => ValidationResult::new(RuleStatus::Warning, false, "Compressed", expected)
            .with_message("bit depth is advisory for compressed formats"),
    }
}

fn evaluate_duration(observed: Option<f64>, min_duration_s: f32) -> ValidationResult {
    let expected = format!(">= {min_duration_s}s");
    match observed {
        None => ValidationResult::new(RuleStatus::Warning, false, "Unknown", expected),
        Some(duration_s) => {
            if duration_s >= min_duration_s as f64 {
                ValidationResult::new(RuleStatus::Pass, true, format!("{duration_s}s"), expected)
            } else {
                ValidationResult::new(RuleStatus::Warning, false, format!("{duration_s}s"), expected)
            }
        }
    }
}

fn evaluate_stereo_type(stereo: Option<&StereoFindings>, allowed: &[String]) -> ValidationResult {
    let expected = allowed.join(", ");
    match stereo {
        None => ValidationResult::new(RuleStatus::Fail, false, "Unknown", expected)
            .with_message("Not a stereo file"),
        Some(findings) => {
            let label = findings.stereo_type.label();
            let matched = allowed.iter().any(|a| a.eq_ignore_ascii_case(label));
            ValidationResult::new(
                if matched { RuleStatus::Pass } else { RuleStatus::Fail },
                matched,
                label,
                expected,
            )
        }
    }
}

fn has_overlap_thresholds(preset: &Preset) -> bool {
    preset.max_overlap_warning_pct.is_some()
        || preset.max_overlap_fail_pct.is_some()
        || preset.max_overlap_segment_warning_s.is_some()
        || preset.max_overlap_segment_fail_s.is_some()
}

/// Worst of the percentage-threshold status and the segment-threshold
/// status, using strict `>` comparisons with equality falling on the
/// lower-severity side.
fn evaluate_overlap(
    conversational: Option<&ConversationalFindings>,
    preset: &Preset,
) -> ValidationResult {
    let expected = format!(
        "overlap <= {}% (warn {}%), longest segment <= {}s (warn {}s)",
        preset.max_overlap_fail_pct.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string()),
        preset.max_overlap_warning_pct.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string()),
        preset.max_overlap_segment_fail_s.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string()),
        preset.max_overlap_segment_warning_s.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string()),
    );

    let Some(findings) = conversational else {
        return ValidationResult::new(RuleStatus::Fail, false, "Unknown", expected)
            .with_message("no conversational overlap findings available");
    };

    let pct_status = threshold_status(
        findings.overlap.overlap_pct,
        preset.max_overlap_warning_pct,
        preset.max_overlap_fail_pct,
    );
    let longest_segment_s = findings
        .overlap
        .segments
        .iter()
        .map(|s| s.duration_s)
        .fold(0.0f32, f32::max);
    let segment_status = threshold_status(
        longest_segment_s,
        preset.max_overlap_segment_warning_s,
        preset.max_overlap_segment_fail_s,
    );

    let status = pct_status.max(segment_status);
    let matched = status == RuleStatus::Pass;
    ValidationResult::new(
        status,
        matched,
        format!(
            "overlap {:.1}%, longest segment {:.2}s",
            findings.overlap.overlap_pct, longest_segment_s
        ),
        expected,
    )
}

/// `> fail` is `Fail`, `> warning` is `Warning`, else `Pass`; a missing
/// threshold never contributes a worse verdict.
fn threshold_status(observed: f32, warning: Option<f32>, fail: Option<f32>) -> RuleStatus {
    if let Some(fail) = fail {
        if observed > fail {
            return RuleStatus::Fail;
        }
    }
    if let Some(warning) = warning {
        if observed > warning {
            return RuleStatus::Warning;
        }
    }
    RuleStatus::Pass
}

fn evaluate_filename(
    rule: FilenameRule,
    ctx: &FilenameContext,
    catalogue: &Catalogue,
) -> RecspecResult<ValidationResult> {
    let filename = ctx.filename.as_deref().ok_or_else(|| RecspecError::PresetRequiresConfiguration {
        message: "filename rule requires a candidate filename".to_string(),
    })?;

    match rule {
        FilenameRule::None => unreachable!("caller filters FilenameRule::None"),
        FilenameRule::ScriptMatch => {
            let config = ctx.script_match.as_ref().ok_or_else(|| {
                RecspecError::PresetRequiresConfiguration {
                    message: "three-hour preset requires allowed scripts and an expected speaker id"
                        .to_string(),
                }
            })?;
            Ok(validate_script_match(filename, config))
        }
        FilenameRule::BilingualPattern => {
            let result = validate_bilingual_pattern(filename, catalogue);
            Ok(result.into_validation_result(filename))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::{
        BitDepth, ConsistencyFindings, OverlapFindings, OverlapSegment, StereoType, SyncFindings,
    };

    fn properties(file_type: &str) -> FileProperties {
        FileProperties {
            file_type: file_type.to_string(),
            sample_rate_hz: Some(48_000),
            bit_depth: BitDepth::Known(16),
            channel_count: Some(2),
            duration_s: Some(2.0),
            file_size_bytes: 1_536_044,
        }
    }

    #[test]
    fn parser_happy_path_passes_p2b2_stereo() {
        let preset = crate::presets::PresetRegistry::default_presets();
        let preset = preset.lookup("p2b2-pairs-stereo").unwrap();
        let props = properties("WAV (PCM)");
        let catalogue = Catalogue::embedded();
        let results = evaluate(&props, None, None, preset, &FilenameContext::default(), &catalogue).unwrap();
        assert!(results.values().all(|r| r.status == RuleStatus::Pass));
    }

    #[test]
    fn compressed_wav_against_wav_preset_warns() {
        let registry = crate::presets::PresetRegistry::default_presets();
        let preset = registry.lookup("auditions-emotional-voice").unwrap();
        let mut props = properties("WAV (Compressed – Format 2)");
        props.channel_count = Some(1);
        let catalogue = Catalogue::embedded();
        let results = evaluate(&props, None, None, preset, &FilenameContext::default(), &catalogue).unwrap();
        assert_eq!(results["file_type"].status, RuleStatus::Warning);
    }

    #[test]
    fn file_type_mp3_against_wav_fails() {
        let mut props = properties("MP3");
        props.bit_depth = BitDepth::Compressed;
        let result = evaluate_file_type(&props.file_type, &["WAV".to_string()]);
        assert_eq!(result.status, RuleStatus::Fail);
    }

    #[test]
    fn stereo_rule_fails_without_findings() {
        let result = evaluate_stereo_type(None, &["Conversational Stereo".to_string()]);
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.message.as_deref(), Some("Not a stereo file"));
    }

    #[test]
    fn overlap_equality_falls_on_lower_severity_side() {
        let preset = Preset::new("t").with_overlap_thresholds(10.0, 25.0);
        let conversational = ConversationalFindings {
            overlap: OverlapFindings {
                overlap_pct: 10.0,
                segments: vec![OverlapSegment { start_s: 0.0, duration_s: 1.0 }],
            },
            consistency: ConsistencyFindings { consistency_pct: 90.0 },
            sync: SyncFindings { aligned: true, lag_ms: 0.0 },
        };
        let result = evaluate_overlap(Some(&conversational), &preset);
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn overlap_strictly_above_warning_warns() {
        let preset = Preset::new("t").with_overlap_thresholds(10.0, 25.0);
        let conversational = ConversationalFindings {
            overlap: OverlapFindings {
                overlap_pct: 10.1,
                segments: vec![],
            },
            consistency: ConsistencyFindings { consistency_pct: 90.0 },
            sync: SyncFindings { aligned: true, lag_ms: 0.0 },
        };
        let result = evaluate_overlap(Some(&conversational), &preset);
        assert_eq!(result.status, RuleStatus::Warning);
    }

    #[test]
    fn three_hour_without_config_is_preset_requires_configuration() {
        let registry = crate::presets::PresetRegistry::default_presets();
        let preset = registry.lookup("three-hour").unwrap();
        let props = properties("WAV (PCM)");
        let catalogue = Catalogue::embedded();
        let ctx = FilenameContext {
            filename: Some("script_alpha_spk01.wav".to_string()),
            script_match: None,
        };
        let err = evaluate(&props, None, None, preset, &ctx, &catalogue).unwrap_err();
        assert!(matches!(err, RecspecError::PresetRequiresConfiguration { .. }));
    }
}
