//! `script_match` filename rule, used by the `three-hour` preset.

use recspec_types::{RuleStatus, ValidationResult};

/// Configuration a host must supply for the `three-hour` preset's
/// `script_match` rule. The allowed script base names and expected
/// speaker id travel alongside the preset as per-run configuration
/// rather than as immutable preset criteria, since a single `three-hour`
/// preset is reused across many distinct scripts/speakers (see
/// `DESIGN.md`). Absence of this value when `filename_rule == ScriptMatch`
/// raises `RecspecError::PresetRequiresConfiguration`.
#[derive(Debug, Clone)]
pub struct ScriptMatchConfig {
    /// Ordered sequence of allowed script base names.
    pub allowed_script_bases: Vec<String>,
    pub expected_speaker_id: String,
}

/// Validates `filename` against `config`.
///
/// Expected form `<script_base>_<speaker_id>.wav` (case-sensitive base
/// match); the first allowed base that prefixes the filename decides the
/// outcome.
pub fn validate_script_match(filename: &str, config: &ScriptMatchConfig) -> ValidationResult {
    let trimmed = filename.trim();
    let candidate = strip_wav_suffix(trimmed);

    for base in &config.allowed_script_bases {
        let prefix = format!("{base}_");
        if let Some(remainder) = candidate.strip_prefix(prefix.as_str()) {
            let expected = format!("{base}_{}", config.expected_speaker_id);
            if remainder == config.expected_speaker_id {
                return ValidationResult::new(RuleStatus::Pass, true, candidate, expected);
            }
            return ValidationResult::new(RuleStatus::Fail, false, candidate, expected)
                .with_message("Incorrect speaker id");
        }
    }

    ValidationResult::new(
        RuleStatus::Fail,
        false,
        candidate,
        "<script_base>_<speaker_id>",
    )
    .with_message("No matching script")
}

/// Strips a trailing `.wav`/`.WAV`/... suffix (case-insensitive).
fn strip_wav_suffix(name: &str) -> &str {
    if name.len() >= 4 && name[name.len() - 4..].eq_ignore_ascii_case(".wav") {
        &name[..name.len() - 4]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScriptMatchConfig {
        ScriptMatchConfig {
            allowed_script_bases: vec!["script_alpha".to_string(), "script_beta".to_string()],
            expected_speaker_id: "spk042".to_string(),
        }
    }

    #[test]
    fn exact_match_passes() {
        let result = validate_script_match("script_alpha_spk042.wav", &config());
        assert_eq!(result.status, RuleStatus::Pass);
        assert!(result.matched);
    }

    #[test]
    fn wrong_speaker_id_fails_with_message() {
        let result = validate_script_match("script_alpha_spk099.wav", &config());
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.message.as_deref(), Some("Incorrect speaker id"));
    }

    #[test]
    fn unrecognized_base_fails_with_no_matching_script() {
        let result = validate_script_match("script_gamma_spk042.wav", &config());
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.message.as_deref(), Some("No matching script"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let result = validate_script_match("SCRIPT_ALPHA_spk042.wav", &config());
        assert_eq!(result.status, RuleStatus::Fail);
    }

    #[test]
    fn wav_suffix_strip_is_case_insensitive() {
        let result = validate_script_match("script_alpha_spk042.WAV", &config());
        assert_eq!(result.status, RuleStatus::Pass);
    }
}
