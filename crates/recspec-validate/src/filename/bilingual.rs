//! `bilingual_pattern` filename rule, used by the `bilingual-conversational`
//! preset.

use recspec_types::{RecspecError, RuleStatus, ValidationResult};

use crate::catalogue::Catalogue;

const SPONTANEOUS_PREFIX: &str = "SPONTANEOUS_";

/// Structured result of the bilingual pattern check.
#[derive(Debug, Clone)]
pub struct BilingualResult {
    pub status: RuleStatus,
    pub expected_format: String,
    pub issues: Vec<String>,
    pub is_spontaneous: bool,
}

impl BilingualResult {
    pub fn into_validation_result(self, observed: &str) -> ValidationResult {
        let matched = self.status == RuleStatus::Pass;
        let mut result =
            ValidationResult::new(self.status, matched, observed, self.expected_format);
        if !self.issues.is_empty() {
            result = result.with_message(self.issues.join("; "));
        }
        result
    }
}

struct Parsed<'a> {
    conversation_id: String,
    lang: &'a str,
    user_id: u64,
    agent_id: u64,
}

/// Finds the `(conversation_id, lang, user_id, agent_id)` split point: the
/// language token is a `-`-delimited segment recognized by the catalogue
/// such that everything after it is exactly `user-<id>-agent-<id>`.
/// Conversation ids may themselves contain `-`, so `<lang>` can only be
/// identified by lookup in the catalogue rather than by position. The
/// spontaneous grammar's token before `<lang>` is always the single
/// `SPONTANEOUS_<N>` segment
/// (`lang_idx` fixed at 1); the scripted grammar's conversation id may
/// span multiple segments, so every candidate `lang_idx` is tried.
fn parse_base<'a>(
    parts: &[&'a str],
    catalogue: &'a Catalogue,
    fixed_lang_idx: Option<usize>,
) -> Option<Parsed<'a>> {
    let candidates: Vec<usize> = match fixed_lang_idx {
        Some(idx) => vec![idx],
        None => (1..parts.len()).collect(),
    };
    for lang_idx in candidates {
        if lang_idx >= parts.len() {
            continue;
        }
        let lang = parts[lang_idx];
        if !catalogue.is_known_language(lang) {
            continue;
        }
        let remainder = &parts[lang_idx + 1..];
        if remainder.len() != 4 || remainder[0] != "user" || remainder[2] != "agent" {
            continue;
        }
        let (Ok(user_id), Ok(agent_id)) =
            (remainder[1].parse::<u64>(), remainder[3].parse::<u64>())
        else {
            continue;
        };
        let conversation_id = parts[..lang_idx].join("-");
        return Some(Parsed {
            conversation_id,
            lang,
            user_id,
            agent_id,
        });
    }
    None
}

fn strip_wav_suffix(name: &str) -> Option<&str> {
    if name.len() >= 4 && name[name.len() - 4..].eq_ignore_ascii_case(".wav") {
        Some(&name[..name.len() - 4])
    } else {
        None
    }
}

/// Validates `filename` against the bilingual scripted/unscripted
/// grammars.
pub fn validate_bilingual_pattern(filename: &str, catalogue: &Catalogue) -> BilingualResult {
    let mut issues = Vec::new();

    // Detect spontaneous case-insensitively before anything else so a
    // case-mismatched `Spontaneous_` prefix routes to the unscripted
    // grammar and its diagnostics, never the scripted one.
    let is_spontaneous = filename.len() >= SPONTANEOUS_PREFIX.len()
        && filename[..SPONTANEOUS_PREFIX.len()].eq_ignore_ascii_case(SPONTANEOUS_PREFIX);

    let base = match strip_wav_suffix(filename) {
        Some(b) => b,
        None => {
            issues.push("must end with .wav".to_string());
            filename
        }
    };
    if strip_wav_suffix(base).is_some() {
        issues.push("double extension".to_string());
    }

    if filename.chars().any(|c| c.is_whitespace()) {
        issues.push("filename must not contain whitespace".to_string());
    }

    if is_spontaneous {
        let remainder = &base[SPONTANEOUS_PREFIX.len().min(base.len())..];
        if !base.starts_with(SPONTANEOUS_PREFIX) {
            issues.push(format!("{SPONTANEOUS_PREFIX} prefix must be uppercase"));
        } else if remainder != remainder.to_lowercase() {
            issues.push("unscripted filename suffix must be lowercase".to_string());
        }
    } else if base != base.to_lowercase() {
        issues.push("scripted filename must be entirely lowercase".to_string());
    }

    let parts: Vec<&str> = base.split('-').collect();
    let fixed_lang_idx = if is_spontaneous { Some(1) } else { None };
    let parsed = parse_base(&parts, catalogue, fixed_lang_idx);

    let (expected_format, pair_ok) = match &parsed {
        Some(p) if !catalogue.has_contributor_pair(p.lang, p.user_id, p.agent_id) => {
            issues.push(format!(
                "contributor pair ({}, {}) not recognized for language '{}'",
                p.user_id, p.agent_id, p.lang
            ));
            let conv_token = if is_spontaneous {
                parts[0].to_string()
            } else {
                p.conversation_id.clone()
            };
            (
                format!("{conv_token}-{}-user-<user_id>-agent-<agent_id>.wav", p.lang),
                false,
            )
        }
        Some(_) => (filename.to_string(), true),
        None => {
            if is_spontaneous {
                issues.push("malformed SPONTANEOUS_<N>-<lang>-user-<id>-agent-<id> filename".to_string());
            } else {
                issues.push("malformed <conversation_id>-<lang>-user-<id>-agent-<id> filename".to_string());
            }
            (canonical_template(is_spontaneous), false)
        }
    };

    let status = if issues.is_empty() && pair_ok {
        RuleStatus::Pass
    } else {
        RuleStatus::Fail
    };

    BilingualResult {
        status,
        expected_format,
        issues,
        is_spontaneous,
    }
}

fn canonical_template(is_spontaneous: bool) -> String {
    if is_spontaneous {
        "SPONTANEOUS_<N>-<lang>-user-<user_id>-agent-<agent_id>.wav".to_string()
    } else {
        "<conversation_id>-<lang>-user-<user_id>-agent-<agent_id>.wav".to_string()
    }
}

/// Validates and raises [`RecspecError::CatalogueMiss`] when the language
/// token cannot even be resolved, for callers that want a hard error
/// rather than a `fail` validation (e.g. pre-flight checks before a batch
/// run). The Criteria Validator itself always uses
/// [`validate_bilingual_pattern`] and turns a bad language into a `fail`.
pub fn require_known_language(lang: &str, catalogue: &Catalogue) -> Result<(), RecspecError> {
    if catalogue.is_known_language(lang) {
        Ok(())
    } else {
        Err(RecspecError::CatalogueMiss {
            reason: format!("unrecognized language code '{lang}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        Catalogue::embedded()
    }

    #[test]
    fn well_formed_scripted_filename_passes() {
        let result = validate_bilingual_pattern(
            "greeting-intro-en_us-user-4394-agent-14981.wav",
            &catalogue(),
        );
        assert_eq!(result.status, RuleStatus::Pass);
        assert!(!result.is_spontaneous);
    }

    #[test]
    fn contributor_pair_is_swap_invariant() {
        let a = validate_bilingual_pattern(
            "greeting-intro-en_us-user-4394-agent-14981.wav",
            &catalogue(),
        );
        let b = validate_bilingual_pattern(
            "greeting-intro-en_us-user-14981-agent-4394.wav",
            &catalogue(),
        );
        assert_eq!(a.status, RuleStatus::Pass);
        assert_eq!(b.status, RuleStatus::Pass);
    }

    #[test]
    fn well_formed_unscripted_filename_passes() {
        let result =
            validate_bilingual_pattern("SPONTANEOUS_51-en_us-user-4394-agent-14981.wav", &catalogue());
        assert_eq!(result.status, RuleStatus::Pass);
        assert!(result.is_spontaneous);
    }

    /// A case-mismatched `Spontaneous_` prefix still routes to the
    /// unscripted validator, and the only issue reported is casing.
    #[test]
    fn case_mismatched_prefix_routes_to_unscripted() {
        let result = validate_bilingual_pattern(
            "Spontaneous_51-en_us-user-4394-agent-14981.wav",
            &catalogue(),
        );
        assert!(result.is_spontaneous);
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].contains("SPONTANEOUS_"));
        assert!(!result.issues.iter().any(|i| i.contains("conversation id")));
        assert!(!result.issues.iter().any(|i| i.contains("must be entirely lowercase")));
    }

    #[test]
    fn unrecognized_contributor_pair_fails() {
        let result =
            validate_bilingual_pattern("greeting-intro-en_us-user-1-agent-2.wav", &catalogue());
        assert_eq!(result.status, RuleStatus::Fail);
        assert!(result.issues.iter().any(|i| i.contains("contributor pair")));
    }

    #[test]
    fn double_extension_is_flagged() {
        let result = validate_bilingual_pattern(
            "greeting-intro-en_us-user-4394-agent-14981.wav.wav",
            &catalogue(),
        );
        assert!(result.issues.iter().any(|i| i.contains("double extension")));
    }

    #[test]
    fn embedded_whitespace_is_flagged() {
        let result = validate_bilingual_pattern(
            "greeting intro-en_us-user-4394-agent-14981.wav",
            &catalogue(),
        );
        assert!(result.issues.iter().any(|i| i.contains("whitespace")));
    }
}
