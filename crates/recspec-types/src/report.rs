use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::findings::{
    ConversationalFindings, LevelFindings, MicBleedFindings, ReverbFindings, SilenceFindings,
    StereoFindings,
};
use crate::properties::FileProperties;
use crate::validation::{RuleStatus, ValidationResult};

/// Overall file verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallVerdict {
    Pass,
    Warning,
    Fail,
    Error,
}

impl OverallVerdict {
    /// Worst rule status wins: fail if any rule failed, else warning if
    /// any rule warned, else pass.
    pub fn worst_of(validations: &BTreeMap<String, ValidationResult>) -> Self {
        match validations.values().map(|v| v.status).max() {
            Some(RuleStatus::Fail) => OverallVerdict::Fail,
            Some(RuleStatus::Warning) => OverallVerdict::Warning,
            _ => OverallVerdict::Pass,
        }
    }
}

/// Per-file analysis result.
///
/// Serializes through a `BTreeMap` for `validations` so repeated runs over
/// the same input produce byte-identical JSON key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub file_properties: FileProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverb: Option<ReverbFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence: Option<SilenceFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stereo: Option<StereoFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bleed: Option<MicBleedFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversational: Option<ConversationalFindings>,
    pub validations: BTreeMap<String, ValidationResult>,
    pub overall: OverallVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    pub fn new(file_properties: FileProperties) -> Self {
        Self {
            file_properties,
            level: None,
            reverb: None,
            silence: None,
            stereo: None,
            bleed: None,
            conversational: None,
            validations: BTreeMap::new(),
            overall: OverallVerdict::Pass,
            error: None,
        }
    }

    /// Marks the report as `error`, recording only the first-raised error;
    /// later calls are no-ops so the original failure isn't overwritten.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
            self.overall = OverallVerdict::Error;
        }
    }

    /// Recomputes `overall` from `validations`, unless the report has
    /// already been marked `error`.
    pub fn finalize_verdict(&mut self) {
        if self.overall != OverallVerdict::Error {
            self.overall = OverallVerdict::worst_of(&self.validations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::BitDepth;

    fn empty_properties() -> FileProperties {
        FileProperties {
            file_type: "WAV (PCM)".to_string(),
            sample_rate_hz: Some(48_000),
            bit_depth: BitDepth::Known(16),
            channel_count: Some(2),
            duration_s: Some(2.0),
            file_size_bytes: 1_000,
        }
    }

    #[test]
    fn mark_error_keeps_first_message() {
        let mut report = Report::new(empty_properties());
        report.mark_error("first");
        report.mark_error("second");
        assert_eq!(report.error.as_deref(), Some("first"));
        assert_eq!(report.overall, OverallVerdict::Error);
    }

    #[test]
    fn finalize_verdict_is_worst_of_rules() {
        let mut report = Report::new(empty_properties());
        report.validations.insert(
            "sample_rate".to_string(),
            ValidationResult::new(RuleStatus::Pass, true, "48000", "48000"),
        );
        report.validations.insert(
            "duration".to_string(),
            ValidationResult::new(RuleStatus::Warning, false, "Unknown", ">= 1.0"),
        );
        report.finalize_verdict();
        assert_eq!(report.overall, OverallVerdict::Warning);
    }
}
