//! Aggregate pass/warn/fail/error counts and total duration across a
//! batch run.

use recspec_types::{OverallVerdict, Report};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchSummary {
    pub pass: usize,
    pub warning: usize,
    pub fail: usize,
    pub error: usize,
    pub total_duration_s: f64,
}

impl BatchSummary {
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.overall {
                OverallVerdict::Pass => summary.pass += 1,
                OverallVerdict::Warning => summary.warning += 1,
                OverallVerdict::Fail => summary.fail += 1,
                OverallVerdict::Error => summary.error += 1,
            }
            summary.total_duration_s += report.file_properties.duration_s.unwrap_or(0.0);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recspec_types::{BitDepth, FileProperties};
    use std::collections::BTreeMap;

    fn report_with(overall: OverallVerdict, duration_s: Option<f64>) -> Report {
        Report {
            file_properties: FileProperties {
                file_type: "WAV (PCM)".to_string(),
                sample_rate_hz: Some(48_000),
                bit_depth: BitDepth::Known(16),
                channel_count: Some(1),
                duration_s,
                file_size_bytes: 0,
            },
            level: None,
            reverb: None,
            silence: None,
            stereo: None,
            bleed: None,
            conversational: None,
            validations: BTreeMap::new(),
            overall,
            error: None,
        }
    }

    #[test]
    fn counts_each_verdict_once() {
        let reports = vec![
            report_with(OverallVerdict::Pass, Some(1.0)),
            report_with(OverallVerdict::Warning, Some(2.0)),
            report_with(OverallVerdict::Fail, Some(3.0)),
            report_with(OverallVerdict::Error, None),
        ];
        let summary = BatchSummary::from_reports(&reports);
        assert_eq!(summary.pass, 1);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.error, 1);
        assert_eq!(summary.total_duration_s, 6.0);
    }
}
