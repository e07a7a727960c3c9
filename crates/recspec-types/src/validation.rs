use serde::{Deserialize, Serialize};

/// Per-rule outcome.
///
/// Declaration order is significant: `Ord` makes `Fail` the worst and
/// `Pass` the best, so the overall verdict is `rules.iter().map(|r|
/// r.status).max()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Warning,
    Fail,
}

/// The outcome of evaluating one named rule against one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: RuleStatus,
    pub matched: bool,
    pub observed: String,
    pub expected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn new(status: RuleStatus, matched: bool, observed: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            status,
            matched,
            observed: observed.into(),
            expected: expected.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_is_the_worst_status() {
        assert!(RuleStatus::Fail > RuleStatus::Warning);
        assert!(RuleStatus::Warning > RuleStatus::Pass);
    }
}
