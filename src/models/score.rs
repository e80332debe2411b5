use serde::{Deserialize, Serialize};

/// Relevance verdict for one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Fit score, 0 to 100
    pub score: u8,

    /// Short justification
    pub reason: String,
}

impl ScoreResult {
    pub const MAX: u8 = 100;

    pub fn new(score: u8, reason: impl Into<String>) -> Self {
        Self {
            score: score.min(Self::MAX),
            reason: reason.into(),
        }
    }

    /// Zero score recording why scoring failed.
    pub fn failed(detail: impl std::fmt::Display) -> Self {
        Self::new(0, format!("AI Error: {detail}"))
    }

    pub fn passes(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_max() {
        assert_eq!(ScoreResult::new(250, "x").score, 100);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(ScoreResult::new(50, "ok").passes(50));
        assert!(!ScoreResult::new(49, "close").passes(50));
    }

    #[test]
    fn failed_is_zero_with_reason() {
        let result = ScoreResult::failed("timeout");
        assert_eq!(result.score, 0);
        assert_eq!(result.reason, "AI Error: timeout");
    }
}
