//! Feedback generator seam
//!
//! The pipeline only depends on this trait; the production implementation
//! lives in [`crate::services::feedback_client`] and tests inject mocks.
//! The generator is treated as an opaque, possibly slow, possibly failing
//! capability.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::services::criteria::EvaluationCriteria;

/// Feedback generator errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generator endpoint returned an error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Generator output did not match the expected JSON shape
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No API key configured for the generator endpoint
    #[error("API key not configured")]
    MissingApiKey,
}

/// Scores for the four evaluated dimensions (1-5 integers)
///
/// Dimensions the generator omits fall back to a neutral 3, except
/// empathy which defaults to 4.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackScores {
    #[serde(default = "default_score")]
    pub vocabulary: u8,
    #[serde(default = "default_score")]
    pub grammar: u8,
    #[serde(default = "default_score")]
    pub logic: u8,
    #[serde(default = "default_empathy_score")]
    pub empathy: u8,
}

fn default_score() -> u8 {
    3
}

fn default_empathy_score() -> u8 {
    4
}

impl Default for FeedbackScores {
    fn default() -> Self {
        Self {
            vocabulary: default_score(),
            grammar: default_score(),
            logic: default_score(),
            empathy: default_empathy_score(),
        }
    }
}

/// Structured generator output for one essay
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedFeedback {
    /// Three-part narrative feedback for the student
    #[serde(default)]
    pub feedback: String,

    /// Rationale tying the feedback back to the achievement standard
    #[serde(default)]
    pub achievement_explanation: String,

    /// Suggested revision of the full essay text
    #[serde(default)]
    pub revised_text: String,

    #[serde(default)]
    pub scores: FeedbackScores,
}

/// Produces draft feedback for a student essay under the given criteria
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(
        &self,
        student_text: &str,
        criteria: &EvaluationCriteria,
    ) -> Result<GeneratedFeedback, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scores_use_defaults() {
        let generated: GeneratedFeedback = serde_json::from_str(
            r#"{"feedback": "좋아요", "achievement_explanation": "근거", "revised_text": "수정본"}"#,
        )
        .unwrap();

        assert_eq!(generated.scores.vocabulary, 3);
        assert_eq!(generated.scores.grammar, 3);
        assert_eq!(generated.scores.logic, 3);
        assert_eq!(generated.scores.empathy, 4);
    }

    #[test]
    fn test_partial_scores_fill_in() {
        let generated: GeneratedFeedback = serde_json::from_str(
            r#"{"feedback": "f", "scores": {"vocabulary": 5, "logic": 2}}"#,
        )
        .unwrap();

        assert_eq!(generated.scores.vocabulary, 5);
        assert_eq!(generated.scores.grammar, 3);
        assert_eq!(generated.scores.logic, 2);
        assert_eq!(generated.scores.empathy, 4);
    }
}
