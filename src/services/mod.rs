//! Service layer: criteria loading, feedback generation, the submission
//! pipeline, and supervisory review operations

pub mod criteria;
pub mod feedback_client;
pub mod generator;
pub mod pipeline;
pub mod review;

pub use criteria::{CriteriaSource, EvaluationCriteria};
pub use feedback_client::OpenAiFeedbackClient;
pub use generator::{FeedbackGenerator, FeedbackScores, GeneratedFeedback, GenerationError};
pub use pipeline::SubmissionPipeline;
