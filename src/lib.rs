//! redink - AI-assisted essay feedback core
//!
//! Accepts short student essay submissions, enriches each one with draft
//! feedback from an external generator on a detached background task, and
//! persists the results in a single shared JSON collection guarded by a
//! process-local lock. Supervisory callers later approve records and mark
//! reports as sent through the same store.
//!
//! HTTP routing, static admin pages, and process startup live outside this
//! crate; [`FeedbackService`] is the surface a routing layer consumes.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use crate::config::ServiceConfig;
pub use crate::error::{Error, Result};

use std::sync::Arc;

use crate::models::EssayRecord;
use crate::services::criteria::CriteriaSource;
use crate::services::feedback_client::OpenAiFeedbackClient;
use crate::services::generator::FeedbackGenerator;
use crate::services::pipeline::SubmissionPipeline;
use crate::services::review;
use crate::store::EssayStore;

/// Shared service wiring: the store, the submission pipeline, and the
/// supervisory operations behind one handle
pub struct FeedbackService {
    store: Arc<EssayStore>,
    pipeline: SubmissionPipeline,
}

impl FeedbackService {
    /// Build the production wiring from configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client =
            OpenAiFeedbackClient::new(api_key, config.model.clone(), config.request_timeout())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Wire the service around an arbitrary generator (tests inject mocks here)
    pub fn new(config: &ServiceConfig, generator: Arc<dyn FeedbackGenerator>) -> Self {
        let store = Arc::new(EssayStore::new(config.store_path.clone()));
        let criteria = Arc::new(CriteriaSource::new(config.criteria_path.clone()));
        let pipeline = SubmissionPipeline::new(
            Arc::clone(&store),
            generator,
            criteria,
            config.model.clone(),
        );

        Self { store, pipeline }
    }

    /// Accept a submission; returns the process id immediately while the
    /// enrichment run proceeds in the background
    pub fn submit(&self, text: &str) -> Result<String> {
        self.pipeline.submit(text)
    }

    /// All persisted records, in insertion order
    pub async fn read_all(&self) -> Vec<EssayRecord> {
        self.store.read_all().await
    }

    /// Approve a record with the teacher's final feedback
    pub async fn approve(
        &self,
        process_id: &str,
        final_feedback: &str,
        lesson_feedback: Option<&str>,
    ) -> Result<()> {
        review::approve(&self.store, process_id, final_feedback, lesson_feedback).await
    }

    /// Mark a student or parent report as sent
    pub async fn mark_report_sent(&self, process_id: &str, kind: &str) -> Result<()> {
        review::mark_report_sent(&self.store, process_id, kind).await
    }
}
