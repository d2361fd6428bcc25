//! Submission pipeline
//!
//! `submit` validates the text, mints the process id, and schedules the
//! enrichment run on a detached task before returning. The submitter gets an
//! immediate acknowledgment; a run that later fails leaves no record behind,
//! and the only trace of the failure is the error log entry. The generator
//! call happens entirely outside the store's critical section: only the
//! final append takes the lock.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{new_process_id, EssayRecord};
use crate::services::criteria::CriteriaSource;
use crate::services::generator::FeedbackGenerator;
use crate::store::EssayStore;

/// Schedules one enrichment run per accepted submission
pub struct SubmissionPipeline {
    store: Arc<EssayStore>,
    generator: Arc<dyn FeedbackGenerator>,
    criteria: Arc<CriteriaSource>,
    model_name: String,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<EssayStore>,
        generator: Arc<dyn FeedbackGenerator>,
        criteria: Arc<CriteriaSource>,
        model_name: String,
    ) -> Self {
        Self {
            store,
            generator,
            criteria,
            model_name,
        }
    }

    /// Accept a submission and return its process id immediately.
    ///
    /// The enrichment task is detached: the returned id carries no
    /// completion guarantee, and an id whose run failed will never
    /// resolve to a record.
    pub fn submit(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("submitted text is empty".to_string()));
        }

        let process_id = new_process_id(Utc::now());

        let store = Arc::clone(&self.store);
        let generator = Arc::clone(&self.generator);
        let criteria = Arc::clone(&self.criteria);
        let model_name = self.model_name.clone();
        let text = text.to_string();
        let task_process_id = process_id.clone();

        tokio::spawn(async move {
            if let Err(e) =
                run_enrichment(store, generator, criteria, model_name, text, &task_process_id).await
            {
                tracing::error!(
                    process_id = %task_process_id,
                    error = %e,
                    "Background enrichment failed; no record will be stored for this submission"
                );
            }
        });

        tracing::info!(process_id = %process_id, "Submission accepted, enrichment scheduled");

        Ok(process_id)
    }
}

/// One enrichment run: criteria → generator → record → append
async fn run_enrichment(
    store: Arc<EssayStore>,
    generator: Arc<dyn FeedbackGenerator>,
    criteria: Arc<CriteriaSource>,
    model_name: String,
    text: String,
    process_id: &str,
) -> Result<()> {
    let criteria = criteria.load()?;

    let generated = generator.generate(&text, &criteria).await?;

    let mut record = EssayRecord::draft(&text, &criteria, &generated, &model_name);
    // The submitter already holds this id; the record must carry the same one.
    record.process.process_id = process_id.to_string();

    store.append(record).await?;

    tracing::info!(process_id = %process_id, "Draft feedback stored");

    Ok(())
}
