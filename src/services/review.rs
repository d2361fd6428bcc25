//! Supervisory review operations
//!
//! Teacher-side mutations layered on the store's locate-and-mutate
//! primitive. Both operations are idempotent in effect: re-invoking with the
//! same arguments reproduces the same final state, only refreshing
//! timestamps. Neither guards against re-invocation.

use std::str::FromStr;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{ReportKind, ReportStatus, ReviewStatus, TeacherCorrection};
use crate::store::EssayStore;

// TODO: take the teacher id from the caller's session once the routing layer
// grows authentication.
const TEACHER_ID: &str = "t_001";

/// Step reached once the teacher has approved the final feedback
const COMPLETED_STEP: u8 = 5;

/// Approve a drafted record with the teacher's final feedback.
///
/// Moves the record to `completed`, snapshots the AI draft alongside the
/// final wording, and optionally attaches lesson participation feedback.
pub async fn approve(
    store: &EssayStore,
    process_id: &str,
    final_feedback: &str,
    lesson_feedback: Option<&str>,
) -> Result<()> {
    let final_feedback = final_feedback.trim().to_string();
    if final_feedback.is_empty() {
        return Err(Error::InvalidInput("final feedback is empty".to_string()));
    }
    let lesson_feedback = lesson_feedback.map(|s| s.trim().to_string());

    store
        .locate_and_mutate(process_id, move |record| {
            let now = Utc::now();

            record.process.status = ReviewStatus::Completed;
            record.process.current_step = COMPLETED_STEP;

            record.teacher_correction = Some(TeacherCorrection {
                teacher_id: TEACHER_ID.to_string(),
                corrected_at: now,
                teacher_final_feedback: final_feedback.clone(),
                ai_draft_feedback: record.ai_feedback.ai_draft_feedback.clone(),
            });

            record.ai_feedback.final_feedback = Some(final_feedback);
            record.ai_feedback.approved_at = Some(now);

            if let Some(lesson) = lesson_feedback {
                record.lesson_feedback = Some(lesson);
            }
        })
        .await?;

    tracing::info!(process_id = %process_id, "Record approved");

    Ok(())
}

/// Mark a student or parent report as sent for a record.
///
/// The flag and its timestamp are set independently of review status and
/// are never cleared.
pub async fn mark_report_sent(store: &EssayStore, process_id: &str, kind: &str) -> Result<()> {
    let kind = ReportKind::from_str(kind)?;

    store
        .locate_and_mutate(process_id, move |record| {
            let now = Utc::now();
            let status = record.report_status.get_or_insert_with(ReportStatus::default);

            match kind {
                ReportKind::Student => {
                    status.student_sent = true;
                    status.student_sent_at = Some(now);
                }
                ReportKind::Parent => {
                    status.parent_sent = true;
                    status.parent_sent_at = Some(now);
                }
            }
        })
        .await?;

    tracing::info!(process_id = %process_id, kind = kind.as_str(), "Report marked as sent");

    Ok(())
}
