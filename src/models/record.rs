//! Essay record schema and review state machine
//!
//! One `EssayRecord` is written per successful enrichment run and then
//! mutated in place by supervisory operations. Records progress
//! `drafted` → `completed`; the report flags are orthogonal to that
//! transition and are never cleared once set.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::services::criteria::EvaluationCriteria;
use crate::services::generator::GeneratedFeedback;

/// Carried on every record for forward compatibility; not enforced on read.
pub const SCHEMA_VERSION: &str = "1.0.0";

const LANGUAGE: &str = "ko";
const GRADE: &str = "초등학교 5학년";
const SEMESTER: &str = "2학기";
const SUBJECT: &str = "국어";

const ESSAY_PROMPT: &str =
    "지문을 읽고, 자신과 생각이나 처지가 다른 사람과 어떻게 대화하면 좋을지 느낀 점을 써 보세요.";
const PROMPT_TEMPLATE_ID: &str = "empathetic_feedback_v3";
const FEEDBACK_TYPE: &str = "3단 구성 공감적 피드백";
const FEEDBACK_TAGS: [&str; 6] = [
    "공감",
    "경청",
    "존중",
    "긍정 강화",
    "성취기준 기반 조언",
    "심화 질문",
];

/// Step reached when the AI draft is stored
const DRAFT_STEP: u8 = 3;

/// Review state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// AI draft stored, awaiting teacher review
    Drafted,
    /// Teacher approved the final feedback (terminal)
    Completed,
}

/// Recipient of a sent report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Student,
    Parent,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Student => "student",
            ReportKind::Parent => "parent",
        }
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(ReportKind::Student),
            "parent" => Ok(ReportKind::Parent),
            other => Err(Error::InvalidInput(format!(
                "report kind must be 'student' or 'parent', got '{}'",
                other
            ))),
        }
    }
}

/// Record metadata; `updated_at` is refreshed on every mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub language: String,
    pub grade: String,
    pub semester: String,
    pub subject: String,
}

/// Curriculum achievement standards, keyed by revision year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementStandards {
    #[serde(rename = "2015")]
    pub year_2015: Vec<String>,
}

/// Lesson the essay was written for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonContext {
    pub lesson_id: String,
    pub text_title: String,
    pub text_description: String,
    pub achievement_standards: AchievementStandards,
}

/// Processing state of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Stable lookup key, minted at submission time
    pub process_id: String,
    pub status: ReviewStatus,
    pub current_step: u8,
}

/// The submitted essay itself; immutable once stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentEssay {
    pub essay_id: String,
    pub prompt: String,
    pub student_answer: String,
    pub submitted_at: DateTime<Utc>,
}

/// One scored evaluation dimension on a 1-5 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDimension {
    pub scale: u8,
    pub value: u8,
    pub comment: String,
}

impl ScoredDimension {
    fn new(value: u8) -> Self {
        Self {
            scale: 5,
            value,
            comment: String::new(),
        }
    }
}

/// The four evaluated dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationDimensions {
    pub vocabulary: ScoredDimension,
    pub grammar: ScoredDimension,
    pub logic: ScoredDimension,
    pub empathy: ScoredDimension,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub dimensions: EvaluationDimensions,
}

/// Generator output as stored on the record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiFeedback {
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    pub prompt_template_id: String,
    pub ai_draft_feedback: String,
    pub ai_feedback_type: String,
    pub ai_feedback_tags: Vec<String>,
    pub achievement_explanation: String,
    pub revised_text: String,

    /// Teacher-approved feedback; absent until approval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

/// Written at approval time; snapshots the AI draft alongside the
/// teacher's final wording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherCorrection {
    pub teacher_id: String,
    pub corrected_at: DateTime<Utc>,
    pub teacher_final_feedback: String,
    pub ai_draft_feedback: String,
}

/// Report delivery flags; set independently of review status, never cleared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportStatus {
    #[serde(default)]
    pub student_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_sent_at: Option<DateTime<Utc>>,
}

/// One enriched essay submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayRecord {
    pub metadata: Metadata,
    pub lesson_context: LessonContext,
    pub process: ProcessInfo,
    pub student_essay: StudentEssay,
    pub evaluation: Evaluation,
    pub ai_feedback: AiFeedback,

    /// Absent until the record is approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_correction: Option<TeacherCorrection>,

    /// Absent until the first report is marked sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_status: Option<ReportStatus>,

    /// Lesson participation feedback, optionally supplied at approval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_feedback: Option<String>,
}

impl EssayRecord {
    /// Assemble a freshly drafted record from the student text, the
    /// evaluation criteria, and the generator's output.
    ///
    /// Mints its own `process_id`; the pipeline overwrites it with the id
    /// already handed to the submitter so both always agree.
    pub fn draft(
        student_answer: &str,
        criteria: &EvaluationCriteria,
        generated: &GeneratedFeedback,
        model_name: &str,
    ) -> Self {
        let now = Utc::now();

        Self {
            metadata: Metadata {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: now,
                updated_at: now,
                language: LANGUAGE.to_string(),
                grade: GRADE.to_string(),
                semester: SEMESTER.to_string(),
                subject: SUBJECT.to_string(),
            },
            lesson_context: LessonContext {
                lesson_id: criteria.lesson_id.clone(),
                text_title: criteria.text_description.clone(),
                text_description: criteria.text_description.clone(),
                achievement_standards: AchievementStandards {
                    year_2015: vec![criteria.achievement_standard.clone()],
                },
            },
            process: ProcessInfo {
                process_id: new_process_id(now),
                status: ReviewStatus::Drafted,
                current_step: DRAFT_STEP,
            },
            student_essay: StudentEssay {
                essay_id: new_essay_id(),
                prompt: ESSAY_PROMPT.to_string(),
                student_answer: student_answer.to_string(),
                submitted_at: now,
            },
            evaluation: Evaluation {
                dimensions: EvaluationDimensions {
                    vocabulary: ScoredDimension::new(generated.scores.vocabulary),
                    grammar: ScoredDimension::new(generated.scores.grammar),
                    logic: ScoredDimension::new(generated.scores.logic),
                    empathy: ScoredDimension::new(generated.scores.empathy),
                },
            },
            ai_feedback: AiFeedback {
                model_name: model_name.to_string(),
                created_at: now,
                prompt_template_id: PROMPT_TEMPLATE_ID.to_string(),
                ai_draft_feedback: generated.feedback.clone(),
                ai_feedback_type: FEEDBACK_TYPE.to_string(),
                ai_feedback_tags: FEEDBACK_TAGS.iter().map(|t| t.to_string()).collect(),
                achievement_explanation: generated.achievement_explanation.clone(),
                revised_text: generated.revised_text.clone(),
                final_feedback: None,
                approved_at: None,
            },
            teacher_correction: None,
            report_status: None,
            lesson_feedback: None,
        }
    }

    /// The stable identifier used for all lookups
    pub fn process_id(&self) -> &str {
        &self.process.process_id
    }
}

/// Mint a process id: `proc_<UTC date>_<UTC time>_<6 hex chars>`
///
/// Ids are minted once, synchronously, before any background task is
/// scheduled, so concurrent enrichment runs can never collide on one.
pub fn new_process_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("proc_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..6])
}

/// Mint an essay id: `ESSAY_<8 hex chars>`
pub fn new_essay_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ESSAY_{}", &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_format() {
        let now = Utc::now();
        let id = new_process_id(now);
        assert!(id.starts_with("proc_"));
        // proc_ + 8 date + _ + 6 time + _ + 6 hex
        assert_eq!(id.len(), "proc_".len() + 8 + 1 + 6 + 1 + 6);
    }

    #[test]
    fn test_process_ids_unique() {
        let now = Utc::now();
        let a = new_process_id(now);
        let b = new_process_id(now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_essay_id_format() {
        let id = new_essay_id();
        assert!(id.starts_with("ESSAY_"));
        assert_eq!(id.len(), "ESSAY_".len() + 8);
    }

    #[test]
    fn test_review_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ReviewStatus::Drafted).unwrap(),
            "\"drafted\""
        );
        assert_eq!(
            serde_json::to_string(&ReviewStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("student".parse::<ReportKind>().unwrap(), ReportKind::Student);
        assert_eq!("parent".parse::<ReportKind>().unwrap(), ReportKind::Parent);
        assert!("teacher".parse::<ReportKind>().is_err());
        assert!("Student".parse::<ReportKind>().is_err());
    }
}
