//! Data models for persisted essay records

pub mod record;

pub use record::{
    AchievementStandards, AiFeedback, EssayRecord, Evaluation, EvaluationDimensions, LessonContext,
    Metadata, ProcessInfo, ReportKind, ReportStatus, ReviewStatus, ScoredDimension, StudentEssay,
    TeacherCorrection,
};
pub use record::{new_essay_id, new_process_id};
