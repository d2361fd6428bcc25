//! Achievement standard loading
//!
//! Reads the curriculum reference JSON consulted on every enrichment run.
//! The file carries the 2015 achievement standards and a description of the
//! reading passage the essays respond to.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Evaluation criteria handed to the feedback generator
#[derive(Debug, Clone)]
pub struct EvaluationCriteria {
    /// Derived from the criteria file name
    pub lesson_id: String,
    /// All 2015 achievement standards, joined into one line
    pub achievement_standard: String,
    /// Description of the reading passage
    pub text_description: String,
}

#[derive(Debug, Default, Deserialize)]
struct StandardFile {
    #[serde(default)]
    source_data_info: SourceDataInfo,
    #[serde(default)]
    learning_data_info: LearningDataInfo,
}

#[derive(Debug, Default, Deserialize)]
struct SourceDataInfo {
    #[serde(rename = "2015_achievement_standard", default)]
    achievement_standard_2015: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LearningDataInfo {
    #[serde(default)]
    text_description: String,
}

/// Loads evaluation criteria from a fixed reference file
#[derive(Debug, Clone)]
pub struct CriteriaSource {
    path: PathBuf,
}

impl CriteriaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and flatten the criteria file
    pub fn load(&self) -> Result<EvaluationCriteria> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!(
                "Failed to read criteria file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let file: StandardFile = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!(
                "Failed to parse criteria file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(EvaluationCriteria {
            lesson_id: lesson_id_from_path(&self.path),
            achievement_standard: file.source_data_info.achievement_standard_2015.join(" "),
            text_description: file.learning_data_info.text_description,
        })
    }
}

fn lesson_id_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
