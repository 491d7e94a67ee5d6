use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{BloomLevel, Difficulty, QuestionType};
use crate::model::taxonomy::CategoryId;
use crate::model::wire;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PaperCriteriaError {
    #[error("total questions must be greater than 0")]
    ZeroTotal,

    #[error("difficulty distribution asks for {requested} questions but the paper has {total}")]
    DistributionExceedsTotal { requested: u32, total: u32 },

    #[error("time limit must be at least one minute")]
    ZeroTimeLimit,
}

//
// ─── CRITERIA ──────────────────────────────────────────────────────────────────
//

/// Filters and quotas for a generated paper. Empty sets mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperCriteria {
    pub total_questions: u32,
    pub subjects: Vec<CategoryId>,
    pub topics: Vec<CategoryId>,
    pub subtopics: Vec<CategoryId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_topics: Vec<CategoryId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_subtopics: Vec<CategoryId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub difficulty_distribution: BTreeMap<Difficulty, u32>,
    pub question_types: Vec<QuestionType>,
    pub bloom_levels: Vec<BloomLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u32>,
    pub include_ai_generated: bool,
}

impl PaperCriteria {
    /// Criteria for `total_questions` questions with no filters.
    #[must_use]
    pub fn new(total_questions: u32) -> Self {
        Self {
            total_questions,
            subjects: Vec::new(),
            topics: Vec::new(),
            subtopics: Vec::new(),
            excluded_topics: Vec::new(),
            excluded_subtopics: Vec::new(),
            difficulty_distribution: BTreeMap::new(),
            question_types: Vec::new(),
            bloom_levels: Vec::new(),
            max_time: None,
            include_ai_generated: true,
        }
    }

    #[must_use]
    pub fn distribution_total(&self) -> u32 {
        self.difficulty_distribution.values().sum()
    }

    /// Validate the quotas before sending them to the backend.
    ///
    /// # Errors
    ///
    /// Returns `PaperCriteriaError` when the total is zero, the difficulty
    /// quotas exceed the total, or the time limit is zero.
    pub fn validate(&self) -> Result<(), PaperCriteriaError> {
        if self.total_questions == 0 {
            return Err(PaperCriteriaError::ZeroTotal);
        }
        let requested = self.distribution_total();
        if requested > self.total_questions {
            return Err(PaperCriteriaError::DistributionExceedsTotal {
                requested,
                total: self.total_questions,
            });
        }
        if self.max_time == Some(0) {
            return Err(PaperCriteriaError::ZeroTimeLimit);
        }
        Ok(())
    }
}

//
// ─── GENERATED PAPER ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperQuestion {
    pub id: QuestionId,
    pub title: String,
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
    #[serde(default, deserialize_with = "wire::blank_as_none")]
    pub subtopic: Option<String>,
    pub difficulty_level: Difficulty,
    pub estimated_time: u32,
    pub bloom_level: BloomLevel,
    #[serde(default, deserialize_with = "wire::flag")]
    pub is_ai_generated: bool,
}

/// Aggregate statistics the backend computes for a paper.
///
/// The backend sends `{}` for an empty paper, so every field defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperMetadata {
    pub total_questions: u32,
    pub total_time_minutes: u32,
    pub difficulty_distribution: BTreeMap<String, u32>,
    pub question_type_distribution: BTreeMap<String, u32>,
    pub bloom_level_distribution: BTreeMap<String, u32>,
    pub subject_distribution: BTreeMap<String, u32>,
    pub ai_generated_count: u32,
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperOutcome {
    /// Every requested question was found.
    Complete,
    /// Fewer questions matched than were requested.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPaper {
    pub outcome: PaperOutcome,
    pub message: String,
    pub questions: Vec<PaperQuestion>,
    pub metadata: PaperMetadata,
}

impl GeneratedPaper {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.outcome == PaperOutcome::Partial
    }

    /// Total minutes, recomputed from the questions when metadata is absent.
    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        if self.metadata.total_time_minutes > 0 || self.questions.is_empty() {
            return self.metadata.total_time_minutes;
        }
        self.questions.iter().map(|q| q.estimated_time).sum()
    }
}

/// File format for a saved paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Markdown, ExportFormat::Json, ExportFormat::Html];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Json => "JSON",
            ExportFormat::Html => "HTML",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

/// Default save name, e.g. `paper_20231114_221320`.
#[must_use]
pub fn default_paper_filename(now: DateTime<Utc>) -> String {
    format!("paper_{}", now.format("%Y%m%d_%H%M%S"))
}
