use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::wire;

//
// ─── VOCABULARIES ──────────────────────────────────────────────────────────────
//

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            #[must_use]
            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim();
                Self::ALL.iter().copied().find(|value| value.label() == label)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum! {
    /// Answer format of a question.
    pub enum QuestionType {
        Mcq => "MCQ",
        Coding => "Coding",
        Numerical => "Numerical",
        Descriptive => "Descriptive",
        FillInTheBlank => "Fill-in-the-blank",
        TrueFalse => "True/False",
        ShortAnswer => "Short Answer",
    }
}

labelled_enum! {
    /// Cognitive level on Bloom's taxonomy.
    pub enum BloomLevel {
        Recall => "Recall",
        Understand => "Understand",
        Apply => "Apply",
        Analyze => "Analyze",
        Evaluate => "Evaluate",
        Create => "Create",
    }
}

labelled_enum! {
    pub enum Difficulty {
        Easy => "Easy",
        Medium => "Medium",
        Hard => "Hard",
    }
}

//
// ─── READ MODELS ───────────────────────────────────────────────────────────────
//

/// A stored question as listed by the question index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSummary {
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
    #[serde(default)]
    pub ai_generation_notes: Option<String>,
    #[serde(default)]
    pub parent_question_id: Option<QuestionId>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A question entry in a practice listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeQuestion {
    pub id: QuestionId,
    pub title: String,
    pub question_type: QuestionType,
    pub difficulty_level: Difficulty,
    pub estimated_time: u32,
    pub bloom_level: BloomLevel,
}

/// Full question including its markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDetail {
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
    #[serde(default)]
    pub content: String,
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionDraftError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("estimated time must be at least one minute")]
    InvalidEstimatedTime,
}

/// Question authoring form as submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub title: String,
    pub body_markdown: String,
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
    pub subtopic: Option<String>,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub bloom_level: BloomLevel,
    pub generate_ai_variants: bool,
    pub ai_notes: String,
}

impl Default for QuestionDraft {
    /// The blank authoring form.
    fn default() -> Self {
        Self {
            title: String::new(),
            body_markdown: String::new(),
            question_type: QuestionType::Mcq,
            subject: String::new(),
            topic: String::new(),
            subtopic: None,
            difficulty: Difficulty::Medium,
            estimated_minutes: 5,
            bloom_level: BloomLevel::Understand,
            generate_ai_variants: false,
            ai_notes: String::new(),
        }
    }
}

impl QuestionDraft {
    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionDraftError` found, in form order.
    pub fn validate(&self) -> Result<(), QuestionDraftError> {
        let required = [
            ("title", &self.title),
            ("question text", &self.body_markdown),
            ("subject", &self.subject),
            ("topic", &self.topic),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(QuestionDraftError::MissingField(name));
            }
        }
        if self.estimated_minutes == 0 {
            return Err(QuestionDraftError::InvalidEstimatedTime);
        }
        Ok(())
    }

    /// Form fields in the encoding the submission endpoint expects.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("full_question_text", self.body_markdown.clone()),
            ("question_type", self.question_type.label().to_string()),
            ("subject", self.subject.trim().to_string()),
            ("topic", self.topic.trim().to_string()),
            (
                "subtopic",
                self.subtopic
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
            ),
            ("difficulty_level", self.difficulty.label().to_string()),
            ("estimated_time", self.estimated_minutes.to_string()),
            ("bloom_level", self.bloom_level.label().to_string()),
            ("ai_notes", self.ai_notes.clone()),
        ];
        if self.generate_ai_variants {
            fields.push(("generate_ai_questions", "on".to_string()));
        }
        fields
    }
}

/// AI-generated sibling created alongside a submitted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiVariant {
    pub id: QuestionId,
    pub title: String,
    pub file_path: String,
}

/// Backend acknowledgement of a submitted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedQuestion {
    pub id: QuestionId,
    pub title: String,
    pub file_path: String,
    #[serde(default, rename = "ai_questions")]
    pub ai_variants: Vec<AiVariant>,
}
