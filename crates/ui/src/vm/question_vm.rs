use qbank_core::model::{
    BloomLevel, Difficulty, QuestionDraft, QuestionDraftError, QuestionSummary, QuestionType,
};
use services::SubmissionReceipt;

use crate::vm::time_fmt::format_backend_timestamp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Question submission form. Select inputs hold vocabulary labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionFormVm {
    pub title: String,
    pub body_markdown: String,
    pub question_type: String,
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub difficulty: String,
    pub estimated_minutes: String,
    pub bloom_level: String,
    pub generate_ai_variants: bool,
    pub ai_notes: String,
}

impl Default for QuestionFormVm {
    fn default() -> Self {
        let draft = QuestionDraft::default();
        Self {
            title: String::new(),
            body_markdown: String::new(),
            question_type: draft.question_type.label().to_string(),
            subject: String::new(),
            topic: String::new(),
            subtopic: String::new(),
            difficulty: draft.difficulty.label().to_string(),
            estimated_minutes: draft.estimated_minutes.to_string(),
            bloom_level: draft.bloom_level.label().to_string(),
            generate_ai_variants: false,
            ai_notes: String::new(),
        }
    }
}

impl QuestionFormVm {
    /// Map the form to a validated draft, collecting every field error.
    ///
    /// # Errors
    ///
    /// Returns one `FieldError` per invalid or missing field.
    pub fn to_draft(&self) -> Result<QuestionDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("title", &self.title),
            ("body_markdown", &self.body_markdown),
            ("subject", &self.subject),
            ("topic", &self.topic),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: "Required".to_string(),
                });
            }
        }

        let question_type = parse_label(
            &mut errors,
            "question_type",
            &self.question_type,
            QuestionType::from_label,
        );
        let difficulty =
            parse_label(&mut errors, "difficulty", &self.difficulty, Difficulty::from_label);
        let bloom_level =
            parse_label(&mut errors, "bloom_level", &self.bloom_level, BloomLevel::from_label);

        let estimated_minutes = match self.estimated_minutes.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => Some(minutes),
            _ => {
                errors.push(FieldError {
                    field: "estimated_minutes",
                    message: "Enter a whole number of minutes".to_string(),
                });
                None
            }
        };

        let (Some(question_type), Some(difficulty), Some(bloom_level), Some(estimated_minutes)) =
            (question_type, difficulty, bloom_level, estimated_minutes)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let subtopic = self.subtopic.trim();
        let draft = QuestionDraft {
            title: self.title.trim().to_string(),
            body_markdown: self.body_markdown.clone(),
            question_type,
            subject: self.subject.trim().to_string(),
            topic: self.topic.trim().to_string(),
            subtopic: (!subtopic.is_empty()).then(|| subtopic.to_string()),
            difficulty,
            estimated_minutes,
            bloom_level,
            generate_ai_variants: self.generate_ai_variants,
            ai_notes: self.ai_notes.trim().to_string(),
        };
        draft.validate().map_err(|err| vec![draft_error(&err)])?;
        Ok(draft)
    }
}

fn parse_label<T>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let value = parse(raw);
    if value.is_none() {
        errors.push(FieldError {
            field,
            message: format!("Unknown option {raw:?}"),
        });
    }
    value
}

fn draft_error(err: &QuestionDraftError) -> FieldError {
    let field = match err {
        QuestionDraftError::MissingField("question text") => "body_markdown",
        QuestionDraftError::MissingField(name) => *name,
        _ => "estimated_minutes",
    };
    FieldError {
        field,
        message: err.to_string(),
    }
}

#[must_use]
pub fn field_error<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|error| error.field == field)
        .map(|error| error.message.as_str())
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionVm {
    pub headline: String,
    pub file_path: String,
    pub variants: Vec<String>,
}

#[must_use]
pub fn map_submission(receipt: &SubmissionReceipt) -> SubmissionVm {
    let headline = if receipt.message.trim().is_empty() {
        format!("Saved question #{}", receipt.question.id)
    } else {
        receipt.message.clone()
    };
    SubmissionVm {
        headline,
        file_path: receipt.question.file_path.clone(),
        variants: receipt
            .question
            .ai_variants
            .iter()
            .map(|variant| format!("#{} {}", variant.id, variant.title))
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: u64,
    pub title: String,
    pub location: String,
    pub meta: String,
    pub created: Option<String>,
    pub ai_badge: bool,
}

#[must_use]
pub fn map_question_rows(questions: &[QuestionSummary]) -> Vec<QuestionRowVm> {
    questions
        .iter()
        .map(|question| {
            let mut location = format!("{} › {}", question.subject, question.topic);
            if let Some(subtopic) = &question.subtopic {
                location.push_str(" › ");
                location.push_str(subtopic);
            }
            QuestionRowVm {
                id: question.id.value(),
                title: question.title.clone(),
                location,
                meta: format!(
                    "{} · {} · {} min",
                    question.question_type, question.difficulty_level, question.estimated_time
                ),
                created: question
                    .created_at
                    .as_deref()
                    .map(format_backend_timestamp),
                ai_badge: question.is_ai_generated,
            }
        })
        .collect()
}
