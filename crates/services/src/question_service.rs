use qbank_core::model::{QuestionDraft, QuestionSummary, SubmittedQuestion};

use crate::api::BackendClient;
use crate::error::QuestionServiceError;

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub question: SubmittedQuestion,
    pub message: String,
}

impl SubmissionReceipt {
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.question.ai_variants.len()
    }
}

/// Submits new questions and lists the bank.
#[derive(Clone)]
pub struct QuestionService {
    client: BackendClient,
}

impl QuestionService {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Validate `draft` locally, then store it on the backend.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Draft` when a required field is missing.
    /// Returns `QuestionServiceError::Api` if the backend request fails.
    pub async fn submit(
        &self,
        draft: &QuestionDraft,
    ) -> Result<SubmissionReceipt, QuestionServiceError> {
        draft.validate()?;
        let (question, message) = self.client.submit_question(draft).await?;
        tracing::info!(
            id = %question.id,
            variants = question.ai_variants.len(),
            "question submitted"
        );
        Ok(SubmissionReceipt { question, message })
    }

    /// Every stored question, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Api` if the backend request fails.
    pub async fn list(&self) -> Result<Vec<QuestionSummary>, QuestionServiceError> {
        Ok(self.client.list_questions().await?)
    }
}
