use qbank_core::model::{CategoryId, PracticeQuestion, QuestionDetail, QuestionId, QuestionTree};

use crate::api::BackendClient;
use crate::error::ApiError;

/// Read-only browsing of the bank by subject, topic and subtopic.
#[derive(Clone)]
pub struct PracticeService {
    client: BackendClient,
}

impl PracticeService {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Question counts per subject, topic and subtopic.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend request fails.
    pub async fn tree(&self) -> Result<QuestionTree, ApiError> {
        let tree = self.client.practice_tree().await?;
        tracing::debug!(questions = tree.total_questions(), "practice tree loaded");
        Ok(tree)
    }

    /// Questions under a topic; `subtopic` narrows to one bucket, where the
    /// `General` bucket means questions without a subtopic.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend request fails.
    pub async fn questions(
        &self,
        subject: &CategoryId,
        topic: &CategoryId,
        subtopic: Option<&CategoryId>,
    ) -> Result<Vec<PracticeQuestion>, ApiError> {
        self.client.practice_questions(subject, topic, subtopic).await
    }

    /// One question with its markdown body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the question is missing or the request fails.
    pub async fn question(&self, id: QuestionId) -> Result<QuestionDetail, ApiError> {
        self.client.question(id).await
    }
}
