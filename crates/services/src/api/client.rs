use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use url::Url;

use qbank_core::model::{
    CategoryId, ExportFormat, GeneratedPaper, Level, PaperCriteria, PaperMetadata, PaperOutcome,
    PaperQuestion, ParentPath, PracticeQuestion, QuestionDetail, QuestionDraft, QuestionId,
    QuestionSummary, QuestionTree, SubmittedQuestion,
};

use crate::api::TaxonomyBackend;
use crate::api::envelope::{self, Reply, Status};
use crate::config::BackendConfig;
use crate::error::ApiError;

/// HTTP client for the question bank backend.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Build a client whose every request is bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.config.base_url.join(path)?)
    }

    /// URL of the children query for `level` beneath `parent`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidQuery` when `parent` does not carry exactly
    /// the ancestors of `level`.
    pub fn children_url(&self, level: Level, parent: &ParentPath) -> Result<Url, ApiError> {
        if parent.children_level() != level || parent.ids().len() != level.depth() {
            return Err(ApiError::InvalidQuery(format!(
                "{level} query needs {} ancestor(s), got {parent}",
                level.depth()
            )));
        }
        let path = match level {
            Level::Subject => "api/paper/subjects",
            Level::Topic => "api/paper/topics",
            Level::Subtopic => "api/paper/subtopics",
        };
        let mut url = self.endpoint(path)?;
        if !parent.is_root() {
            url.query_pairs_mut().extend_pairs(parent.query_pairs());
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Reply, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = envelope::error_message(&body);
            tracing::warn!(%status, %message, "backend request failed");
            return Err(ApiError::HttpStatus { status, message });
        }
        envelope::decode(&body)
    }

    async fn get(&self, url: Url) -> Result<Reply, ApiError> {
        tracing::debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    /// Every stored question, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or backend-reported errors.
    pub async fn list_questions(&self) -> Result<Vec<QuestionSummary>, ApiError> {
        let mut reply = self.get(self.endpoint("questions")?).await?;
        reply.take_or_default("questions")
    }

    /// Subject → topic → subtopic question counts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or backend-reported errors.
    pub async fn practice_tree(&self) -> Result<QuestionTree, ApiError> {
        let mut reply = self.get(self.endpoint("api/practice/tree")?).await?;
        reply.take_or_default("tree")
    }

    /// Questions filed under a topic, optionally narrowed to one subtopic
    /// (`General` selects questions without a subtopic).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or backend-reported errors.
    pub async fn practice_questions(
        &self,
        subject: &CategoryId,
        topic: &CategoryId,
        subtopic: Option<&CategoryId>,
    ) -> Result<Vec<PracticeQuestion>, ApiError> {
        let mut url = self.endpoint("api/practice/questions")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("subject", subject.as_str());
            query.append_pair("topic", topic.as_str());
            if let Some(subtopic) = subtopic {
                query.append_pair("subtopic", subtopic.as_str());
            }
        }
        let mut reply = self.get(url).await?;
        reply.take_or_default("questions")
    }

    /// A single question with its markdown body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::HttpStatus` (404) when the question does not exist.
    pub async fn question(&self, id: QuestionId) -> Result<QuestionDetail, ApiError> {
        let url = self.endpoint(&format!("api/practice/question/{id}"))?;
        let mut reply = self.get(url).await?;
        reply.take("question")
    }

    /// Ask the backend to assemble a paper. A `warning` reply means fewer
    /// questions matched than were requested.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Application` when nothing matches the criteria.
    pub async fn generate_paper(&self, criteria: &PaperCriteria) -> Result<GeneratedPaper, ApiError> {
        let url = self.endpoint("api/paper/generate")?;
        tracing::debug!(%url, total = criteria.total_questions, "POST paper criteria");
        let mut reply = self.send(self.client.post(url).json(criteria)).await?;
        let questions: Vec<PaperQuestion> = reply.take_or_default("questions")?;
        let metadata: PaperMetadata = reply.take_or_default("metadata")?;
        let outcome = match reply.status {
            Status::Warning => PaperOutcome::Partial,
            _ => PaperOutcome::Complete,
        };
        Ok(GeneratedPaper {
            outcome,
            message: reply.message.unwrap_or_default(),
            questions,
            metadata,
        })
    }

    /// Persist a generated paper on the backend; returns the saved file path.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or backend-reported errors.
    pub async fn save_paper(
        &self,
        paper: &GeneratedPaper,
        filename: &str,
        format: ExportFormat,
    ) -> Result<String, ApiError> {
        #[derive(Serialize)]
        struct PaperData<'a> {
            questions: &'a [PaperQuestion],
            metadata: &'a PaperMetadata,
        }

        #[derive(Serialize)]
        struct SaveRequest<'a> {
            paper_data: PaperData<'a>,
            filename: &'a str,
            format: ExportFormat,
        }

        let url = self.endpoint("api/paper/save")?;
        let payload = SaveRequest {
            paper_data: PaperData {
                questions: &paper.questions,
                metadata: &paper.metadata,
            },
            filename,
            format,
        };
        let mut reply = self.send(self.client.post(url).json(&payload)).await?;
        reply.take("file_path")
    }

    /// Submit a new question as a multipart form. Returns the created record
    /// and the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or backend-reported errors.
    pub async fn submit_question(
        &self,
        draft: &QuestionDraft,
    ) -> Result<(SubmittedQuestion, String), ApiError> {
        let url = self.endpoint("submit")?;
        let form = draft
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        tracing::debug!(%url, title = %draft.title, "POST question");
        let mut reply = self.send(self.client.post(url).multipart(form)).await?;
        let question: SubmittedQuestion = reply.take("data")?;
        Ok((question, reply.message.unwrap_or_default()))
    }
}

#[async_trait]
impl TaxonomyBackend for BackendClient {
    async fn query_children(
        &self,
        level: Level,
        parent: &ParentPath,
    ) -> Result<Vec<CategoryId>, ApiError> {
        let url = self.children_url(level, parent)?;
        let key = match level {
            Level::Subject => "subjects",
            Level::Topic => "topics",
            Level::Subtopic => "subtopics",
        };
        let mut reply = self.get(url).await?;
        let raw: Vec<Option<String>> = reply.take_or_default(key)?;
        // Empty names are dropped rather than failing the whole list.
        Ok(raw
            .into_iter()
            .flatten()
            .filter_map(|name| CategoryId::new(name).ok())
            .collect())
    }
}
