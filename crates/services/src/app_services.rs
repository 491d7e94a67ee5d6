use std::sync::Arc;

use crate::Clock;
use crate::api::{BackendClient, TaxonomyBackend};
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::filter::{FilterController, FilterObserver};
use crate::paper_service::PaperService;
use crate::practice_service::PracticeService;
use crate::question_service::QuestionService;

/// Assembles app-facing services around one backend client.
#[derive(Clone)]
pub struct AppServices {
    config: BackendConfig,
    taxonomy: Arc<dyn TaxonomyBackend>,
    papers: Arc<PaperService>,
    questions: Arc<QuestionService>,
    practice: Arc<PracticeService>,
}

impl AppServices {
    /// Build services that talk to the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: BackendConfig, clock: Clock) -> Result<Self, ApiError> {
        let client = BackendClient::new(config.clone())?;
        tracing::info!(base_url = %config.base_url, timeout = ?config.request_timeout, "backend configured");
        Ok(Self {
            config,
            taxonomy: Arc::new(client.clone()),
            papers: Arc::new(PaperService::new(clock, client.clone())),
            questions: Arc::new(QuestionService::new(client.clone())),
            practice: Arc::new(PracticeService::new(client)),
        })
    }

    /// Swap the taxonomy source used by new filter controllers.
    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: Arc<dyn TaxonomyBackend>) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// A fresh filter controller reporting to `observer`. Each screen owns
    /// its own controller, so selections are never shared between screens.
    #[must_use]
    pub fn filter_controller(&self, observer: Arc<dyn FilterObserver>) -> FilterController {
        FilterController::new(
            Arc::clone(&self.taxonomy),
            observer,
            self.config.request_timeout,
        )
    }

    #[must_use]
    pub fn papers(&self) -> Arc<PaperService> {
        Arc::clone(&self.papers)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }
}
