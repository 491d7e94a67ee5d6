use std::sync::Arc;

use services::{
    AppServices, FilterController, FilterObserver, PaperService, PracticeService, QuestionService,
};

/// What the views need from the composition root.
pub trait UiApp: Send + Sync {
    fn backend_label(&self) -> String;

    fn papers(&self) -> Arc<PaperService>;
    fn questions(&self) -> Arc<QuestionService>;
    fn practice(&self) -> Arc<PracticeService>;

    /// A controller owned by one screen.
    fn filter_controller(&self, observer: Arc<dyn FilterObserver>) -> FilterController;
}

impl UiApp for AppServices {
    fn backend_label(&self) -> String {
        self.config().base_url.to_string()
    }

    fn papers(&self) -> Arc<PaperService> {
        AppServices::papers(self)
    }

    fn questions(&self) -> Arc<QuestionService> {
        AppServices::questions(self)
    }

    fn practice(&self) -> Arc<PracticeService> {
        AppServices::practice(self)
    }

    fn filter_controller(&self, observer: Arc<dyn FilterObserver>) -> FilterController {
        AppServices::filter_controller(self, observer)
    }
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: Arc<dyn UiApp>) -> Self {
        Self { app }
    }

    #[must_use]
    pub fn backend_label(&self) -> String {
        self.app.backend_label()
    }

    #[must_use]
    pub fn papers(&self) -> Arc<PaperService> {
        self.app.papers()
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        self.app.questions()
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        self.app.practice()
    }

    #[must_use]
    pub fn filter_controller(&self, observer: Arc<dyn FilterObserver>) -> FilterController {
        self.app.filter_controller(observer)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
