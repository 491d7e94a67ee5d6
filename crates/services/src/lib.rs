#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod config;
pub mod error;
pub mod filter;
pub mod paper_service;
pub mod practice_service;
pub mod question_service;

pub use qbank_core::Clock;
pub use reqwest::StatusCode;

pub use api::{BackendClient, InMemoryTaxonomy, TaxonomyBackend};
pub use app_services::AppServices;
pub use config::{BackendConfig, ConfigError};
pub use error::{ApiError, PaperServiceError, ParentFailure, QuestionServiceError, RefreshError};
pub use filter::{
    FilterController, FilterEvent, FilterEventLog, FilterObserver, FilterSnapshot, LevelSnapshot,
    NoopObserver, RefreshOutcome,
};
pub use paper_service::{PaperService, SavedPaper};
pub use practice_service::PracticeService;
pub use question_service::{QuestionService, SubmissionReceipt};
