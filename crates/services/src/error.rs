//! Shared error types for the services crate.

use thiserror::Error;

use qbank_core::model::{Level, PaperCriteriaError, ParentPath, QuestionDraftError};

/// Errors emitted by backend requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend returned {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    /// The backend answered but reported a logical error.
    #[error("{0}")]
    Application(String),
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Http(reqwest::Error),
}

impl ApiError {
    /// Network-level failures and server faults, as opposed to the backend
    /// rejecting a request.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            ApiError::Timeout | ApiError::Http(_) => true,
            ApiError::HttpStatus { status, .. } => !status.is_client_error(),
            _ => false,
        }
    }

    /// The backend rejected the request: an `error` envelope or a 4xx reply.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        match self {
            ApiError::Application(_) => true,
            ApiError::HttpStatus { status, .. } => status.is_client_error(),
            _ => false,
        }
    }

    /// Message the backend attached to a rejection, if it sent one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        let message = match self {
            ApiError::Application(message) => message,
            ApiError::HttpStatus { message, .. } if self.is_rejection() => message,
            _ => return None,
        };
        let message = message.trim();
        (!message.is_empty()).then_some(message)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(err)
        }
    }
}

/// One failed children query within a refresh.
#[derive(Debug)]
pub struct ParentFailure {
    pub parent: ParentPath,
    pub error: ApiError,
}

/// A refresh could not load every parent's children; nothing was published.
#[derive(Debug, Error)]
#[error("loading {level} options failed for {} of {attempted} requests", .failures.len())]
pub struct RefreshError {
    pub level: Level,
    pub attempted: usize,
    pub failures: Vec<ParentFailure>,
}

impl RefreshError {
    /// Human-readable diagnostic naming the first failing parent.
    #[must_use]
    pub fn message(&self) -> String {
        match self.failures.first() {
            Some(first) if self.failures.len() == 1 => format!(
                "Could not load {} for {}: {}",
                self.level.plural_label().to_lowercase(),
                first.parent,
                first.error
            ),
            Some(first) => format!(
                "Could not load {} for {} of {} selections (first: {}: {})",
                self.level.plural_label().to_lowercase(),
                self.failures.len(),
                self.attempted,
                first.parent,
                first.error
            ),
            None => self.to_string(),
        }
    }
}

/// Errors emitted by `PaperService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaperServiceError {
    #[error(transparent)]
    Criteria(#[from] PaperCriteriaError),
    #[error("filename cannot be empty")]
    EmptyFilename,
    #[error("filename must not contain path separators: {0}")]
    InvalidFilename(String),
    #[error("paper has no questions to save")]
    EmptyPaper,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `QuestionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionServiceError {
    #[error(transparent)]
    Draft(#[from] QuestionDraftError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
