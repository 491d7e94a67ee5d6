use dioxus::prelude::*;
use services::{ApiError, PaperServiceError, QuestionServiceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The backend could not be reached or did not answer in time.
    Unreachable,
    /// The backend answered with an error.
    Rejected,
    NotFound,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unreachable => "The question bank is not reachable. Check that it is running.",
            ViewError::Rejected => "The question bank rejected the request.",
            ViewError::NotFound => "That item no longer exists.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::HttpStatus { status, .. } if status.as_u16() == 404 => ViewError::NotFound,
            err if err.is_transport() => ViewError::Unreachable,
            err if err.is_rejection() => ViewError::Rejected,
            _ => ViewError::Unknown,
        }
    }
}

/// Text for a failed backend call: the backend's own message when it sent
/// one, otherwise the generic message for the failure class.
#[must_use]
pub fn api_error_text(err: ApiError) -> String {
    if let Some(message) = err.backend_message() {
        tracing::warn!(error = %err, "backend rejected request");
        return message.to_string();
    }
    ViewError::from(err).message().to_string()
}

#[must_use]
pub fn paper_error_text(err: PaperServiceError) -> String {
    match err {
        PaperServiceError::Api(err) => api_error_text(err),
        PaperServiceError::InvalidFilename(name) => format!("{name} is not a valid file name."),
        other => {
            tracing::warn!(error = %other, "paper request failed");
            capitalize(&other.to_string())
        }
    }
}

#[must_use]
pub fn question_error_text(err: QuestionServiceError) -> String {
    match err {
        QuestionServiceError::Api(err) => api_error_text(err),
        other => {
            tracing::warn!(error = %other, "question request failed");
            capitalize(&other.to_string())
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        tracing::warn!(error = %err, "backend request failed");
        Self::from_api(&err)
    }
}

impl From<PaperServiceError> for ViewError {
    fn from(err: PaperServiceError) -> Self {
        match err {
            PaperServiceError::Api(err) => err.into(),
            other => {
                tracing::warn!(error = %other, "paper request failed");
                ViewError::Rejected
            }
        }
    }
}

impl From<QuestionServiceError> for ViewError {
    fn from(err: QuestionServiceError) -> Self {
        match err {
            QuestionServiceError::Api(err) => err.into(),
            other => {
                tracing::warn!(error = %other, "question request failed");
                ViewError::Rejected
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
