mod filter_panel;
mod home;
mod paper_builder;
mod practice;
mod question_form;
mod questions;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use filter_panel::{FilterHandle, FilterPanel, use_filter};
pub use home::HomeView;
pub use paper_builder::PaperBuilderView;
pub use practice::PracticeView;
pub use question_form::QuestionFormView;
pub use questions::QuestionsView;
pub use state::{
    ViewError, ViewState, api_error_text, paper_error_text, question_error_text,
    view_state_from_resource,
};
