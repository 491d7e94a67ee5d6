mod ids;
mod paper;
mod question;
mod taxonomy;
mod tree;

pub use ids::{ParseIdError, QuestionId};
pub use paper::{
    ExportFormat, GeneratedPaper, PaperCriteria, PaperCriteriaError, PaperMetadata, PaperOutcome,
    PaperQuestion, default_paper_filename,
};
pub use question::{
    AiVariant, BloomLevel, Difficulty, PracticeQuestion, QuestionDetail, QuestionDraft,
    QuestionDraftError, QuestionSummary, QuestionType, SubmittedQuestion,
};
pub use taxonomy::{AvailableOptions, CategoryError, CategoryId, Level, ParentPath, SelectionSet};
pub use tree::{GENERAL_SUBTOPIC, QuestionTree, is_general};

pub(crate) mod wire;
