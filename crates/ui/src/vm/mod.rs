mod filter_vm;
mod markdown_vm;
mod paper_vm;
mod practice_vm;
mod question_vm;
mod time_fmt;

pub use filter_vm::{FilterErrors, FilterLevelVm, FilterOptionVm, FilterPanelVm, map_filter_panel};
pub use markdown_vm::{markdown_excerpt, markdown_to_html, normalize_markdown, sanitize_html};
pub use paper_vm::{
    PaperFormError, PaperFormVm, PaperQuestionRowVm, PaperSummaryVm, map_paper_summary,
};
pub use practice_vm::{
    PracticeOutlineVm, PracticeQuestionRowVm, QuestionDetailVm, SubjectNodeVm, SubtopicNodeVm,
    TopicNodeVm, map_practice_outline, map_practice_rows, map_question_detail,
};
pub use question_vm::{
    FieldError, QuestionFormVm, QuestionRowVm, SubmissionVm, field_error, map_question_rows,
    map_submission,
};
pub use time_fmt::{format_backend_timestamp, format_datetime};
