use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuestionRowVm, map_question_rows};

#[component]
pub fn QuestionsView() -> Element {
    let ctx = use_context::<AppContext>();
    let questions = ctx.questions();

    let resource = use_resource(move || {
        let questions = questions.clone();
        async move {
            let items = questions.list().await.map_err(ViewError::from)?;
            Ok::<Vec<QuestionRowVm>, ViewError>(map_question_rows(&items))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Questions" }
                Link { class: "btn btn-primary", to: Route::QuestionForm {}, "New question" }
            }
            div { class: "view-divider" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { "No questions yet." }
                    } else {
                        ul { class: "question-list",
                            for row in rows {
                                QuestionRow { key: "{row.id}", row }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "form-error", "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn QuestionRow(row: QuestionRowVm) -> Element {
    rsx! {
        li { class: "question-row",
            div { class: "question-row-head",
                span { class: "question-row-title", "{row.title}" }
                if row.ai_badge {
                    span { class: "badge", "AI" }
                }
            }
            p { class: "question-row-location", "{row.location}" }
            p { class: "question-row-meta",
                "{row.meta}"
                if let Some(created) = row.created.as_ref() {
                    " · {created}"
                }
            }
        }
    }
}
