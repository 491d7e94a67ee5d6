use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{PracticeOutlineVm, map_practice_outline};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let practice = ctx.practice();
    let backend = ctx.backend_label();

    let mut resource = use_resource(move || {
        let practice = practice.clone();
        async move {
            let tree = practice.tree().await.map_err(ViewError::from)?;
            Ok::<PracticeOutlineVm, ViewError>(map_practice_outline(&tree))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Question Bank" }
                p { class: "view-subtitle", "Connected to {backend}" }
            }
            div { class: "view-divider" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(outline) => rsx! {
                    if outline.is_empty() {
                        p { "The bank is empty. " Link { to: Route::QuestionForm {}, "Add a question" } }
                    } else {
                        p { class: "home-total", "{outline.total_label} in the bank" }
                        ul { class: "home-subjects",
                            for subject in outline.subjects {
                                li { key: "{subject.name}",
                                    span { class: "home-subject", "{subject.name}" }
                                    span { class: "home-count", "{subject.count_label}" }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "form-error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }

            div { class: "home-actions",
                Link { class: "btn btn-primary", to: Route::PaperBuilder {}, "Build a paper" }
                Link { class: "btn btn-secondary", to: Route::Practice {}, "Practice" }
            }
        }
    }
}
