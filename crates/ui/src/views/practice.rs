use dioxus::prelude::*;
use qbank_core::model::{CategoryId, QuestionId};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    PracticeOutlineVm, PracticeQuestionRowVm, QuestionDetailVm, map_practice_outline,
    map_practice_rows, map_question_detail,
};

/// The bucket whose questions are listed: a topic, optionally narrowed to
/// one subtopic.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Bucket {
    subject: CategoryId,
    topic: CategoryId,
    subtopic: Option<CategoryId>,
}

impl Bucket {
    fn title(&self) -> String {
        match &self.subtopic {
            Some(subtopic) => format!("{} › {} › {}", self.subject, self.topic, subtopic),
            None => format!("{} › {}", self.subject, self.topic),
        }
    }
}

#[component]
pub fn PracticeView() -> Element {
    let ctx = use_context::<AppContext>();
    let practice = ctx.practice();
    let mut bucket = use_signal(|| None::<Bucket>);
    let mut open_question = use_signal(|| None::<QuestionId>);

    let outline_practice = practice.clone();
    let outline = use_resource(move || {
        let practice = outline_practice.clone();
        async move {
            let tree = practice.tree().await.map_err(ViewError::from)?;
            Ok::<PracticeOutlineVm, ViewError>(map_practice_outline(&tree))
        }
    });

    let list_practice = practice.clone();
    let questions = use_resource(move || {
        let practice = list_practice.clone();
        let selected = bucket();
        async move {
            let Some(selected) = selected else {
                return Ok(Vec::new());
            };
            let rows = practice
                .questions(&selected.subject, &selected.topic, selected.subtopic.as_ref())
                .await
                .map_err(ViewError::from)?;
            Ok::<Vec<PracticeQuestionRowVm>, ViewError>(map_practice_rows(&rows))
        }
    });

    let detail = use_resource(move || {
        let practice = practice.clone();
        let id = open_question();
        async move {
            let Some(id) = id else {
                return Ok(None);
            };
            let question = practice.question(id).await.map_err(ViewError::from)?;
            Ok::<Option<QuestionDetailVm>, ViewError>(Some(map_question_detail(&question)))
        }
    });

    let outline_state = view_state_from_resource(&outline);
    let questions_state = view_state_from_resource(&questions);
    let detail_state = view_state_from_resource(&detail);
    let selected = bucket();

    rsx! {
        div { class: "page practice-page",
            header { class: "view-header",
                h2 { class: "view-title", "Practice" }
            }
            div { class: "view-divider" }

            div { class: "practice-layout",
                aside { class: "practice-outline",
                    match outline_state {
                        ViewState::Idle | ViewState::Loading => rsx! { p { "Loading..." } },
                        ViewState::Error(err) => rsx! { p { class: "form-error", "{err.message()}" } },
                        ViewState::Ready(vm) => rsx! {
                            p { class: "practice-total", "{vm.total_label}" }
                            if vm.is_empty() {
                                p { "No questions yet." }
                            }
                            for subject in vm.subjects {
                                details { key: "{subject.name}", open: true,
                                    summary { "{subject.name} ({subject.count_label})" }
                                    for topic in subject.topics {
                                        TopicEntry {
                                            key: "{subject.name}/{topic.name}",
                                            subject: subject.name.clone(),
                                            topic: topic.name.clone(),
                                            count_label: topic.count_label.clone(),
                                            subtopics: topic
                                                .subtopics
                                                .iter()
                                                .map(|node| (node.name.clone(), node.label.clone(), node.count_label.clone()))
                                                .collect::<Vec<_>>(),
                                            on_select: move |next: Bucket| {
                                                open_question.set(None);
                                                bucket.set(Some(next));
                                            },
                                        }
                                    }
                                }
                            }
                        },
                    }
                }

                section { class: "practice-questions",
                    if let Some(selected) = selected.as_ref() {
                        h3 { "{selected.title()}" }
                        match questions_state {
                            ViewState::Idle | ViewState::Loading => rsx! { p { "Loading..." } },
                            ViewState::Error(err) => rsx! { p { class: "form-error", "{err.message()}" } },
                            ViewState::Ready(rows) => rsx! {
                                if rows.is_empty() {
                                    p { "No questions in this bucket." }
                                }
                                ul { class: "practice-list",
                                    for row in rows {
                                        li { key: "{row.id}",
                                            button {
                                                class: "practice-row",
                                                r#type: "button",
                                                onclick: move |_| open_question.set(Some(QuestionId::new(row.id))),
                                                span { class: "practice-row-title", "{row.title}" }
                                                span { class: "practice-row-meta", "{row.meta}" }
                                            }
                                        }
                                    }
                                }
                            },
                        }
                    } else {
                        p { class: "practice-hint", "Pick a topic to list its questions." }
                    }
                }

                article { class: "practice-detail",
                    match detail_state {
                        ViewState::Ready(Some(vm)) => rsx! {
                            p { class: "practice-breadcrumb", "{vm.breadcrumb}" }
                            h3 { "{vm.title}" }
                            p { class: "practice-row-meta", "{vm.meta}" }
                            div { class: "markdown-body", dangerous_inner_html: "{vm.body_html}" }
                        },
                        ViewState::Error(err) => rsx! { p { class: "form-error", "{err.message()}" } },
                        ViewState::Loading => rsx! { p { "Loading..." } },
                        ViewState::Idle | ViewState::Ready(None) => rsx! {},
                    }
                }
            }
        }
    }
}

#[component]
fn TopicEntry(
    subject: CategoryId,
    topic: CategoryId,
    count_label: String,
    subtopics: Vec<(CategoryId, String, String)>,
    on_select: EventHandler<Bucket>,
) -> Element {
    let whole_topic = Bucket {
        subject: subject.clone(),
        topic: topic.clone(),
        subtopic: None,
    };
    rsx! {
        div { class: "practice-topic",
            button {
                class: "practice-topic-button",
                r#type: "button",
                onclick: move |_| on_select.call(whole_topic.clone()),
                "{topic} ({count_label})"
            }
            ul {
                for (name, label, count) in subtopics {
                    li { key: "{name}",
                        button {
                            class: "practice-subtopic-button",
                            r#type: "button",
                            onclick: {
                                let next = Bucket {
                                    subject: subject.clone(),
                                    topic: topic.clone(),
                                    subtopic: Some(name.clone()),
                                };
                                move |_| on_select.call(next.clone())
                            },
                            "{label} ({count})"
                        }
                    }
                }
            }
        }
    }
}
