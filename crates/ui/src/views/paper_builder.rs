use std::time::Duration;

use dioxus::prelude::*;
use qbank_core::model::{BloomLevel, ExportFormat, GeneratedPaper, Level, QuestionType};

use crate::context::AppContext;
use crate::views::filter_panel::{FilterPanel, use_filter};
use crate::views::paper_error_text;
use crate::vm::{PaperFormVm, map_paper_summary};

const SAVED_NOTICE: Duration = Duration::from_secs(4);

#[derive(Clone, Debug, PartialEq, Eq)]
enum ActionState {
    Idle,
    Working,
    Done(String),
    Failed(String),
}

fn export_format_from_value(value: &str) -> ExportFormat {
    ExportFormat::ALL
        .into_iter()
        .find(|format| format.extension() == value)
        .unwrap_or_default()
}

#[component]
pub fn PaperBuilderView() -> Element {
    let ctx = use_context::<AppContext>();
    let papers = ctx.papers();
    let filter = use_filter();
    let mut form = use_signal(PaperFormVm::default);
    let mut paper = use_signal(|| None::<GeneratedPaper>);
    let mut generate_state = use_signal(|| ActionState::Idle);
    let mut save_state = use_signal(|| ActionState::Idle);
    let default_name = papers.default_filename();
    let mut filename = use_signal(move || default_name);
    let mut format = use_signal(ExportFormat::default);

    let panel_vm = filter.panel.read().clone();
    let snapshot = filter.snapshot.read().clone();
    let busy = *filter.pending.read() > 0;
    let filter_for_toggle = filter.clone();
    let filter_for_retry = filter.clone();

    let papers_for_generate = papers.clone();
    let on_generate = move |_| {
        if generate_state() == ActionState::Working {
            return;
        }
        let criteria = match form.read().to_criteria(&filter.snapshot.read()) {
            Ok(criteria) => criteria,
            Err(err) => {
                generate_state.set(ActionState::Failed(err.message));
                return;
            }
        };
        let papers = papers_for_generate.clone();
        spawn(async move {
            generate_state.set(ActionState::Working);
            match papers.generate(&criteria).await {
                Ok(generated) => {
                    save_state.set(ActionState::Idle);
                    paper.set(Some(generated));
                    generate_state.set(ActionState::Idle);
                }
                Err(err) => generate_state.set(ActionState::Failed(paper_error_text(err))),
            }
        });
    };

    let on_save = move |_| {
        let Some(current) = paper.read().clone() else {
            return;
        };
        if save_state() == ActionState::Working {
            return;
        }
        let papers = papers.clone();
        let name = filename.read().clone();
        let chosen = format();
        spawn(async move {
            save_state.set(ActionState::Working);
            match papers.save(&current, &name, chosen).await {
                Ok(saved) => {
                    let message = format!("Saved to {}", saved.file_path);
                    save_state.set(ActionState::Done(message.clone()));
                    tokio::time::sleep(SAVED_NOTICE).await;
                    if save_state() == ActionState::Done(message) {
                        save_state.set(ActionState::Idle);
                    }
                }
                Err(err) => save_state.set(ActionState::Failed(paper_error_text(err))),
            }
        });
    };

    let form_value = form.read().clone();
    let type_boxes = QuestionType::ALL.iter().copied().map(|question_type| {
        let checked = form_value.question_types.contains(&question_type);
        rsx! {
            label { key: "{question_type}", class: "check",
                input {
                    r#type: "checkbox",
                    checked,
                    onchange: move |_| {
                        let mut form = form.write();
                        if !form.question_types.remove(&question_type) {
                            form.question_types.insert(question_type);
                        }
                    },
                }
                "{question_type}"
            }
        }
    });
    let bloom_boxes = BloomLevel::ALL.iter().copied().map(|bloom| {
        let checked = form_value.bloom_levels.contains(&bloom);
        rsx! {
            label { key: "{bloom}", class: "check",
                input {
                    r#type: "checkbox",
                    checked,
                    onchange: move |_| {
                        let mut form = form.write();
                        if !form.bloom_levels.remove(&bloom) {
                            form.bloom_levels.insert(bloom);
                        }
                    },
                }
                "{bloom}"
            }
        }
    });

    let exclusion_groups = [Level::Topic, Level::Subtopic].into_iter().map(|level| {
        let excluded = form_value.excluded(level).cloned().unwrap_or_default();
        let state = snapshot.level(level);
        let boxes = state
            .options
            .iter()
            .filter(|id| !state.selection.contains(id))
            .cloned()
            .map(|id| {
                let checked = excluded.contains(&id);
                let label = id.to_string();
                rsx! {
                    label { key: "{label}", class: "check",
                        input {
                            r#type: "checkbox",
                            checked,
                            onchange: move |_| {
                                form.write().toggle_exclusion(level, id.clone());
                            },
                        }
                        "{label}"
                    }
                }
            })
            .collect::<Vec<_>>();
        (level, boxes)
    })
    .filter(|(_, boxes)| !boxes.is_empty())
    .collect::<Vec<_>>();

    let summary = paper.read().as_ref().map(map_paper_summary);

    rsx! {
        div { class: "page paper-page",
            header { class: "view-header",
                h2 { class: "view-title", "Build a paper" }
                p { class: "view-subtitle", "Narrow the bank, set quotas, then generate." }
            }
            div { class: "view-divider" }

            FilterPanel {
                vm: panel_vm,
                busy,
                on_toggle: move |(level, id)| filter_for_toggle.toggle(level, id),
                on_retry: move |level| filter_for_retry.retry(level),
            }

            form { class: "paper-form",
                onsubmit: move |evt| evt.prevent_default(),
                div { class: "form-row",
                    label { r#for: "total-questions", "Questions" }
                    input {
                        id: "total-questions",
                        r#type: "number",
                        min: "1",
                        value: "{form_value.total_questions}",
                        oninput: move |evt| form.write().total_questions = evt.value(),
                    }
                    label { r#for: "max-time", "Time limit (min)" }
                    input {
                        id: "max-time",
                        r#type: "number",
                        min: "1",
                        placeholder: "none",
                        value: "{form_value.max_time}",
                        oninput: move |evt| form.write().max_time = evt.value(),
                    }
                }
                fieldset { class: "form-row",
                    legend { "Difficulty mix" }
                    label { "Easy"
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{form_value.easy}",
                            oninput: move |evt| form.write().easy = evt.value(),
                        }
                    }
                    label { "Medium"
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{form_value.medium}",
                            oninput: move |evt| form.write().medium = evt.value(),
                        }
                    }
                    label { "Hard"
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{form_value.hard}",
                            oninput: move |evt| form.write().hard = evt.value(),
                        }
                    }
                }
                fieldset { class: "form-row",
                    legend { "Question types" }
                    {type_boxes}
                }
                fieldset { class: "form-row",
                    legend { "Bloom levels" }
                    {bloom_boxes}
                }
                for (level, boxes) in exclusion_groups {
                    fieldset { key: "{level}", class: "form-row paper-exclusions",
                        legend { "Exclude {level.plural_label().to_lowercase()}" }
                        {boxes.into_iter()}
                    }
                }
                label { class: "check",
                    input {
                        r#type: "checkbox",
                        checked: form_value.include_ai_generated,
                        onchange: move |_| {
                            let mut form = form.write();
                            form.include_ai_generated = !form.include_ai_generated;
                        },
                    }
                    "Include AI-generated questions"
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: generate_state() == ActionState::Working,
                        onclick: on_generate,
                        if generate_state() == ActionState::Working { "Generating..." } else { "Generate paper" }
                    }
                }
                if let ActionState::Failed(message) = generate_state() {
                    p { class: "form-error", role: "alert", "{message}" }
                }
            }

            if let Some(summary) = summary {
                section { class: "paper-result",
                    h3 { "{summary.headline}" }
                    if let Some(warning) = summary.warning.as_ref() {
                        p { class: "paper-warning", "{warning}" }
                    }
                    if !summary.distribution.is_empty() {
                        ul { class: "paper-distribution",
                            for entry in summary.distribution.iter() {
                                li { key: "{entry}", "{entry}" }
                            }
                        }
                    }
                    ol { class: "paper-questions",
                        for row in summary.rows.iter() {
                            li { key: "{row.number}", class: "paper-question",
                                span { class: "paper-question-title", "{row.title}" }
                                if row.ai_badge {
                                    span { class: "badge", "AI" }
                                }
                                span { class: "paper-question-location", "{row.location}" }
                                span { class: "paper-question-meta", "{row.meta}" }
                            }
                        }
                    }
                    if summary.can_save {
                        div { class: "paper-save",
                            input {
                                r#type: "text",
                                aria_label: "File name",
                                value: "{filename}",
                                oninput: move |evt| filename.set(evt.value()),
                            }
                            select {
                                value: "{format().extension()}",
                                onchange: move |evt| format.set(export_format_from_value(&evt.value())),
                                for choice in ExportFormat::ALL {
                                    option { key: "{choice.extension()}", value: "{choice.extension()}", "{choice.label()}" }
                                }
                            }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                disabled: save_state() == ActionState::Working,
                                onclick: on_save,
                                "Save"
                            }
                        }
                        match save_state() {
                            ActionState::Done(message) => rsx! { p { class: "paper-saved", "{message}" } },
                            ActionState::Failed(message) => rsx! { p { class: "form-error", role: "alert", "{message}" } },
                            ActionState::Working => rsx! { p { "Saving..." } },
                            ActionState::Idle => rsx! {},
                        }
                    }
                }
            }
        }
    }
}
