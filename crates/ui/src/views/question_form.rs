use dioxus::prelude::*;
use qbank_core::model::{BloomLevel, Difficulty, QuestionType};

use crate::context::AppContext;
use crate::views::question_error_text;
use crate::vm::{
    FieldError, QuestionFormVm, SubmissionVm, field_error, map_submission, markdown_excerpt,
    markdown_to_html, normalize_markdown,
};

const PREVIEW_EXCERPT_CHARS: usize = 120;

#[derive(Clone, Debug, PartialEq, Eq)]
enum SubmitState {
    Idle,
    Submitting,
    Submitted(SubmissionVm),
    Failed(String),
}

#[component]
pub fn QuestionFormView() -> Element {
    let ctx = use_context::<AppContext>();
    let questions = ctx.questions();
    let mut form = use_signal(QuestionFormVm::default);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut submit_state = use_signal(|| SubmitState::Idle);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submit_state() == SubmitState::Submitting {
            return;
        }
        let mut current = form.read().clone();
        current.body_markdown = normalize_markdown(&current.body_markdown);
        let draft = match current.to_draft() {
            Ok(draft) => draft,
            Err(field_errors) => {
                errors.set(field_errors);
                return;
            }
        };
        errors.set(Vec::new());
        let questions = questions.clone();
        spawn(async move {
            submit_state.set(SubmitState::Submitting);
            match questions.submit(&draft).await {
                Ok(receipt) => {
                    form.set(QuestionFormVm::default());
                    submit_state.set(SubmitState::Submitted(map_submission(&receipt)));
                }
                Err(err) => submit_state.set(SubmitState::Failed(question_error_text(err))),
            }
        });
    };

    let values = form.read().clone();
    let field_errors = errors.read().clone();
    let excerpt = markdown_excerpt(&values.body_markdown, PREVIEW_EXCERPT_CHARS);
    let preview_html = markdown_to_html(&values.body_markdown);
    let submitting = submit_state() == SubmitState::Submitting;

    rsx! {
        div { class: "page question-form-page",
            header { class: "view-header",
                h2 { class: "view-title", "New question" }
            }
            div { class: "view-divider" }

            form { class: "question-form", onsubmit: on_submit,
                TextField {
                    id: "title",
                    label: "Title",
                    value: values.title.clone(),
                    error: field_error(&field_errors, "title").map(str::to_string),
                    on_input: move |value| form.write().title = value,
                }
                div { class: "form-field",
                    label { r#for: "body_markdown", "Question (markdown)" }
                    textarea {
                        id: "body_markdown",
                        rows: "10",
                        value: "{values.body_markdown}",
                        oninput: move |evt| form.write().body_markdown = evt.value(),
                    }
                    if let Some(message) = field_error(&field_errors, "body_markdown") {
                        p { class: "field-error", "{message}" }
                    }
                }
                div { class: "form-row",
                    TextField {
                        id: "subject",
                        label: "Subject",
                        value: values.subject.clone(),
                        error: field_error(&field_errors, "subject").map(str::to_string),
                        on_input: move |value| form.write().subject = value,
                    }
                    TextField {
                        id: "topic",
                        label: "Topic",
                        value: values.topic.clone(),
                        error: field_error(&field_errors, "topic").map(str::to_string),
                        on_input: move |value| form.write().topic = value,
                    }
                    TextField {
                        id: "subtopic",
                        label: "Subtopic (optional)",
                        value: values.subtopic.clone(),
                        error: None,
                        on_input: move |value| form.write().subtopic = value,
                    }
                }
                div { class: "form-row",
                    SelectField {
                        id: "question_type",
                        label: "Type",
                        value: values.question_type.clone(),
                        options: QuestionType::ALL.iter().map(|value| value.label()).collect::<Vec<_>>(),
                        error: field_error(&field_errors, "question_type").map(str::to_string),
                        on_change: move |value| form.write().question_type = value,
                    }
                    SelectField {
                        id: "difficulty",
                        label: "Difficulty",
                        value: values.difficulty.clone(),
                        options: Difficulty::ALL.iter().map(|value| value.label()).collect::<Vec<_>>(),
                        error: field_error(&field_errors, "difficulty").map(str::to_string),
                        on_change: move |value| form.write().difficulty = value,
                    }
                    SelectField {
                        id: "bloom_level",
                        label: "Bloom level",
                        value: values.bloom_level.clone(),
                        options: BloomLevel::ALL.iter().map(|value| value.label()).collect::<Vec<_>>(),
                        error: field_error(&field_errors, "bloom_level").map(str::to_string),
                        on_change: move |value| form.write().bloom_level = value,
                    }
                    TextField {
                        id: "estimated_minutes",
                        label: "Minutes",
                        value: values.estimated_minutes.clone(),
                        error: field_error(&field_errors, "estimated_minutes").map(str::to_string),
                        on_input: move |value| form.write().estimated_minutes = value,
                    }
                }
                label { class: "check",
                    input {
                        r#type: "checkbox",
                        checked: values.generate_ai_variants,
                        onchange: move |_| {
                            let mut form = form.write();
                            form.generate_ai_variants = !form.generate_ai_variants;
                        },
                    }
                    "Generate AI variants"
                }
                if values.generate_ai_variants {
                    TextField {
                        id: "ai_notes",
                        label: "Notes for the variants",
                        value: values.ai_notes.clone(),
                        error: None,
                        on_input: move |value| form.write().ai_notes = value,
                    }
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: submitting,
                        if submitting { "Submitting..." } else { "Submit question" }
                    }
                }
            }

            match submit_state() {
                SubmitState::Submitted(vm) => rsx! {
                    section { class: "submission",
                        p { class: "submission-headline", "{vm.headline}" }
                        p { class: "submission-path", "{vm.file_path}" }
                        if !vm.variants.is_empty() {
                            ul {
                                for variant in vm.variants.iter() {
                                    li { key: "{variant}", "{variant}" }
                                }
                            }
                        }
                    }
                },
                SubmitState::Failed(message) => rsx! {
                    p { class: "form-error", role: "alert", "{message}" }
                },
                SubmitState::Idle | SubmitState::Submitting => rsx! {},
            }

            if !values.body_markdown.trim().is_empty() {
                section { class: "question-preview",
                    h3 { "Preview" }
                    p { class: "question-preview-excerpt", "{excerpt}" }
                    div { class: "markdown-body", dangerous_inner_html: "{preview_html}" }
                }
            }
        }
    }
}

#[component]
fn TextField(
    id: &'static str,
    label: &'static str,
    value: String,
    error: Option<String>,
    on_input: EventHandler<String>,
) -> Element {
    rsx! {
        div { class: "form-field",
            label { r#for: id, "{label}" }
            input {
                id,
                r#type: "text",
                value: "{value}",
                oninput: move |evt| on_input.call(evt.value()),
            }
            if let Some(message) = error {
                p { class: "field-error", "{message}" }
            }
        }
    }
}

#[component]
fn SelectField(
    id: &'static str,
    label: &'static str,
    value: String,
    options: Vec<&'static str>,
    error: Option<String>,
    on_change: EventHandler<String>,
) -> Element {
    rsx! {
        div { class: "form-field",
            label { r#for: id, "{label}" }
            select {
                id,
                value: "{value}",
                onchange: move |evt| on_change.call(evt.value()),
                for choice in options {
                    option { key: "{choice}", value: choice, selected: choice == value, "{choice}" }
                }
            }
            if let Some(message) = error {
                p { class: "field-error", "{message}" }
            }
        }
    }
}
