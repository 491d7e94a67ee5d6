use std::sync::Arc;

use dioxus::prelude::*;
use qbank_core::model::{CategoryId, Level};
use services::{FilterController, FilterEventLog, FilterObserver, FilterSnapshot};

use crate::context::AppContext;
use crate::vm::{FilterErrors, FilterPanelVm, map_filter_panel};

#[derive(Clone, Debug, PartialEq, Eq)]
enum FilterAction {
    Load,
    Toggle(Level, CategoryId),
    Retry(Level),
}

/// Screen-owned filter state: one controller plus the signals the view
/// renders from.
#[derive(Clone)]
pub struct FilterHandle {
    controller: Arc<FilterController>,
    log: Arc<FilterEventLog>,
    pub panel: Signal<FilterPanelVm>,
    pub snapshot: Signal<FilterSnapshot>,
    pub pending: Signal<usize>,
    errors: Signal<FilterErrors>,
}

impl FilterHandle {
    pub fn toggle(&self, level: Level, id: CategoryId) {
        self.dispatch(FilterAction::Toggle(level, id));
    }

    /// Re-run the refresh that last failed at `level`.
    pub fn retry(&self, level: Level) {
        self.dispatch(FilterAction::Retry(level));
    }

    fn dispatch(&self, action: FilterAction) {
        let mut handle = self.clone();
        spawn(async move {
            *handle.pending.write() += 1;
            let controller = Arc::clone(&handle.controller);
            let result = match action {
                FilterAction::Load => controller.load_roots().await,
                FilterAction::Toggle(level, id) => controller.toggle(level, id).await,
                FilterAction::Retry(level) => match level.parent() {
                    Some(parent) => controller.refresh_children(parent).await,
                    None => controller.load_roots().await,
                },
            };
            if let Err(err) = result {
                tracing::debug!(level = %err.level, "filter refresh left previous options in place");
            }
            let remaining = handle.pending.peek().saturating_sub(1);
            handle.pending.set(remaining);
            handle.sync();
        });
    }

    fn sync(&mut self) {
        let snapshot = self.controller.snapshot();
        let events = self.log.drain();
        self.errors.write().apply(events);
        let panel = map_filter_panel(&snapshot, &self.errors.read());
        self.panel.set(panel);
        self.snapshot.set(snapshot);
    }
}

/// Create the screen's filter controller and load the subject list.
pub fn use_filter() -> FilterHandle {
    let ctx = use_context::<AppContext>();
    let panel = use_signal(|| map_filter_panel(&FilterSnapshot::default(), &FilterErrors::default()));
    let snapshot = use_signal(FilterSnapshot::default);
    let pending = use_signal(|| 0usize);
    let errors = use_signal(FilterErrors::default);

    use_hook(move || {
        let log = Arc::new(FilterEventLog::new());
        let controller = ctx.filter_controller(Arc::clone(&log) as Arc<dyn FilterObserver>);
        let handle = FilterHandle {
            controller: Arc::new(controller),
            log,
            panel,
            snapshot,
            pending,
            errors,
        };
        handle.dispatch(FilterAction::Load);
        handle
    })
}

#[component]
pub fn FilterPanel(
    vm: FilterPanelVm,
    busy: bool,
    on_toggle: EventHandler<(Level, CategoryId)>,
    on_retry: EventHandler<Level>,
) -> Element {
    let columns = vm.levels.iter().map(|level_vm| {
        let level = level_vm.level;
        let options = level_vm.options.iter().map(|option| {
            let id = option.id.clone();
            rsx! {
                li { key: "{option.input_id}", class: "filter-option",
                    input {
                        id: "{option.input_id}",
                        r#type: "checkbox",
                        checked: option.checked,
                        onchange: move |_| on_toggle.call((level, id.clone())),
                    }
                    label { r#for: "{option.input_id}", "{option.label}" }
                }
            }
        });
        rsx! {
            section { key: "{level.query_key()}", class: "filter-column",
                header { class: "filter-column-header",
                    h4 { "{level_vm.title}" }
                    span { class: "filter-column-count", "{level_vm.selected_label}" }
                }
                if let Some(error) = level_vm.error.as_ref() {
                    div { class: "filter-error", role: "alert",
                        p { "{error}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| on_retry.call(level),
                            "Retry"
                        }
                    }
                }
                if let Some(hint) = level_vm.empty_hint.as_ref() {
                    p { class: "filter-empty", "{hint}" }
                } else {
                    ul { class: "filter-options", {options} }
                }
            }
        }
    });

    let mut panel_class = String::from("filter-panel");
    if busy {
        panel_class.push_str(" filter-panel--busy");
    }
    if vm.has_errors() {
        panel_class.push_str(" filter-panel--error");
    }
    rsx! {
        div { class: "{panel_class}",
            {columns}
        }
    }
}
