use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use qbank_core::model::{CategoryId, Level, ParentPath};
use services::{FilterController, InMemoryTaxonomy, NoopObserver};

use super::filter_panel::FilterPanel;
use super::test_harness::{ViewKind, drive_dom, setup_view_harness};
use crate::vm::{FilterErrors, FilterPanelVm, map_filter_panel};

fn id(name: &str) -> CategoryId {
    CategoryId::new(name).unwrap()
}

fn subjects_taxonomy() -> InMemoryTaxonomy {
    let taxonomy = InMemoryTaxonomy::new();
    taxonomy.set_children(&ParentPath::root(), [id("Physics"), id("Math")]);
    taxonomy
}

#[component]
fn PanelHost(vm: FilterPanelVm) -> Element {
    rsx! {
        FilterPanel {
            vm,
            busy: false,
            on_toggle: move |_: (Level, CategoryId)| {},
            on_retry: move |_: Level| {},
        }
    }
}

#[tokio::test(flavor = "current_thread")]
async fn filter_panel_renders_levels_from_props() {
    let taxonomy = subjects_taxonomy();
    let math = ParentPath::root().child(id("Math")).unwrap();
    taxonomy.set_children(&math, [id("Algebra")]);
    let controller = FilterController::new(
        Arc::new(taxonomy),
        Arc::new(NoopObserver),
        Duration::from_secs(1),
    );
    controller.load_roots().await.unwrap();
    controller.toggle(Level::Subject, id("Math")).await.unwrap();
    let vm = map_filter_panel(&controller.snapshot(), &FilterErrors::default());

    let mut dom = VirtualDom::new_with_props(PanelHost, PanelHostProps { vm });
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    let html = dioxus_ssr::render(&dom);

    assert!(html.contains("filter-subject-Math"), "missing checkbox id in {html}");
    assert!(html.contains("Physics"), "missing option in {html}");
    assert!(html.contains("Algebra"), "missing topic in {html}");
    assert!(html.contains("1 selected"), "missing count in {html}");
    assert!(html.contains("Select a topic first."), "missing hint in {html}");
    assert!(!html.contains("Retry"), "unexpected retry in {html}");
    assert!(!html.contains("filter-panel--error"), "unexpected error style in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn paper_builder_smoke_loads_subjects() {
    let mut harness = setup_view_harness(ViewKind::PaperBuilder, subjects_taxonomy());
    harness.rebuild();
    let html = harness.drive_until("filter-subject-Physics", 10).await;

    assert!(html.contains("Build a paper"), "missing title in {html}");
    assert!(html.contains("filter-subject-Math"), "missing Math in {html}");
    assert!(html.contains("filter-subject-Physics"), "missing Physics in {html}");
    assert!(html.contains("Select a subject first."), "missing topic hint in {html}");
    assert_eq!(harness.taxonomy.call_count(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn paper_builder_smoke_shows_retry_on_failure() {
    let taxonomy = subjects_taxonomy();
    taxonomy.fail(&ParentPath::root(), "bank offline");
    let mut harness = setup_view_harness(ViewKind::PaperBuilder, taxonomy);
    harness.rebuild();
    let html = harness.drive_until("bank offline", 10).await;

    assert!(html.contains("bank offline"), "missing failure in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
    assert!(html.contains("No subjects available."), "missing empty hint in {html}");
    assert!(html.contains("filter-panel--error"), "missing error style in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn questions_view_smoke_starts_loading() {
    let mut harness = setup_view_harness(ViewKind::Questions, InMemoryTaxonomy::new());
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Questions"), "missing title in {html}");
    assert!(html.contains("Loading..."), "missing loading state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_reports_unreachable_backend() {
    let mut harness = setup_view_harness(ViewKind::Home, InMemoryTaxonomy::new());
    harness.rebuild();
    let html = harness.drive_until("not reachable", 40).await;
    assert!(html.contains("Connected to test backend"), "missing backend label in {html}");
    assert!(html.contains("not reachable"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn question_form_smoke_renders_vocabularies() {
    let mut harness = setup_view_harness(ViewKind::QuestionForm, InMemoryTaxonomy::new());
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Submit question"), "missing submit in {html}");
    assert!(html.contains("True/False") || html.contains("MCQ"), "missing types in {html}");
    assert!(html.contains("Understand"), "missing bloom levels in {html}");
    assert!(!html.contains("Preview"), "preview shown for empty body in {html}");
}
