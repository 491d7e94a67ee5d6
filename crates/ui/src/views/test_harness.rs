use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use qbank_core::time::fixed_now;
use services::{
    AppServices, BackendConfig, Clock, FilterController, FilterObserver, InMemoryTaxonomy,
    PaperService, PracticeService, QuestionService,
};

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, PaperBuilderView, QuestionFormView, QuestionsView};

/// Nothing listens here, so every backend call fails fast as unreachable.
const UNREACHABLE_URL: &str = "http://127.0.0.1:9/";

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn backend_label(&self) -> String {
        "test backend".to_string()
    }

    fn papers(&self) -> Arc<PaperService> {
        self.services.papers()
    }

    fn questions(&self) -> Arc<QuestionService> {
        self.services.questions()
    }

    fn practice(&self) -> Arc<PracticeService> {
        self.services.practice()
    }

    fn filter_controller(&self, observer: Arc<dyn FilterObserver>) -> FilterController {
        self.services.filter_controller(observer)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    PaperBuilder,
    Questions,
    QuestionForm,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::PaperBuilder => rsx! { PaperBuilderView {} },
        ViewKind::Questions => rsx! { QuestionsView {} },
        ViewKind::QuestionForm => rsx! { QuestionFormView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub taxonomy: InMemoryTaxonomy,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until `needle` shows up in the rendered html or the rounds run out.
    pub async fn drive_until(&mut self, needle: &str, rounds: usize) -> String {
        let mut html = self.render();
        for _ in 0..rounds {
            if html.contains(needle) {
                break;
            }
            self.drive_async().await;
            html = self.render();
        }
        html
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// A harness whose filter controllers read `taxonomy`; every other backend
/// call goes to an address nobody listens on.
pub fn setup_view_harness(view: ViewKind, taxonomy: InMemoryTaxonomy) -> ViewHarness {
    let config = BackendConfig::new(UNREACHABLE_URL, Duration::from_millis(500))
        .expect("valid test config");
    let services = AppServices::new(config, Clock::fixed(fixed_now()))
        .expect("http client")
        .with_taxonomy(Arc::new(taxonomy.clone()));

    let app = Arc::new(TestApp { services });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom, taxonomy }
}
