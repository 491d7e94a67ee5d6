use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{HomeView, PaperBuilderView, PracticeView, QuestionFormView, QuestionsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/paper", PaperBuilderView)] PaperBuilder {},
        #[route("/practice", PracticeView)] Practice {},
        #[route("/questions", QuestionsView)] Questions {},
        #[route("/questions/new", QuestionFormView)] QuestionForm {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Question Bank" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: Route::PaperBuilder {}, "Build paper" } }
                li { Link { to: Route::Practice {}, "Practice" } }
                li { Link { to: Route::Questions {}, "Questions" } }
                li { Link { to: Route::QuestionForm {}, "Add question" } }
            }
        }
    }
}
