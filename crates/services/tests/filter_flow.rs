use std::sync::Arc;
use std::time::Duration;

use qbank_core::model::{CategoryId, Level, ParentPath};
use services::{
    ApiError, FilterController, FilterEvent, FilterEventLog, FilterObserver, InMemoryTaxonomy,
    RefreshOutcome,
};

fn id(name: &str) -> CategoryId {
    CategoryId::new(name).unwrap()
}

fn ids(names: &[&str]) -> Vec<CategoryId> {
    names.iter().map(|name| id(name)).collect()
}

fn path(names: &[&str]) -> ParentPath {
    names
        .iter()
        .fold(ParentPath::root(), |path, name| path.child(id(name)).unwrap())
}

fn school_taxonomy() -> InMemoryTaxonomy {
    let taxonomy = InMemoryTaxonomy::new();
    taxonomy.set_children(&ParentPath::root(), ids(&["Math", "Physics"]));
    taxonomy.set_children(&path(&["Math"]), ids(&["Algebra", "Geometry"]));
    taxonomy.set_children(&path(&["Physics"]), ids(&["Mechanics", "Algebra"]));
    taxonomy.set_children(&path(&["Math", "Algebra"]), ids(&["Linear"]));
    taxonomy.set_children(&path(&["Physics", "Algebra"]), ids(&["Vectors"]));
    taxonomy.set_children(&path(&["Physics", "Mechanics"]), ids(&["Kinematics"]));
    taxonomy
}

fn controller_for(taxonomy: &InMemoryTaxonomy) -> (FilterController, Arc<FilterEventLog>) {
    let log = Arc::new(FilterEventLog::new());
    let controller = FilterController::new(
        Arc::new(taxonomy.clone()),
        Arc::clone(&log) as Arc<dyn FilterObserver>,
        Duration::from_secs(2),
    );
    (controller, log)
}

#[tokio::test]
async fn topics_are_the_sorted_union_of_every_selected_subject() {
    let taxonomy = school_taxonomy();
    let (controller, log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    assert_eq!(
        controller.available_options(Level::Subject).as_slice(),
        ids(&["Math", "Physics"])
    );

    let outcome = controller
        .set_selection(Level::Subject, ids(&["Math", "Physics"]))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        RefreshOutcome::Published {
            level: Level::Topic,
            ..
        }
    ));
    assert_eq!(
        controller.available_options(Level::Topic).as_slice(),
        ids(&["Algebra", "Geometry", "Mechanics"])
    );
    assert_eq!(
        log.published(Level::Topic).last(),
        Some(&ids(&["Algebra", "Geometry", "Mechanics"]))
    );
}

#[tokio::test]
async fn shared_topic_queries_subtopics_under_each_subject() {
    let taxonomy = school_taxonomy();
    let (controller, _log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    controller
        .set_selection(Level::Subject, ids(&["Math", "Physics"]))
        .await
        .unwrap();
    controller
        .set_selection(Level::Topic, ids(&["Algebra"]))
        .await
        .unwrap();

    let subtopic_calls: Vec<ParentPath> = taxonomy
        .calls()
        .into_iter()
        .filter(|(level, _)| *level == Level::Subtopic)
        .map(|(_, parent)| parent)
        .collect();
    assert_eq!(
        subtopic_calls,
        vec![path(&["Math", "Algebra"]), path(&["Physics", "Algebra"])]
    );
    assert_eq!(
        controller.available_options(Level::Subtopic).as_slice(),
        ids(&["Linear", "Vectors"])
    );
}

#[tokio::test]
async fn deselecting_the_last_subject_clears_without_backend_calls() {
    let taxonomy = school_taxonomy();
    let (controller, log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    controller
        .set_selection(Level::Subject, ids(&["Math"]))
        .await
        .unwrap();
    controller
        .set_selection(Level::Topic, ids(&["Algebra"]))
        .await
        .unwrap();
    assert!(!controller.available_options(Level::Subtopic).is_empty());
    log.drain();
    let calls_before = taxonomy.call_count();

    let outcome = controller.toggle(Level::Subject, id("Math")).await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Cleared { level: Level::Topic });
    assert_eq!(taxonomy.call_count(), calls_before);
    let snapshot = controller.snapshot();
    for level in [Level::Topic, Level::Subtopic] {
        assert!(snapshot.level(level).options.is_empty());
        assert!(snapshot.level(level).selection.is_empty());
    }
    assert_eq!(
        log.drain(),
        vec![
            FilterEvent::OptionsChanged {
                level: Level::Topic,
                options: Vec::new()
            },
            FilterEvent::OptionsChanged {
                level: Level::Subtopic,
                options: Vec::new()
            },
        ]
    );
}

#[tokio::test]
async fn repeating_a_selection_does_not_accumulate() {
    let taxonomy = school_taxonomy();
    let (controller, _log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();

    controller
        .set_selection(Level::Subject, ids(&["Physics"]))
        .await
        .unwrap();
    let once = controller.available_options(Level::Topic);
    controller
        .set_selection(Level::Subject, ids(&["Physics"]))
        .await
        .unwrap();

    assert_eq!(controller.available_options(Level::Topic), once);
    assert_eq!(once.as_slice(), ids(&["Algebra", "Mechanics"]));
}

#[tokio::test]
async fn removed_parent_prunes_dependent_selection() {
    let taxonomy = school_taxonomy();
    let (controller, _log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    controller
        .set_selection(Level::Subject, ids(&["Math", "Physics"]))
        .await
        .unwrap();
    controller
        .set_selection(Level::Topic, ids(&["Geometry", "Mechanics"]))
        .await
        .unwrap();

    controller
        .set_selection(Level::Subject, ids(&["Physics"]))
        .await
        .unwrap();

    assert_eq!(
        controller.current_selection(Level::Topic).to_vec(),
        ids(&["Mechanics"])
    );
    assert_eq!(
        controller.available_options(Level::Subtopic).as_slice(),
        ids(&["Kinematics"])
    );
}

#[tokio::test]
async fn failed_refresh_keeps_last_known_good_options() {
    let taxonomy = school_taxonomy();
    let (controller, log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    controller
        .set_selection(Level::Subject, ids(&["Math"]))
        .await
        .unwrap();
    let before = controller.snapshot();

    taxonomy.fail(&path(&["Math"]), "database is locked");
    let err = controller
        .refresh_children(Level::Subject)
        .await
        .unwrap_err();

    assert_eq!(err.level, Level::Topic);
    assert_eq!(err.attempted, 1);
    assert!(matches!(&err.failures[0].error, ApiError::Application(message) if message == "database is locked"));
    assert_eq!(controller.snapshot(), before);
    let failures = log.failures(Level::Topic);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("/Math"), "{}", failures[0]);
}

#[tokio::test]
async fn failed_refresh_still_rebuilds_levels_below() {
    let taxonomy = school_taxonomy();
    taxonomy.set_children(&path(&["Math", "Geometry"]), ids(&["Circles"]));
    let (controller, log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    controller
        .set_selection(Level::Subject, ids(&["Math"]))
        .await
        .unwrap();
    controller
        .set_selection(Level::Topic, ids(&["Algebra"]))
        .await
        .unwrap();
    assert_eq!(controller.available_options(Level::Subtopic).as_slice(), ids(&["Linear"]));

    let geometry_gate = taxonomy.hold(&path(&["Math", "Geometry"]));
    taxonomy.fail(&path(&["Math"]), "database is locked");
    let (widened, failed, ()) = tokio::join!(
        controller.set_selection(Level::Topic, ids(&["Algebra", "Geometry"])),
        controller.refresh_children(Level::Subject),
        async {
            tokio::task::yield_now().await;
            geometry_gate.notify_waiters();
        },
    );

    assert_eq!(
        widened.unwrap(),
        RefreshOutcome::Superseded { level: Level::Subtopic }
    );
    assert_eq!(failed.unwrap_err().level, Level::Topic);
    assert_eq!(
        controller.available_options(Level::Topic).as_slice(),
        ids(&["Algebra", "Geometry"])
    );
    assert_eq!(
        controller.available_options(Level::Subtopic).as_slice(),
        ids(&["Circles", "Linear"])
    );
    assert_eq!(
        log.published(Level::Subtopic).last(),
        Some(&ids(&["Circles", "Linear"]))
    );
    assert_eq!(log.failures(Level::Topic).len(), 1);
}

#[tokio::test]
async fn first_load_failure_leaves_options_empty() {
    let taxonomy = school_taxonomy();
    taxonomy.fail(&path(&["Physics"]), "boom");
    let (controller, log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();

    let err = controller
        .set_selection(Level::Subject, ids(&["Math", "Physics"]))
        .await
        .unwrap_err();

    assert_eq!(err.attempted, 2);
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].parent, path(&["Physics"]));
    assert!(controller.available_options(Level::Topic).is_empty());
    assert_eq!(log.failures(Level::Topic).len(), 1);
}

#[tokio::test]
async fn stale_refresh_arriving_last_is_discarded() {
    let taxonomy = school_taxonomy();
    let (controller, log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    let math_gate = taxonomy.hold(&path(&["Math"]));

    let (stale, fresh, ()) = tokio::join!(
        controller.set_selection(Level::Subject, ids(&["Math"])),
        controller.set_selection(Level::Subject, ids(&["Physics"])),
        async {
            tokio::task::yield_now().await;
            math_gate.notify_one();
        },
    );

    assert_eq!(
        stale.unwrap(),
        RefreshOutcome::Superseded { level: Level::Topic }
    );
    assert!(matches!(
        fresh.unwrap(),
        RefreshOutcome::Published {
            level: Level::Topic,
            ..
        }
    ));
    assert_eq!(
        controller.available_options(Level::Topic).as_slice(),
        ids(&["Algebra", "Mechanics"])
    );
    assert!(
        !log.published(Level::Topic)
            .contains(&ids(&["Algebra", "Geometry"]))
    );
}

#[tokio::test]
async fn stale_refresh_arriving_first_is_discarded() {
    let taxonomy = school_taxonomy();
    let (controller, _log) = controller_for(&taxonomy);
    controller.load_roots().await.unwrap();
    let math_gate = taxonomy.hold(&path(&["Math"]));
    let physics_gate = taxonomy.hold(&path(&["Physics"]));

    let (stale, fresh, ()) = tokio::join!(
        controller.set_selection(Level::Subject, ids(&["Math"])),
        controller.set_selection(Level::Subject, ids(&["Physics"])),
        async {
            tokio::task::yield_now().await;
            math_gate.notify_one();
            tokio::task::yield_now().await;
            physics_gate.notify_one();
        },
    );

    assert_eq!(
        stale.unwrap(),
        RefreshOutcome::Superseded { level: Level::Topic }
    );
    assert!(fresh.is_ok());
    assert_eq!(
        controller.available_options(Level::Topic).as_slice(),
        ids(&["Algebra", "Mechanics"])
    );
}
