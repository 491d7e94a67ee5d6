use qbank_core::model::{CategoryId, Level};
use services::{FilterEvent, FilterSnapshot};

/// Last refresh failure per level, cleared once the level publishes again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterErrors {
    by_level: [Option<String>; 3],
}

impl FilterErrors {
    pub fn apply(&mut self, events: impl IntoIterator<Item = FilterEvent>) {
        for event in events {
            match event {
                FilterEvent::OptionsChanged { level, .. } => {
                    self.by_level[level.depth()] = None;
                }
                FilterEvent::RefreshFailed { level, message } => {
                    self.by_level[level.depth()] = Some(message);
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, level: Level) -> Option<&str> {
        self.by_level[level.depth()].as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_level.iter().all(Option::is_none)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOptionVm {
    pub id: CategoryId,
    pub label: String,
    pub checked: bool,
    /// Stable element id so labels can target their checkbox.
    pub input_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterLevelVm {
    pub level: Level,
    pub title: &'static str,
    pub options: Vec<FilterOptionVm>,
    pub selected_label: String,
    pub empty_hint: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterPanelVm {
    pub levels: Vec<FilterLevelVm>,
}

impl FilterPanelVm {
    #[must_use]
    pub fn level(&self, level: Level) -> Option<&FilterLevelVm> {
        self.levels.iter().find(|vm| vm.level == level)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.levels.iter().any(|vm| vm.error.is_some())
    }
}

#[must_use]
pub fn map_filter_panel(snapshot: &FilterSnapshot, errors: &FilterErrors) -> FilterPanelVm {
    let levels = Level::ALL
        .into_iter()
        .map(|level| map_filter_level(snapshot, errors, level))
        .collect();
    FilterPanelVm { levels }
}

fn map_filter_level(snapshot: &FilterSnapshot, errors: &FilterErrors, level: Level) -> FilterLevelVm {
    let state = snapshot.level(level);
    let options = state
        .options
        .iter()
        .map(|id| FilterOptionVm {
            id: id.clone(),
            label: id.to_string(),
            checked: state.selection.contains(id),
            input_id: input_id(level, id),
        })
        .collect::<Vec<_>>();

    let empty_hint = if !options.is_empty() {
        None
    } else {
        let waiting_on_parent = level
            .parent()
            .is_some_and(|parent| snapshot.level(parent).selection.is_empty());
        Some(match level.parent() {
            Some(parent) if waiting_on_parent => {
                format!("Select a {} first.", parent.label().to_lowercase())
            }
            _ => format!("No {} available.", level.plural_label().to_lowercase()),
        })
    };

    let selected_label = match state.selection.len() {
        0 => "All".to_string(),
        count => format!("{count} selected"),
    };

    FilterLevelVm {
        level,
        title: level.plural_label(),
        options,
        selected_label,
        empty_hint,
        error: errors.get(level).map(str::to_string),
    }
}

/// ASCII letters and digits are kept as is; every other byte becomes `_xx`
/// (lowercase hex), so distinct names never share an id.
fn input_id(level: Level, id: &CategoryId) -> String {
    let mut encoded = format!("filter-{}-", level.query_key());
    for byte in id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("_{byte:02x}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use qbank_core::model::ParentPath;
    use services::{FilterController, FilterEventLog, FilterObserver, InMemoryTaxonomy};

    fn id(name: &str) -> CategoryId {
        CategoryId::new(name).unwrap()
    }

    async fn loaded_snapshot() -> (FilterSnapshot, Arc<FilterEventLog>, InMemoryTaxonomy) {
        let taxonomy = InMemoryTaxonomy::new();
        let root = ParentPath::root();
        taxonomy.set_children(&root, [id("Computer Science"), id("Math")]);
        taxonomy.set_children(&root.child(id("Math")).unwrap(), [id("Algebra")]);
        let log = Arc::new(FilterEventLog::new());
        let controller = FilterController::new(
            Arc::new(taxonomy.clone()),
            Arc::clone(&log) as Arc<dyn FilterObserver>,
            Duration::from_secs(1),
        );
        controller.load_roots().await.unwrap();
        controller
            .set_selection(Level::Subject, [id("Math")])
            .await
            .unwrap();
        (controller.snapshot(), log, taxonomy)
    }

    #[tokio::test]
    async fn maps_checkboxes_with_selection() {
        let (snapshot, _, _) = loaded_snapshot().await;
        let panel = map_filter_panel(&snapshot, &FilterErrors::default());

        let subjects = panel.level(Level::Subject).unwrap();
        assert_eq!(subjects.title, "Subjects");
        assert_eq!(subjects.selected_label, "1 selected");
        let checked: Vec<_> = subjects
            .options
            .iter()
            .map(|option| (option.label.as_str(), option.checked))
            .collect();
        assert_eq!(checked, vec![("Computer Science", false), ("Math", true)]);
        assert_eq!(subjects.options[0].input_id, "filter-subject-Computer_20Science");

        let topics = panel.level(Level::Topic).unwrap();
        assert_eq!(topics.selected_label, "All");
        assert_eq!(topics.options.len(), 1);
        assert!(topics.empty_hint.is_none());
    }

    #[test]
    fn input_ids_never_collide() {
        let names = ["C++", "C--", "C  ", "Math", "math", "a_20", "a ", "Café"];
        let encoded: std::collections::BTreeSet<_> = names
            .iter()
            .map(|name| input_id(Level::Topic, &id(name)))
            .collect();
        assert_eq!(encoded.len(), names.len());
        assert_eq!(input_id(Level::Topic, &id("C++")), "filter-topic-C_2b_2b");
        assert_eq!(input_id(Level::Topic, &id("a_20")), "filter-topic-a_5f20");
        assert_eq!(input_id(Level::Topic, &id("Café")), "filter-topic-Caf_c3_a9");
    }

    #[tokio::test]
    async fn empty_level_explains_missing_parent() {
        let (snapshot, _, _) = loaded_snapshot().await;
        let panel = map_filter_panel(&snapshot, &FilterErrors::default());
        let subtopics = panel.level(Level::Subtopic).unwrap();
        assert_eq!(subtopics.empty_hint.as_deref(), Some("Select a topic first."));
    }

    #[test]
    fn failure_is_cleared_by_next_publish() {
        let mut errors = FilterErrors::default();
        errors.apply([FilterEvent::RefreshFailed {
            level: Level::Topic,
            message: "Could not load topics".into(),
        }]);
        assert_eq!(errors.get(Level::Topic), Some("Could not load topics"));
        assert!(errors.get(Level::Subject).is_none());

        errors.apply([FilterEvent::OptionsChanged {
            level: Level::Topic,
            options: Vec::new(),
        }]);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn failures_surface_on_their_level() {
        let (snapshot, log, _) = loaded_snapshot().await;
        let mut errors = FilterErrors::default();
        errors.apply(log.drain());
        errors.apply([FilterEvent::RefreshFailed {
            level: Level::Subtopic,
            message: "request timed out".into(),
        }]);
        let panel = map_filter_panel(&snapshot, &errors);
        assert!(panel.has_errors());
        assert_eq!(
            panel.level(Level::Subtopic).unwrap().error.as_deref(),
            Some("request timed out")
        );
    }
}
