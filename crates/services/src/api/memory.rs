use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use qbank_core::model::{CategoryId, Level, ParentPath, QuestionTree, is_general};

use crate::api::TaxonomyBackend;
use crate::error::ApiError;

#[derive(Default)]
struct Inner {
    children: HashMap<ParentPath, Vec<CategoryId>>,
    failures: HashMap<ParentPath, String>,
    gates: HashMap<ParentPath, Arc<Notify>>,
    calls: Vec<(Level, ParentPath)>,
}

/// Taxonomy held in memory, for tests and offline previews.
///
/// Paths without registered children answer with an empty list. Every query
/// is recorded so callers can assert on request counts.
#[derive(Clone, Default)]
pub struct InMemoryTaxonomy {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTaxonomy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror a practice tree the way the backend derives its filter lists:
    /// the synthetic `General` subtopic is not offered.
    #[must_use]
    pub fn from_tree(tree: &QuestionTree) -> Self {
        let taxonomy = Self::new();
        let root = ParentPath::root();
        taxonomy.set_children(&root, tree.subjects().cloned());
        for subject in tree.subjects() {
            let Some(subject_path) = root.child(subject.clone()) else {
                continue;
            };
            taxonomy.set_children(&subject_path, tree.topics(subject).cloned());
            for topic in tree.topics(subject) {
                let Some(topic_path) = subject_path.child(topic.clone()) else {
                    continue;
                };
                taxonomy.set_children(
                    &topic_path,
                    tree.subtopics(subject, topic)
                        .map(|(name, _)| name)
                        .filter(|name| !is_general(name))
                        .cloned(),
                );
            }
        }
        taxonomy
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_children(&self, parent: &ParentPath, children: impl IntoIterator<Item = CategoryId>) {
        self.lock()
            .children
            .insert(parent.clone(), children.into_iter().collect());
    }

    /// Make queries beneath `parent` fail with an application error.
    pub fn fail(&self, parent: &ParentPath, message: impl Into<String>) {
        self.lock().failures.insert(parent.clone(), message.into());
    }

    pub fn clear_failure(&self, parent: &ParentPath) {
        self.lock().failures.remove(parent);
    }

    /// Hold queries beneath `parent` until the returned handle is notified
    /// (one `notify_one` releases one query). Never notifying simulates a
    /// backend that does not answer.
    #[must_use]
    pub fn hold(&self, parent: &ParentPath) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(parent.clone(), Arc::clone(&gate));
        gate
    }

    #[must_use]
    pub fn calls(&self) -> Vec<(Level, ParentPath)> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }
}

#[async_trait]
impl TaxonomyBackend for InMemoryTaxonomy {
    async fn query_children(
        &self,
        level: Level,
        parent: &ParentPath,
    ) -> Result<Vec<CategoryId>, ApiError> {
        let gate = {
            let mut inner = self.lock();
            inner.calls.push((level, parent.clone()));
            inner.gates.get(parent).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let inner = self.lock();
        if let Some(message) = inner.failures.get(parent) {
            return Err(ApiError::Application(message.clone()));
        }
        Ok(inner.children.get(parent).cloned().unwrap_or_default())
    }
}
