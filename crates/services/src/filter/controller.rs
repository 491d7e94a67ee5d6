use std::collections::{BTreeMap, BTreeSet};
use std::iter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;

use qbank_core::model::{AvailableOptions, CategoryId, Level, ParentPath, SelectionSet};

use crate::api::TaxonomyBackend;
use crate::error::{ApiError, ParentFailure, RefreshError};
use crate::filter::observer::FilterObserver;

/// How a refresh ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New options were published for `level` (and the cascade below it ran).
    Published { level: Level, generation: u64 },
    /// Nothing was selected above `level`; it and every deeper level were
    /// emptied without contacting the backend.
    Cleared { level: Level },
    /// A newer refresh of `level` started while this one was in flight, so
    /// its results were dropped.
    Superseded { level: Level },
    /// The deepest level has no children to refresh.
    Leaf,
}

/// Options and selection of one level at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub options: AvailableOptions,
    pub selection: SelectionSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSnapshot {
    levels: [LevelSnapshot; 3],
}

impl FilterSnapshot {
    #[must_use]
    pub fn level(&self, level: Level) -> &LevelSnapshot {
        &self.levels[level.depth()]
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Default)]
struct LevelState {
    selection: SelectionSet,
    options: AvailableOptions,
    /// Which parent paths produced each offered id. Needed to build the
    /// ancestor chain of the next level's queries.
    provenance: BTreeMap<CategoryId, BTreeSet<ParentPath>>,
    generation: u64,
}

#[derive(Debug, Default)]
struct FilterState {
    levels: [LevelState; 3],
}

impl FilterState {
    fn level(&self, level: Level) -> &LevelState {
        &self.levels[level.depth()]
    }

    fn level_mut(&mut self, level: Level) -> &mut LevelState {
        &mut self.levels[level.depth()]
    }

    /// Marks a new refresh of `level`. Deeper levels are bumped too, so any
    /// refresh still running below is invalidated.
    fn begin(&mut self, level: Level) -> u64 {
        for affected in iter::once(level).chain(level.descendants()) {
            self.level_mut(affected).generation += 1;
        }
        self.level(level).generation
    }

    /// Queries needed to refresh `level` from the current selection above it.
    fn parent_paths(&self, level: Level) -> Vec<ParentPath> {
        let Some(parent_level) = level.parent() else {
            return vec![ParentPath::root()];
        };
        let parent = self.level(parent_level);
        let mut paths = Vec::new();
        for id in parent.selection.iter() {
            if parent_level == Level::Subject {
                paths.extend(ParentPath::root().child(id.clone()));
            } else if let Some(bases) = parent.provenance.get(id) {
                paths.extend(bases.iter().filter_map(|base| base.child(id.clone())));
            }
        }
        paths
    }

    /// Empties `level` and everything below it. Returns the levels touched.
    fn clear_from(&mut self, level: Level) -> Vec<Level> {
        let levels: Vec<Level> = iter::once(level).chain(level.descendants()).collect();
        for affected in &levels {
            let state = self.level_mut(*affected);
            state.options = AvailableOptions::empty();
            state.selection.clear();
            state.provenance.clear();
        }
        levels
    }

    fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            levels: Level::ALL.map(|level| {
                let state = self.level(level);
                LevelSnapshot {
                    options: state.options.clone(),
                    selection: state.selection.clone(),
                }
            }),
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Keeps the subject → topic → subtopic filter lists consistent with the
/// selections above them.
///
/// Every refresh is tagged with a per-level generation. Results are only
/// published while their generation is still current, so a slow response
/// can never overwrite the outcome of a newer selection. A refresh that
/// fails for any parent publishes nothing: the level keeps its last good
/// options, the observer is told about the failure, and the levels below
/// are still rebuilt from what the failed level kept.
pub struct FilterController {
    backend: Arc<dyn TaxonomyBackend>,
    observer: Arc<dyn FilterObserver>,
    request_timeout: Duration,
    state: Mutex<FilterState>,
}

type QueryResult = (ParentPath, Result<Vec<CategoryId>, ApiError>);

impl FilterController {
    #[must_use]
    pub fn new(
        backend: Arc<dyn TaxonomyBackend>,
        observer: Arc<dyn FilterObserver>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            observer,
            request_timeout,
            state: Mutex::new(FilterState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FilterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the subject list, then cascade into topics and subtopics for
    /// whatever is still selected.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` when any query of the cascade fails.
    pub async fn load_roots(&self) -> Result<RefreshOutcome, RefreshError> {
        self.cascade_from(Level::Subject).await
    }

    /// Replace the selection at `level` and refresh the levels below it.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` when a dependent refresh fails. The new
    /// selection is kept either way.
    pub async fn set_selection(
        &self,
        level: Level,
        ids: impl IntoIterator<Item = CategoryId>,
    ) -> Result<RefreshOutcome, RefreshError> {
        let selection: SelectionSet = ids.into_iter().collect();
        tracing::debug!(%level, selected = selection.len(), "selection changed");
        self.lock().level_mut(level).selection = selection;
        self.refresh_children(level).await
    }

    /// Flip one id at `level` and refresh the levels below it.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` when a dependent refresh fails.
    pub async fn toggle(
        &self,
        level: Level,
        id: CategoryId,
    ) -> Result<RefreshOutcome, RefreshError> {
        let selected = self.lock().level_mut(level).selection.toggle(id.clone());
        tracing::debug!(%level, %id, selected, "selection toggled");
        self.refresh_children(level).await
    }

    /// Recompute the options of the level below `parent_level` from its
    /// current selection, cascading further down after each publish.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` when any query of the cascade fails.
    pub async fn refresh_children(
        &self,
        parent_level: Level,
    ) -> Result<RefreshOutcome, RefreshError> {
        match parent_level.child() {
            Some(level) => self.cascade_from(level).await,
            None => Ok(RefreshOutcome::Leaf),
        }
    }

    #[must_use]
    pub fn current_selection(&self, level: Level) -> SelectionSet {
        self.lock().level(level).selection.clone()
    }

    #[must_use]
    pub fn available_options(&self, level: Level) -> AvailableOptions {
        self.lock().level(level).options.clone()
    }

    /// Generation of the latest refresh started for `level`.
    #[must_use]
    pub fn generation(&self, level: Level) -> u64 {
        self.lock().level(level).generation
    }

    #[must_use]
    pub fn snapshot(&self) -> FilterSnapshot {
        self.lock().snapshot()
    }

    /// Refreshes `start` and the levels below it. A failed level keeps its
    /// last good state and the levels below are rebuilt from it. The first
    /// error is returned.
    async fn cascade_from(&self, start: Level) -> Result<RefreshOutcome, RefreshError> {
        let mut first_outcome = None;
        let mut first_error = None;
        let mut current = Some(start);
        while let Some(level) = current {
            current = match self.refresh_level(level).await {
                Ok(outcome) => {
                    first_outcome.get_or_insert(outcome);
                    match outcome {
                        RefreshOutcome::Published { .. } => level.child(),
                        _ => None,
                    }
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                    level.child()
                }
            };
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(first_outcome.unwrap_or(RefreshOutcome::Leaf)),
        }
    }

    async fn refresh_level(&self, level: Level) -> Result<RefreshOutcome, RefreshError> {
        let (generation, parents) = {
            let mut state = self.lock();
            let generation = state.begin(level);
            (generation, state.parent_paths(level))
        };

        if parents.is_empty() {
            let cleared = self.lock().clear_from(level);
            tracing::debug!(%level, generation, "no parents selected, clearing");
            for affected in cleared {
                self.observer.on_available_options_changed(affected, &[]);
            }
            return Ok(RefreshOutcome::Cleared { level });
        }

        let attempted = parents.len();
        tracing::debug!(%level, generation, requests = attempted, "refreshing options");
        let results = join_all(parents.into_iter().map(|parent| self.query(level, parent))).await;
        self.settle(level, generation, attempted, results)
    }

    async fn query(&self, level: Level, parent: ParentPath) -> QueryResult {
        let request = self.backend.query_children(level, &parent);
        let result = match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout),
        };
        (parent, result)
    }

    fn settle(
        &self,
        level: Level,
        generation: u64,
        attempted: usize,
        results: Vec<QueryResult>,
    ) -> Result<RefreshOutcome, RefreshError> {
        let mut merged: BTreeMap<CategoryId, BTreeSet<ParentPath>> = BTreeMap::new();
        let mut failures = Vec::new();
        for (parent, result) in results {
            match result {
                Ok(children) => {
                    for child in children {
                        merged.entry(child).or_default().insert(parent.clone());
                    }
                }
                Err(error) => failures.push(ParentFailure { parent, error }),
            }
        }

        let published = {
            let mut state = self.lock();
            if state.level(level).generation != generation {
                tracing::debug!(%level, generation, "dropping superseded refresh");
                return Ok(RefreshOutcome::Superseded { level });
            }
            if failures.is_empty() {
                let options = AvailableOptions::from_unsorted(merged.keys().cloned());
                let entry = state.level_mut(level);
                let pruned = entry.selection.retain_offered(&options);
                entry.options = options.clone();
                entry.provenance = merged;
                Some((options, pruned))
            } else {
                None
            }
        };

        match published {
            Some((options, pruned)) => {
                tracing::info!(%level, generation, options = options.len(), pruned, "options published");
                self.observer
                    .on_available_options_changed(level, options.as_slice());
                Ok(RefreshOutcome::Published { level, generation })
            }
            None => {
                let err = RefreshError {
                    level,
                    attempted,
                    failures,
                };
                let message = err.message();
                tracing::warn!(%level, generation, failed = err.failures.len(), %message, "refresh failed");
                self.observer.on_refresh_failed(level, &message);
                Err(err)
            }
        }
    }
}
