use std::sync::{Mutex, MutexGuard, PoisonError};

use qbank_core::model::{CategoryId, Level};

/// Receives the controller's published state. Implementations must be cheap:
/// callbacks run inline on the task that drove the refresh.
pub trait FilterObserver: Send + Sync {
    /// New options for `level`, sorted and deduplicated.
    fn on_available_options_changed(&self, level: Level, options: &[CategoryId]);

    /// A refresh for `level` failed; its previous options are still in place.
    fn on_refresh_failed(&self, level: Level, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FilterObserver for NoopObserver {
    fn on_available_options_changed(&self, _level: Level, _options: &[CategoryId]) {}

    fn on_refresh_failed(&self, _level: Level, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    OptionsChanged {
        level: Level,
        options: Vec<CategoryId>,
    },
    RefreshFailed {
        level: Level,
        message: String,
    },
}

/// Observer that keeps every event in arrival order until drained.
#[derive(Debug, Default)]
pub struct FilterEventLog {
    events: Mutex<Vec<FilterEvent>>,
}

impl FilterEventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FilterEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn events(&self) -> Vec<FilterEvent> {
        self.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<FilterEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Options published for `level`, oldest first.
    #[must_use]
    pub fn published(&self, level: Level) -> Vec<Vec<CategoryId>> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                FilterEvent::OptionsChanged { level: l, options } if *l == level => {
                    Some(options.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn failures(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                FilterEvent::RefreshFailed { level: l, message } if *l == level => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }
}

impl FilterObserver for FilterEventLog {
    fn on_available_options_changed(&self, level: Level, options: &[CategoryId]) {
        self.lock().push(FilterEvent::OptionsChanged {
            level,
            options: options.to_vec(),
        });
    }

    fn on_refresh_failed(&self, level: Level, message: &str) {
        self.lock().push(FilterEvent::RefreshFailed {
            level,
            message: message.to_string(),
        });
    }
}
