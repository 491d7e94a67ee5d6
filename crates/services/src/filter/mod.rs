//! Cascading subject → topic → subtopic selection.

mod controller;
mod observer;

pub use controller::{FilterController, FilterSnapshot, LevelSnapshot, RefreshOutcome};
pub use observer::{FilterEvent, FilterEventLog, FilterObserver, NoopObserver};
