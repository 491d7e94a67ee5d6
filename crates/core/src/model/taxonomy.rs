use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// A rung in the fixed three-level taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Subject,
    Topic,
    Subtopic,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Subject, Level::Topic, Level::Subtopic];

    /// Zero-based depth of the level (subject is the root).
    #[must_use]
    pub fn depth(self) -> usize {
        match self {
            Level::Subject => 0,
            Level::Topic => 1,
            Level::Subtopic => 2,
        }
    }

    #[must_use]
    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth).copied()
    }

    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.depth().checked_sub(1).and_then(Self::from_depth)
    }

    #[must_use]
    pub fn child(self) -> Option<Self> {
        Self::from_depth(self.depth() + 1)
    }

    /// Levels strictly below this one, nearest first.
    pub fn descendants(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().skip(self.depth() + 1)
    }

    /// Query parameter name used when this level appears in a parent path.
    #[must_use]
    pub fn query_key(self) -> &'static str {
        match self {
            Level::Subject => "subject",
            Level::Topic => "topic",
            Level::Subtopic => "subtopic",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Level::Subject => "Subject",
            Level::Topic => "Topic",
            Level::Subtopic => "Subtopic",
        }
    }

    #[must_use]
    pub fn plural_label(self) -> &'static str {
        match self {
            Level::Subject => "Subjects",
            Level::Topic => "Topics",
            Level::Subtopic => "Subtopics",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── CATEGORY ID ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category name cannot be empty")]
    EmptyName,
}

/// Backend category identifier, kept byte-for-byte as received. Only the
/// empty string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a validated category identifier.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` if the name is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, CategoryError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        Ok(Self(value))
    }

    /// For compile-time constants known to be non-empty.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryId {
    type Error = CategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── PARENT PATH ───────────────────────────────────────────────────────────────
//

/// Ancestor chain sent with a children query: empty for subjects, the
/// subject for topics, subject and topic for subtopics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParentPath(Vec<CategoryId>);

impl ParentPath {
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Extends the path by one level. Returns `None` once the path already
    /// reaches the deepest level.
    #[must_use]
    pub fn child(&self, id: CategoryId) -> Option<Self> {
        if self.0.len() >= Level::ALL.len() - 1 {
            return None;
        }
        let mut ids = self.0.clone();
        ids.push(id);
        Some(Self(ids))
    }

    /// Level of the identifiers a query with this path returns.
    #[must_use]
    pub fn children_level(&self) -> Level {
        Level::from_depth(self.0.len()).unwrap_or(Level::Subtopic)
    }

    /// The last (nearest) ancestor, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&CategoryId> {
        self.0.last()
    }

    #[must_use]
    pub fn ids(&self) -> &[CategoryId] {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// `(key, value)` pairs for the query string, root first.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Level::ALL
            .into_iter()
            .zip(self.0.iter())
            .map(|(level, id)| (level.query_key(), id.as_str()))
    }
}

impl fmt::Display for ParentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for id in &self.0 {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

//
// ─── SELECTION / OPTIONS ───────────────────────────────────────────────────────
//

/// The identifiers currently chosen at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet(BTreeSet<CategoryId>);

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryId> {
        self.0.iter()
    }

    /// Adds or removes `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: CategoryId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    /// Drops every identifier that is no longer offered. Returns `true` when
    /// anything was removed.
    pub fn retain_offered(&mut self, options: &AvailableOptions) -> bool {
        let before = self.0.len();
        self.0.retain(|id| options.contains(id));
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<CategoryId> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<CategoryId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = CategoryId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Deduplicated, lexicographically sorted identifiers offered at a level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableOptions(Vec<CategoryId>);

impl AvailableOptions {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_unsorted(ids: impl IntoIterator<Item = CategoryId>) -> Self {
        let set: BTreeSet<CategoryId> = ids.into_iter().collect();
        Self(set.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.0.binary_search(id).is_ok()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CategoryId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryId> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> CategoryId {
        CategoryId::new(name).unwrap()
    }

    #[test]
    fn level_navigation() {
        assert_eq!(Level::Subject.parent(), None);
        assert_eq!(Level::Subject.child(), Some(Level::Topic));
        assert_eq!(Level::Topic.child(), Some(Level::Subtopic));
        assert_eq!(Level::Subtopic.child(), None);
        assert_eq!(Level::Subtopic.parent(), Some(Level::Topic));
        let below: Vec<_> = Level::Subject.descendants().collect();
        assert_eq!(below, vec![Level::Topic, Level::Subtopic]);
        assert_eq!(Level::Subtopic.descendants().count(), 0);
    }

    #[test]
    fn category_id_keeps_backend_text_verbatim() {
        assert_eq!(id("Math ").as_str(), "Math ");
        assert_ne!(id("Math "), id("Math"));
        assert_eq!(id(" ").as_str(), " ");
        assert_eq!(CategoryId::new(""), Err(CategoryError::EmptyName));
    }

    #[test]
    fn parent_path_echoes_padded_names() {
        let path = ParentPath::root()
            .child(id("Math "))
            .and_then(|p| p.child(id(" Algebra")))
            .unwrap();
        let pairs: Vec<_> = path.query_pairs().collect();
        assert_eq!(pairs, vec![("subject", "Math "), ("topic", " Algebra")]);
    }

    #[test]
    fn category_id_deserialization_validates() {
        let ok: CategoryId = serde_json::from_str("\"Algebra\"").unwrap();
        assert_eq!(ok.as_str(), "Algebra");
        assert!(serde_json::from_str::<CategoryId>("\"\"").is_err());
    }

    #[test]
    fn parent_path_builds_query_pairs() {
        let path = ParentPath::root()
            .child(id("Math"))
            .and_then(|p| p.child(id("Algebra")))
            .unwrap();
        assert_eq!(path.children_level(), Level::Subtopic);
        let pairs: Vec<_> = path.query_pairs().collect();
        assert_eq!(pairs, vec![("subject", "Math"), ("topic", "Algebra")]);
        assert_eq!(path.to_string(), "/Math/Algebra");
        assert!(path.child(id("Linear")).is_none());
    }

    #[test]
    fn root_path_queries_subjects() {
        let root = ParentPath::root();
        assert!(root.is_root());
        assert_eq!(root.children_level(), Level::Subject);
        assert_eq!(root.query_pairs().count(), 0);
    }

    #[test]
    fn available_options_sort_and_dedup() {
        let options =
            AvailableOptions::from_unsorted([id("Mechanics"), id("Algebra"), id("Algebra")]);
        let names: Vec<_> = options.iter().map(CategoryId::as_str).collect();
        assert_eq!(names, vec!["Algebra", "Mechanics"]);
        assert!(options.contains(&id("Mechanics")));
        assert!(!options.contains(&id("Geometry")));
    }

    #[test]
    fn selection_retains_only_offered_ids() {
        let mut selection: SelectionSet = [id("Algebra"), id("Optics")].into_iter().collect();
        let options = AvailableOptions::from_unsorted([id("Algebra"), id("Geometry")]);
        assert!(selection.retain_offered(&options));
        assert_eq!(selection.to_vec(), vec![id("Algebra")]);
        assert!(!selection.retain_offered(&options));
    }

    #[test]
    fn selection_toggle() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle(id("Math")));
        assert!(selection.contains(&id("Math")));
        assert!(!selection.toggle(id("Math")));
        assert!(selection.is_empty());
    }
}
