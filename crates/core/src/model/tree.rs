use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::taxonomy::CategoryId;

/// Subtopic bucket for questions filed directly under a topic.
pub const GENERAL_SUBTOPIC: &str = "General";

type Subtopics = BTreeMap<CategoryId, u32>;
type Topics = BTreeMap<CategoryId, Subtopics>;

/// Read-only snapshot of subject → topic → subtopic question counts.
///
/// Names are kept exactly as the backend sends them. An empty subtopic key
/// counts toward the general bucket; empty subject or topic keys are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionTree(BTreeMap<CategoryId, Topics>);

type RawTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, u32>>>;

impl<'de> Deserialize<'de> for QuestionTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTree::deserialize(deserializer)?;
        let mut tree = QuestionTree::default();
        for (subject, topics) in raw {
            let Ok(subject) = CategoryId::new(subject) else {
                continue;
            };
            for (topic, subtopics) in topics {
                let Ok(topic) = CategoryId::new(topic) else {
                    continue;
                };
                for (subtopic, count) in subtopics {
                    let subtopic = CategoryId::new(subtopic).ok();
                    tree.add(subject.clone(), topic.clone(), subtopic, count);
                }
            }
        }
        Ok(tree)
    }
}

impl QuestionTree {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &CategoryId> {
        self.0.keys()
    }

    pub fn topics(&self, subject: &CategoryId) -> impl Iterator<Item = &CategoryId> {
        self.0.get(subject).into_iter().flat_map(BTreeMap::keys)
    }

    pub fn subtopics(
        &self,
        subject: &CategoryId,
        topic: &CategoryId,
    ) -> impl Iterator<Item = (&CategoryId, u32)> {
        self.0
            .get(subject)
            .and_then(|topics| topics.get(topic))
            .into_iter()
            .flat_map(|subtopics| subtopics.iter().map(|(name, count)| (name, *count)))
    }

    #[must_use]
    pub fn topic_total(&self, subject: &CategoryId, topic: &CategoryId) -> u32 {
        self.subtopics(subject, topic).map(|(_, count)| count).sum()
    }

    #[must_use]
    pub fn subject_total(&self, subject: &CategoryId) -> u32 {
        self.topics(subject)
            .map(|topic| self.topic_total(subject, topic))
            .sum()
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.subjects()
            .map(|subject| self.subject_total(subject))
            .sum()
    }

    /// Insert or replace a count. Used to build snapshots locally.
    pub fn insert(
        &mut self,
        subject: CategoryId,
        topic: CategoryId,
        subtopic: Option<CategoryId>,
        count: u32,
    ) {
        let subtopic = subtopic.unwrap_or_else(|| CategoryId::from_static(GENERAL_SUBTOPIC));
        self.0
            .entry(subject)
            .or_default()
            .entry(topic)
            .or_default()
            .insert(subtopic, count);
    }

    fn add(
        &mut self,
        subject: CategoryId,
        topic: CategoryId,
        subtopic: Option<CategoryId>,
        count: u32,
    ) {
        let subtopic = subtopic.unwrap_or_else(|| CategoryId::from_static(GENERAL_SUBTOPIC));
        let slot = self
            .0
            .entry(subject)
            .or_default()
            .entry(topic)
            .or_default()
            .entry(subtopic)
            .or_default();
        *slot = slot.saturating_add(count);
    }
}

/// Whether `subtopic` is the synthetic bucket for un-subtopiced questions.
#[must_use]
pub fn is_general(subtopic: &CategoryId) -> bool {
    subtopic.as_str() == GENERAL_SUBTOPIC
}
