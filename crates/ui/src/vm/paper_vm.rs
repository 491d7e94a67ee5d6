use std::collections::BTreeSet;

use qbank_core::model::{
    BloomLevel, CategoryId, Difficulty, GeneratedPaper, Level, PaperCriteria, PaperCriteriaError,
    PaperQuestion, QuestionType,
};
use services::FilterSnapshot;

/// Raw paper form inputs as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperFormVm {
    pub total_questions: String,
    pub easy: String,
    pub medium: String,
    pub hard: String,
    pub max_time: String,
    pub question_types: BTreeSet<QuestionType>,
    pub bloom_levels: BTreeSet<BloomLevel>,
    pub include_ai_generated: bool,
    pub excluded_topics: BTreeSet<CategoryId>,
    pub excluded_subtopics: BTreeSet<CategoryId>,
}

impl Default for PaperFormVm {
    fn default() -> Self {
        Self {
            total_questions: "10".to_string(),
            easy: String::new(),
            medium: String::new(),
            hard: String::new(),
            max_time: String::new(),
            question_types: BTreeSet::new(),
            bloom_levels: BTreeSet::new(),
            include_ai_generated: true,
            excluded_topics: BTreeSet::new(),
            excluded_subtopics: BTreeSet::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperFormError {
    pub field: &'static str,
    pub message: String,
}

impl PaperFormVm {
    /// Build criteria from the form and the filter selection. Unselected
    /// filter levels stay empty, which the backend reads as "any".
    ///
    /// # Errors
    ///
    /// Returns the first field that does not parse or violates a quota rule.
    pub fn to_criteria(&self, filters: &FilterSnapshot) -> Result<PaperCriteria, PaperFormError> {
        let total = parse_count("total_questions", &self.total_questions)?.unwrap_or(0);
        let mut criteria = PaperCriteria::new(total);
        criteria.subjects = filters.level(Level::Subject).selection.to_vec();
        criteria.topics = filters.level(Level::Topic).selection.to_vec();
        criteria.subtopics = filters.level(Level::Subtopic).selection.to_vec();
        criteria.excluded_topics = offered_exclusions(filters, Level::Topic, &self.excluded_topics);
        criteria.excluded_subtopics =
            offered_exclusions(filters, Level::Subtopic, &self.excluded_subtopics);

        for (field, raw, difficulty) in [
            ("easy", &self.easy, Difficulty::Easy),
            ("medium", &self.medium, Difficulty::Medium),
            ("hard", &self.hard, Difficulty::Hard),
        ] {
            if let Some(count) = parse_count(field, raw)?.filter(|count| *count > 0) {
                criteria.difficulty_distribution.insert(difficulty, count);
            }
        }

        criteria.max_time = parse_count("max_time", &self.max_time)?;
        criteria.question_types = self.question_types.iter().copied().collect();
        criteria.bloom_levels = self.bloom_levels.iter().copied().collect();
        criteria.include_ai_generated = self.include_ai_generated;

        criteria.validate().map_err(|err| PaperFormError {
            field: match err {
                PaperCriteriaError::ZeroTimeLimit => "max_time",
                PaperCriteriaError::DistributionExceedsTotal { .. } => "distribution",
                _ => "total_questions",
            },
            message: err.to_string(),
        })?;
        Ok(criteria)
    }

    /// Exclusions only exist for topics and subtopics.
    #[must_use]
    pub fn excluded(&self, level: Level) -> Option<&BTreeSet<CategoryId>> {
        match level {
            Level::Topic => Some(&self.excluded_topics),
            Level::Subtopic => Some(&self.excluded_subtopics),
            Level::Subject => None,
        }
    }

    /// Flips the exclusion of `id`; returns whether it is now excluded.
    pub fn toggle_exclusion(&mut self, level: Level, id: CategoryId) -> bool {
        let set = match level {
            Level::Topic => &mut self.excluded_topics,
            Level::Subtopic => &mut self.excluded_subtopics,
            Level::Subject => return false,
        };
        if set.remove(&id) {
            false
        } else {
            set.insert(id);
            true
        }
    }
}

/// Exclusions still offered at `level` and not also selected there. Stale
/// ids left over from an earlier cascade are dropped.
fn offered_exclusions(
    filters: &FilterSnapshot,
    level: Level,
    excluded: &BTreeSet<CategoryId>,
) -> Vec<CategoryId> {
    let state = filters.level(level);
    excluded
        .iter()
        .filter(|id| state.options.contains(id) && !state.selection.contains(id))
        .cloned()
        .collect()
}

fn parse_count(field: &'static str, raw: &str) -> Result<Option<u32>, PaperFormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<u32>().map(Some).map_err(|_| PaperFormError {
        field,
        message: format!("{trimmed:?} is not a whole number"),
    })
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperQuestionRowVm {
    pub number: usize,
    pub title: String,
    pub location: String,
    pub meta: String,
    pub ai_badge: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperSummaryVm {
    pub headline: String,
    pub warning: Option<String>,
    pub distribution: Vec<String>,
    pub rows: Vec<PaperQuestionRowVm>,
    pub can_save: bool,
}

#[must_use]
pub fn map_paper_summary(paper: &GeneratedPaper) -> PaperSummaryVm {
    let count = paper.questions.len();
    let minutes = paper.total_minutes();
    let headline = format!(
        "{count} {} · {minutes} min",
        if count == 1 { "question" } else { "questions" }
    );
    let warning = paper.is_partial().then(|| {
        if paper.message.trim().is_empty() {
            format!("Only {count} questions matched these filters.")
        } else {
            paper.message.clone()
        }
    });

    let mut distribution: Vec<String> = Difficulty::ALL
        .iter()
        .filter_map(|difficulty| {
            paper
                .metadata
                .difficulty_distribution
                .get(difficulty.label())
                .filter(|count| **count > 0)
                .map(|count| format!("{difficulty}: {count}"))
        })
        .collect();
    if paper.metadata.ai_generated_count > 0 {
        distribution.push(format!("AI-generated: {}", paper.metadata.ai_generated_count));
    }

    let rows = paper
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| map_paper_row(index + 1, question))
        .collect();

    PaperSummaryVm {
        headline,
        warning,
        distribution,
        rows,
        can_save: count > 0,
    }
}

fn map_paper_row(number: usize, question: &PaperQuestion) -> PaperQuestionRowVm {
    let location = match question.subtopic.as_deref() {
        Some(subtopic) => format!("{} › {} › {subtopic}", question.subject, question.topic),
        None => format!("{} › {}", question.subject, question.topic),
    };
    PaperQuestionRowVm {
        number,
        title: question.title.clone(),
        location,
        meta: format!(
            "{} · {} · {} · {} min",
            question.question_type,
            question.difficulty_level,
            question.bloom_level,
            question.estimated_time
        ),
        ai_badge: question.is_ai_generated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use qbank_core::model::{PaperMetadata, PaperOutcome, ParentPath, QuestionId};
    use services::{FilterController, InMemoryTaxonomy, NoopObserver};

    fn id(name: &str) -> CategoryId {
        CategoryId::new(name).unwrap()
    }

    fn question(id: u64, subtopic: Option<&str>) -> PaperQuestion {
        PaperQuestion {
            id: QuestionId::new(id),
            title: format!("Question {id}"),
            question_type: QuestionType::Mcq,
            subject: "Math".into(),
            topic: "Algebra".into(),
            subtopic: subtopic.map(str::to_string),
            difficulty_level: Difficulty::Easy,
            estimated_time: 4,
            bloom_level: BloomLevel::Apply,
            is_ai_generated: id % 2 == 0,
        }
    }

    #[test]
    fn form_builds_criteria_from_selection() {
        let form = PaperFormVm {
            total_questions: " 5 ".into(),
            easy: "2".into(),
            hard: "0".into(),
            max_time: "30".into(),
            question_types: [QuestionType::Coding].into(),
            ..PaperFormVm::default()
        };
        let criteria = form.to_criteria(&FilterSnapshot::default()).unwrap();
        assert_eq!(criteria.total_questions, 5);
        assert!(criteria.subjects.is_empty());
        assert_eq!(criteria.difficulty_distribution.len(), 1);
        assert_eq!(criteria.difficulty_distribution[&Difficulty::Easy], 2);
        assert_eq!(criteria.max_time, Some(30));
        assert_eq!(criteria.question_types, vec![QuestionType::Coding]);
    }

    #[tokio::test]
    async fn exclusions_reach_criteria_while_offered() {
        let taxonomy = InMemoryTaxonomy::new();
        let math = ParentPath::root().child(id("Math")).unwrap();
        taxonomy.set_children(&ParentPath::root(), [id("Math")]);
        taxonomy.set_children(&math, [id("Algebra"), id("Geometry"), id("Proofs")]);
        taxonomy.set_children(&math.child(id("Algebra")).unwrap(), [id("Linear")]);
        let controller =
            FilterController::new(Arc::new(taxonomy), Arc::new(NoopObserver), Duration::from_secs(1));
        controller.load_roots().await.unwrap();
        controller.toggle(Level::Subject, id("Math")).await.unwrap();
        controller.toggle(Level::Topic, id("Algebra")).await.unwrap();

        let mut form = PaperFormVm::default();
        assert!(form.toggle_exclusion(Level::Topic, id("Geometry")));
        assert!(form.toggle_exclusion(Level::Topic, id("Algebra")));
        assert!(form.toggle_exclusion(Level::Topic, id("Optics")));
        assert!(form.toggle_exclusion(Level::Subtopic, id("Linear")));
        assert!(!form.toggle_exclusion(Level::Subject, id("Math")));
        assert!(form.excluded(Level::Subject).is_none());

        let criteria = form.to_criteria(&controller.snapshot()).unwrap();
        assert_eq!(criteria.topics, vec![id("Algebra")]);
        assert_eq!(criteria.excluded_topics, vec![id("Geometry")]);
        assert_eq!(criteria.excluded_subtopics, vec![id("Linear")]);

        assert!(!form.toggle_exclusion(Level::Topic, id("Geometry")));
        let criteria = form.to_criteria(&controller.snapshot()).unwrap();
        assert!(criteria.excluded_topics.is_empty());
    }

    #[test]
    fn form_reports_bad_numbers() {
        let form = PaperFormVm {
            medium: "lots".into(),
            ..PaperFormVm::default()
        };
        let err = form.to_criteria(&FilterSnapshot::default()).unwrap_err();
        assert_eq!(err.field, "medium");
    }

    #[test]
    fn form_reports_oversized_distribution() {
        let form = PaperFormVm {
            total_questions: "2".into(),
            easy: "3".into(),
            ..PaperFormVm::default()
        };
        let err = form.to_criteria(&FilterSnapshot::default()).unwrap_err();
        assert_eq!(err.field, "distribution");
    }

    #[test]
    fn summary_flags_partial_papers() {
        let mut metadata = PaperMetadata::default();
        metadata.difficulty_distribution.insert("Easy".into(), 2);
        metadata.ai_generated_count = 1;
        let paper = GeneratedPaper {
            outcome: PaperOutcome::Partial,
            message: "Only 2 of 5 questions available".into(),
            questions: vec![question(1, Some("Linear")), question(2, None)],
            metadata,
        };
        let vm = map_paper_summary(&paper);
        assert_eq!(vm.headline, "2 questions · 8 min");
        assert_eq!(vm.warning.as_deref(), Some("Only 2 of 5 questions available"));
        assert_eq!(vm.distribution, vec!["Easy: 2", "AI-generated: 1"]);
        assert_eq!(vm.rows[0].location, "Math › Algebra › Linear");
        assert_eq!(vm.rows[1].location, "Math › Algebra");
        assert_eq!(vm.rows[0].meta, "MCQ · Easy · Apply · 4 min");
        assert!(vm.rows[1].ai_badge);
        assert!(vm.can_save);
    }
}
