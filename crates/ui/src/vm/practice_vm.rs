use qbank_core::model::{CategoryId, PracticeQuestion, QuestionDetail, QuestionTree, is_general};

use crate::vm::markdown_vm::markdown_to_html;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtopicNodeVm {
    pub name: CategoryId,
    pub label: String,
    pub count_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicNodeVm {
    pub name: CategoryId,
    pub count_label: String,
    pub subtopics: Vec<SubtopicNodeVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectNodeVm {
    pub name: CategoryId,
    pub count_label: String,
    pub topics: Vec<TopicNodeVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeOutlineVm {
    pub total_label: String,
    pub subjects: Vec<SubjectNodeVm>,
}

impl PracticeOutlineVm {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

fn count_label(count: u32) -> String {
    match count {
        1 => "1 question".to_string(),
        n => format!("{n} questions"),
    }
}

/// Outline of the bank. Subtopic-less questions appear under a
/// "General" entry listed after the named subtopics.
#[must_use]
pub fn map_practice_outline(tree: &QuestionTree) -> PracticeOutlineVm {
    let subjects = tree
        .subjects()
        .map(|subject| {
            let topics = tree
                .topics(subject)
                .map(|topic| {
                    let mut subtopics: Vec<SubtopicNodeVm> = tree
                        .subtopics(subject, topic)
                        .map(|(name, count)| SubtopicNodeVm {
                            name: name.clone(),
                            label: if is_general(name) {
                                "General (no subtopic)".to_string()
                            } else {
                                name.to_string()
                            },
                            count_label: count_label(count),
                        })
                        .collect();
                    subtopics.sort_by_key(|node| is_general(&node.name));
                    TopicNodeVm {
                        name: topic.clone(),
                        count_label: count_label(tree.topic_total(subject, topic)),
                        subtopics,
                    }
                })
                .collect();
            SubjectNodeVm {
                name: subject.clone(),
                count_label: count_label(tree.subject_total(subject)),
                topics,
            }
        })
        .collect();

    PracticeOutlineVm {
        total_label: count_label(tree.total_questions()),
        subjects,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeQuestionRowVm {
    pub id: u64,
    pub title: String,
    pub meta: String,
}

#[must_use]
pub fn map_practice_rows(questions: &[PracticeQuestion]) -> Vec<PracticeQuestionRowVm> {
    questions
        .iter()
        .map(|question| PracticeQuestionRowVm {
            id: question.id.value(),
            title: question.title.clone(),
            meta: format!(
                "{} · {} · {} · {} min",
                question.question_type,
                question.difficulty_level,
                question.bloom_level,
                question.estimated_time
            ),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionDetailVm {
    pub title: String,
    pub breadcrumb: String,
    pub meta: String,
    pub body_html: String,
}

#[must_use]
pub fn map_question_detail(question: &QuestionDetail) -> QuestionDetailVm {
    let mut breadcrumb = format!("{} › {}", question.subject, question.topic);
    if let Some(subtopic) = &question.subtopic {
        breadcrumb.push_str(" › ");
        breadcrumb.push_str(subtopic);
    }
    let body_html = if question.content.trim().is_empty() {
        "<p><em>This question has no body.</em></p>".to_string()
    } else {
        markdown_to_html(&question.content)
    };
    QuestionDetailVm {
        title: question.title.clone(),
        breadcrumb,
        meta: format!(
            "{} · {} · {} · {} min",
            question.question_type,
            question.difficulty_level,
            question.bloom_level,
            question.estimated_time
        ),
        body_html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::model::{BloomLevel, Difficulty, QuestionId, QuestionType};

    fn id(name: &str) -> CategoryId {
        CategoryId::new(name).unwrap()
    }

    #[test]
    fn outline_counts_and_orders_general_last() {
        let mut tree = QuestionTree::default();
        tree.insert(id("Math"), id("Algebra"), None, 2);
        tree.insert(id("Math"), id("Algebra"), Some(id("Quadratics")), 1);
        tree.insert(id("Math"), id("Algebra"), Some(id("Fractions")), 3);

        let outline = map_practice_outline(&tree);
        assert_eq!(outline.total_label, "6 questions");
        let algebra = &outline.subjects[0].topics[0];
        let labels: Vec<_> = algebra.subtopics.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Fractions", "Quadratics", "General (no subtopic)"]);
        assert_eq!(algebra.subtopics[1].count_label, "1 question");
    }

    #[test]
    fn empty_tree_has_empty_outline() {
        let outline = map_practice_outline(&QuestionTree::default());
        assert!(outline.is_empty());
        assert_eq!(outline.total_label, "0 questions");
    }

    #[test]
    fn detail_renders_sanitized_body() {
        let detail = QuestionDetail {
            id: QuestionId::new(3),
            title: "Kinematics".into(),
            question_type: QuestionType::Numerical,
            subject: "Physics".into(),
            topic: "Mechanics".into(),
            subtopic: None,
            difficulty_level: Difficulty::Hard,
            estimated_time: 12,
            bloom_level: BloomLevel::Analyze,
            content: "**Find** v<script>x</script>".into(),
        };
        let vm = map_question_detail(&detail);
        assert_eq!(vm.breadcrumb, "Physics › Mechanics");
        assert!(vm.body_html.contains("<strong>Find</strong>"));
        assert!(!vm.body_html.contains("script"));
        assert_eq!(vm.meta, "Numerical · Hard · Analyze · 12 min");
    }
}
