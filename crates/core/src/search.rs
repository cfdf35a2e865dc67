//! Title filters used by read-side collaborators.
//!
//! Matching is a case-insensitive substring test; an empty query matches
//! everything.

use crate::model::{Question, Sheet, Subtopic, Topic};

fn matches(title: &str, query: &str) -> bool {
    title.to_lowercase().contains(&query.to_lowercase())
}

/// Topics whose title contains `query`, in sheet order.
#[must_use]
pub fn filter_topics<'a>(sheet: &'a Sheet, query: &str) -> Vec<&'a Topic> {
    sheet
        .topics()
        .iter()
        .filter(|t| matches(t.title(), query))
        .collect()
}

/// Questions of a subtopic whose title contains `query`.
#[must_use]
pub fn filter_questions<'a>(subtopic: &'a Subtopic, query: &str) -> Vec<&'a Question> {
    subtopic
        .questions()
        .iter()
        .filter(|q| matches(q.title(), query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, SubtopicId, TopicId};

    #[test]
    fn filters_topics_case_insensitively() {
        let sheet = Sheet::from_topics(vec![
            Topic::new(TopicId::from("1"), "Arrays"),
            Topic::new(TopicId::from("2"), "Binary Search"),
            Topic::new(TopicId::from("3"), "Graphs"),
        ]);
        let found: Vec<&str> = filter_topics(&sheet, "AR").iter().map(|t| t.title()).collect();
        assert_eq!(found, vec!["Arrays", "Binary Search"]);
        assert_eq!(filter_topics(&sheet, "").len(), 3);
        assert!(filter_topics(&sheet, "trie").is_empty());
    }

    #[test]
    fn filters_questions_within_a_subtopic() {
        let sub = Subtopic::with_questions(
            SubtopicId::from("s"),
            "Easy",
            vec![
                Question::new(QuestionId::from("a"), "Two Sum", "#"),
                Question::new(QuestionId::from("b"), "Valid Anagram", "#"),
            ],
        );
        let found = filter_questions(&sub, "sum");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "a");
    }
}
