//! Plain-text views printed by the CLI.

use sheet_core::model::{CompletedSet, Question, Sheet};
use sheet_core::search::{filter_questions, filter_topics};
use sheet_core::{NextQuestion, Progress};

pub fn progress_line(label: &str, progress: Progress) -> String {
    format!(
        "{label}: {}/{} ({}%)",
        progress.done, progress.total, progress.percent
    )
}

fn question_line(question: &Question, completed: &CompletedSet) -> String {
    let mark = if completed.contains(question.id()) { "x" } else { " " };
    let link = if question.link().is_empty() {
        String::new()
    } else {
        format!("  <{}>", question.link())
    };
    format!("[{mark}] {}{link}  ({})", question.title(), question.id())
}

/// The whole tree with ids and per-level progress.
pub fn sheet_tree(sheet: &Sheet, completed: &CompletedSet, admin: bool) -> String {
    if sheet.is_empty() {
        return "No topics yet. Run `sheet sync` or `sheet add-topic <title>`.\n".to_owned();
    }

    let mut out = String::new();
    for (index, topic) in sheet.topics().iter().enumerate() {
        let header = progress_line(topic.title(), Progress::of(topic, completed));
        if admin {
            out.push_str(&format!("{index}. {header}  ({})\n", topic.id()));
        } else {
            out.push_str(&format!("{index}. {header}\n"));
        }
        for subtopic in topic.subtopics() {
            let line = progress_line(subtopic.title(), Progress::of(subtopic, completed));
            if admin {
                out.push_str(&format!("   - {line}  ({})\n", subtopic.id()));
            } else {
                out.push_str(&format!("   - {line}\n"));
            }
            for question in subtopic.questions() {
                out.push_str(&format!("       {}\n", question_line(question, completed)));
            }
        }
    }
    out
}

pub fn next_line(next: Option<NextQuestion<'_>>) -> String {
    match next {
        Some(next) => format!(
            "Next: {} / {} / {}  ({})",
            next.topic.title(),
            next.subtopic.title(),
            next.question.title(),
            next.question.id()
        ),
        None => "Nothing left to do.".to_owned(),
    }
}

/// Topics whose title matches, then matching questions anywhere in the sheet.
pub fn search_results(sheet: &Sheet, completed: &CompletedSet, query: &str) -> String {
    let mut out = String::new();
    for topic in filter_topics(sheet, query) {
        out.push_str(&format!("topic    {}  ({})\n", topic.title(), topic.id()));
    }
    for topic in sheet.topics() {
        for subtopic in topic.subtopics() {
            for question in filter_questions(subtopic, query) {
                out.push_str(&format!(
                    "question {} / {} / {}\n",
                    topic.title(),
                    subtopic.title(),
                    question_line(question, completed)
                ));
            }
        }
    }
    if out.is_empty() {
        out.push_str(&format!("No matches for \"{query}\".\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::model::{QuestionId, Subtopic, SubtopicId, Topic, TopicId};
    use sheet_core::progress::next_incomplete;

    fn sheet() -> Sheet {
        Sheet::from_topics(vec![Topic::with_subtopics(
            TopicId::from("t1"),
            "Arrays",
            vec![Subtopic::with_questions(
                SubtopicId::from("s1"),
                "Easy",
                vec![
                    Question::new(QuestionId::from("q1"), "Two Sum", "https://x/1"),
                    Question::new(QuestionId::from("q2"), "Max Subarray", ""),
                ],
            )],
        )])
    }

    #[test]
    fn tree_marks_completed_questions() {
        let completed: CompletedSet = [QuestionId::from("q1")].into_iter().collect();
        let out = sheet_tree(&sheet(), &completed, true);

        assert!(out.contains("0. Arrays: 1/2 (50%)  (t1)"));
        assert!(out.contains("- Easy: 1/2 (50%)  (s1)"));
        assert!(out.contains("[x] Two Sum  <https://x/1>  (q1)"));
        assert!(out.contains("[ ] Max Subarray  (q2)"));
    }

    #[test]
    fn tree_hides_structural_ids_outside_admin_mode() {
        let out = sheet_tree(&sheet(), &CompletedSet::new(), false);
        assert!(out.contains("0. Arrays: 0/2 (0%)\n"));
        assert!(!out.contains("(t1)"));
        assert!(out.contains("(q1)"));
    }

    #[test]
    fn next_points_at_first_open_question() {
        let sheet = sheet();
        let completed: CompletedSet = [QuestionId::from("q1")].into_iter().collect();
        assert_eq!(
            next_line(next_incomplete(&sheet, &completed)),
            "Next: Arrays / Easy / Max Subarray  (q2)"
        );
    }

    #[test]
    fn search_lists_topics_and_questions() {
        let out = search_results(&sheet(), &CompletedSet::new(), "SUM");
        assert!(out.contains("question Arrays / Easy / [ ] Two Sum"));
        assert!(!out.contains("topic"));

        let none = search_results(&sheet(), &CompletedSet::new(), "graph");
        assert_eq!(none, "No matches for \"graph\".\n");
    }
}
