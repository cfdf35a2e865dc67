//! Read-side progress projections over a sheet and its completed set.
//!
//! Everything here is a pure function of `(tree, CompletedSet)`. Counting is
//! driven by walking the tree, so orphaned completed ids never contribute.

use crate::model::{CompletedSet, Question, Sheet, Subtopic, Topic};

/// Anything that owns questions: a subtopic, a topic or the whole sheet.
pub trait Scope {
    /// Questions in structural order.
    fn questions(&self) -> impl Iterator<Item = &Question>;
}

impl Scope for Subtopic {
    fn questions(&self) -> impl Iterator<Item = &Question> {
        Subtopic::questions(self).iter()
    }
}

impl Scope for Topic {
    fn questions(&self) -> impl Iterator<Item = &Question> {
        self.subtopics().iter().flat_map(Subtopic::questions)
    }
}

impl Scope for Sheet {
    fn questions(&self) -> impl Iterator<Item = &Question> {
        self.topics()
            .iter()
            .flat_map(Topic::subtopics)
            .flat_map(Subtopic::questions)
    }
}

/// Aggregated completion for one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub done: usize,
    pub percent: u8,
}

impl Progress {
    #[must_use]
    pub fn of(scope: &impl Scope, completed: &CompletedSet) -> Self {
        let total = count_questions(scope);
        let done = count_done(scope, completed);
        Self {
            total,
            done,
            percent: percent(done, total),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total - self.done
    }

    /// True when the scope has questions and all of them are completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

#[must_use]
pub fn count_questions(scope: &impl Scope) -> usize {
    scope.questions().count()
}

#[must_use]
pub fn count_done(scope: &impl Scope, completed: &CompletedSet) -> usize {
    scope
        .questions()
        .filter(|q| completed.contains(q.id()))
        .count()
}

/// Completion percentage, rounded half-up to the nearest integer.
///
/// An empty scope is 0%. Plain rounding would report 100% for 199 of 200,
/// which would break "100% means every question is done"; the latter wins, so
/// a scope with at least one open question is capped at 99%.
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    let rounded = (200 * done + total) / (2 * total);
    let capped = if done < total { rounded.min(99) } else { rounded };
    u8::try_from(capped).unwrap_or(100)
}

/// Location of the first open question, for "continue where you left off".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextQuestion<'a> {
    pub topic: &'a Topic,
    pub subtopic: &'a Subtopic,
    pub question: &'a Question,
}

/// First question, in topic/subtopic/question order, that is not completed.
#[must_use]
pub fn next_incomplete<'a>(sheet: &'a Sheet, completed: &CompletedSet) -> Option<NextQuestion<'a>> {
    sheet.topics().iter().find_map(|topic| {
        topic.subtopics().iter().find_map(|subtopic| {
            subtopic
                .questions()
                .iter()
                .find(|q| !completed.contains(q.id()))
                .map(|question| NextQuestion {
                    topic,
                    subtopic,
                    question,
                })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, SubtopicId, TopicId};
    use proptest::prelude::*;

    fn question(id: &str) -> Question {
        Question::new(QuestionId::from(id), id.to_uppercase(), "#")
    }

    fn sheet_of(layout: &[&[&[&str]]]) -> Sheet {
        let topics = layout
            .iter()
            .enumerate()
            .map(|(ti, subs)| {
                let subtopics = subs
                    .iter()
                    .enumerate()
                    .map(|(si, qs)| {
                        Subtopic::with_questions(
                            SubtopicId::new(format!("s{ti}{si}")),
                            format!("Sub {si}"),
                            qs.iter().map(|id| question(id)).collect(),
                        )
                    })
                    .collect();
                Topic::with_subtopics(TopicId::new(format!("t{ti}")), format!("Topic {ti}"), subtopics)
            })
            .collect();
        Sheet::from_topics(topics)
    }

    fn completed(ids: &[&str]) -> CompletedSet {
        ids.iter().map(|id| QuestionId::from(*id)).collect()
    }

    #[test]
    fn arrays_scenario() {
        let sheet = sheet_of(&[&[&["q1", "q2"]]]);
        let done = completed(&["q1"]);

        let topic = &sheet.topics()[0];
        assert_eq!(Progress::of(topic, &done).percent, 50);
        let next = next_incomplete(&sheet, &done).unwrap();
        assert_eq!(next.question.id().as_str(), "q2");
        assert_eq!(next.topic.id().as_str(), "t0");
        assert_eq!(next.subtopic.id().as_str(), "s00");
    }

    #[test]
    fn empty_scopes_are_zero_percent() {
        let sheet = sheet_of(&[&[&[]], &[]]);
        let progress = Progress::of(&sheet, &completed(&["ghost"]));
        assert_eq!(progress, Progress { total: 0, done: 0, percent: 0 });
        assert!(!progress.is_complete());
        assert!(next_incomplete(&sheet, &CompletedSet::new()).is_none());
        assert!(next_incomplete(&Sheet::new(), &CompletedSet::new()).is_none());
    }

    #[test]
    fn orphaned_ids_never_count() {
        let sheet = sheet_of(&[&[&["q1"]]]);
        let progress = Progress::of(&sheet, &completed(&["q1", "gone-1", "gone-2"]));
        assert_eq!(progress.total, 1);
        assert_eq!(progress.done, 1);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn counts_at_every_granularity() {
        let sheet = sheet_of(&[&[&["a", "b"], &["c"]], &[&["d", "e", "f"]]]);
        let done = completed(&["a", "c", "d"]);

        let sub = &sheet.topics()[0].subtopics()[1];
        assert_eq!(Progress::of(sub, &done).percent, 100);
        let first = Progress::of(&sheet.topics()[0], &done);
        assert_eq!((first.total, first.done, first.percent), (3, 2, 67));
        let second = Progress::of(&sheet.topics()[1], &done);
        assert_eq!((second.done, second.remaining(), second.percent), (1, 2, 33));
        let whole = Progress::of(&sheet, &done);
        assert_eq!((whole.total, whole.done, whole.percent), (6, 3, 50));
    }

    #[test]
    fn next_incomplete_follows_structural_order() {
        let sheet = sheet_of(&[&[&["a"], &["b", "c"]], &[&["d"]]]);
        let next = next_incomplete(&sheet, &completed(&["a", "c"])).unwrap();
        assert_eq!(next.question.id().as_str(), "b");
        let next = next_incomplete(&sheet, &completed(&["a", "b", "c"])).unwrap();
        assert_eq!(next.question.id().as_str(), "d");
        assert!(next_incomplete(&sheet, &completed(&["a", "b", "c", "d"])).is_none());
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 200), 1);
    }

    #[test]
    fn partial_scope_never_reports_full() {
        assert_eq!(percent(199, 200), 99);
        assert_eq!(percent(200, 200), 100);
    }

    proptest! {
        #[test]
        fn percent_is_bounded(total in 0usize..500, done_frac in 0.0f64..=1.0) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let done = (total as f64 * done_frac) as usize;
            let p = percent(done, total);
            prop_assert!(p <= 100);
            if total == 0 {
                prop_assert_eq!(p, 0);
            }
            prop_assert_eq!(p == 100, total > 0 && done == total);
        }
    }
}
