use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, SubtopicId, TopicId};
use crate::model::question::Question;
use crate::model::subtopic::Subtopic;
use crate::model::topic::Topic;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetError {
    #[error("topic title cannot be empty")]
    EmptyTitle,
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Result of a structural mutation.
///
/// Lookups that miss degrade to `NotFound` instead of an error; callers
/// usually treat both variants as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    Applied,
    NotFound,
}

impl Outcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

//
// ─── SHEET ─────────────────────────────────────────────────────────────────────
//

/// The aggregate root: an ordered sequence of topics.
///
/// Serialized as a bare JSON array, which is also the shape written to the
/// client cache on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sheet {
    topics: Vec<Topic>,
}

impl Sheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_topics(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id() == id)
    }

    /// Index of the first topic with the given id.
    #[must_use]
    pub fn topic_position(&self, id: &TopicId) -> Option<usize> {
        self.topics.iter().position(|t| t.id() == id)
    }

    /// Finds a question anywhere in the tree.
    #[must_use]
    pub fn find_question(&self, id: &QuestionId) -> Option<&Question> {
        self.topics
            .iter()
            .flat_map(Topic::subtopics)
            .flat_map(Subtopic::questions)
            .find(|q| q.id() == id)
    }

    fn topic_mut(&mut self, id: &TopicId) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id() == id)
    }

    /// Appends a new, empty topic.
    ///
    /// No uniqueness check is made on the title.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::EmptyTitle` if the trimmed title is empty.
    pub fn add_topic(&mut self, title: &str) -> Result<&Topic, SheetError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SheetError::EmptyTitle);
        }
        self.topics.push(Topic::new(TopicId::generate(), title));
        Ok(&self.topics[self.topics.len() - 1])
    }

    /// Removes the first topic with a matching id.
    pub fn delete_topic(&mut self, id: &TopicId) -> Outcome {
        match self.topic_position(id) {
            Some(index) => {
                self.topics.remove(index);
                Outcome::Applied
            }
            None => Outcome::NotFound,
        }
    }

    /// Moves the topic at `from` so that it ends up at index `to`.
    ///
    /// Out-of-range indices are a caller contract violation; they are rejected
    /// as `NotFound` and leave the sequence untouched.
    pub fn reorder_topics(&mut self, from: usize, to: usize) -> Outcome {
        let len = self.topics.len();
        if from >= len || to >= len {
            return Outcome::NotFound;
        }
        if from != to {
            let moved = self.topics.remove(from);
            self.topics.insert(to, moved);
        }
        Outcome::Applied
    }

    /// Appends an empty subtopic to a topic. Returns `None` when the topic is absent.
    pub fn add_subtopic(&mut self, topic_id: &TopicId, title: impl Into<String>) -> Option<&Subtopic> {
        let topic = self.topic_mut(topic_id)?;
        Some(topic.push_subtopic(Subtopic::new(SubtopicId::generate(), title)))
    }

    pub fn delete_subtopic(&mut self, topic_id: &TopicId, sub_id: &SubtopicId) -> Outcome {
        match self.topic_mut(topic_id) {
            Some(topic) => topic.remove_subtopic(sub_id),
            None => Outcome::NotFound,
        }
    }

    /// Appends a question to a subtopic. Returns `None` when any id in the path is absent.
    ///
    /// The link is stored as given.
    pub fn add_question(
        &mut self,
        topic_id: &TopicId,
        sub_id: &SubtopicId,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Option<&Question> {
        let subtopic = self.topic_mut(topic_id)?.subtopic_mut(sub_id)?;
        Some(subtopic.push_question(Question::new(QuestionId::generate(), title, link)))
    }

    pub fn delete_question(
        &mut self,
        topic_id: &TopicId,
        sub_id: &SubtopicId,
        question_id: &QuestionId,
    ) -> Outcome {
        match self
            .topic_mut(topic_id)
            .and_then(|topic| topic.subtopic_mut(sub_id))
        {
            Some(subtopic) => subtopic.remove_question(question_id),
            None => Outcome::NotFound,
        }
    }

    /// Replaces the whole tree. The empty-sheet guard belongs to the caller.
    pub fn hydrate(&mut self, topics: Vec<Topic>) {
        self.topics = topics;
    }
}
