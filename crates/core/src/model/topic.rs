use serde::{Deserialize, Serialize};

use crate::model::ids::{SubtopicId, TopicId};
use crate::model::lenient::lenient_seq;
use crate::model::sheet::Outcome;
use crate::model::subtopic::Subtopic;

/// A top-level entry of the sheet.
///
/// This is also the unit the remote document store knows about: nested
/// changes reach the server as a full replacement of the owning topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "lenient_seq")]
    subtopics: Vec<Subtopic>,
}

impl Topic {
    /// Creates a topic with no subtopics.
    #[must_use]
    pub fn new(id: TopicId, title: impl Into<String>) -> Self {
        Self::with_subtopics(id, title, Vec::new())
    }

    #[must_use]
    pub fn with_subtopics(id: TopicId, title: impl Into<String>, subtopics: Vec<Subtopic>) -> Self {
        Self {
            id,
            title: title.into(),
            subtopics,
        }
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics
    }

    #[must_use]
    pub fn subtopic(&self, id: &SubtopicId) -> Option<&Subtopic> {
        self.subtopics.iter().find(|s| s.id() == id)
    }

    pub(crate) fn subtopic_mut(&mut self, id: &SubtopicId) -> Option<&mut Subtopic> {
        self.subtopics.iter_mut().find(|s| s.id() == id)
    }

    pub(crate) fn push_subtopic(&mut self, subtopic: Subtopic) -> &Subtopic {
        self.subtopics.push(subtopic);
        &self.subtopics[self.subtopics.len() - 1]
    }

    pub(crate) fn remove_subtopic(&mut self, id: &SubtopicId) -> Outcome {
        match self.subtopics.iter().position(|s| s.id() == id) {
            Some(index) => {
                self.subtopics.remove(index);
                Outcome::Applied
            }
            None => Outcome::NotFound,
        }
    }
}
