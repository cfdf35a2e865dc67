use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, SubtopicId};
use crate::model::lenient::lenient_seq;
use crate::model::question::Question;
use crate::model::sheet::Outcome;

/// An ordered group of questions inside a topic.
///
/// Questions keep insertion order; there is no intra-subtopic reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    id: SubtopicId,
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "lenient_seq")]
    questions: Vec<Question>,
}

impl Subtopic {
    /// Creates an empty subtopic.
    #[must_use]
    pub fn new(id: SubtopicId, title: impl Into<String>) -> Self {
        Self::with_questions(id, title, Vec::new())
    }

    #[must_use]
    pub fn with_questions(
        id: SubtopicId,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SubtopicId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub(crate) fn push_question(&mut self, question: Question) -> &Question {
        self.questions.push(question);
        &self.questions[self.questions.len() - 1]
    }

    pub(crate) fn remove_question(&mut self, id: &QuestionId) -> Outcome {
        match self.questions.iter().position(|q| q.id() == id) {
            Some(index) => {
                self.questions.remove(index);
                Outcome::Applied
            }
            None => Outcome::NotFound,
        }
    }
}
