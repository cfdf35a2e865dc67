use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// A single tracked problem.
///
/// Never edited in place; replaced or deleted as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            link: link.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }
}
