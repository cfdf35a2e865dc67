mod completed;
mod ids;
mod lenient;
mod link;
mod question;
mod sheet;
mod subtopic;
mod topic;

pub use completed::CompletedSet;
pub use ids::{QuestionId, SubtopicId, TopicId};
pub use link::normalize_link;
pub use question::Question;
pub use sheet::{Outcome, Sheet, SheetError};
pub use subtopic::Subtopic;
pub use topic::Topic;
