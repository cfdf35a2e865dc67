//! Groups a flat question dataset into the Topic → Subtopic → Question tree.
//!
//! Records without a topic land in `"General"`, records without a subtopic in
//! `"Misc"`. Groups are created in first-seen order and questions keep dataset
//! order inside their group.

use serde::Deserialize;
use std::collections::HashMap;

use crate::model::{Question, QuestionId, Subtopic, SubtopicId, Topic, TopicId};

pub const DEFAULT_TOPIC: &str = "General";
pub const DEFAULT_SUBTOPIC: &str = "Misc";
pub const FALLBACK_LINK: &str = "#";

/// Problem reference nested in some dataset rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub problem_url: Option<String>,
}

/// One row of an external question dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sub_topic: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub question_id: Option<ProblemRef>,
}

impl DatasetRecord {
    fn topic_label(&self) -> &str {
        non_empty(self.topic.as_deref()).unwrap_or(DEFAULT_TOPIC)
    }

    fn subtopic_label(&self) -> &str {
        non_empty(self.sub_topic.as_deref()).unwrap_or(DEFAULT_SUBTOPIC)
    }

    fn into_question(self) -> Question {
        let problem = self.question_id.unwrap_or_default();
        let title = non_empty(self.title.as_deref())
            .or(non_empty(problem.name.as_deref()))
            .unwrap_or_default()
            .to_owned();
        let link = non_empty(problem.problem_url.as_deref())
            .or(non_empty(self.link.as_deref()))
            .or(non_empty(self.resource.as_deref()))
            .unwrap_or(FALLBACK_LINK)
            .to_owned();
        let id = match non_empty(self.id.as_deref()) {
            Some(id) => QuestionId::new(id),
            None => QuestionId::generate(),
        };
        Question::new(id, title, link)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Payload served by the dataset endpoint.
///
/// Either the `{ "data": { "questions": [...] } }` envelope or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Dataset {
    // Listed first: a struct variant would also accept a JSON array positionally.
    Records(Vec<DatasetRecord>),
    Envelope { data: DatasetBody },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetBody {
    #[serde(default)]
    pub questions: Vec<DatasetRecord>,
}

impl Dataset {
    #[must_use]
    pub fn into_records(self) -> Vec<DatasetRecord> {
        match self {
            Dataset::Envelope { data } => data.questions,
            Dataset::Records(records) => records,
        }
    }
}

#[derive(Default)]
struct TopicGroup {
    subtopics: Vec<(String, Vec<Question>)>,
    index: HashMap<String, usize>,
}

/// Builds the topic tree from dataset rows.
///
/// Topic and subtopic ids are always freshly generated; question ids come from
/// the row's `_id` when present.
pub fn group_records(records: impl IntoIterator<Item = DatasetRecord>) -> Vec<Topic> {
    let mut groups: Vec<(String, TopicGroup)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let topic_label = record.topic_label().to_owned();
        let subtopic_label = record.subtopic_label().to_owned();

        let topic_slot = match index.get(&topic_label) {
            Some(&slot) => slot,
            None => {
                groups.push((topic_label.clone(), TopicGroup::default()));
                index.insert(topic_label, groups.len() - 1);
                groups.len() - 1
            }
        };
        let group = &mut groups[topic_slot].1;

        let sub_slot = match group.index.get(&subtopic_label) {
            Some(&slot) => slot,
            None => {
                group.subtopics.push((subtopic_label.clone(), Vec::new()));
                group.index.insert(subtopic_label, group.subtopics.len() - 1);
                group.subtopics.len() - 1
            }
        };
        group.subtopics[sub_slot].1.push(record.into_question());
    }

    groups
        .into_iter()
        .map(|(title, group)| {
            let subtopics = group
                .subtopics
                .into_iter()
                .map(|(sub_title, questions)| {
                    Subtopic::with_questions(SubtopicId::generate(), sub_title, questions)
                })
                .collect();
            Topic::with_subtopics(TopicId::generate(), title, subtopics)
        })
        .collect()
}
