use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ids::QuestionId;

/// Ids of completed questions, kept apart from the tree.
///
/// Membership does not imply the question still exists: structural deletes
/// never touch this set, so ids of deleted questions stay behind as orphans.
/// Orphans never count towards progress because counting walks the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedSet {
    ids: BTreeSet<QuestionId>,
}

impl CompletedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionId> {
        self.ids.iter()
    }

    /// Flips membership of `id` and returns whether it is now completed.
    pub fn toggle(&mut self, id: QuestionId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }
}

impl FromIterator<QuestionId> for CompletedSet {
    fn from_iter<I: IntoIterator<Item = QuestionId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = CompletedSet::new();
        assert!(set.toggle(QuestionId::from("q1")));
        assert!(set.contains(&QuestionId::from("q1")));
        assert!(!set.toggle(QuestionId::from("q1")));
        assert!(set.is_empty());
    }

    #[test]
    fn accepts_ids_missing_from_any_tree() {
        let mut set = CompletedSet::new();
        assert!(set.toggle(QuestionId::from("ghost")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn reads_a_json_list_with_duplicates() {
        let set: CompletedSet = serde_json::from_str(r#"["b", "a", "b"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }

    proptest! {
        #[test]
        fn toggle_is_its_own_inverse(
            initial in prop::collection::btree_set("[a-d]{1,2}", 0..8),
            id in "[a-d]{1,2}",
        ) {
            let original: CompletedSet = initial.into_iter().map(QuestionId::from).collect();
            let mut set = original.clone();
            let _ = set.toggle(QuestionId::from(id.as_str()));
            let _ = set.toggle(QuestionId::from(id.as_str()));
            prop_assert_eq!(set, original);
        }
    }
}
