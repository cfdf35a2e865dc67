//! Turns a drag gesture (dragged topic dropped onto another topic) into a
//! positional move on the topic sequence.

use crate::model::{Outcome, Sheet, TopicId};

/// Resolves both ids to their current indices.
///
/// Returns `None` when the ids are equal, when either does not resolve, or
/// when both resolve to the same index.
#[must_use]
pub fn resolve_move(sheet: &Sheet, dragged: &TopicId, target: &TopicId) -> Option<(usize, usize)> {
    if dragged == target {
        return None;
    }
    let from = sheet.topic_position(dragged)?;
    let to = sheet.topic_position(target)?;
    (from != to).then_some((from, to))
}

/// Applies a drag gesture; unresolvable gestures are `NotFound` no-ops.
pub fn apply_move(sheet: &mut Sheet, dragged: &TopicId, target: &TopicId) -> Outcome {
    match resolve_move(sheet, dragged, target) {
        Some((from, to)) => sheet.reorder_topics(from, to),
        None => Outcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Topic;
    use proptest::prelude::*;

    fn sheet(n: usize) -> Sheet {
        Sheet::from_topics(
            (0..n)
                .map(|i| Topic::new(TopicId::new(format!("t{i}")), format!("T{i}")))
                .collect(),
        )
    }

    fn order(sheet: &Sheet) -> Vec<String> {
        sheet.topics().iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn drop_onto_later_topic_moves_after_it() {
        let mut s = sheet(4);
        let outcome = apply_move(&mut s, &TopicId::from("t0"), &TopicId::from("t2"));
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(order(&s), vec!["t1", "t2", "t0", "t3"]);
    }

    #[test]
    fn drop_onto_itself_is_a_no_op() {
        let mut s = sheet(3);
        assert_eq!(resolve_move(&s, &TopicId::from("t1"), &TopicId::from("t1")), None);
        assert_eq!(
            apply_move(&mut s, &TopicId::from("t1"), &TopicId::from("t1")),
            Outcome::NotFound
        );
        assert_eq!(order(&s), vec!["t0", "t1", "t2"]);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut s = sheet(3);
        assert_eq!(
            apply_move(&mut s, &TopicId::from("zz"), &TopicId::from("t1")),
            Outcome::NotFound
        );
        assert_eq!(
            apply_move(&mut s, &TopicId::from("t1"), &TopicId::from("zz")),
            Outcome::NotFound
        );
        assert_eq!(order(&s), vec!["t0", "t1", "t2"]);
    }

    proptest! {
        #[test]
        fn inverse_move_restores_order(n in 1usize..12, a in 0usize..12, b in 0usize..12) {
            let (from, to) = (a % n, b % n);
            let original = sheet(n);
            let mut s = original.clone();
            prop_assert!(s.reorder_topics(from, to).is_applied());
            prop_assert!(s.reorder_topics(to, from).is_applied());
            prop_assert_eq!(s, original);
        }
    }
}
