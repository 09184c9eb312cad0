//! Evaluation order of fields and of the rules on one field.
//!
//! Fields are ordered by their declared rank when every field has one.
//! Otherwise declaration order is kept and the configuration is flagged so
//! that fail-fast and partial validation can refuse it.

use serde::{Deserialize, Serialize};

/// How completely the fields of a form declare their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderingState {
    /// Every field has a rank.
    Ordered,
    /// No field has a rank.
    Unordered,
    /// Some fields have a rank and some do not.
    Mixed,
}

impl OrderingState {
    /// Classify a set of optional ranks. No ranks at all, including an
    /// empty set, is `Unordered`.
    pub fn classify(ranks: &[Option<i32>]) -> Self {
        let ranked = ranks.iter().filter(|rank| rank.is_some()).count();
        if ranked == 0 {
            OrderingState::Unordered
        } else if ranked == ranks.len() {
            OrderingState::Ordered
        } else {
            OrderingState::Mixed
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, OrderingState::Ordered)
    }
}

/// Result of ordering a list of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOrdering {
    /// Positions into the input slice, in evaluation order.
    pub indices: Vec<usize>,
    /// Classification of the input ranks.
    pub state: OrderingState,
}

/// Compute the evaluation order for fields with the given ranks.
pub fn order_fields(ranks: &[Option<i32>]) -> FieldOrdering {
    let state = OrderingState::classify(ranks);
    let mut indices: Vec<usize> = (0..ranks.len()).collect();

    if state.is_ordered() {
        // sort_by_key is stable, so equal ranks keep declaration order
        indices.sort_by_key(|&i| ranks[i]);
    }

    FieldOrdering { indices, state }
}

/// Stable-sort a field's rules by sequence.
pub fn sort_rules<T, F>(rules: &mut [T], sequence: F)
where
    F: Fn(&T) -> i32,
{
    rules.sort_by_key(|rule| sequence(rule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_ranked() {
        let ordering = order_fields(&[Some(3), Some(1), Some(2)]);
        assert_eq!(ordering.indices, vec![1, 2, 0]);
        assert_eq!(ordering.state, OrderingState::Ordered);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let ordering = order_fields(&[Some(2), Some(1), Some(2), Some(1)]);
        assert_eq!(ordering.indices, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_unranked_and_mixed() {
        let unordered = order_fields(&[None, None]);
        assert_eq!(unordered.indices, vec![0, 1]);
        assert_eq!(unordered.state, OrderingState::Unordered);

        let mixed = order_fields(&[Some(5), None, Some(1)]);
        assert_eq!(mixed.indices, vec![0, 1, 2]);
        assert_eq!(mixed.state, OrderingState::Mixed);

        assert_eq!(order_fields(&[]).state, OrderingState::Unordered);
    }

    #[test]
    fn test_sort_rules_by_sequence() {
        let mut rules = vec![("b", 2), ("none", -1), ("a", 1), ("c", 2)];
        sort_rules(&mut rules, |rule| rule.1);
        let names: Vec<&str> = rules.iter().map(|rule| rule.0).collect();
        assert_eq!(names, vec!["none", "a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_indices_are_permutation(ranks in prop::collection::vec(prop::option::of(-5i32..5), 0..20)) {
            let ordering = order_fields(&ranks);
            let mut sorted = ordering.indices.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..ranks.len()).collect::<Vec<_>>());
        }

        #[test]
        fn prop_ranked_order_is_stable(ranks in prop::collection::vec(-5i32..5, 1..20)) {
            let ranks: Vec<Option<i32>> = ranks.into_iter().map(Some).collect();
            let ordering = order_fields(&ranks);
            prop_assert_eq!(ordering.state, OrderingState::Ordered);
            for pair in ordering.indices.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(ranks[a] < ranks[b] || (ranks[a] == ranks[b] && a < b));
            }
        }

        #[test]
        fn prop_partial_ranks_keep_declaration_order(ranks in prop::collection::vec(prop::option::of(-5i32..5), 1..20)) {
            let ordering = order_fields(&ranks);
            if ranks.iter().any(Option::is_none) {
                prop_assert_ne!(ordering.state, OrderingState::Ordered);
                prop_assert_eq!(ordering.indices, (0..ranks.len()).collect::<Vec<_>>());
            }
        }
    }
}
