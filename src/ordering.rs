//! Ordering primitives for 1-based contiguous child orderings.
//!
//! Sections within a round and forms within a section both carry a 1-based
//! position that must stay contiguous. All structural mutations go through
//! `swap_elements` plus an explicit reindex of the surviving siblings.

/// Swap the elements at the two zero-based positions.
///
/// If either position is out of range the slice is left untouched. Callers
/// rely on this for boundary moves (first element up, last element down),
/// which are silent no-ops.
pub fn swap_elements<T>(items: &mut [T], index_a: usize, index_b: usize) {
    if index_a < items.len() && index_b < items.len() {
        items.swap(index_a, index_b);
    }
}

/// Zero-based list position for a 1-based ordering value.
///
/// Returns `None` for orderings below 1, which would otherwise underflow.
pub fn list_position(one_based_index: i64) -> Option<usize> {
    if one_based_index < 1 {
        return None;
    }
    Some((one_based_index - 1) as usize)
}

/// The 1-based ordering value for the next child appended to a parent with
/// `existing_count` children.
pub fn next_index(existing_count: usize) -> i64 {
    (existing_count as i64 + 1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_adjacent_elements() {
        let mut items = vec!["a", "b", "c"];
        swap_elements(&mut items, 1, 2);
        assert_eq!(items, vec!["a", "c", "b"]);
    }

    #[test]
    fn swap_is_an_involution() {
        let original = vec![1, 2, 3, 4, 5];
        for i in 0..original.len() - 1 {
            let mut items = original.clone();
            swap_elements(&mut items, i, i + 1);
            swap_elements(&mut items, i, i + 1);
            assert_eq!(items, original);
        }
    }

    #[test]
    fn out_of_range_swap_is_a_no_op() {
        let mut items = vec![1, 2, 3];
        swap_elements(&mut items, 0, 3);
        assert_eq!(items, vec![1, 2, 3]);
        swap_elements(&mut items, 7, 1);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn swap_on_empty_list_is_a_no_op() {
        let mut items: Vec<i32> = vec![];
        swap_elements(&mut items, 0, 1);
        assert!(items.is_empty());
    }

    #[test]
    fn list_position_converts_one_based_indices() {
        assert_eq!(list_position(1), Some(0));
        assert_eq!(list_position(3), Some(2));
        assert_eq!(list_position(0), None);
        assert_eq!(list_position(-2), None);
    }

    #[test]
    fn next_index_starts_at_one() {
        assert_eq!(next_index(0), 1);
        assert_eq!(next_index(4), 5);
    }
}
