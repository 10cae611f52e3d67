//! Stable min-priority frontier for the waypoint search

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct FrontierEntry<T> {
    priority: f32,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for FrontierEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for FrontierEntry<T> {}

impl<T> PartialOrd for FrontierEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for FrontierEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap and we want the
        // lowest priority first, then the earliest insertion among equals
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue over search items.
///
/// Entries are never updated in place: pushing an item twice keeps both
/// entries. Equal priorities come out in insertion order.
#[derive(Debug, Clone)]
pub struct SearchFrontier<T> {
    heap: BinaryHeap<FrontierEntry<T>>,
    next_sequence: u64,
}

impl<T> Default for SearchFrontier<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<T> SearchFrontier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T, priority: f32) {
        self.heap.push(FrontierEntry {
            priority,
            sequence: self.next_sequence,
            item,
        });
        self.next_sequence += 1;
    }

    /// Remove the lowest-priority item, returning it with its priority
    pub fn pop_min(&mut self) -> Option<(T, f32)> {
        self.heap.pop().map(|entry| (entry.item, entry.priority))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Current contents in extraction order, for diagnostics
    pub fn iter(&self) -> impl Iterator<Item = (&T, f32)> + '_ {
        let mut entries: Vec<&FrontierEntry<T>> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries
            .into_iter()
            .map(|entry| (&entry.item, entry.priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_lowest_priority_first() {
        let mut frontier = SearchFrontier::new();
        frontier.push("far", 9.0);
        frontier.push("near", 1.5);
        frontier.push("mid", 4.0);

        assert_eq!(frontier.pop_min(), Some(("near", 1.5)));
        assert_eq!(frontier.pop_min(), Some(("mid", 4.0)));
        assert_eq!(frontier.pop_min(), Some(("far", 9.0)));
        assert_eq!(frontier.pop_min(), None);
    }

    #[test]
    fn test_equal_priorities_keep_insertion_order() {
        let mut frontier = SearchFrontier::new();
        for name in ["first", "second", "third", "fourth"] {
            frontier.push(name, 2.0);
        }
        frontier.push("cheaper", 1.0);

        let order: Vec<_> = std::iter::from_fn(|| frontier.pop_min().map(|(item, _)| item)).collect();
        assert_eq!(order, vec!["cheaper", "first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut frontier = SearchFrontier::new();
        frontier.push(7u32, 3.0);
        frontier.push(7u32, 1.0);

        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.pop_min(), Some((7, 1.0)));
        assert_eq!(frontier.pop_min(), Some((7, 3.0)));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_iter_matches_extraction_order() {
        let mut frontier = SearchFrontier::new();
        frontier.push('c', 5.0);
        frontier.push('a', 1.0);
        frontier.push('b', 1.0);

        let order: Vec<char> = frontier.iter().map(|(item, _)| *item).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
        assert_eq!(frontier.len(), 3);
    }
}
