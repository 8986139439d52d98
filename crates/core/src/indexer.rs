//! Stateful index allocation for matching spec entries to live tmux objects.
//!
//! An [`Indexer`] groups a population of existing entities (windows by name,
//! panes by title) and hands out their indexes one at a time, lowest first.
//! Spec entries that share a name therefore claim existing windows or panes
//! oldest-first, and entries left without an index are the ones to create.

use std::collections::{BTreeSet, HashMap, VecDeque};

/// Per-group queues of sorted, unique indexes.
///
/// Lives for a single interpretation pass: [`Indexer::next`] consumes the
/// queues, so an indexer must not be shared between passes.
#[derive(Debug, Default, Clone)]
pub struct Indexer {
    queues: HashMap<String, VecDeque<u32>>,
}

impl Indexer {
    /// Group `entities` by `group` and collect the indexes read with `index`.
    pub fn build<T, G, I>(entities: &[T], group: G, index: I) -> Self
    where
        G: Fn(&T) -> &str,
        I: Fn(&T) -> u32,
    {
        let mut sets: HashMap<String, BTreeSet<u32>> = HashMap::new();
        for entity in entities {
            sets.entry(group(entity).to_string())
                .or_default()
                .insert(index(entity));
        }

        let queues = sets
            .into_iter()
            .map(|(key, set)| (key, set.into_iter().collect()))
            .collect();

        Self { queues }
    }

    /// Pop the smallest remaining index for `group`.
    ///
    /// Returns `None` when the group is unknown or exhausted.
    pub fn next(&mut self, group: &str) -> Option<u32> {
        self.queues.get_mut(group)?.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entity {
        index: u32,
        title: &'static str,
    }

    fn entities(pairs: &[(u32, &'static str)]) -> Vec<Entity> {
        pairs
            .iter()
            .map(|&(index, title)| Entity { index, title })
            .collect()
    }

    #[test]
    fn test_stateful_indexer() {
        let list = entities(&[(1, "foo"), (2, "bar"), (3, "foo")]);
        let mut indexer = Indexer::build(&list, |e| e.title, |e| e.index);

        assert_eq!(indexer.next("foo"), Some(1));
        assert_eq!(indexer.next("foo"), Some(3));
        assert_eq!(indexer.next("foo"), None);
        assert_eq!(indexer.next("bar"), Some(2));
        assert_eq!(indexer.next("bar"), None);
    }

    #[test]
    fn test_indexes_are_sorted_and_unique() {
        let list = entities(&[(3, "g"), (1, "g"), (1, "g"), (2, "g")]);
        let mut indexer = Indexer::build(&list, |e| e.title, |e| e.index);

        assert_eq!(indexer.next("g"), Some(1));
        assert_eq!(indexer.next("g"), Some(2));
        assert_eq!(indexer.next("g"), Some(3));
        assert_eq!(indexer.next("g"), None);
    }

    #[test]
    fn test_unknown_group() {
        let mut indexer = Indexer::build(&entities(&[]), |e| e.title, |e| e.index);
        assert_eq!(indexer.next("missing"), None);
    }
}
