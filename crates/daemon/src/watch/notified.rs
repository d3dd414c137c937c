use std::collections::{HashSet, VecDeque};

use roomwatch_common::entity::NotifiedKey;

/// Keys that already produced (or deliberately skipped) an alert.
///
/// Insertion-ordered. `capacity` is a soft bound enforced by [`trim`]: keys
/// still reported by the source are never forgotten, so the set can exceed
/// `capacity` while more watched statuses are visible than it allows. A
/// capacity of zero means unbounded.
///
/// [`trim`]: NotifiedSet::trim
#[derive(Debug, Default)]
pub struct NotifiedSet {
    capacity: usize,
    order: VecDeque<NotifiedKey>,
    members: HashSet<NotifiedKey>,
}

impl NotifiedSet {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, order: VecDeque::new(), members: HashSet::new() }
    }

    pub fn contains(&self, key: &NotifiedKey) -> bool {
        self.members.contains(key)
    }

    /// Record `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: NotifiedKey) -> bool {
        if !self.members.insert(key.clone()) {
            return false;
        }
        self.order.push_back(key);
        true
    }

    /// Forget the oldest keys until the set is back within capacity, skipping
    /// any key for which `visible` returns `true`. Returns how many were dropped.
    pub fn trim(&mut self, visible: impl Fn(&NotifiedKey) -> bool) -> usize {
        if self.capacity == 0 || self.order.len() <= self.capacity {
            return 0;
        }
        let mut excess = self.order.len() - self.capacity;
        let mut dropped = 0;
        let members = &mut self.members;
        self.order.retain(|key| {
            if excess == 0 || visible(key) {
                return true;
            }
            members.remove(key);
            excess -= 1;
            dropped += 1;
            false
        });
        dropped
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str, status: &str) -> NotifiedKey {
        NotifiedKey { entity_id: id.into(), status: status.into() }
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut set = NotifiedSet::new(10);
        assert!(set.insert(key("a1", "resolved")));
        assert!(!set.insert(key("a1", "resolved")));
        assert!(set.insert(key("a1", "in-progress")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn trim_forgets_oldest_hidden_keys() {
        let mut set = NotifiedSet::new(2);
        set.insert(key("a1", "resolved"));
        set.insert(key("a2", "resolved"));
        set.insert(key("a3", "resolved"));

        assert_eq!(set.trim(|_| false), 1);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&key("a1", "resolved")));
        assert!(set.contains(&key("a2", "resolved")));
        assert!(set.contains(&key("a3", "resolved")));
    }

    #[test]
    fn trim_keeps_visible_keys_even_over_capacity() {
        let mut set = NotifiedSet::new(2);
        for id in ["a1", "a2", "a3", "a4"] {
            set.insert(key(id, "resolved"));
        }

        // a1 and a3 are still reported by the source.
        let dropped = set.trim(|k| k.entity_id == "a1" || k.entity_id == "a3");
        assert_eq!(dropped, 2);
        assert!(set.contains(&key("a1", "resolved")));
        assert!(set.contains(&key("a3", "resolved")));
        assert!(!set.contains(&key("a2", "resolved")));
        assert!(!set.contains(&key("a4", "resolved")));

        // Everything visible: nothing can go.
        set.insert(key("a5", "resolved"));
        assert_eq!(set.trim(|_| true), 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        let mut set = NotifiedSet::new(0);
        for i in 0..500 {
            set.insert(key(&format!("a{i}"), "resolved"));
        }
        assert_eq!(set.trim(|_| false), 0);
        assert_eq!(set.len(), 500);
        assert!(set.contains(&key("a0", "resolved")));
    }
}
