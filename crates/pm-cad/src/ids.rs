//! Identifier Generation
//!
//! Every owner (sketch, part, assembly) keeps its own counter, so
//! identifiers are unique within that owner and never reused after a
//! removal.

use serde::{Deserialize, Serialize};

/// Monotonic counter producing `prefix + n` identifiers
///
/// The counter is part of the owner's persisted state: replaying the same
/// sequence of operations from the same snapshot yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    /// Create a generator whose first number is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next number
    pub fn next_number(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Take the next number and format it behind `prefix`
    pub fn next_id(&mut self, prefix: &str) -> String {
        let n = self.next_number();
        format!("{prefix}{n}")
    }

    /// The number the next call will hand out
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Make sure `n` is never handed out
    pub fn reserve(&mut self, n: u64) {
        self.next = self.next.max(n.saturating_add(1));
    }

    /// Reserve the number behind `prefix` in an existing id
    ///
    /// Ids that do not have the `prefix + n` shape are ignored.
    pub fn reserve_id(&mut self, prefix: &str, id: &str) {
        if let Some(n) = id.strip_prefix(prefix).and_then(|rest| rest.parse::<u64>().ok()) {
            self.reserve(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_start_at_one() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id("geom_"), "geom_1");
        assert_eq!(ids.next_id("geom_"), "geom_2");
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_ids_never_repeat() {
        let mut ids = IdGenerator::new();
        let issued: HashSet<String> = (0..500).map(|_| ids.next_id("Plane")).collect();
        assert_eq!(issued.len(), 500);
    }

    #[test]
    fn test_reserve_moves_past_existing_ids() {
        let mut ids = IdGenerator::new();
        ids.reserve_id("geom_", "geom_7");
        ids.reserve_id("geom_", "geom_3");
        ids.reserve_id("geom_", "custom");
        ids.reserve_id("geom_", "Plane9");
        assert_eq!(ids.next_id("geom_"), "geom_8");

        ids.reserve(2);
        assert_eq!(ids.peek(), 9);
    }

    #[test]
    fn test_shared_counter_across_prefixes() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id("Plane"), "Plane1");
        assert_eq!(ids.next_id("Axis"), "Axis2");
        assert_eq!(ids.next_number(), 3);
    }
}
