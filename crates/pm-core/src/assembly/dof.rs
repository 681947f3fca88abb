//! Degree-of-freedom accounting for mates
//!
//! Every component starts with 6 freedoms. Mates remove freedoms from the
//! pair of components they connect; a pair can lose at most 6, so stacking
//! redundant mates does not drain the global pool twice. Mates naming a
//! missing component or relating a component to itself are ignored.

use std::collections::{BTreeMap, HashMap};

use super::{Assembly, ComponentId};

/// Freedoms of one unconstrained rigid body
const RIGID_BODY_FREEDOMS: u32 = 6;

impl Assembly {
    /// Uncapped freedom removal per unordered component pair
    fn pair_removals(&self) -> BTreeMap<(ComponentId, ComponentId), u32> {
        let mut removals = BTreeMap::new();
        for mate in &self.mates {
            if mate.component_a == mate.component_b
                || !self.contains_component(mate.component_a)
                || !self.contains_component(mate.component_b)
            {
                continue;
            }
            let removed = removals.entry(mate.pair()).or_insert(0u32);
            *removed = removed.saturating_add(mate.kind.removed_freedoms());
        }
        removals
    }

    /// Freedoms removed between two components, capped at 6
    pub fn removed_freedoms_between(&self, a: ComponentId, b: ComponentId) -> u32 {
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.pair_removals()
            .get(&pair)
            .map_or(0, |&removed| removed.min(RIGID_BODY_FREEDOMS))
    }

    /// Remaining freedoms: `max(0, 6 × components − Σ capped pair removals)`
    pub fn degrees_of_freedom(&self) -> u32 {
        let total = u32::try_from(self.components.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(RIGID_BODY_FREEDOMS);
        let removed = self
            .pair_removals()
            .values()
            .fold(0u32, |sum, &removed| sum.saturating_add(removed.min(RIGID_BODY_FREEDOMS)));
        total.saturating_sub(removed)
    }

    /// Check if any pair is constrained by more than 6 freedoms
    pub fn is_over_constrained(&self) -> bool {
        self.pair_removals()
            .values()
            .any(|&removed| removed > RIGID_BODY_FREEDOMS)
    }

    /// Check if freedoms remain and some component is not fully located
    pub fn is_under_constrained(&self) -> bool {
        if self.degrees_of_freedom() == 0 {
            return false;
        }
        let located = self.located_freedoms();
        self.components
            .iter()
            .any(|c| located.get(&c.id).copied().unwrap_or(0) < RIGID_BODY_FREEDOMS)
    }

    /// Check if the component has at least 6 freedoms removed by its mates
    pub fn is_fully_located(&self, id: ComponentId) -> bool {
        self.located_freedoms().get(&id).copied().unwrap_or(0) >= RIGID_BODY_FREEDOMS
    }

    /// Capped removals summed per component
    fn located_freedoms(&self) -> HashMap<ComponentId, u32> {
        let mut located = HashMap::new();
        for ((a, b), removed) in self.pair_removals() {
            let removed = removed.min(RIGID_BODY_FREEDOMS);
            for id in [a, b] {
                let sum = located.entry(id).or_insert(0u32);
                *sum = sum.saturating_add(removed);
            }
        }
        located
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use pm_cad::Part;

    fn with_components(count: usize) -> (Assembly, Vec<ComponentId>) {
        let mut assembly = Assembly::new("asm");
        let part = Part::new("p");
        let ids = (0..count)
            .map(|_| assembly.add_component(&part, Transform::IDENTITY))
            .collect();
        (assembly, ids)
    }

    #[test]
    fn test_empty_assembly() {
        let (assembly, _) = with_components(0);
        assert_eq!(assembly.degrees_of_freedom(), 0);
        assert!(!assembly.is_over_constrained());
        assert!(!assembly.is_under_constrained());
    }

    #[test]
    fn test_mate_then_flush_then_over_constrained() {
        let (mut assembly, ids) = with_components(2);
        let (a, b) = (ids[0], ids[1]);
        assert_eq!(assembly.degrees_of_freedom(), 12);

        assembly.create_mate(a, b, 0.0);
        assert_eq!(assembly.degrees_of_freedom(), 9);

        assembly.create_flush(a, b, 0.0);
        assert_eq!(assembly.degrees_of_freedom(), 8);
        assert!(!assembly.is_over_constrained());
        assert!(assembly.is_under_constrained());

        assembly.create_insert(a, b);
        assert!(assembly.is_over_constrained());
        assert_eq!(assembly.removed_freedoms_between(b, a), 6);
        assert_eq!(assembly.degrees_of_freedom(), 6);
    }

    #[test]
    fn test_invalid_mates_are_not_counted() {
        let (mut assembly, ids) = with_components(2);
        assembly.create_mate(ids[0], 99, 0.0);
        assembly.create_insert(ids[1], ids[1]);
        assert_eq!(assembly.degrees_of_freedom(), 12);
        assert!(!assembly.is_over_constrained());
    }

    #[test]
    fn test_fully_located() {
        let (mut assembly, ids) = with_components(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        assembly.create_insert(a, b);
        assembly.create_angle(a, b, 0.2);
        assert!(assembly.is_fully_located(a));
        assert!(assembly.is_fully_located(b));
        assert!(!assembly.is_fully_located(c));
        assert_eq!(assembly.degrees_of_freedom(), 12);
        assert!(assembly.is_under_constrained());

        assembly.create_insert(b, c);
        assembly.create_angle(c, b, 0.0);
        assert_eq!(assembly.degrees_of_freedom(), 6);
        assert!(!assembly.is_under_constrained());
    }

    #[test]
    fn test_pair_removal_capped() {
        let (mut assembly, ids) = with_components(2);
        assembly.create_insert(ids[0], ids[1]);
        assembly.create_parallel(ids[0], ids[1], 0.0);
        assert_eq!(assembly.degrees_of_freedom(), 6);
        assert!(assembly.is_over_constrained());
        assert!(!assembly.is_under_constrained());
    }

    #[test]
    fn test_stacked_mates_stay_bounded() {
        let (mut assembly, ids) = with_components(3);
        for _ in 0..1000 {
            assembly.create_insert(ids[0], ids[1]);
        }
        assert_eq!(assembly.removed_freedoms_between(ids[0], ids[1]), 6);
        assert_eq!(assembly.degrees_of_freedom(), 12);
        assert!(assembly.is_over_constrained());
        assert!(assembly.is_fully_located(ids[0]));
        assert!(!assembly.is_fully_located(ids[2]));
    }
}
