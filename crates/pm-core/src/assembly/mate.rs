//! Mate constraints between components

use serde::{Deserialize, Serialize};

use super::{Assembly, AssemblyError, ComponentId};

/// Kind of mate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MateKind {
    /// Point coincidence, offset along the mate axis
    Mate,
    /// Planar coincidence with an offset
    Flush,
    /// Rotation about the mate axis (radians)
    Angle,
    /// Concentric plus flush, e.g. a bolt in a hole
    Insert,
    /// Shared axis
    Concentric,
    Tangent,
    /// Same orientation, optional planar offset
    Parallel,
    /// Fixed distance between origins
    Distance,
    /// Coupled rotation; value is the ratio
    Gear,
    /// Cam follower; value is the phase offset (radians)
    Cam,
}

impl MateKind {
    /// Get the kind name; also the prefix of generated mate names
    pub fn type_name(&self) -> &'static str {
        match self {
            MateKind::Mate => "Mate",
            MateKind::Flush => "Flush",
            MateKind::Angle => "Angle",
            MateKind::Insert => "Insert",
            MateKind::Concentric => "Concentric",
            MateKind::Tangent => "Tangent",
            MateKind::Parallel => "Parallel",
            MateKind::Distance => "Distance",
            MateKind::Gear => "Gear",
            MateKind::Cam => "Cam",
        }
    }

    /// Degrees of freedom removed between the two components
    pub fn removed_freedoms(&self) -> u32 {
        match self {
            MateKind::Mate => 3,
            MateKind::Flush => 1,
            MateKind::Angle => 1,
            MateKind::Insert => 5,
            MateKind::Concentric => 4,
            MateKind::Tangent => 1,
            MateKind::Parallel => 2,
            MateKind::Distance => 1,
            MateKind::Gear | MateKind::Cam => 1,
        }
    }
}

/// A mate between two components
///
/// `component_b` is moved relative to `component_a` by the mate pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MateConstraint {
    /// Name, unique within the assembly; assigned when the mate is added
    #[serde(default)]
    pub name: String,
    pub component_a: ComponentId,
    pub component_b: ComponentId,
    pub kind: MateKind,
    #[serde(default)]
    pub value: f64,
}

impl MateConstraint {
    /// Create an unnamed mate
    pub fn new(component_a: ComponentId, component_b: ComponentId, kind: MateKind, value: f64) -> Self {
        Self {
            name: String::new(),
            component_a,
            component_b,
            kind,
            value,
        }
    }

    /// Check if the mate involves a component
    pub fn involves(&self, id: ComponentId) -> bool {
        self.component_a == id || self.component_b == id
    }

    /// Component pair with the smaller id first
    pub fn pair(&self) -> (ComponentId, ComponentId) {
        if self.component_a <= self.component_b {
            (self.component_a, self.component_b)
        } else {
            (self.component_b, self.component_a)
        }
    }
}

impl Assembly {
    /// Append a mate and return its generated name
    ///
    /// Component ids are not checked here: mates may be loaded before the
    /// components they reference. See [`Assembly::validate_mates`].
    pub fn add_mate(&mut self, mut mate: MateConstraint) -> String {
        loop {
            let name = self.mate_ids.next_id(&format!("{}_", mate.kind.type_name()));
            if self.find_mate(&name).is_none() {
                mate.name = name;
                break;
            }
        }
        tracing::debug!(
            "Assembly '{}': added {} between {} and {}",
            self.name,
            mate.name,
            mate.component_a,
            mate.component_b
        );
        let name = mate.name.clone();
        self.mates.push(mate);
        name
    }

    /// Mates in application order
    pub fn mates(&self) -> &[MateConstraint] {
        &self.mates
    }

    /// Find a mate by name
    pub fn find_mate(&self, name: &str) -> Option<&MateConstraint> {
        self.mates.iter().find(|m| m.name == name)
    }

    /// Remove a mate by name
    pub fn remove_mate(&mut self, name: &str) -> Result<MateConstraint, AssemblyError> {
        let index = self
            .mates
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| AssemblyError::MateNotFound(name.to_string()))?;
        Ok(self.mates.remove(index))
    }

    fn push_mate(&mut self, a: ComponentId, b: ComponentId, kind: MateKind, value: f64) -> String {
        self.add_mate(MateConstraint::new(a, b, kind, value))
    }

    /// Point mate with an offset along the mate axis
    pub fn create_mate(&mut self, a: ComponentId, b: ComponentId, offset: f64) -> String {
        self.push_mate(a, b, MateKind::Mate, offset)
    }

    /// Flush mate with a planar offset
    pub fn create_flush(&mut self, a: ComponentId, b: ComponentId, offset: f64) -> String {
        self.push_mate(a, b, MateKind::Flush, offset)
    }

    /// Angle mate (radians)
    pub fn create_angle(&mut self, a: ComponentId, b: ComponentId, angle: f64) -> String {
        self.push_mate(a, b, MateKind::Angle, angle)
    }

    /// Insert mate (concentric and flush with no offset)
    pub fn create_insert(&mut self, a: ComponentId, b: ComponentId) -> String {
        self.push_mate(a, b, MateKind::Insert, 0.0)
    }

    /// Concentric mate
    pub fn create_concentric(&mut self, a: ComponentId, b: ComponentId, offset: f64) -> String {
        self.push_mate(a, b, MateKind::Concentric, offset)
    }

    /// Tangent mate
    pub fn create_tangent(&mut self, a: ComponentId, b: ComponentId, offset: f64) -> String {
        self.push_mate(a, b, MateKind::Tangent, offset)
    }

    /// Parallel mate with an optional planar distance
    pub fn create_parallel(&mut self, a: ComponentId, b: ComponentId, distance: f64) -> String {
        self.push_mate(a, b, MateKind::Parallel, distance)
    }

    /// Distance mate between component origins
    pub fn create_distance(&mut self, a: ComponentId, b: ComponentId, distance: f64) -> String {
        self.push_mate(a, b, MateKind::Distance, distance)
    }

    /// Gear mate with a transmission ratio
    pub fn create_gear(&mut self, a: ComponentId, b: ComponentId, ratio: f64) -> String {
        self.push_mate(a, b, MateKind::Gear, ratio)
    }

    /// Cam mate with a phase offset (radians)
    pub fn create_cam(&mut self, a: ComponentId, b: ComponentId, phase_offset: f64) -> String {
        self.push_mate(a, b, MateKind::Cam, phase_offset)
    }

    /// Check that every mate references two distinct existing components
    ///
    /// Invalid mates are reported but kept.
    pub fn validate_mates(&self) -> Result<(), Vec<AssemblyError>> {
        let mut errors = Vec::new();

        for mate in &self.mates {
            for component in [mate.component_a, mate.component_b] {
                if !self.contains_component(component) {
                    errors.push(AssemblyError::MissingComponent {
                        name: mate.name.clone(),
                        component,
                    });
                }
            }
            if mate.component_a == mate.component_b {
                errors.push(AssemblyError::SelfReference(mate.name.clone()));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use pm_cad::Part;

    fn two_components() -> (Assembly, ComponentId, ComponentId) {
        let mut assembly = Assembly::new("asm");
        let part = Part::new("p");
        let a = assembly.add_component(&part, Transform::IDENTITY);
        let b = assembly.add_component(&part, Transform::IDENTITY);
        (assembly, a, b)
    }

    #[test]
    fn test_mate_names_are_unique() {
        let (mut assembly, a, b) = two_components();
        let m1 = assembly.create_mate(a, b, 0.0);
        let m2 = assembly.create_flush(a, b, 1.0);
        let m3 = assembly.create_insert(a, b);
        assert_eq!(m1, "Mate_1");
        assert_eq!(m2, "Flush_2");
        assert_eq!(m3, "Insert_3");
        assert_eq!(assembly.mates().len(), 3);
        assert_eq!(assembly.find_mate(&m2).unwrap().value, 1.0);
    }

    #[test]
    fn test_removed_name_not_reused() {
        let (mut assembly, a, b) = two_components();
        let m1 = assembly.create_mate(a, b, 0.0);
        let removed = assembly.remove_mate(&m1).unwrap();
        assert_eq!(removed.kind, MateKind::Mate);
        assert!(matches!(
            assembly.remove_mate(&m1),
            Err(AssemblyError::MateNotFound(_))
        ));
        assert_eq!(assembly.create_mate(a, b, 0.0), "Mate_2");
    }

    #[test]
    fn test_removed_freedoms() {
        assert_eq!(MateKind::Mate.removed_freedoms(), 3);
        assert_eq!(MateKind::Flush.removed_freedoms(), 1);
        assert_eq!(MateKind::Angle.removed_freedoms(), 1);
        assert_eq!(MateKind::Insert.removed_freedoms(), 5);
        assert_eq!(MateKind::Concentric.removed_freedoms(), 4);
        assert_eq!(MateKind::Parallel.removed_freedoms(), 2);
        assert_eq!(MateKind::Gear.removed_freedoms(), 1);
    }

    #[test]
    fn test_pair_is_ordered() {
        let mate = MateConstraint::new(5, 2, MateKind::Flush, 0.0);
        assert_eq!(mate.pair(), (2, 5));
        assert!(mate.involves(5));
        assert!(!mate.involves(3));
    }

    #[test]
    fn test_validate_reports_but_keeps_invalid_mates() {
        let (mut assembly, a, b) = two_components();
        assembly.create_mate(a, b, 0.0);
        let dangling = assembly.create_flush(a, 99, 0.0);
        let selfie = assembly.create_angle(b, b, 0.5);

        let errors = assembly.validate_mates().unwrap_err();
        assert_eq!(
            errors,
            vec![
                AssemblyError::MissingComponent {
                    name: dangling,
                    component: 99
                },
                AssemblyError::SelfReference(selfie),
            ]
        );
        assert_eq!(assembly.mates().len(), 3);
    }

    #[test]
    fn test_validate_ok() {
        let (mut assembly, a, b) = two_components();
        assembly.create_concentric(a, b, 0.0);
        assert!(assembly.validate_mates().is_ok());
        assert!(assembly.validate().is_ok());
    }
}
