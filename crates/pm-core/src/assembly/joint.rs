//! Kinematic joints between components
//!
//! Joints describe the motion allowed between two components. They are
//! bookkeeping for motion studies: the mate pass does not read them.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{Assembly, AssemblyError, ComponentId};

/// Joint type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JointKind {
    #[default]
    Rigid,
    /// Rotation about the axis
    Revolute,
    /// Translation along the axis
    Slider,
    /// Rotation and translation along the same axis
    Cylindrical,
    /// Motion in the plane normal to the axis
    Planar,
    /// Rotation about the axis plus translation along the slot
    PinSlot,
}

impl JointKind {
    /// Get display name; also the prefix of generated joint names
    pub fn type_name(&self) -> &'static str {
        match self {
            JointKind::Rigid => "Rigid",
            JointKind::Revolute => "Revolute",
            JointKind::Slider => "Slider",
            JointKind::Cylindrical => "Cylindrical",
            JointKind::Planar => "Planar",
            JointKind::PinSlot => "PinSlot",
        }
    }

    /// Degrees of freedom the joint allows
    pub fn degrees_of_freedom(&self) -> u32 {
        match self {
            JointKind::Rigid => 0,
            JointKind::Revolute | JointKind::Slider => 1,
            JointKind::Cylindrical | JointKind::PinSlot => 2,
            JointKind::Planar => 3,
        }
    }

    /// Check if this joint type takes limits
    pub fn has_limits(&self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Slider | JointKind::PinSlot)
    }
}

/// Joint position limits (radians or length units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub lower: f64,
    pub upper: f64,
}

impl JointLimits {
    /// Create limits; the bounds are swapped if given in reverse
    pub fn new(lower: f64, upper: f64) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, position: f64) -> bool {
        (self.lower..=self.upper).contains(&position)
    }

    /// Clamp a joint position into the limits
    pub fn clamp(&self, position: f64) -> f64 {
        position.clamp(self.lower, self.upper)
    }
}

/// A joint between two components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Name, unique within the assembly; assigned when the joint is added
    #[serde(default)]
    pub name: String,
    pub component_a: ComponentId,
    pub component_b: ComponentId,
    pub kind: JointKind,
    /// Unit axis (normal for planar joints)
    pub axis: DVec3,
    /// Pivot point
    #[serde(default)]
    pub origin: DVec3,
    /// Unit slot direction (pin-slot only)
    pub slot_direction: DVec3,
    #[serde(default)]
    pub limits: Option<JointLimits>,
}

impl Joint {
    /// Create an unnamed joint; a zero axis falls back to +Z
    pub fn new(component_a: ComponentId, component_b: ComponentId, kind: JointKind, axis: DVec3) -> Self {
        Self {
            name: String::new(),
            component_a,
            component_b,
            kind,
            axis: axis.normalize_or(DVec3::Z),
            origin: DVec3::ZERO,
            slot_direction: DVec3::X,
            limits: None,
        }
    }

    /// Builder: set the pivot point
    pub fn with_origin(mut self, origin: DVec3) -> Self {
        self.origin = origin;
        self
    }

    /// Builder: set the slot direction; a zero vector falls back to +X
    pub fn with_slot_direction(mut self, slot: DVec3) -> Self {
        self.slot_direction = slot.normalize_or(DVec3::X);
        self
    }

    /// Builder: set the limits
    pub fn with_limits(mut self, limits: Option<JointLimits>) -> Self {
        self.limits = limits;
        self
    }

    pub fn degrees_of_freedom(&self) -> u32 {
        self.kind.degrees_of_freedom()
    }
}

impl Assembly {
    /// Append a joint and return its generated name
    pub fn add_joint(&mut self, mut joint: Joint) -> String {
        loop {
            let name = self.joint_ids.next_id(&format!("{}_", joint.kind.type_name()));
            if self.find_joint(&name).is_none() {
                joint.name = name;
                break;
            }
        }
        tracing::debug!(
            "Assembly '{}': added joint {} between {} and {}",
            self.name,
            joint.name,
            joint.component_a,
            joint.component_b
        );
        let name = joint.name.clone();
        self.joints.push(joint);
        name
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Find a joint by name
    pub fn find_joint(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Remove a joint by name
    pub fn remove_joint(&mut self, name: &str) -> Result<Joint, AssemblyError> {
        let index = self
            .joints
            .iter()
            .position(|j| j.name == name)
            .ok_or_else(|| AssemblyError::JointNotFound(name.to_string()))?;
        Ok(self.joints.remove(index))
    }

    /// Revolute joint about `axis`
    pub fn create_revolute(
        &mut self,
        a: ComponentId,
        b: ComponentId,
        axis: DVec3,
        limits: Option<JointLimits>,
    ) -> String {
        self.add_joint(Joint::new(a, b, JointKind::Revolute, axis).with_limits(limits))
    }

    /// Slider joint along `axis`
    pub fn create_slider(
        &mut self,
        a: ComponentId,
        b: ComponentId,
        axis: DVec3,
        limits: Option<JointLimits>,
    ) -> String {
        self.add_joint(Joint::new(a, b, JointKind::Slider, axis).with_limits(limits))
    }

    /// Cylindrical joint along `axis`
    pub fn create_cylindrical(&mut self, a: ComponentId, b: ComponentId, axis: DVec3) -> String {
        self.add_joint(Joint::new(a, b, JointKind::Cylindrical, axis))
    }

    /// Planar joint in the plane with the given normal
    pub fn create_planar(&mut self, a: ComponentId, b: ComponentId, normal: DVec3) -> String {
        self.add_joint(Joint::new(a, b, JointKind::Planar, normal))
    }

    /// Pin-slot joint: rotation about `axis`, translation along `slot`
    pub fn create_pin_slot(
        &mut self,
        a: ComponentId,
        b: ComponentId,
        axis: DVec3,
        slot: DVec3,
        limits: Option<JointLimits>,
    ) -> String {
        self.add_joint(
            Joint::new(a, b, JointKind::PinSlot, axis)
                .with_slot_direction(slot)
                .with_limits(limits),
        )
    }

    /// Degrees of freedom allowed by all joints
    pub fn joint_degrees_of_freedom(&self) -> u32 {
        self.joints.iter().map(Joint::degrees_of_freedom).sum()
    }

    /// Check that every joint references two distinct existing components
    pub fn validate_joints(&self) -> Result<(), Vec<AssemblyError>> {
        let mut errors = Vec::new();

        for joint in &self.joints {
            for component in [joint.component_a, joint.component_b] {
                if !self.contains_component(component) {
                    errors.push(AssemblyError::MissingComponent {
                        name: joint.name.clone(),
                        component,
                    });
                }
            }
            if joint.component_a == joint.component_b {
                errors.push(AssemblyError::SelfReference(joint.name.clone()));
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
    fn test_joint_names_per_assembly_counter() {
        let (mut assembly, a, b) = two_components();
        let r = assembly.create_revolute(a, b, DVec3::Z, Some(JointLimits::new(-1.0, 1.0)));
        let s = assembly.create_slider(a, b, DVec3::X, None);
        assert_eq!(r, "Revolute_1");
        assert_eq!(s, "Slider_2");
        // mates keep their own counter
        assert_eq!(assembly.create_mate(a, b, 0.0), "Mate_1");
    }

    #[test]
    fn test_joint_degrees_of_freedom() {
        let (mut assembly, a, b) = two_components();
        assert_eq!(assembly.joint_degrees_of_freedom(), 0);
        assembly.add_joint(Joint::new(a, b, JointKind::Rigid, DVec3::Z));
        assembly.create_revolute(a, b, DVec3::Z, None);
        assembly.create_cylindrical(a, b, DVec3::Y);
        assembly.create_planar(a, b, DVec3::Z);
        assembly.create_pin_slot(a, b, DVec3::Z, DVec3::X, None);
        assert_eq!(assembly.joint_degrees_of_freedom(), 1 + 2 + 3 + 2);
    }

    #[test]
    fn test_axes_normalized() {
        let (mut assembly, a, b) = two_components();
        let name = assembly.create_pin_slot(
            a,
            b,
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::ZERO,
            None,
        );
        let joint = assembly.find_joint(&name).unwrap();
        assert_eq!(joint.axis, DVec3::Z);
        assert_eq!(joint.slot_direction, DVec3::X);

        let joint = Joint::new(a, b, JointKind::Slider, DVec3::ZERO).with_origin(DVec3::ONE);
        assert_eq!(joint.axis, DVec3::Z);
        assert_eq!(joint.origin, DVec3::ONE);
    }

    #[test]
    fn test_limits() {
        let limits = JointLimits::new(2.0, -2.0);
        assert_eq!(limits.lower, -2.0);
        assert_eq!(limits.range(), 4.0);
        assert!(limits.contains(0.0));
        assert!(!limits.contains(2.5));
        assert_eq!(limits.clamp(3.0), 2.0);
        assert!(JointKind::Revolute.has_limits());
        assert!(!JointKind::Planar.has_limits());
    }

    #[test]
    fn test_remove_and_validate() {
        let (mut assembly, a, b) = two_components();
        let r = assembly.create_revolute(a, b, DVec3::Z, None);
        let bad = assembly.create_slider(a, 50, DVec3::X, None);

        assert_eq!(
            assembly.validate_joints(),
            Err(vec![AssemblyError::MissingComponent {
                name: bad.clone(),
                component: 50
            }])
        );
        assert!(assembly.validate().is_err());

        assembly.remove_joint(&bad).unwrap();
        assert!(assembly.validate().is_ok());
        assert!(assembly.find_joint(&r).is_some());
        assert_eq!(
            assembly.remove_joint(&bad),
            Err(AssemblyError::JointNotFound(bad))
        );
    }
}
