//! Mate Pass
//!
//! Mates are applied once, in insertion order. Each step moves component B
//! relative to the current (possibly just updated) transform of component
//! A. Every built-in step is a direct assignment, so running the pass twice
//! gives the same result as running it once.

use std::collections::BTreeMap;
use std::fmt;

use glam::{DQuat, DVec3};

use super::{Assembly, MateConstraint, MateKind};
use crate::transform::Transform;
use pm_cad::PassReport;

/// Values shared by every step of one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MateContext {
    /// Unit mate axis
    pub axis: DVec3,
    /// Distances at or below this are not rescaled
    pub distance_epsilon: f64,
}

/// Enforcement step for one mate kind
pub type MateStep = fn(&MateConstraint, &Transform, &mut Transform, &MateContext);

/// Ordered mate pass with a step per mate kind
#[derive(Clone)]
pub struct MateSolver {
    steps: BTreeMap<MateKind, MateStep>,
}

impl fmt::Debug for MateSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MateSolver")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for MateSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MateSolver {
    /// Create a pass with every positional mate kind registered
    pub fn new() -> Self {
        Self {
            steps: BTreeMap::new(),
        }
        .with_step(MateKind::Mate, apply_mate)
        .with_step(MateKind::Flush, apply_flush)
        .with_step(MateKind::Tangent, apply_flush)
        .with_step(MateKind::Angle, apply_angle)
        .with_step(MateKind::Concentric, apply_concentric)
        .with_step(MateKind::Insert, apply_insert)
        .with_step(MateKind::Parallel, apply_parallel)
        .with_step(MateKind::Distance, apply_distance)
    }

    /// Register (or replace) the step for a kind
    pub fn with_step(mut self, kind: MateKind, step: MateStep) -> Self {
        self.steps.insert(kind, step);
        self
    }

    /// Drop the step for a kind
    pub fn without_step(mut self, kind: MateKind) -> Self {
        self.steps.remove(&kind);
        self
    }

    /// Check if a kind is enforced
    pub fn has_step(&self, kind: MateKind) -> bool {
        self.steps.contains_key(&kind)
    }

    /// Apply every mate of the assembly once, in order
    ///
    /// Mates naming a missing component are listed as dangling and the pass
    /// carries on with the rest. Mates without a step, or relating a
    /// component to itself, are skipped.
    pub fn solve(&self, assembly: &mut Assembly) -> PassReport {
        let mut report = PassReport::default();
        let context = MateContext {
            axis: assembly.mate_axis,
            distance_epsilon: assembly.distance_epsilon,
        };

        for index in 0..assembly.mates.len() {
            let mate = &assembly.mates[index];

            let (Some(ia), Some(ib)) = (
                assembly.component_position(mate.component_a),
                assembly.component_position(mate.component_b),
            ) else {
                tracing::warn!(
                    "Assembly '{}': {} references a missing component",
                    assembly.name,
                    mate.name
                );
                report.dangling.push(index);
                continue;
            };

            let Some(step) = self.steps.get(&mate.kind) else {
                tracing::trace!("Assembly '{}': no step for {}", assembly.name, mate.name);
                report.skipped += 1;
                continue;
            };

            if ia == ib {
                tracing::debug!("Assembly '{}': {} relates a component to itself", assembly.name, mate.name);
                report.skipped += 1;
                continue;
            }

            let anchor = assembly.components[ia].transform;
            step(mate, &anchor, &mut assembly.components[ib].transform, &context);
            report.applied += 1;
        }

        report
    }
}

impl Assembly {
    /// Run the default mate pass
    pub fn solve_mates(&mut self) -> PassReport {
        MateSolver::new().solve(self)
    }

    /// Run a custom mate pass
    pub fn solve_mates_with(&mut self, solver: &MateSolver) -> PassReport {
        solver.solve(self)
    }
}

// ============== Steps ==============

/// Place B's origin at A's origin plus `value` along the axis
pub fn apply_mate(mate: &MateConstraint, anchor: &Transform, target: &mut Transform, ctx: &MateContext) {
    target.translation = anchor.translation + ctx.axis * mate.value;
}

/// Set B's offset from A along the axis to `value`, keeping the other components
pub fn apply_flush(mate: &MateConstraint, anchor: &Transform, target: &mut Transform, ctx: &MateContext) {
    let desired = anchor.translation.dot(ctx.axis) + mate.value;
    let current = target.translation.dot(ctx.axis);
    target.translation += ctx.axis * (desired - current);
}

/// Orient B as A rotated by `value` radians about the axis
pub fn apply_angle(mate: &MateConstraint, anchor: &Transform, target: &mut Transform, ctx: &MateContext) {
    target.rotation = (DQuat::from_axis_angle(ctx.axis, mate.value) * anchor.rotation).normalize();
}

/// Put B on A's axis line, keeping B's position along the axis
pub fn apply_concentric(
    _mate: &MateConstraint,
    anchor: &Transform,
    target: &mut Transform,
    ctx: &MateContext,
) {
    let along = target.translation.dot(ctx.axis);
    let anchor_along = anchor.translation.dot(ctx.axis);
    target.translation = anchor.translation + ctx.axis * (along - anchor_along);
}

/// Concentric followed by flush
pub fn apply_insert(mate: &MateConstraint, anchor: &Transform, target: &mut Transform, ctx: &MateContext) {
    apply_concentric(mate, anchor, target, ctx);
    apply_flush(mate, anchor, target, ctx);
}

/// Copy A's orientation; a non-zero value also sets the planar offset
pub fn apply_parallel(mate: &MateConstraint, anchor: &Transform, target: &mut Transform, ctx: &MateContext) {
    target.rotation = anchor.rotation;
    if mate.value.abs() > ctx.distance_epsilon {
        apply_flush(mate, anchor, target, ctx);
    }
}

/// Rescale the A→B vector to length `value`
pub fn apply_distance(mate: &MateConstraint, anchor: &Transform, target: &mut Transform, ctx: &MateContext) {
    let delta = target.translation - anchor.translation;
    let length = delta.length();
    if length > ctx.distance_epsilon {
        target.translation = anchor.translation + delta * (mate.value / length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::ComponentId;
    use approx::assert_abs_diff_eq;
    use pm_cad::Part;
    use std::f64::consts::FRAC_PI_2;

    fn placed(b_at: DVec3) -> (Assembly, ComponentId, ComponentId) {
        let mut assembly = Assembly::new("asm");
        let part = Part::new("p");
        let a = assembly.add_component(
            &part,
            Transform::from_translation(DVec3::new(1.0, 2.0, 3.0)),
        );
        let b = assembly.add_component(&part, Transform::from_translation(b_at));
        (assembly, a, b)
    }

    fn position(assembly: &Assembly, id: ComponentId) -> DVec3 {
        assembly.find_component(id).unwrap().transform.translation
    }

    fn assert_vec_eq(actual: DVec3, expected: DVec3) {
        assert_abs_diff_eq!(actual.distance(expected), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mate_coincides_with_offset() {
        let (mut assembly, a, b) = placed(DVec3::new(9.0, 9.0, 9.0));
        assembly.create_mate(a, b, 2.0);
        let report = assembly.solve_mates();
        assert!(report.is_complete());
        assert_eq!(report.applied, 1);
        assert_vec_eq(position(&assembly, b), DVec3::new(3.0, 2.0, 3.0));
        assert_vec_eq(position(&assembly, a), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_flush_moves_only_along_axis() {
        let (mut assembly, a, b) = placed(DVec3::new(9.0, 8.0, 7.0));
        assembly.set_mate_axis(DVec3::Z).unwrap();
        assembly.create_flush(a, b, 0.5);
        assembly.solve_mates();
        assert_vec_eq(position(&assembly, b), DVec3::new(9.0, 8.0, 3.5));
    }

    #[test]
    fn test_concentric_and_insert() {
        let (mut assembly, a, b) = placed(DVec3::new(9.0, 8.0, 7.0));
        assembly.set_mate_axis(DVec3::Z).unwrap();
        assembly.create_concentric(a, b, 0.0);
        assembly.solve_mates();
        assert_vec_eq(position(&assembly, b), DVec3::new(1.0, 2.0, 7.0));

        let (mut assembly, a, b) = placed(DVec3::new(9.0, 8.0, 7.0));
        assembly.set_mate_axis(DVec3::Z).unwrap();
        assembly.create_insert(a, b);
        assembly.solve_mates();
        assert_vec_eq(position(&assembly, b), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_angle_rotates_about_axis() {
        let (mut assembly, a, b) = placed(DVec3::ZERO);
        assembly.set_mate_axis(DVec3::Z).unwrap();
        assembly.create_angle(a, b, FRAC_PI_2);
        assembly.solve_mates();

        let rotation = assembly.find_component(b).unwrap().transform.rotation;
        assert_vec_eq(rotation * DVec3::X, DVec3::Y);
    }

    #[test]
    fn test_parallel_copies_orientation() {
        let mut assembly = Assembly::new("asm");
        let part = Part::new("p");
        let tilted = Transform::new(DQuat::from_rotation_y(0.3), DVec3::ZERO);
        let a = assembly.add_component(&part, tilted);
        let b = assembly.add_component(&part, Transform::from_translation(DVec3::new(4.0, 1.0, 0.0)));
        assembly.create_parallel(a, b, 0.0);
        assembly.solve_mates();

        let moved = assembly.find_component(b).unwrap().transform;
        assert_eq!(moved.rotation, tilted.rotation);
        assert_vec_eq(moved.translation, DVec3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn test_distance_rescales() {
        let (mut assembly, a, b) = placed(DVec3::new(1.0, 2.0, 13.0));
        assembly.create_distance(a, b, 4.0);
        assembly.solve_mates();
        assert_vec_eq(position(&assembly, b), DVec3::new(1.0, 2.0, 7.0));
    }

    #[test]
    fn test_pass_is_idempotent() {
        let (mut assembly, a, b) = placed(DVec3::new(5.0, -4.0, 2.0));
        assembly.create_flush(a, b, 1.0);
        assembly.create_concentric(a, b, 0.0);
        assembly.create_angle(a, b, 0.4);

        assembly.solve_mates();
        let once = assembly.clone();
        assembly.solve_mates();
        let twice = assembly.find_component(b).unwrap().transform;
        let first = once.find_component(b).unwrap().transform;
        assert_vec_eq(twice.translation, first.translation);
        assert_abs_diff_eq!(twice.rotation.dot(first.rotation).abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_component_reports_incomplete_but_applies_rest() {
        let (mut assembly, a, b) = placed(DVec3::new(9.0, 9.0, 9.0));
        assembly.create_mate(a, 77, 0.0);
        assembly.create_mate(a, b, 0.0);

        let report = assembly.solve_mates();
        assert!(!report.is_complete());
        assert_eq!(report.dangling, vec![0]);
        assert_eq!(report.applied, 1);
        assert_vec_eq(position(&assembly, b), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_motion_and_self_mates_are_skipped() {
        let (mut assembly, a, b) = placed(DVec3::new(9.0, 9.0, 9.0));
        assembly.create_gear(a, b, -0.5);
        assembly.create_cam(a, b, 0.1);
        assembly.create_mate(b, b, 1.0);

        let report = assembly.solve_mates();
        assert!(report.is_complete());
        assert_eq!(report.skipped, 3);
        assert_vec_eq(position(&assembly, b), DVec3::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn test_custom_step() {
        fn lift(_m: &MateConstraint, anchor: &Transform, target: &mut Transform, _c: &MateContext) {
            target.translation = anchor.translation + DVec3::Z * 100.0;
        }

        let (mut assembly, a, b) = placed(DVec3::ZERO);
        assembly.create_gear(a, b, 1.0);
        let solver = MateSolver::new().with_step(MateKind::Gear, lift);
        assert!(solver.has_step(MateKind::Gear));

        assembly.solve_mates_with(&solver);
        assert_vec_eq(position(&assembly, b), DVec3::new(1.0, 2.0, 103.0));

        let solver = MateSolver::new().without_step(MateKind::Mate);
        assert!(!solver.has_step(MateKind::Mate));
    }
}
