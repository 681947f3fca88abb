//! Constraint Pass
//!
//! A single ordered pass of direct assignments. Each constraint moves the
//! `start` of its `b` entity relative to its `a` entity; `a` is the anchor
//! and never moves. There is no iteration to a fixed point, so constraint
//! order matters.
//!
//! Steps are looked up per kind in a table, so enforcement for the reserved
//! kinds can be registered without touching the pass itself.

use std::collections::BTreeMap;
use std::fmt;

use super::{Constraint, ConstraintKind, GeometryEntity, Sketch};
use crate::config::{DEFAULT_DISTANCE_EPSILON, ModelerConfig};
use crate::report::PassReport;

/// Values shared by every step of one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Distances at or below this are not rescaled
    pub distance_epsilon: f64,
}

/// Enforcement step for one constraint kind
///
/// Receives the constraint, a snapshot of the anchor and the driven entity.
pub type ConstraintStep = fn(&Constraint, &GeometryEntity, &mut GeometryEntity, &StepContext);

/// Direct-assignment constraint pass
#[derive(Clone)]
pub struct ConstraintSolver {
    steps: BTreeMap<ConstraintKind, ConstraintStep>,
    context: StepContext,
}

impl fmt::Debug for ConstraintSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSolver")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("context", &self.context)
            .finish()
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver {
    /// Create a pass enforcing Distance, Horizontal, Vertical and Coincident
    pub fn new() -> Self {
        let solver = Self {
            steps: BTreeMap::new(),
            context: StepContext {
                distance_epsilon: DEFAULT_DISTANCE_EPSILON,
            },
        };
        solver
            .with_step(ConstraintKind::Distance, apply_distance)
            .with_step(ConstraintKind::Horizontal, apply_horizontal)
            .with_step(ConstraintKind::Vertical, apply_vertical)
            .with_step(ConstraintKind::Coincident, apply_coincident)
    }

    /// Create the default pass with tolerances from a config
    pub fn from_config(config: &ModelerConfig) -> Self {
        Self::new().with_epsilon(config.distance_epsilon)
    }

    /// Set the degenerate-distance epsilon
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.context.distance_epsilon = epsilon;
        self
    }

    /// Register (or replace) the step for a kind
    pub fn with_step(mut self, kind: ConstraintKind, step: ConstraintStep) -> Self {
        self.steps.insert(kind, step);
        self
    }

    /// Drop the step for a kind, turning it into a no-op
    pub fn without_step(mut self, kind: ConstraintKind) -> Self {
        self.steps.remove(&kind);
        self
    }

    /// Check if a kind is enforced
    pub fn has_step(&self, kind: ConstraintKind) -> bool {
        self.steps.contains_key(&kind)
    }

    /// Apply every constraint of the sketch once, in order
    ///
    /// The pass itself never fails. Constraints whose kind has no step are
    /// counted as skipped; constraints whose `a` or `b` does not resolve are
    /// listed as dangling and left alone.
    pub fn solve(&self, sketch: &mut Sketch) -> PassReport {
        let mut report = PassReport::default();

        for index in 0..sketch.constraints.len() {
            let constraint = &sketch.constraints[index];

            let Some(step) = self.steps.get(&constraint.kind) else {
                report.skipped += 1;
                continue;
            };

            let (Some(&ia), Some(&ib)) = (
                sketch.index.get(&constraint.a),
                sketch.index.get(&constraint.b),
            ) else {
                tracing::debug!(
                    "Sketch '{}': {} constraint {} has a missing reference",
                    sketch.name,
                    constraint.type_name(),
                    index
                );
                report.dangling.push(index);
                continue;
            };

            let anchor = sketch.geometry[ia].clone();
            step(constraint, &anchor, &mut sketch.geometry[ib], &self.context);
            report.applied += 1;
        }

        report
    }
}

// ============== Steps ==============

/// Rescale `b.start` along the a→b vector so its length equals the value
pub fn apply_distance(
    constraint: &Constraint,
    anchor: &GeometryEntity,
    target: &mut GeometryEntity,
    context: &StepContext,
) {
    let delta = target.start - anchor.start;
    let length = delta.length();
    if length > context.distance_epsilon {
        target.start = anchor.start + delta * (constraint.value / length);
    }
}

/// Level `b.start` with `a.start`
pub fn apply_horizontal(
    _constraint: &Constraint,
    anchor: &GeometryEntity,
    target: &mut GeometryEntity,
    _context: &StepContext,
) {
    target.start.y = anchor.start.y;
}

/// Align `b.start` vertically with `a.start`
pub fn apply_vertical(
    _constraint: &Constraint,
    anchor: &GeometryEntity,
    target: &mut GeometryEntity,
    _context: &StepContext,
) {
    target.start.x = anchor.start.x;
}

/// Move `b.start` onto `a.start`
pub fn apply_coincident(
    _constraint: &Constraint,
    anchor: &GeometryEntity,
    target: &mut GeometryEntity,
    _context: &StepContext,
) {
    target.start = anchor.start;
}
