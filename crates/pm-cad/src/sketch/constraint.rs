//! Sketch Constraints
//!
//! Defines geometric and dimensional constraints between sketch entities.
//! A constraint references entities by id; the referenced entities may not
//! exist yet (or any more), which the constraint pass tolerates.

use serde::{Deserialize, Serialize};

/// Kind of sketch constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    // ============== Geometric Constraints ==============
    /// Two points at the same location
    Coincident,
    /// Second entity level with the first
    Horizontal,
    /// Second entity plumb with the first
    Vertical,
    Parallel,
    Perpendicular,
    Tangent,
    Equal,
    Symmetric,
    /// Entity locked in place
    Fixed,

    // ============== Dimensional Constraints ==============
    /// Distance between two entities
    Distance,
    /// Angle between two entities, in degrees
    Angle,
}

impl ConstraintKind {
    /// Get the constraint type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstraintKind::Coincident => "Coincident",
            ConstraintKind::Horizontal => "Horizontal",
            ConstraintKind::Vertical => "Vertical",
            ConstraintKind::Parallel => "Parallel",
            ConstraintKind::Perpendicular => "Perpendicular",
            ConstraintKind::Tangent => "Tangent",
            ConstraintKind::Equal => "Equal",
            ConstraintKind::Symmetric => "Symmetric",
            ConstraintKind::Fixed => "Fixed",
            ConstraintKind::Distance => "Distance",
            ConstraintKind::Angle => "Angle",
        }
    }

    /// Degrees of freedom this constraint removes from the sketch
    pub fn removed_freedoms(&self) -> u32 {
        match self {
            ConstraintKind::Coincident | ConstraintKind::Symmetric | ConstraintKind::Fixed => 2,
            _ => 1,
        }
    }

    /// Check if this is a dimensional constraint (has a value)
    pub fn is_dimensional(&self) -> bool {
        matches!(self, ConstraintKind::Distance | ConstraintKind::Angle)
    }
}

/// A constraint between up to two sketch entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint kind
    pub kind: ConstraintKind,
    /// Anchor entity id
    pub a: String,
    /// Driven entity id; empty for single-entity constraints
    #[serde(default)]
    pub b: String,
    /// Dimension for dimensional constraints
    #[serde(default)]
    pub value: f64,
}

impl Constraint {
    /// Create a constraint of any kind
    pub fn new(kind: ConstraintKind, a: impl Into<String>, b: impl Into<String>, value: f64) -> Self {
        Self {
            kind,
            a: a.into(),
            b: b.into(),
            value,
        }
    }

    /// Create a coincident constraint
    pub fn coincident(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Coincident, a, b, 0.0)
    }

    /// Create a horizontal constraint
    pub fn horizontal(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Horizontal, a, b, 0.0)
    }

    /// Create a vertical constraint
    pub fn vertical(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Vertical, a, b, 0.0)
    }

    /// Create a distance constraint
    pub fn distance(a: impl Into<String>, b: impl Into<String>, distance: f64) -> Self {
        Self::new(ConstraintKind::Distance, a, b, distance)
    }

    /// Create an angle constraint (degrees)
    pub fn angle(a: impl Into<String>, b: impl Into<String>, degrees: f64) -> Self {
        Self::new(ConstraintKind::Angle, a, b, degrees)
    }

    /// Create a parallel constraint
    pub fn parallel(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Parallel, a, b, 0.0)
    }

    /// Create a perpendicular constraint
    pub fn perpendicular(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Perpendicular, a, b, 0.0)
    }

    /// Create a tangent constraint
    pub fn tangent(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Tangent, a, b, 0.0)
    }

    /// Create an equal constraint
    pub fn equal(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Equal, a, b, 0.0)
    }

    /// Create a symmetric constraint
    pub fn symmetric(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Symmetric, a, b, 0.0)
    }

    /// Create a fixed constraint on a single entity
    pub fn fixed(a: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Fixed, a, String::new(), 0.0)
    }

    /// Get the constraint type name for display
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Non-empty entity ids referenced by this constraint
    pub fn referenced_ids(&self) -> impl Iterator<Item = &str> {
        [self.a.as_str(), self.b.as_str()]
            .into_iter()
            .filter(|id| !id.is_empty())
    }

    /// Check if this constraint references an entity
    pub fn references(&self, id: &str) -> bool {
        self.referenced_ids().any(|r| r == id)
    }
}
