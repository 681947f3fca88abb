//! Parametric Parts
//!
//! A part owns an ordered feature timeline, reference geometry, user
//! parameters, rules and configurations. The timeline order is the feature
//! history; the rollback position and suppression flags decide which
//! features take part in an evaluation without ever removing any.

mod parameters;
mod reference;
mod timeline;

pub use parameters::{Configuration, Rule, RuleReport};
pub use reference::{BaseAxis, BasePlane, CoordinateSystem, WorkAxis, WorkPlane, WorkPoint};
pub use timeline::RebuildReport;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expression::{ExpressionError, Parameter};
use crate::feature::Feature;
use crate::ids::IdGenerator;

/// Part-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PartError {
    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("A feature named '{0}' already exists")]
    DuplicateFeatureName(String),

    #[error("Index {index} out of range ({len} features)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration {index} out of range ({len} configurations)")]
    ConfigurationOutOfRange { index: usize, len: usize },

    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),
}

/// A parametric part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Unique identifier
    pub id: Uuid,
    /// Part name
    pub name: String,
    /// Ordered feature timeline
    features: Vec<Feature>,
    /// Last participating timeline index (None = evaluate all)
    rollback_position: Option<usize>,
    /// Work planes, axes, points and coordinate systems
    #[serde(default)]
    reference: reference::ReferenceGeometry,
    /// User parameters in declaration order
    #[serde(default)]
    user_parameters: Vec<Parameter>,
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    configurations: Vec<Configuration>,
    #[serde(default)]
    active_configuration: Option<usize>,
    /// Skeleton part this part is designed against (not owned)
    #[serde(default)]
    skeleton_part: Option<Uuid>,
    /// Shared counter for generated feature names
    feature_ids: IdGenerator,
    /// Shared counter for reference geometry ids
    reference_ids: IdGenerator,
}

impl Part {
    /// Create a new empty part
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            features: Vec::new(),
            rollback_position: None,
            reference: reference::ReferenceGeometry::default(),
            user_parameters: Vec::new(),
            rules: Vec::new(),
            configurations: Vec::new(),
            active_configuration: None,
            skeleton_part: None,
            feature_ids: IdGenerator::new(),
            reference_ids: IdGenerator::new(),
        }
    }

    /// The skeleton part this part references, if any
    pub fn skeleton_part(&self) -> Option<Uuid> {
        self.skeleton_part
    }

    /// Set or clear the skeleton part reference
    pub fn set_skeleton_part(&mut self, skeleton: Option<Uuid>) {
        self.skeleton_part = skeleton;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{BooleanOp, FeatureKind};

    #[test]
    fn test_part_creation() {
        let part = Part::new("Bracket");
        assert_eq!(part.name, "Bracket");
        assert!(part.features().is_empty());
        assert_eq!(part.rollback_position(), None);
        assert_eq!(part.skeleton_part(), None);
    }

    #[test]
    fn test_skeleton_reference() {
        let skeleton = Part::new("Skeleton");
        let mut part = Part::new("Body");
        part.set_skeleton_part(Some(skeleton.id));
        assert_eq!(part.skeleton_part(), Some(skeleton.id));
        part.set_skeleton_part(None);
        assert_eq!(part.skeleton_part(), None);
    }

    #[test]
    fn test_ron_round_trip_keeps_state() {
        let mut part = Part::new("Plate");
        part.add_user_parameter(Parameter::new("W", 40.0));
        let extrude = part.create_extrude("Sketch1", 5.0, false, BooleanOp::New);
        let hole = part.create_hole(3.0, 5.0, true);
        part.create_fillet(1.0, vec!["e1".into()]);
        part.set_feature_suppressed(&hole, true).unwrap();
        part.set_rollback_position(Some(1));
        part.add_work_plane_offset("", BasePlane::XY, 10.0);
        part.add_configuration(Configuration::new("Wide").with_override("W", 80.0));
        part.set_active_configuration(Some(0)).unwrap();

        let text = ron::ser::to_string_pretty(&part, ron::ser::PrettyConfig::default()).unwrap();
        let mut restored: Part = ron::from_str(&text).unwrap();

        assert_eq!(restored, part);
        assert_eq!(restored.rollback_position(), Some(1));
        assert_eq!(restored.is_feature_suppressed(&hole), Some(true));
        assert_eq!(restored.effective_parameters()["W"], 80.0);
        assert_eq!(restored.find_feature(&extrude).unwrap().kind(), FeatureKind::Extrude);

        // counters survive, so generated names continue where they left off
        assert_eq!(restored.create_shell(1.0, Vec::new()), "Shell4");
        assert_eq!(restored.add_work_point("", glam::DVec3::ZERO), "Point2");
    }
}
