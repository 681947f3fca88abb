//! Feature Definitions
//!
//! A feature is the parametric description of one modeling operation in a
//! part's timeline. The description is handed to an external geometry
//! engine; nothing here produces solids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of modeling operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Extrude,
    Revolve,
    Loft,
    Sweep,
    Helix,
    Hole,
    Fillet,
    Chamfer,
    Shell,
    Draft,
    Mirror,
    Thread,
    Rib,
    Pattern,
    CircularPattern,
    PathPattern,
}

impl FeatureKind {
    /// Get the kind name; also the prefix of generated feature names
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureKind::Extrude => "Extrude",
            FeatureKind::Revolve => "Revolve",
            FeatureKind::Loft => "Loft",
            FeatureKind::Sweep => "Sweep",
            FeatureKind::Helix => "Helix",
            FeatureKind::Hole => "Hole",
            FeatureKind::Fillet => "Fillet",
            FeatureKind::Chamfer => "Chamfer",
            FeatureKind::Shell => "Shell",
            FeatureKind::Draft => "Draft",
            FeatureKind::Mirror => "Mirror",
            FeatureKind::Thread => "Thread",
            FeatureKind::Rib => "Rib",
            FeatureKind::Pattern => "Pattern",
            FeatureKind::CircularPattern => "CircularPattern",
            FeatureKind::PathPattern => "PathPattern",
        }
    }

    /// Check if the feature replicates another feature
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            FeatureKind::Pattern
                | FeatureKind::CircularPattern
                | FeatureKind::PathPattern
                | FeatureKind::Mirror
        )
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BooleanOp {
    /// Create new body
    #[default]
    New,
    /// Add to existing body
    Join,
    /// Remove from existing body
    Cut,
    /// Keep only intersection
    Intersect,
}

/// Kind-specific data of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureParams {
    /// Extrude a sketch profile
    Extrude {
        depth: f64,
        symmetric: bool,
        operation: BooleanOp,
        /// Wall thickness of a thin extrude
        thin_wall: Option<f64>,
    },

    /// Revolve a sketch profile around an axis
    Revolve {
        /// Angle in degrees
        angle: f64,
        /// Axis name (`X`, `Y`, `Z` or a work axis id)
        axis: String,
    },

    /// Loft through the primary sketch and these further sections, in order
    Loft { sections: Vec<String> },

    /// Sweep the primary sketch along a path sketch
    Sweep {
        path_sketch_id: String,
        twist_angle: f64,
        scale_factor: f64,
    },

    Helix {
        radius: f64,
        pitch: f64,
        revolutions: f64,
        clockwise: bool,
    },

    Hole {
        diameter: f64,
        depth: f64,
        through_all: bool,
    },

    Fillet { radius: f64, edge_ids: Vec<String> },

    Chamfer {
        distance1: f64,
        distance2: f64,
        angle: f64,
        edge_ids: Vec<String>,
    },

    Shell { thickness: f64, face_ids: Vec<String> },

    Draft {
        angle: f64,
        plane: String,
        face_ids: Vec<String>,
    },

    Mirror {
        base_feature: String,
        plane: String,
        merge_result: bool,
    },

    Thread {
        standard: String,
        pitch: f64,
        internal: bool,
    },

    Rib { thickness: f64, plane: String },

    /// Rectangular pattern of another feature
    Pattern {
        base_feature: String,
        counts: [u32; 3],
        spacings: [f64; 3],
    },

    CircularPattern {
        base_feature: String,
        count: u32,
        /// Total angle in degrees
        angle: f64,
        axis: String,
    },

    PathPattern {
        base_feature: String,
        path_sketch_id: String,
        count: u32,
        equal_spacing: bool,
    },
}

impl FeatureParams {
    /// The feature kind this data belongs to
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureParams::Extrude { .. } => FeatureKind::Extrude,
            FeatureParams::Revolve { .. } => FeatureKind::Revolve,
            FeatureParams::Loft { .. } => FeatureKind::Loft,
            FeatureParams::Sweep { .. } => FeatureKind::Sweep,
            FeatureParams::Helix { .. } => FeatureKind::Helix,
            FeatureParams::Hole { .. } => FeatureKind::Hole,
            FeatureParams::Fillet { .. } => FeatureKind::Fillet,
            FeatureParams::Chamfer { .. } => FeatureKind::Chamfer,
            FeatureParams::Shell { .. } => FeatureKind::Shell,
            FeatureParams::Draft { .. } => FeatureKind::Draft,
            FeatureParams::Mirror { .. } => FeatureKind::Mirror,
            FeatureParams::Thread { .. } => FeatureKind::Thread,
            FeatureParams::Rib { .. } => FeatureKind::Rib,
            FeatureParams::Pattern { .. } => FeatureKind::Pattern,
            FeatureParams::CircularPattern { .. } => FeatureKind::CircularPattern,
            FeatureParams::PathPattern { .. } => FeatureKind::PathPattern,
        }
    }
}

/// A parametric feature in a part timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Name, unique within the owning part
    pub name: String,
    /// Primary sketch id; empty when the feature has no profile
    #[serde(default)]
    pub sketch_id: String,
    /// Suppressed features stay in the timeline but are not evaluated
    #[serde(default)]
    pub suppressed: bool,
    /// Kind-specific data
    pub params: FeatureParams,
    /// Free-form named scalars
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl Feature {
    /// Create an unsuppressed feature
    pub fn new(name: impl Into<String>, sketch_id: impl Into<String>, params: FeatureParams) -> Self {
        Self {
            name: name.into(),
            sketch_id: sketch_id.into(),
            suppressed: false,
            params,
            parameters: BTreeMap::new(),
        }
    }

    /// Get the feature kind
    pub fn kind(&self) -> FeatureKind {
        self.params.kind()
    }

    /// Get the type name of this feature
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Check if the feature is suppressed
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Set the suppressed state
    pub fn set_suppressed(&mut self, value: bool) {
        self.suppressed = value;
    }

    /// Look up a free-form parameter
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Set a free-form parameter
    pub fn set_parameter(&mut self, name: impl Into<String>, value: f64) {
        self.parameters.insert(name.into(), value);
    }

    /// Every sketch id this feature reads, primary first
    pub fn referenced_sketches(&self) -> Vec<&str> {
        let mut sketches = Vec::new();
        if !self.sketch_id.is_empty() {
            sketches.push(self.sketch_id.as_str());
        }
        match &self.params {
            FeatureParams::Loft { sections } => {
                sketches.extend(sections.iter().map(String::as_str));
            }
            FeatureParams::Sweep { path_sketch_id, .. }
            | FeatureParams::PathPattern { path_sketch_id, .. } => {
                if !path_sketch_id.is_empty() {
                    sketches.push(path_sketch_id.as_str());
                }
            }
            _ => {}
        }
        sketches
    }

    /// The feature this one replicates, if any
    pub fn base_feature(&self) -> Option<&str> {
        match &self.params {
            FeatureParams::Mirror { base_feature, .. }
            | FeatureParams::Pattern { base_feature, .. }
            | FeatureParams::CircularPattern { base_feature, .. }
            | FeatureParams::PathPattern { base_feature, .. } => Some(base_feature.as_str()),
            _ => None,
        }
    }
}
