//! Feature Timeline
//!
//! Ordered feature history with suppression, rollback and reorder, plus the
//! helpers that create named features and the rebuild that hands the
//! participating features to a geometry engine.

use std::collections::HashMap;

use super::{Part, PartError};
use crate::feature::{BooleanOp, Feature, FeatureKind, FeatureParams};
use crate::kernel::{EngineError, FeatureRequest, GeometryEngine, ShapeHandle};
use crate::sketch::Sketch;

/// Default instance count for circular and path patterns
const DEFAULT_PATTERN_COUNT: u32 = 4;

/// Result of handing a part's timeline to a geometry engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildReport {
    /// Shapes produced, in timeline order
    pub shapes: Vec<(String, ShapeHandle)>,
    /// Features the engine rejected
    pub failures: Vec<(String, EngineError)>,
    /// Features left out by suppression or rollback
    pub skipped: Vec<String>,
}

impl RebuildReport {
    /// True when no participating feature failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Shape produced for a feature
    pub fn shape(&self, feature: &str) -> Option<ShapeHandle> {
        self.shapes
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, handle)| *handle)
    }
}

impl Part {
    // ============== Timeline Access ==============

    /// Features in timeline order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Find a feature by name
    pub fn find_feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    fn find_feature_mut(&mut self, name: &str) -> Result<&mut Feature, PartError> {
        self.features
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| PartError::FeatureNotFound(name.to_string()))
    }

    /// Timeline index of a feature
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    // ============== Timeline Editing ==============

    /// Append a feature to the end of the timeline
    ///
    /// The rollback position is left untouched, so a feature appended while
    /// rolled back does not participate until the rollback is cleared.
    pub fn append_feature(&mut self, feature: Feature) -> Result<(), PartError> {
        if self.find_feature(&feature.name).is_some() {
            return Err(PartError::DuplicateFeatureName(feature.name));
        }
        tracing::debug!("Part '{}': appended {} '{}'", self.name, feature.type_name(), feature.name);
        self.features.push(feature);
        Ok(())
    }

    /// Insert a feature at `index` (`index == len` appends)
    pub fn insert_feature(&mut self, index: usize, feature: Feature) -> Result<(), PartError> {
        if index > self.features.len() {
            return Err(PartError::IndexOutOfRange {
                index,
                len: self.features.len(),
            });
        }
        if self.find_feature(&feature.name).is_some() {
            return Err(PartError::DuplicateFeatureName(feature.name));
        }
        self.features.insert(index, feature);
        Ok(())
    }

    /// Remove a feature by name
    pub fn remove_feature(&mut self, name: &str) -> Result<Feature, PartError> {
        let index = self
            .feature_index(name)
            .ok_or_else(|| PartError::FeatureNotFound(name.to_string()))?;
        tracing::debug!("Part '{}': removed feature '{}'", self.name, name);
        Ok(self.features.remove(index))
    }

    /// Move the feature at `from` so it ends up at `to`
    ///
    /// Features keep their names and references. Out-of-range indices leave
    /// the timeline unchanged; `from == to` is a no-op.
    pub fn reorder_feature(&mut self, from: usize, to: usize) -> Result<(), PartError> {
        let len = self.features.len();
        for index in [from, to] {
            if index >= len {
                return Err(PartError::IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let feature = self.features.remove(from);
            self.features.insert(to, feature);
        }
        Ok(())
    }

    /// Suppress or unsuppress a feature by name
    pub fn set_feature_suppressed(&mut self, name: &str, suppressed: bool) -> Result<(), PartError> {
        self.find_feature_mut(name)?.set_suppressed(suppressed);
        Ok(())
    }

    /// Replace the kind-specific data of a feature
    pub fn set_feature_params(&mut self, name: &str, params: FeatureParams) -> Result<(), PartError> {
        self.find_feature_mut(name)?.params = params;
        Ok(())
    }

    /// Set a free-form named scalar on a feature
    pub fn set_feature_parameter(&mut self, name: &str, key: &str, value: f64) -> Result<(), PartError> {
        self.find_feature_mut(name)?.set_parameter(key, value);
        Ok(())
    }

    /// Point a feature at another primary sketch
    pub fn set_feature_sketch(&mut self, name: &str, sketch_id: &str) -> Result<(), PartError> {
        self.find_feature_mut(name)?.sketch_id = sketch_id.to_string();
        Ok(())
    }

    /// Rename a feature; the new name must not be taken
    pub fn rename_feature(&mut self, name: &str, new_name: &str) -> Result<(), PartError> {
        if name != new_name && self.find_feature(new_name).is_some() {
            return Err(PartError::DuplicateFeatureName(new_name.to_string()));
        }
        self.find_feature_mut(name)?.name = new_name.to_string();
        tracing::debug!("Part '{}': renamed feature '{}' to '{}'", self.name, name, new_name);
        Ok(())
    }

    /// Suppression state of a feature, if it exists
    pub fn is_feature_suppressed(&self, name: &str) -> Option<bool> {
        self.find_feature(name).map(Feature::is_suppressed)
    }

    // ============== Rollback ==============

    /// Current rollback position (None = evaluate all)
    pub fn rollback_position(&self) -> Option<usize> {
        self.rollback_position
    }

    /// Set the rollback position
    ///
    /// Any index is accepted; a position past the end behaves like `None`.
    pub fn set_rollback_position(&mut self, position: Option<usize>) {
        self.rollback_position = position;
    }

    /// Check if the feature at `index` takes part in evaluation
    pub fn participates(&self, index: usize) -> bool {
        let Some(feature) = self.features.get(index) else {
            return false;
        };
        self.rollback_position.is_none_or(|rollback| index <= rollback) && !feature.suppressed
    }

    /// Participating features with their timeline index
    pub fn participating_features(&self) -> impl Iterator<Item = (usize, &Feature)> {
        self.features
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.participates(*index))
    }

    // ============== Feature Creation ==============

    fn next_feature_name(&mut self, kind: FeatureKind) -> String {
        loop {
            let name = self.feature_ids.next_id(kind.type_name());
            if self.find_feature(&name).is_none() {
                return name;
            }
        }
    }

    fn push_new(&mut self, sketch_id: impl Into<String>, params: FeatureParams) -> String {
        self.push_new_with(sketch_id, params, |_| {})
    }

    fn push_new_with(
        &mut self,
        sketch_id: impl Into<String>,
        params: FeatureParams,
        init: impl FnOnce(&mut Feature),
    ) -> String {
        let name = self.next_feature_name(params.kind());
        let mut feature = Feature::new(name.clone(), sketch_id, params);
        init(&mut feature);
        tracing::debug!("Part '{}': created {} '{}'", self.name, feature.type_name(), name);
        self.features.push(feature);
        name
    }

    /// Create an extrude of a sketch
    pub fn create_extrude(
        &mut self,
        sketch_id: &str,
        depth: f64,
        symmetric: bool,
        operation: BooleanOp,
    ) -> String {
        self.push_new(
            sketch_id,
            FeatureParams::Extrude {
                depth,
                symmetric,
                operation,
                thin_wall: None,
            },
        )
    }

    /// Create a thin-walled extrude; a non-positive wall becomes 1.0
    pub fn create_thin_extrude(
        &mut self,
        sketch_id: &str,
        depth: f64,
        wall_thickness: f64,
        symmetric: bool,
        operation: BooleanOp,
    ) -> String {
        let wall = if wall_thickness > 0.0 { wall_thickness } else { 1.0 };
        self.push_new(
            sketch_id,
            FeatureParams::Extrude {
                depth,
                symmetric,
                operation,
                thin_wall: Some(wall),
            },
        )
    }

    /// Create a revolve of a sketch (angle in degrees)
    pub fn create_revolve(&mut self, sketch_id: &str, angle: f64, axis: &str) -> String {
        self.push_new(
            sketch_id,
            FeatureParams::Revolve {
                angle,
                axis: axis.to_string(),
            },
        )
    }

    /// Create a loft; the first sketch is the primary profile
    pub fn create_loft(&mut self, sketch_ids: &[String]) -> String {
        let (primary, sections) = match sketch_ids.split_first() {
            Some((first, rest)) => (first.clone(), rest.to_vec()),
            None => (String::new(), Vec::new()),
        };
        let count = sketch_ids.len() as f64;
        self.push_new_with(primary, FeatureParams::Loft { sections }, |feature| {
            feature.set_parameter("section_count", count);
        })
    }

    /// Create a sweep of a profile along a path sketch
    pub fn create_sweep(
        &mut self,
        profile_sketch_id: &str,
        path_sketch_id: &str,
        twist_angle: f64,
        scale_factor: f64,
    ) -> String {
        self.push_new(
            profile_sketch_id,
            FeatureParams::Sweep {
                path_sketch_id: path_sketch_id.to_string(),
                twist_angle,
                scale_factor,
            },
        )
    }

    /// Create a helix
    pub fn create_helix(&mut self, radius: f64, pitch: f64, revolutions: f64, clockwise: bool) -> String {
        self.push_new(
            "",
            FeatureParams::Helix {
                radius,
                pitch,
                revolutions,
                clockwise,
            },
        )
    }

    /// Create a hole
    pub fn create_hole(&mut self, diameter: f64, depth: f64, through_all: bool) -> String {
        self.push_new(
            "",
            FeatureParams::Hole {
                diameter,
                depth,
                through_all,
            },
        )
    }

    /// Create a fillet on edges
    pub fn create_fillet(&mut self, radius: f64, edge_ids: Vec<String>) -> String {
        self.push_new("", FeatureParams::Fillet { radius, edge_ids })
    }

    /// Create a chamfer on edges
    pub fn create_chamfer(
        &mut self,
        distance1: f64,
        distance2: f64,
        angle: f64,
        edge_ids: Vec<String>,
    ) -> String {
        self.push_new(
            "",
            FeatureParams::Chamfer {
                distance1,
                distance2,
                angle,
                edge_ids,
            },
        )
    }

    /// Create a shell removing the given faces
    pub fn create_shell(&mut self, thickness: f64, face_ids: Vec<String>) -> String {
        self.push_new("", FeatureParams::Shell { thickness, face_ids })
    }

    /// Create a draft on faces relative to a plane
    pub fn create_draft(&mut self, angle: f64, plane: &str, face_ids: Vec<String>) -> String {
        self.push_new(
            "",
            FeatureParams::Draft {
                angle,
                plane: plane.to_string(),
                face_ids,
            },
        )
    }

    /// Create a mirror of another feature
    pub fn create_mirror(&mut self, base_feature: &str, plane: &str, merge_result: bool) -> String {
        self.push_new(
            "",
            FeatureParams::Mirror {
                base_feature: base_feature.to_string(),
                plane: plane.to_string(),
                merge_result,
            },
        )
    }

    /// Create a thread
    pub fn create_thread(&mut self, standard: &str, pitch: f64, internal: bool) -> String {
        self.push_new(
            "",
            FeatureParams::Thread {
                standard: standard.to_string(),
                pitch,
                internal,
            },
        )
    }

    /// Create a rib from a sketch
    pub fn create_rib(&mut self, thickness: f64, plane: &str, sketch_id: &str) -> String {
        self.push_new(
            sketch_id,
            FeatureParams::Rib {
                thickness,
                plane: plane.to_string(),
            },
        )
    }

    /// Create a rectangular pattern of another feature
    pub fn create_pattern(&mut self, base_feature: &str, counts: [u32; 3], spacings: [f64; 3]) -> String {
        self.push_new(
            "",
            FeatureParams::Pattern {
                base_feature: base_feature.to_string(),
                counts,
                spacings,
            },
        )
    }

    /// Create a circular pattern; a zero count becomes 4 and an empty axis `Z`
    pub fn create_circular_pattern(&mut self, base_feature: &str, count: u32, angle: f64, axis: &str) -> String {
        let count = if count > 0 { count } else { DEFAULT_PATTERN_COUNT };
        let axis = if axis.is_empty() { "Z" } else { axis };
        self.push_new(
            "",
            FeatureParams::CircularPattern {
                base_feature: base_feature.to_string(),
                count,
                angle,
                axis: axis.to_string(),
            },
        )
    }

    /// Create a pattern along a path sketch; a zero count becomes 4
    pub fn create_path_pattern(
        &mut self,
        base_feature: &str,
        path_sketch_id: &str,
        count: u32,
        equal_spacing: bool,
    ) -> String {
        let count = if count > 0 { count } else { DEFAULT_PATTERN_COUNT };
        self.push_new(
            "",
            FeatureParams::PathPattern {
                base_feature: base_feature.to_string(),
                path_sketch_id: path_sketch_id.to_string(),
                count,
                equal_spacing,
            },
        )
    }

    // ============== Rebuild ==============

    /// Hand every participating feature to the geometry engine, in order
    ///
    /// Each request carries the sketches the feature reads (missing ones are
    /// left out) and the effective parameter table. A failing feature is
    /// logged and recorded; the rebuild continues with the next one.
    pub fn rebuild(
        &self,
        engine: &mut dyn GeometryEngine,
        sketches: &HashMap<String, Sketch>,
    ) -> RebuildReport {
        let mut report = RebuildReport::default();
        let parameters = self.effective_parameters();

        for (index, feature) in self.features.iter().enumerate() {
            if !self.participates(index) {
                tracing::trace!("Part '{}': skipping '{}'", self.name, feature.name);
                report.skipped.push(feature.name.clone());
                continue;
            }

            let mut resolved = Vec::new();
            for sketch_id in feature.referenced_sketches() {
                match sketches.get(sketch_id) {
                    Some(sketch) => resolved.push(sketch),
                    None => tracing::debug!(
                        "Part '{}': feature '{}' references missing sketch '{}'",
                        self.name,
                        feature.name,
                        sketch_id
                    ),
                }
            }

            let request = FeatureRequest {
                index,
                feature,
                sketches: &resolved,
                parameters: &parameters,
            };

            match engine.evaluate(&request) {
                Ok(handle) => report.shapes.push((feature.name.clone(), handle)),
                Err(e) => {
                    tracing::warn!("Failed to rebuild feature '{}': {}", feature.name, e);
                    report.failures.push((feature.name.clone(), e));
                }
            }
        }

        report
    }
}
