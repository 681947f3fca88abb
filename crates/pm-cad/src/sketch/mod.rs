//! 2D Sketch System
//!
//! A sketch owns its geometry, the constraints between that geometry and a
//! list of named parameters. Geometry lives in an ordered arena with an
//! id→index map; the map is rebuilt whenever a sketch is deserialized.

mod analysis;
mod constraint;
mod geometry;
mod solver;

pub use constraint::{Constraint, ConstraintKind};
pub use geometry::{GeometryEntity, GeometryKind, Point2D};
pub use solver::{ConstraintSolver, ConstraintStep, StepContext};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::expression::{EvaluationReport, Parameter, evaluate_parameters};
use crate::ids::IdGenerator;
use crate::report::PassReport;

/// Prefix of generated geometry ids
pub const GEOMETRY_ID_PREFIX: &str = "geom_";

/// Sketch-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SketchError {
    #[error("{0:?} needs at least one point")]
    EmptyPointList(GeometryKind),
    #[error("Geometry not found: {0}")]
    GeometryNotFound(String),
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),
    #[error("Constraint index {index} out of range ({len} constraints)")]
    ConstraintOutOfRange { index: usize, len: usize },
    #[error("Constraint {index} references missing geometry '{id}'")]
    DanglingReference { index: usize, id: String },
}

/// Serialization format for Sketch (without the id index)
#[derive(Serialize, Deserialize)]
struct SketchData {
    name: String,
    geometry: Vec<GeometryEntity>,
    constraints: Vec<Constraint>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    ids: IdGenerator,
}

impl From<Sketch> for SketchData {
    fn from(sketch: Sketch) -> Self {
        Self {
            name: sketch.name,
            geometry: sketch.geometry,
            constraints: sketch.constraints,
            parameters: sketch.parameters,
            ids: sketch.ids,
        }
    }
}

impl From<SketchData> for Sketch {
    fn from(data: SketchData) -> Self {
        let mut sketch = Sketch {
            name: data.name,
            geometry: data.geometry,
            index: HashMap::new(),
            constraints: data.constraints,
            parameters: data.parameters,
            ids: data.ids,
        };
        for entity in &sketch.geometry {
            sketch.ids.reserve_id(GEOMETRY_ID_PREFIX, &entity.id);
        }
        sketch.rebuild_index();
        sketch
    }
}

/// A 2D sketch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SketchData", into = "SketchData")]
pub struct Sketch {
    name: String,
    geometry: Vec<GeometryEntity>,
    index: HashMap<String, usize>,
    constraints: Vec<Constraint>,
    parameters: Vec<Parameter>,
    ids: IdGenerator,
}

impl Sketch {
    /// Create a new empty sketch
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            parameters: Vec::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Sketch name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .geometry
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.clone(), i))
            .collect();
    }

    fn push_geometry(&mut self, kind: GeometryKind, init: impl FnOnce(&mut GeometryEntity)) -> String {
        let mut id = self.ids.next_id(GEOMETRY_ID_PREFIX);
        while self.index.contains_key(&id) {
            id = self.ids.next_id(GEOMETRY_ID_PREFIX);
        }
        let mut entity = GeometryEntity::new(id.clone(), kind);
        init(&mut entity);
        self.index.insert(id.clone(), self.geometry.len());
        self.geometry.push(entity);
        tracing::trace!("Sketch '{}': added {} {}", self.name, kind.type_name(), id);
        id
    }

    // ============== Geometry ==============

    /// Add a point
    pub fn add_point(&mut self, position: Point2D) -> String {
        self.push_geometry(GeometryKind::Point, |g| g.start = position)
    }

    /// Add a line segment
    pub fn add_line(&mut self, start: Point2D, end: Point2D) -> String {
        self.push_geometry(GeometryKind::Line, |g| {
            g.start = start;
            g.end = end;
        })
    }

    /// Add a circle
    pub fn add_circle(&mut self, center: Point2D, radius: f64) -> String {
        self.push_geometry(GeometryKind::Circle, |g| {
            g.center = center;
            g.radius = radius;
        })
    }

    /// Add an arc (angles in degrees)
    pub fn add_arc(&mut self, center: Point2D, radius: f64, start_angle: f64, end_angle: f64) -> String {
        self.push_geometry(GeometryKind::Arc, |g| {
            g.center = center;
            g.radius = radius;
            g.start_angle = start_angle;
            g.end_angle = end_angle;
        })
    }

    /// Add an axis-aligned rectangle from a corner
    pub fn add_rectangle(&mut self, corner: Point2D, width: f64, height: f64) -> String {
        self.push_geometry(GeometryKind::Rectangle, |g| {
            g.start = corner;
            g.width = width;
            g.height = height;
            g.end = corner + Point2D::new(width, height);
        })
    }

    /// Add an ellipse; the major radius is kept in `radius`, the minor in `width`
    pub fn add_ellipse(&mut self, center: Point2D, major_radius: f64, minor_radius: f64) -> String {
        self.push_geometry(GeometryKind::Ellipse, |g| {
            g.center = center;
            g.radius = major_radius;
            g.width = minor_radius;
        })
    }

    /// Add a closed polygon through `points`
    pub fn add_polygon(&mut self, points: Vec<Point2D>) -> Result<String, SketchError> {
        self.add_point_list(GeometryKind::Polygon, points)
    }

    /// Add a spline through `control_points`
    pub fn add_spline(&mut self, control_points: Vec<Point2D>) -> Result<String, SketchError> {
        self.add_point_list(GeometryKind::Spline, control_points)
    }

    fn add_point_list(&mut self, kind: GeometryKind, points: Vec<Point2D>) -> Result<String, SketchError> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Err(SketchError::EmptyPointList(kind));
        };
        Ok(self.push_geometry(kind, |g| {
            g.start = first;
            g.end = last;
            g.points = points;
        }))
    }

    /// Add a text entity anchored at `position`
    pub fn add_text(&mut self, position: Point2D, text: impl Into<String>) -> String {
        let text = text.into();
        self.push_geometry(GeometryKind::Text, |g| {
            g.start = position;
            g.text = text;
        })
    }

    /// All geometry in insertion order
    pub fn geometry(&self) -> &[GeometryEntity] {
        &self.geometry
    }

    /// Find geometry by id
    pub fn find_geometry(&self, id: &str) -> Option<&GeometryEntity> {
        self.index.get(id).map(|&i| &self.geometry[i])
    }

    /// Remove geometry by id
    ///
    /// Constraints that reference the removed entity stay in place and
    /// become inert. The id is never handed out again.
    pub fn remove_geometry(&mut self, id: &str) -> Option<GeometryEntity> {
        let index = self.index.remove(id)?;
        let removed = self.geometry.remove(index);
        self.rebuild_index();
        Some(removed)
    }

    // ============== Constraints ==============

    /// Append a constraint
    ///
    /// References are not checked: entities may be added later.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// All constraints in application order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Remove the constraint at `index`
    pub fn remove_constraint(&mut self, index: usize) -> Result<Constraint, SketchError> {
        if index >= self.constraints.len() {
            return Err(SketchError::ConstraintOutOfRange {
                index,
                len: self.constraints.len(),
            });
        }
        Ok(self.constraints.remove(index))
    }

    /// Run the default constraint pass over this sketch
    pub fn solve(&mut self) -> PassReport {
        ConstraintSolver::new().solve(self)
    }

    // ============== Parameters ==============

    /// Append a parameter; duplicate names are allowed and shadow earlier ones
    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameters in declaration order, for editing
    pub fn parameters_mut(&mut self) -> &mut [Parameter] {
        &mut self.parameters
    }

    /// Last parameter declared with `name`
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().rev().find(|p| p.name == name)
    }

    /// Set the plain value of the last parameter declared with `name`
    pub fn set_parameter_value(&mut self, name: &str, value: f64) -> Result<(), SketchError> {
        let parameter = self
            .parameters
            .iter_mut()
            .rev()
            .find(|p| p.name == name)
            .ok_or_else(|| SketchError::ParameterNotFound(name.to_string()))?;
        parameter.value = value;
        Ok(())
    }

    /// Evaluate driven parameters in declaration order
    pub fn evaluate_parameters(&mut self) -> EvaluationReport {
        let report = evaluate_parameters(&mut self.parameters);
        if !report.all_resolved() {
            tracing::debug!(
                "Sketch '{}': {} parameter(s) did not resolve",
                self.name,
                report.failures.len()
            );
        }
        report
    }
}
