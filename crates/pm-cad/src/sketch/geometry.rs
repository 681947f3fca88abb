//! Sketch Geometry
//!
//! Geometry entities are plain value records. Which fields are meaningful
//! depends on the entity kind; the constraint pass only ever reads and
//! writes `start`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A point on the sketch plane
pub type Point2D = DVec2;

/// Kind of sketch geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryKind {
    #[default]
    Point,
    Line,
    Circle,
    Arc,
    Rectangle,
    Ellipse,
    Polygon,
    Spline,
    Text,
}

impl GeometryKind {
    /// Get the kind name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Line => "Line",
            GeometryKind::Circle => "Circle",
            GeometryKind::Arc => "Arc",
            GeometryKind::Rectangle => "Rectangle",
            GeometryKind::Ellipse => "Ellipse",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Spline => "Spline",
            GeometryKind::Text => "Text",
        }
    }

    /// Degrees of freedom an unconstrained entity of this kind contributes
    pub fn degrees_of_freedom(&self) -> u32 {
        match self {
            GeometryKind::Point => 2,
            GeometryKind::Line => 4,
            GeometryKind::Circle => 3,
            GeometryKind::Arc => 5,
            GeometryKind::Rectangle => 4,
            GeometryKind::Ellipse | GeometryKind::Polygon | GeometryKind::Spline => 4,
            GeometryKind::Text => 2,
        }
    }
}

/// A geometry entity owned by a sketch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryEntity {
    /// Identifier, unique within the owning sketch
    pub id: String,
    /// Entity kind
    pub kind: GeometryKind,
    /// Start point (point position, line start, rectangle corner, text anchor)
    pub start: Point2D,
    /// End point (line end, opposite rectangle corner)
    pub end: Point2D,
    /// Center of circles, arcs and ellipses
    pub center: Point2D,
    /// Radius; major radius for ellipses
    pub radius: f64,
    /// Arc start angle in degrees
    pub start_angle: f64,
    /// Arc end angle in degrees
    pub end_angle: f64,
    /// Rectangle width; minor radius for ellipses
    pub width: f64,
    /// Rectangle height
    pub height: f64,
    /// Text content for text entities
    #[serde(default)]
    pub text: String,
    /// Vertices of polygons and control points of splines
    #[serde(default)]
    pub points: Vec<Point2D>,
}

impl GeometryEntity {
    /// Create an entity with every field at its default
    pub fn new(id: impl Into<String>, kind: GeometryKind) -> Self {
        Self {
            id: id.into(),
            kind,
            start: Point2D::ZERO,
            end: Point2D::ZERO,
            center: Point2D::ZERO,
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 360.0,
            width: 0.0,
            height: 0.0,
            text: String::new(),
            points: Vec::new(),
        }
    }

    /// Get the kind name for display
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Length of a line; zero for other kinds
    pub fn length(&self) -> f64 {
        match self.kind {
            GeometryKind::Line => self.start.distance(self.end),
            _ => 0.0,
        }
    }
}
