//! Reference Geometry
//!
//! Work planes, axes, points and coordinate systems owned by a part. All
//! four share one id counter per part, so `Plane1`, `Axis2`, `Point3`...

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::Part;

/// Principal plane a work plane can be offset from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasePlane {
    XY,
    YZ,
    XZ,
}

impl BasePlane {
    /// Origin and normal of this plane offset along its normal
    pub fn frame(&self, offset: f64) -> (DVec3, DVec3) {
        match self {
            BasePlane::XY => (DVec3::new(0.0, 0.0, offset), DVec3::Z),
            BasePlane::YZ => (DVec3::new(offset, 0.0, 0.0), DVec3::X),
            BasePlane::XZ => (DVec3::new(0.0, offset, 0.0), DVec3::Y),
        }
    }
}

/// Principal axis a work axis can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseAxis {
    X,
    Y,
    Z,
}

impl BaseAxis {
    /// Unit direction of this axis
    pub fn direction(&self) -> DVec3 {
        match self {
            BaseAxis::X => DVec3::X,
            BaseAxis::Y => DVec3::Y,
            BaseAxis::Z => DVec3::Z,
        }
    }
}

/// A work plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPlane {
    pub id: String,
    pub name: String,
    pub origin: DVec3,
    pub normal: DVec3,
    /// Principal plane this one is derived from
    pub base_plane: Option<BasePlane>,
    /// Offset along the base plane normal
    pub offset: f64,
}

/// A work axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkAxis {
    pub id: String,
    pub name: String,
    pub point: DVec3,
    pub direction: DVec3,
    /// Principal axis this one is derived from
    pub base_axis: Option<BaseAxis>,
}

/// A work point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPoint {
    pub id: String,
    pub name: String,
    pub point: DVec3,
}

/// A coordinate system given by an origin and its X and Y directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub id: String,
    pub name: String,
    pub origin: DVec3,
    pub x_direction: DVec3,
    pub y_direction: DVec3,
}

impl CoordinateSystem {
    /// Z direction (X × Y)
    pub fn z_direction(&self) -> DVec3 {
        self.x_direction.cross(self.y_direction)
    }
}

/// Reference geometry containers of a part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ReferenceGeometry {
    pub planes: Vec<WorkPlane>,
    pub axes: Vec<WorkAxis>,
    pub points: Vec<WorkPoint>,
    pub coordinate_systems: Vec<CoordinateSystem>,
}

impl Part {
    /// Generate a reference id and the display name (the id when `name` is empty)
    fn next_reference(&mut self, prefix: &str, name: &str) -> (String, String) {
        let id = self.reference_ids.next_id(prefix);
        let name = if name.is_empty() { id.clone() } else { name.to_string() };
        (id, name)
    }

    /// Add a work plane through `origin` with `normal`
    pub fn add_work_plane(&mut self, name: &str, origin: DVec3, normal: DVec3) -> String {
        let (id, name) = self.next_reference("Plane", name);
        self.reference.planes.push(WorkPlane {
            id: id.clone(),
            name,
            origin,
            normal,
            base_plane: None,
            offset: 0.0,
        });
        id
    }

    /// Add a work plane offset from a principal plane
    pub fn add_work_plane_offset(&mut self, name: &str, base: BasePlane, offset: f64) -> String {
        let (id, name) = self.next_reference("Plane", name);
        let (origin, normal) = base.frame(offset);
        self.reference.planes.push(WorkPlane {
            id: id.clone(),
            name,
            origin,
            normal,
            base_plane: Some(base),
            offset,
        });
        id
    }

    /// Add a work axis through `point` along `direction`
    pub fn add_work_axis(&mut self, name: &str, point: DVec3, direction: DVec3) -> String {
        let (id, name) = self.next_reference("Axis", name);
        self.reference.axes.push(WorkAxis {
            id: id.clone(),
            name,
            point,
            direction,
            base_axis: None,
        });
        id
    }

    /// Add a work axis along a principal axis through the origin
    pub fn add_work_axis_base(&mut self, name: &str, base: BaseAxis) -> String {
        let (id, name) = self.next_reference("Axis", name);
        self.reference.axes.push(WorkAxis {
            id: id.clone(),
            name,
            point: DVec3::ZERO,
            direction: base.direction(),
            base_axis: Some(base),
        });
        id
    }

    /// Add a work point
    pub fn add_work_point(&mut self, name: &str, point: DVec3) -> String {
        let (id, name) = self.next_reference("Point", name);
        self.reference.points.push(WorkPoint {
            id: id.clone(),
            name,
            point,
        });
        id
    }

    /// Add a coordinate system
    pub fn add_coordinate_system(
        &mut self,
        name: &str,
        origin: DVec3,
        x_direction: DVec3,
        y_direction: DVec3,
    ) -> String {
        let (id, name) = self.next_reference("CS", name);
        self.reference.coordinate_systems.push(CoordinateSystem {
            id: id.clone(),
            name,
            origin,
            x_direction,
            y_direction,
        });
        id
    }

    /// Work planes in creation order
    pub fn work_planes(&self) -> &[WorkPlane] {
        &self.reference.planes
    }

    /// Work axes in creation order
    pub fn work_axes(&self) -> &[WorkAxis] {
        &self.reference.axes
    }

    /// Work points in creation order
    pub fn work_points(&self) -> &[WorkPoint] {
        &self.reference.points
    }

    /// Coordinate systems in creation order
    pub fn coordinate_systems(&self) -> &[CoordinateSystem] {
        &self.reference.coordinate_systems
    }

    /// Find a work plane by id
    pub fn find_work_plane(&self, id: &str) -> Option<&WorkPlane> {
        self.reference.planes.iter().find(|p| p.id == id)
    }

    /// Find a work axis by id
    pub fn find_work_axis(&self, id: &str) -> Option<&WorkAxis> {
        self.reference.axes.iter().find(|a| a.id == id)
    }
}
