//! Component transforms

use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Rotation and translation of a placed component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Unit quaternion
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    pub fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Pure translation
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            rotation: DQuat::IDENTITY,
            translation,
        }
    }

    /// Pure rotation
    pub fn from_rotation(rotation: DQuat) -> Self {
        Self {
            rotation,
            translation: DVec3::ZERO,
        }
    }

    /// Combine two transforms the way placements are stacked
    ///
    /// Translations add and the rotation of `self` is kept. This is not a
    /// full rigid-body product: the translation of `other` is not rotated
    /// and its rotation is dropped.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            rotation: self.rotation,
            translation: self.translation + other.translation,
        }
    }

    /// Return a copy moved by `offset`
    pub fn translated(&self, offset: DVec3) -> Transform {
        Transform {
            rotation: self.rotation,
            translation: self.translation + offset,
        }
    }

    /// Convert to a 4x4 matrix
    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Map a point from component space into assembly space
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }
}
