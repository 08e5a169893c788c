//! Local transform type shared by the pose state, the reference host and the
//! baking engine.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// A decomposed local transform (location, rotation, scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation relative to the rest pose.
    #[serde(default)]
    pub location: DVec3,
    /// Rotation as a unit quaternion `[x, y, z, w]`.
    #[serde(default = "default_rotation")]
    pub rotation: DQuat,
    /// Per-axis scale.
    #[serde(default = "default_scale")]
    pub scale: DVec3,
}

fn default_rotation() -> DQuat {
    DQuat::IDENTITY
}

fn default_scale() -> DVec3 {
    DVec3::ONE
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        location: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Creates a pure translation.
    pub fn from_location(location: DVec3) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }

    /// Sets the rotation.
    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the scale.
    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    /// Returns true if the transform equals identity within `epsilon`.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.location.abs_diff_eq(DVec3::ZERO, epsilon)
            && self.rotation.abs_diff_eq(DQuat::IDENTITY, epsilon)
            && self.scale.abs_diff_eq(DVec3::ONE, epsilon)
    }

    /// Composes the transform into a 4x4 matrix.
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }

    /// Decomposes a 4x4 affine matrix.
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (scale, rotation, location) = matrix.to_scale_rotation_translation();
        Self {
            location,
            rotation,
            scale,
        }
    }
}

/// Converts an XYZ euler rotation (X applied first) into a quaternion.
pub fn euler_xyz_to_quat(euler: DVec3) -> DQuat {
    DQuat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x)
}

/// Converts a quaternion into an XYZ euler rotation (X applied first).
pub fn quat_to_euler_xyz(rotation: DQuat) -> DVec3 {
    let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
    DVec3::new(x, y, z)
}
