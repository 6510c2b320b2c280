//! Per-frame die pose

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::float::FloatOffset;
use super::rotation::RotationState;
use crate::euler_to_quat;

/// Composed transform for one rendered frame
///
/// The float layer wraps the controller rotation:
/// `T(float.translation) * R(float.rotation) * R(rotation) * S(scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiePose {
    /// Controller angles (XYZ Euler radians)
    pub rotation: Vec3,
    /// Idle float contribution
    pub float: FloatOffset,
    /// Uniform scale
    pub scale: f32,
}

impl Default for DiePose {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            float: FloatOffset::default(),
            scale: 1.0,
        }
    }
}

impl DiePose {
    pub fn new(rotation: &RotationState, float: FloatOffset) -> Self {
        Self {
            rotation: rotation.angles(),
            float,
            scale: 1.0,
        }
    }

    /// Combined orientation (float wobble applied outside the controller rotation)
    pub fn orientation(&self) -> Quat {
        euler_to_quat(self.float.rotation) * euler_to_quat(self.rotation)
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.float.translation
    }

    /// Die-local -> world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.orientation(),
            self.translation(),
        )
    }
}
