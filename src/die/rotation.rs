//! Per-frame rotation controller
//!
//! The die spins slowly about Y, tilts and rolls on a slow sine, and leans
//! toward the pointer. Each frame is recomputed from scratch out of the
//! elapsed time and the latest pointer offset, so nothing accumulates and a
//! paused clock resumes without drift.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::euler_to_quat;

/// Rotation angles for one frame plus the pointer influence that fed them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationState {
    pub angle_x: f32,
    pub angle_y: f32,
    pub angle_z: f32,
    /// Pointer Y scaled by `POINTER_GAIN` (vertical motion tilts about X)
    pub target_influence_x: f32,
    /// Pointer X scaled by `POINTER_GAIN` (horizontal motion turns about Y)
    pub target_influence_y: f32,
}

impl RotationState {
    /// Angles as an XYZ Euler triple
    #[inline]
    pub fn angles(&self) -> Vec3 {
        Vec3::new(self.angle_x, self.angle_y, self.angle_z)
    }

    #[inline]
    pub fn quat(&self) -> Quat {
        euler_to_quat(self.angles())
    }
}

/// Owns the die's rotation state; always in the running state while mounted
#[derive(Debug, Clone, Default)]
pub struct RotationController {
    state: RotationState,
    frames: u64,
}

impl RotationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotation for elapsed time `t` (seconds) and pointer offset (world units)
    pub fn rotation_at(t: f32, pointer: Vec2) -> RotationState {
        let target_influence_x = pointer.y * POINTER_GAIN;
        let target_influence_y = pointer.x * POINTER_GAIN;

        RotationState {
            angle_x: (t * IDLE_TILT_SPEED).sin() * IDLE_TILT_AMPLITUDE
                + target_influence_x * ROTATION_BLEND,
            angle_y: t * IDLE_SPIN_SPEED + target_influence_y * ROTATION_BLEND,
            angle_z: (t * IDLE_TILT_SPEED).cos() * IDLE_ROLL_AMPLITUDE,
            target_influence_x,
            target_influence_y,
        }
    }

    /// Advance to time `t` with the latest pointer sample
    ///
    /// A non-finite `t` keeps the previous pose.
    pub fn update(&mut self, t: f32, pointer: Vec2) -> RotationState {
        if !t.is_finite() {
            log::warn!("Ignoring non-finite frame time {t}, holding pose");
            return self.state;
        }
        // A NaN offset would poison every later frame; treat it as centered
        let pointer = if pointer.is_finite() { pointer } else { Vec2::ZERO };

        self.state = Self::rotation_at(t, pointer);
        self.frames += 1;
        self.state
    }

    /// Last computed state (used when no frame time is available)
    #[inline]
    pub fn hold(&self) -> RotationState {
        self.state
    }

    /// Number of frames computed since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
