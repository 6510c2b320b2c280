//! Crystal Die - an interactive glass die for the game's landing page
//!
//! Core modules:
//! - `die`: Deterministic die model (pip layouts, pointer sampling, rotation, idle float)
//! - `scene`: Scene graph, materials, camera and the die composer
//! - `view`: Mount/unmount lifecycle and frame clock
//! - `renderer`: WebGPU SDF rendering pipeline
//! - `settings`: Quality and motion preferences

pub mod die;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod view;

pub use die::{DieError, DiePose, Face, FaceSpec};
pub use settings::{QualityPreset, Settings};
pub use view::DieView;

use glam::{EulerRot, Quat, Vec3};

/// Die configuration constants (fixed at build time)
pub mod consts {
    /// Edge length of the die body
    pub const DIE_SIZE: f32 = 2.0;
    /// Half of the edge length (distance from center to a face)
    pub const DIE_HALF_EXTENT: f32 = DIE_SIZE / 2.0;
    /// Corner radius of the rounded body
    pub const DIE_CORNER_RADIUS: f32 = 0.25;
    /// Corner tessellation hint for mesh-based hosts
    pub const DIE_CORNER_SMOOTHNESS: u32 = 8;

    /// Pip sphere radius
    pub const PIP_RADIUS: f32 = 0.15;
    /// Offset of corner pips from the face center along each axis
    pub const PIP_SPREAD: f32 = 0.55;
    /// How far the pip center sits past `DIE_HALF_EXTENT - PIP_RADIUS`
    pub const PIP_EPSILON: f32 = 0.05;
    /// Pip center distance from the die center (embedded just under the face)
    pub const PIP_DEPTH: f32 = DIE_HALF_EXTENT - PIP_RADIUS + PIP_EPSILON;
    /// Sphere segments (width and height) for pip meshes
    pub const PIP_SEGMENTS: u32 = 32;
    /// Total pips on a standard die (1 + 2 + ... + 6)
    pub const TOTAL_PIPS: usize = 21;

    /// Pointer offset -> target influence gain
    pub const POINTER_GAIN: f32 = 0.3;
    /// Fraction of the target influence blended into the rotation
    pub const ROTATION_BLEND: f32 = 0.4;
    /// Fraction of the world viewport a full-screen pointer sweep covers
    pub const POINTER_VIEWPORT_FRACTION: f32 = 0.1;

    /// Angular speed of the idle tilt/roll oscillation (rad/s)
    pub const IDLE_TILT_SPEED: f32 = 0.2;
    /// Angular speed of the idle spin about Y (rad/s)
    pub const IDLE_SPIN_SPEED: f32 = 0.25;
    /// Peak idle tilt about X (radians)
    pub const IDLE_TILT_AMPLITUDE: f32 = 0.2;
    /// Peak idle roll about Z (radians)
    pub const IDLE_ROLL_AMPLITUDE: f32 = 0.1;
}

/// Quaternion for an XYZ Euler triple (intrinsic X, then Y, then Z)
#[inline]
pub fn euler_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z)
}

/// Re-map `value` from `[in_min, in_max]` to `[out_min, out_max]` (no clamping)
#[inline]
pub fn map_linear(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}
