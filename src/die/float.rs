//! Idle floating layer
//!
//! A slow bob and wobble layered on top of the controller rotation. The curve
//! is cosmetic; only its bounds matter. Each mounted view draws its own phase
//! offset from a seeded RNG so two dice never float in lockstep.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::map_linear;

/// Rotation and translation contributed by the float layer for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatOffset {
    /// XYZ Euler wobble (radians)
    pub rotation: Vec3,
    /// Bob offset (world units, Y only)
    pub translation: Vec3,
}

/// Bob/wobble parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleFloat {
    /// Time multiplier for the whole curve
    pub speed: f32,
    /// Scale of the wobble rotation
    pub rotation_intensity: f32,
    /// Scale of the vertical bob
    pub float_intensity: f32,
    /// Vertical range the bob sweeps before `float_intensity`
    pub floating_range: (f32, f32),
    /// Seconds added to the clock so each instance starts mid-curve
    pub phase_offset: f32,
}

impl Default for IdleFloat {
    fn default() -> Self {
        Self {
            speed: 2.0,
            rotation_intensity: 0.5,
            float_intensity: 1.0,
            floating_range: (-0.2, 0.2),
            phase_offset: 0.0,
        }
    }
}

impl IdleFloat {
    /// Upper bound on the phase offset drawn by `seeded`
    pub const MAX_PHASE_OFFSET: f32 = 10_000.0;

    /// Default curve with a phase offset drawn from `seed`
    pub fn seeded(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self {
            phase_offset: rng.random_range(0.0..Self::MAX_PHASE_OFFSET),
            ..Self::default()
        }
    }

    /// Float contribution at elapsed time `t` (seconds)
    pub fn sample(&self, t: f32) -> FloatOffset {
        // Phase can reach 1e4 s; summed in f32 that rounds frame steps to ~1 ms
        let u = (self.phase_offset as f64 + t as f64) / 4.0 * self.speed as f64;
        let (sin, cos) = (u.rem_euclid(TAU) as f32).sin_cos();

        let rotation = Vec3::new(cos / 8.0, sin / 8.0, sin / 20.0) * self.rotation_intensity;
        let (lo, hi) = self.floating_range;
        let y = map_linear(sin / 10.0, -0.1, 0.1, lo, hi) * self.float_intensity;

        FloatOffset {
            rotation,
            translation: Vec3::new(0.0, y, 0.0),
        }
    }
}
