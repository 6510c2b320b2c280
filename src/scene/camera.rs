//! Camera and stage (environment, contact shadow)

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::material::hex_rgb;
use crate::die::Viewport;
use crate::euler_to_quat;

/// Perspective camera looking down -Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 6.0),
            fov_y: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// World-space size of the visible area at `target`'s distance
    pub fn world_extent_at(&self, target: Vec3, aspect: f32) -> Vec2 {
        let distance = self.position.distance(target);
        let height = 2.0 * (self.fov_y.to_radians() / 2.0).tan() * distance;
        Vec2::new(height * aspect, height)
    }

    /// Viewport for a window of `pixels`, measured at `target`
    ///
    /// A zero-height window yields a degenerate viewport rather than NaNs.
    pub fn viewport_at(&self, target: Vec3, pixels: Vec2) -> Viewport {
        if pixels.y <= 0.0 || !pixels.is_finite() {
            return Viewport::new(pixels, Vec2::ZERO);
        }
        Viewport::new(pixels, self.world_extent_at(target, pixels.x / pixels.y))
    }
}

/// Shape of an environment light panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightForm {
    Rect,
    Circle,
}

/// Emissive panel reflected by the glass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lightformer {
    pub form: LightForm,
    pub intensity: f32,
    pub position: Vec3,
    pub scale: f32,
    pub color: [f32; 3],
}

/// Soft shadow plane under the die
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactShadow {
    /// Plane height
    pub y: f32,
    pub opacity: f32,
    /// Plane extent
    pub scale: f32,
    pub blur: f32,
    /// Distance above the plane at which occluders stop casting
    pub far: f32,
}

/// Everything around the die the renderer needs: backdrop, lights, shadow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub background: [f32; 3],
    /// Rotation of the light rig (XYZ Euler radians)
    pub environment_rotation: Vec3,
    pub lights: Vec<Lightformer>,
    pub shadow: ContactShadow,
}

impl Default for Stage {
    fn default() -> Self {
        let white = hex_rgb(0xffffff);
        Self {
            background: hex_rgb(0xfafafa),
            environment_rotation: Vec3::new(-PI / 3.0, 0.0, 1.0),
            lights: vec![
                Lightformer {
                    form: LightForm::Rect,
                    intensity: 5.0,
                    position: Vec3::new(3.0, 4.0, 3.0),
                    scale: 5.0,
                    color: white,
                },
                Lightformer {
                    form: LightForm::Rect,
                    intensity: 3.0,
                    position: Vec3::new(-5.0, 0.0, -5.0),
                    scale: 5.0,
                    color: white,
                },
                Lightformer {
                    form: LightForm::Circle,
                    intensity: 2.0,
                    position: Vec3::new(0.0, 5.0, 0.0),
                    scale: 2.0,
                    color: white,
                },
            ],
            shadow: ContactShadow {
                y: -1.6,
                opacity: 0.6,
                scale: 15.0,
                blur: 2.5,
                far: 4.0,
            },
        }
    }
}

impl Stage {
    /// Light positions after the rig rotation
    pub fn light_positions(&self) -> impl Iterator<Item = (Vec3, &Lightformer)> {
        let rig = euler_to_quat(self.environment_rotation);
        self.lights.iter().map(move |l| (rig * l.position, l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_extent_at_origin() {
        let camera = Camera::default();
        let extent = camera.world_extent_at(Vec3::ZERO, 2.0);
        let d = 37.0_f32.sqrt();
        let expected_h = 2.0 * (22.5_f32.to_radians()).tan() * d;
        assert!((extent.y - expected_h).abs() < 1e-4);
        assert!((extent.x - expected_h * 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_viewport_at_degenerate_window() {
        let camera = Camera::default();
        let vp = camera.viewport_at(Vec3::ZERO, Vec2::new(800.0, 0.0));
        assert!(!vp.is_valid());
        let vp = camera.viewport_at(Vec3::ZERO, Vec2::new(800.0, 600.0));
        assert!(vp.is_valid());
    }

    #[test]
    fn test_light_rig_preserves_distance() {
        let stage = Stage::default();
        for (rotated, light) in stage.light_positions() {
            assert!((rotated.length() - light.position.length()).abs() < 1e-4);
        }
        assert_eq!(stage.light_positions().count(), 3);
    }

    #[test]
    fn test_shadow_below_die() {
        let stage = Stage::default();
        assert!(stage.shadow.y < -crate::consts::DIE_HALF_EXTENT);
    }
}
