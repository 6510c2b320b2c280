//! Die geometry and matching signed distance functions
//!
//! The SDFs mirror the ones in `die_shader.wgsl` so placement can be checked
//! on the CPU.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Mesh shape parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Box with rounded edges and corners
    RoundedBox {
        /// Full edge lengths
        size: Vec3,
        /// Corner radius
        radius: f32,
        /// Corner tessellation hint for mesh-based hosts
        smoothness: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

impl Geometry {
    /// Signed distance from a point in mesh-local space
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        match *self {
            Geometry::RoundedBox { size, radius, .. } => sd_rounded_box(p, size * 0.5, radius),
            Geometry::Sphere { radius, .. } => sd_sphere(p, radius),
        }
    }

    /// Radius of the smallest origin-centered sphere enclosing the mesh
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Geometry::RoundedBox { size, radius, .. } => {
                let inner = (size * 0.5 - Vec3::splat(radius)).max(Vec3::ZERO);
                inner.length() + radius
            }
            Geometry::Sphere { radius, .. } => radius,
        }
    }
}

/// Signed distance to a sphere at the origin
#[inline]
pub fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Signed distance to a rounded box at the origin
///
/// `half_extent` is the outer half size; edges are rounded by `radius`.
pub fn sd_rounded_box(p: Vec3, half_extent: Vec3, radius: f32) -> f32 {
    let q = p.abs() - half_extent + Vec3::splat(radius);
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0) - radius
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec3 = Vec3::splat(1.0);

    #[test]
    fn test_rounded_box_face_centers_on_surface() {
        for n in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            assert!(sd_rounded_box(n, HALF, 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rounded_box_corner_is_cut() {
        // The sharp corner lies outside the rounded surface
        assert!(sd_rounded_box(Vec3::ONE, HALF, 0.25) > 0.0);
        // Zero radius reproduces the sharp box
        assert!(sd_rounded_box(Vec3::ONE, HALF, 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_rounded_box_inside_negative() {
        assert!((sd_rounded_box(Vec3::ZERO, HALF, 0.25) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere() {
        assert!((sd_sphere(Vec3::new(0.0, 3.0, 0.0), 1.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_radius() {
        let body = Geometry::RoundedBox {
            size: Vec3::splat(2.0),
            radius: 0.25,
            smoothness: 8,
        };
        let r = body.bounding_radius();
        // Between the face distance and the sharp corner distance
        assert!(r > 1.0 && r < 3.0_f32.sqrt());
        // The farthest rounded corner point sits exactly on the surface
        let corner = Vec3::ONE.normalize() * r;
        assert!(body.signed_distance(corner).abs() < 1e-5);
    }
}
