//! Pip layout generation
//!
//! One set of 2D templates (1 through 6 pips) is shared by every face. A face
//! pushes its template out to `PIP_DEPTH` along the face-local normal and the
//! face orientation rotates the result into die-local space.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::error::DieError;
use super::face::Face;
use crate::consts::{PIP_DEPTH, PIP_SPREAD};

const S: f32 = PIP_SPREAD;

const ONE: [Vec2; 1] = [Vec2::ZERO];
const TWO: [Vec2; 2] = [Vec2::new(-S, -S), Vec2::new(S, S)];
const THREE: [Vec2; 3] = [Vec2::new(-S, -S), Vec2::ZERO, Vec2::new(S, S)];
const FOUR: [Vec2; 4] = [
    Vec2::new(-S, -S),
    Vec2::new(S, S),
    Vec2::new(-S, S),
    Vec2::new(S, -S),
];
const FIVE: [Vec2; 5] = [
    Vec2::new(-S, -S),
    Vec2::new(S, S),
    Vec2::new(-S, S),
    Vec2::new(S, -S),
    Vec2::ZERO,
];
const SIX: [Vec2; 6] = [
    Vec2::new(-S, -S),
    Vec2::new(-S, 0.0),
    Vec2::new(-S, S),
    Vec2::new(S, -S),
    Vec2::new(S, 0.0),
    Vec2::new(S, S),
];

/// 2D pip template for a face (face-local x/y, centered on the face)
pub fn template(face: Face) -> &'static [Vec2] {
    match face {
        Face::One => &ONE,
        Face::Two => &TWO,
        Face::Three => &THREE,
        Face::Four => &FOUR,
        Face::Five => &FIVE,
        Face::Six => &SIX,
    }
}

/// 2D pip template by raw face index
pub fn pip_template(index: u8) -> Result<&'static [Vec2], DieError> {
    Face::try_from(index).map(template)
}

/// Immutable description of one face: its pips and orientation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSpec {
    pub face: Face,
    /// Pip centers in face-local space (z = `PIP_DEPTH`)
    pub pip_positions: Vec<Vec3>,
    /// Face-local -> die-local rotation (XYZ Euler radians)
    pub face_rotation: Vec3,
}

impl FaceSpec {
    pub fn new(face: Face) -> Self {
        let pip_positions = template(face)
            .iter()
            .map(|p| p.extend(PIP_DEPTH))
            .collect();

        Self {
            face,
            pip_positions,
            face_rotation: face.orientation(),
        }
    }

    /// Build the spec for a raw face index (1..=6)
    pub fn for_index(index: u8) -> Result<Self, DieError> {
        Face::try_from(index).map(Self::new)
    }

    /// Number of pips on this face
    #[inline]
    pub fn pip_count(&self) -> usize {
        self.pip_positions.len()
    }

    /// Outward face normal in die-local space
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.face.normal()
    }

    /// Pip centers rotated into die-local space
    pub fn die_local_pips(&self) -> Vec<Vec3> {
        let rotation = crate::euler_to_quat(self.face_rotation);
        self.pip_positions.iter().map(|p| rotation * *p).collect()
    }
}

/// The six face specs of a standard die, built once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieLayout {
    faces: [FaceSpec; 6],
}

impl Default for DieLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl DieLayout {
    pub fn new() -> Self {
        Self {
            faces: Face::ALL.map(FaceSpec::new),
        }
    }

    /// Spec for a given face
    pub fn face(&self, face: Face) -> &FaceSpec {
        &self.faces[face.value() as usize - 1]
    }

    /// Faces in pip-count order
    pub fn iter(&self) -> impl Iterator<Item = &FaceSpec> {
        self.faces.iter()
    }

    /// Total pips across all faces
    pub fn pip_count(&self) -> usize {
        self.faces.iter().map(FaceSpec::pip_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DIE_HALF_EXTENT, PIP_EPSILON, PIP_RADIUS, TOTAL_PIPS};

    fn contains_approx(set: &[Vec2], p: Vec2) -> bool {
        set.iter().any(|q| (*q - p).length() < 1e-6)
    }

    #[test]
    fn test_pip_counts_match_face_value() {
        for index in 1..=6u8 {
            let spec = FaceSpec::for_index(index).unwrap();
            assert_eq!(spec.pip_count(), index as usize);
            assert_eq!(pip_template(index).unwrap().len(), index as usize);
        }
        assert_eq!(DieLayout::new().pip_count(), TOTAL_PIPS);
    }

    #[test]
    fn test_invalid_face_index() {
        assert_eq!(FaceSpec::for_index(0), Err(DieError::InvalidFace(0)));
        assert_eq!(FaceSpec::for_index(7), Err(DieError::InvalidFace(7)));
        assert!(pip_template(255).is_err());
    }

    #[test]
    fn test_templates_half_turn_symmetric() {
        for face in Face::ALL {
            let set = template(face);
            for p in set {
                assert!(
                    contains_approx(set, -*p),
                    "face {} pip {:?} has no 180° partner",
                    face.value(),
                    p
                );
            }
        }
    }

    #[test]
    fn test_center_pip_only_on_odd_faces() {
        for face in Face::ALL {
            let has_center = contains_approx(template(face), Vec2::ZERO);
            assert_eq!(has_center, face.value() % 2 == 1, "face {}", face.value());
        }
    }

    #[test]
    fn test_five_is_four_plus_center() {
        let four = template(Face::Four);
        let five = template(Face::Five);
        assert_eq!(&five[..4], four);
        assert_eq!(five[4], Vec2::ZERO);
    }

    #[test]
    fn test_six_is_two_columns() {
        let six = template(Face::Six);
        assert_eq!(six.iter().filter(|p| p.x == -PIP_SPREAD).count(), 3);
        assert_eq!(six.iter().filter(|p| p.x == PIP_SPREAD).count(), 3);
        for y in [-PIP_SPREAD, 0.0, PIP_SPREAD] {
            assert!(contains_approx(six, Vec2::new(-PIP_SPREAD, y)));
            assert!(contains_approx(six, Vec2::new(PIP_SPREAD, y)));
        }
    }

    #[test]
    fn test_depth_is_constant() {
        let expected = DIE_HALF_EXTENT - PIP_RADIUS + PIP_EPSILON;
        for spec in DieLayout::new().iter() {
            for p in &spec.pip_positions {
                assert_eq!(p.z, expected);
            }
        }
    }

    #[test]
    fn test_die_local_pips_sit_on_their_face() {
        for spec in DieLayout::new().iter() {
            let normal = spec.normal();
            for p in spec.die_local_pips() {
                // Depth along the face normal is preserved by the rotation
                assert!((p.dot(normal) - PIP_DEPTH).abs() < 1e-5);
                // Lateral offset stays within the spread square
                let lateral = p - normal * p.dot(normal);
                assert!(lateral.abs().max_element() <= PIP_SPREAD + 1e-5);
            }
        }
    }

    #[test]
    fn test_faces_use_the_same_template() {
        // Un-rotating each face's die-local pips recovers the shared template
        for spec in DieLayout::new().iter() {
            let inverse = crate::euler_to_quat(spec.face_rotation).inverse();
            for (local, die) in spec.pip_positions.iter().zip(spec.die_local_pips()) {
                assert!((inverse * die - *local).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_layout_lookup() {
        let layout = DieLayout::new();
        for face in Face::ALL {
            assert_eq!(layout.face(face).face, face);
        }
    }
}
