//! Die faces and their fixed orientations
//!
//! Every face is authored in the same face-local frame (normal = +Z) and then
//! rotated into die-local space. Opposite faces sum to seven.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use super::error::DieError;
use crate::euler_to_quat;

/// One of the six faces of a standard die, named by its pip count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl Face {
    /// All faces in pip-count order
    pub const ALL: [Face; 6] = [
        Face::One,
        Face::Two,
        Face::Three,
        Face::Four,
        Face::Five,
        Face::Six,
    ];

    /// Pip count (1..=6)
    pub fn value(self) -> u8 {
        match self {
            Face::One => 1,
            Face::Two => 2,
            Face::Three => 3,
            Face::Four => 4,
            Face::Five => 5,
            Face::Six => 6,
        }
    }

    /// The face on the other side of the die
    pub fn opposite(self) -> Face {
        match self {
            Face::One => Face::Six,
            Face::Two => Face::Five,
            Face::Three => Face::Four,
            Face::Four => Face::Three,
            Face::Five => Face::Two,
            Face::Six => Face::One,
        }
    }

    /// Where the face sits on the die
    pub fn side(self) -> &'static str {
        match self {
            Face::One => "front",
            Face::Two => "top",
            Face::Three => "right",
            Face::Four => "left",
            Face::Five => "bottom",
            Face::Six => "back",
        }
    }

    /// Face-local -> die-local rotation as XYZ Euler angles (radians)
    pub fn orientation(self) -> Vec3 {
        match self {
            Face::One => Vec3::ZERO,
            Face::Two => Vec3::new(-FRAC_PI_2, 0.0, 0.0),
            Face::Three => Vec3::new(0.0, FRAC_PI_2, 0.0),
            Face::Four => Vec3::new(0.0, -FRAC_PI_2, 0.0),
            Face::Five => Vec3::new(FRAC_PI_2, 0.0, 0.0),
            Face::Six => Vec3::new(0.0, PI, 0.0),
        }
    }

    /// Face-local -> die-local rotation
    #[inline]
    pub fn rotation(self) -> Quat {
        euler_to_quat(self.orientation())
    }

    /// Outward normal in die-local space
    pub fn normal(self) -> Vec3 {
        self.rotation() * Vec3::Z
    }
}

impl TryFrom<u8> for Face {
    type Error = DieError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Face::One),
            2 => Ok(Face::Two),
            3 => Ok(Face::Three),
            4 => Ok(Face::Four),
            5 => Ok(Face::Five),
            6 => Ok(Face::Six),
            other => Err(DieError::InvalidFace(other)),
        }
    }
}

impl From<Face> for u8 {
    fn from(face: Face) -> Self {
        face.value()
    }
}
