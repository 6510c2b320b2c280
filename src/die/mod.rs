//! Deterministic die model
//!
//! Everything here is pure and frame-rate independent:
//! - Pip layouts are fixed templates rotated into place
//! - Rotation is a function of elapsed time and the latest pointer sample
//! - No rendering or platform dependencies

pub mod error;
pub mod face;
pub mod float;
pub mod pips;
pub mod pointer;
pub mod pose;
pub mod rotation;

pub use error::DieError;
pub use face::Face;
pub use float::{FloatOffset, IdleFloat};
pub use pips::{DieLayout, FaceSpec, pip_template};
pub use pointer::{PointerReader, PointerSampler, PointerWriter, Viewport, pointer_cell};
pub use pose::DiePose;
pub use rotation::{RotationController, RotationState};
