//! WebGPU rendering module
//!
//! The whole die is raymarched in the fragment shader from signed distance fields.

pub mod die_pipeline;

pub use die_pipeline::{DieRenderState, pack_frame};
