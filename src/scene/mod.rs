//! Scene graph for the die
//!
//! Plain data: transform nodes, meshes and material descriptors. Rendering
//! walks the graph into a flat list of draw calls for the host pipeline.

pub mod camera;
pub mod composer;
pub mod geometry;
pub mod material;
pub mod node;

pub use camera::{Camera, ContactShadow, LightForm, Lightformer, Stage};
pub use composer::DieComposer;
pub use geometry::{Geometry, sd_rounded_box, sd_sphere};
pub use material::{EmissiveMaterial, Material, TransmissionMaterial};
pub use node::{DrawCall, FrameContext, Mesh, Node, Transform};
