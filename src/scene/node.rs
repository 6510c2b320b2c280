//! Transform nodes, meshes and draw calls

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use super::material::Material;

/// Local transform of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Geometry plus the material it is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

/// A scene graph node: a transform with an optional mesh and children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub children: Vec<Node>,
}

impl Node {
    /// Empty transform group
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            mesh: None,
            children: Vec::new(),
        }
    }

    /// Leaf node drawing `mesh`
    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::group(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search by name
    #[cfg(test)]
    pub(crate) fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Number of mesh nodes in this subtree
    pub fn mesh_count(&self) -> usize {
        self.mesh.is_some() as usize + self.children.iter().map(Node::mesh_count).sum::<usize>()
    }

    /// Visit every node depth-first (parent before children) with its world matrix
    pub fn visit<F>(&self, parent: Mat4, f: &mut F)
    where
        F: FnMut(&Node, Mat4),
    {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }
}

/// One mesh to draw with its resolved world transform
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub name: String,
    pub world: Mat4,
    pub geometry: Geometry,
    pub material: Material,
}

impl DrawCall {
    /// World-space origin of the mesh
    pub fn origin(&self) -> Vec3 {
        self.world.transform_point3(Vec3::ZERO)
    }
}

/// Per-frame output collected from the scene graph
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    /// Seconds since mount for this frame
    pub time: f32,
    draws: Vec<DrawCall>,
}

impl FrameContext {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            draws: Vec::new(),
        }
    }

    /// Reset for a new frame, keeping the allocation
    pub fn begin(&mut self, time: f32) {
        self.time = time;
        self.draws.clear();
    }

    pub fn push(&mut self, draw: DrawCall) {
        self.draws.push(draw);
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draw calls using a transmissive material
    pub fn transmissive(&self) -> impl Iterator<Item = &DrawCall> {
        self.draws
            .iter()
            .filter(|d| matches!(d.material, Material::Transmission(_)))
    }

    /// Draw calls using an emissive material
    pub fn emissive(&self) -> impl Iterator<Item = &DrawCall> {
        self.draws
            .iter()
            .filter(|d| matches!(d.material, Material::Emissive(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::material::EmissiveMaterial;

    fn dot() -> Mesh {
        Mesh {
            geometry: Geometry::Sphere {
                radius: 0.1,
                width_segments: 8,
                height_segments: 8,
            },
            material: Material::Emissive(EmissiveMaterial::GLOWING_PIP),
        }
    }

    #[test]
    fn test_visit_composes_parent_first() {
        let tree = Node::group("root")
            .with_transform(Transform::from_translation(Vec3::X))
            .with_child(
                Node::mesh("leaf", dot()).with_transform(Transform::from_translation(Vec3::Y)),
            );

        let mut seen = Vec::new();
        tree.visit(Mat4::IDENTITY, &mut |node, world| {
            seen.push((node.name.clone(), world.transform_point3(Vec3::ZERO)));
        });

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "root");
        assert!((seen[1].1 - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_find_and_count() {
        let tree = Node::group("root")
            .with_child(Node::group("a").with_child(Node::mesh("a0", dot())))
            .with_child(Node::mesh("b", dot()));
        assert_eq!(tree.mesh_count(), 2);
        assert!(tree.find("a0").is_some());
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_frame_begin_clears() {
        let mut frame = FrameContext::new(0.0);
        frame.push(DrawCall {
            name: "x".into(),
            world: Mat4::IDENTITY,
            geometry: dot().geometry,
            material: dot().material,
        });
        assert_eq!(frame.emissive().count(), 1);
        assert_eq!(frame.transmissive().count(), 0);
        frame.begin(1.0);
        assert!(frame.draws().is_empty());
        assert_eq!(frame.time, 1.0);
    }
}
