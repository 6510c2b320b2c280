//! Die composer: builds the die's scene graph and poses it each frame

use glam::{Mat4, Vec3};

use super::geometry::Geometry;
use super::material::{EmissiveMaterial, Material, TransmissionMaterial};
use super::node::{DrawCall, FrameContext, Mesh, Node, Transform};
use crate::consts::*;
use crate::die::{DieLayout, DiePose, FaceSpec};
use crate::euler_to_quat;

/// Name of the posed root node
pub const ROOT_NODE: &str = "die";
/// Name of the glass body node
pub const BODY_NODE: &str = "die.body";

/// Glass body mesh
pub fn body_mesh() -> Mesh {
    Mesh {
        geometry: Geometry::RoundedBox {
            size: Vec3::splat(DIE_SIZE),
            radius: DIE_CORNER_RADIUS,
            smoothness: DIE_CORNER_SMOOTHNESS,
        },
        material: Material::Transmission(TransmissionMaterial::SMOKED_GLASS),
    }
}

/// Single pip mesh (shared by every pip)
pub fn pip_mesh() -> Mesh {
    Mesh {
        geometry: Geometry::Sphere {
            radius: PIP_RADIUS,
            width_segments: PIP_SEGMENTS,
            height_segments: PIP_SEGMENTS,
        },
        material: Material::Emissive(EmissiveMaterial::GLOWING_PIP),
    }
}

/// Face group: the face rotation with one pip mesh per template position
fn face_group(spec: &FaceSpec) -> Node {
    let pip = pip_mesh();
    let name = format!("face.{}", spec.face.value());

    spec.pip_positions.iter().enumerate().fold(
        Node::group(name.clone())
            .with_transform(Transform::from_rotation(euler_to_quat(spec.face_rotation))),
        |group, (i, pos)| {
            group.with_child(
                Node::mesh(format!("{name}.pip.{i}"), pip)
                    .with_transform(Transform::from_translation(*pos)),
            )
        },
    )
}

/// Owns the die's scene graph and its current pose
#[derive(Debug, Clone)]
pub struct DieComposer {
    root: Node,
    pose: DiePose,
}

impl Default for DieComposer {
    fn default() -> Self {
        Self::new(&DieLayout::new())
    }
}

impl DieComposer {
    pub fn new(layout: &DieLayout) -> Self {
        let root = layout.iter().fold(
            Node::group(ROOT_NODE).with_child(Node::mesh(BODY_NODE, body_mesh())),
            |root, spec| root.with_child(face_group(spec)),
        );

        log::debug!(
            "Composed die: {} meshes ({} pips)",
            root.mesh_count(),
            layout.pip_count()
        );

        let mut composer = Self {
            root,
            pose: DiePose::default(),
        };
        composer.apply_pose(DiePose::default());
        composer
    }

    /// Write the pose into the root transform
    pub fn apply_pose(&mut self, pose: DiePose) {
        self.pose = pose;
        self.root.transform = Transform {
            translation: pose.translation(),
            rotation: pose.orientation(),
            scale: Vec3::splat(pose.scale),
        };
    }

    /// Snapshot of the pose last applied
    pub fn current_pose(&self) -> DiePose {
        self.pose
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Emit one draw call per mesh, in scene-graph order (body first)
    pub fn render(&self, frame: &mut FrameContext) {
        self.root.visit(Mat4::IDENTITY, &mut |node, world| {
            if let Some(mesh) = node.mesh {
                frame.push(DrawCall {
                    name: node.name.clone(),
                    world,
                    geometry: mesh.geometry,
                    material: mesh.material,
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::{Face, FloatOffset, RotationController};
    use crate::scene::geometry::sd_rounded_box;
    use glam::Vec2;

    fn render(composer: &DieComposer) -> FrameContext {
        let mut frame = FrameContext::new(0.0);
        composer.render(&mut frame);
        frame
    }

    #[test]
    fn test_graph_shape() {
        let composer = DieComposer::default();
        let root = composer.root();
        assert_eq!(root.name, ROOT_NODE);
        // Body plus six face groups
        assert_eq!(root.children.len(), 7);
        assert_eq!(root.mesh_count(), 1 + TOTAL_PIPS);
        for face in Face::ALL {
            let group = root.find(&format!("face.{}", face.value())).unwrap();
            assert_eq!(group.children.len(), face.value() as usize);
        }
    }

    #[test]
    fn test_render_emits_body_then_pips() {
        let frame = render(&DieComposer::default());
        assert_eq!(frame.draws().len(), 1 + TOTAL_PIPS);
        assert_eq!(frame.draws()[0].name, BODY_NODE);
        assert_eq!(frame.transmissive().count(), 1);
        assert_eq!(frame.emissive().count(), TOTAL_PIPS);
    }

    #[test]
    fn test_pips_embedded_in_body_at_rest() {
        let frame = render(&DieComposer::default());
        let half = Vec3::splat(DIE_HALF_EXTENT);
        for pip in frame.emissive() {
            let d = sd_rounded_box(pip.origin(), half, DIE_CORNER_RADIUS);
            // Center just under the surface, sphere poking slightly through
            assert!(d < 0.0, "{} center outside body ({d})", pip.name);
            assert!(d > -PIP_RADIUS, "{} fully buried ({d})", pip.name);
        }
    }

    #[test]
    fn test_pose_moves_every_mesh() {
        let mut composer = DieComposer::default();
        let state = RotationController::rotation_at(12.0, Vec2::new(0.5, -0.5));
        let float = FloatOffset {
            rotation: Vec3::new(0.05, -0.02, 0.01),
            translation: Vec3::new(0.0, 0.1, 0.0),
        };
        let pose = DiePose::new(&state, float);
        composer.apply_pose(pose);
        assert_eq!(composer.current_pose(), pose);

        let rest = render(&DieComposer::default());
        let posed = render(&composer);
        let m = pose.matrix();
        for (a, b) in rest.draws().iter().zip(posed.draws()) {
            assert_eq!(a.name, b.name);
            let expected = m.transform_point3(a.origin());
            assert!((b.origin() - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_default_pose_is_rest() {
        let composer = DieComposer::default();
        assert_eq!(composer.current_pose(), DiePose::default());
        assert!(composer.root().transform.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }
}
