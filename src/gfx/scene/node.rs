//! # Scene Graph Nodes
//!
//! A [`Node`] is a tree element holding a local transform, a material and
//! its children. What a node *is* — plain group, procedural primitive,
//! loaded model or instanced mesh — is a [`NodeKind`] variant resolved at
//! construction, so the render traversal dispatches with one `match`
//! instead of re-checking capabilities every frame.

use cgmath::{Matrix4, Rad, Vector3, Vector4};

use crate::error::RenderError;
use crate::gfx::camera::free_camera::Camera;
use crate::gfx::rendering::renderer::RenderCtx;
use crate::gfx::rendering::uniforms::MaterialInfo;
use crate::gfx::scene::instance::Instance;
use crate::gfx::scene::model::Model;
use crate::gfx::scene::primitive::Primitive;

/// Per-node surface appearance.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub color: Vector4<f32>,
    /// Specular exponent, typically 1..128.
    pub shininess: f32,
    pub use_texture: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            shininess: 32.0,
            use_texture: false,
        }
    }
}

impl Material {
    pub(crate) fn to_gpu(self) -> MaterialInfo {
        MaterialInfo {
            color: self.color.into(),
            shininess: self.shininess,
            use_texture: self.use_texture as u32,
            _padding: [0.0; 2],
        }
    }
}

/// What a node renders, fixed at construction.
pub enum NodeKind {
    /// Pure grouping/transform node, draws nothing itself.
    Group,
    Primitive(Primitive),
    Model(Model),
    Instance(Instance),
}

/// The draw contract implemented by the renderable node kinds.
///
/// `model_matrix` is the node's world matrix for this frame, already
/// composed with every ancestor transform.
pub trait Renderable {
    fn draw(
        &mut self,
        ctx: &mut RenderCtx,
        model_matrix: Matrix4<f32>,
        camera: &Camera,
        material: &Material,
    ) -> Result<(), RenderError>;
}

/// Scene graph tree element.
///
/// A node exclusively owns its children; the render traversal carries the
/// parent world matrix down the tree, so no back-reference to the parent
/// is kept.
pub struct Node {
    pub name: String,
    pub position: Vector3<f32>,
    /// Euler angles in radians, applied in X, Y, Z order.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub material: Material,
    /// The local matrix used for the last render.
    pub model_matrix: Matrix4<f32>,
    override_matrix: Option<Matrix4<f32>>,
    pub children: Vec<Node>,
    kind: NodeKind,
}

impl Node {
    /// Creates a non-drawing grouping node.
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        let mut node = Self {
            name: name.into(),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            material: Material::default(),
            model_matrix: cgmath::SquareMatrix::identity(),
            override_matrix: None,
            children: Vec::new(),
            kind,
        };
        node.model_matrix = node.compose_local_matrix();
        node
    }

    /// Appends a child. The tree is a tree: callers must never add a node
    /// to one of its own descendants.
    pub fn add_child(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Depth-first search for the first descendant with `name`.
    pub fn child_named(&self, name: &str) -> Option<&Node> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.child_named(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn child_named_mut(&mut self, name: &str) -> Option<&mut Node> {
        for child in &mut self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.child_named_mut(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// The instance payload, if this node is an instanced mesh.
    pub fn instance_mut(&mut self) -> Option<&mut Instance> {
        match &mut self.kind {
            NodeKind::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Replaces the composed local matrix with a caller-supplied one,
    /// verbatim, until [`Node::clear_override_matrix`]. Used for animated
    /// procedural motion that does not decompose into position, rotation
    /// and scale.
    pub fn set_override_matrix(&mut self, matrix: Matrix4<f32>) {
        self.override_matrix = Some(matrix);
    }

    pub fn clear_override_matrix(&mut self) {
        self.override_matrix = None;
    }

    /// The node's local matrix for this frame: the override if one is set,
    /// otherwise the composed transform.
    pub fn local_matrix(&self) -> Matrix4<f32> {
        match self.override_matrix {
            Some(matrix) => matrix,
            None => self.compose_local_matrix(),
        }
    }

    // The composition order translate * rx * ry * rz * scale is
    // load-bearing for visual correctness; do not reorder.
    fn compose_local_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Renders this subtree.
    ///
    /// Children are rendered before the node's own draw submission. With a
    /// depth buffer that ordering has no correctness impact for opaque
    /// geometry; it is a preserved design choice.
    pub fn render(
        &mut self,
        ctx: &mut RenderCtx,
        parent_matrix: Matrix4<f32>,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        self.model_matrix = self.local_matrix();
        let world_matrix = parent_matrix * self.model_matrix;

        for child in &mut self.children {
            child.render(ctx, world_matrix, camera)?;
        }

        match &mut self.kind {
            NodeKind::Group => Ok(()),
            NodeKind::Primitive(primitive) => {
                primitive.draw(ctx, world_matrix, camera, &self.material)
            }
            NodeKind::Model(model) => model.draw(ctx, world_matrix, camera, &self.material),
            NodeKind::Instance(instance) => {
                instance.draw(ctx, world_matrix, camera, &self.material)
            }
        }
    }

    /// Computes the world matrix this node would draw with, without
    /// touching the GPU. The traversal in [`Node::render`] performs the
    /// same composition.
    pub fn world_matrix(&self, parent_matrix: Matrix4<f32>) -> Matrix4<f32> {
        parent_matrix * self.local_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    fn matrices_close(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
        let a: [[f32; 4]; 4] = a.into();
        let b: [[f32; 4]; 4] = b.into();
        a.iter()
            .flatten()
            .zip(b.iter().flatten())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_local_matrix_composition_order() {
        let mut node = Node::group("n");
        node.position = Vector3::new(1.0, 2.0, 3.0);
        node.rotation = Vector3::new(0.3, -0.6, 1.1);
        node.scale = Vector3::new(2.0, 0.5, 4.0);

        let expected = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))
            * Matrix4::from_angle_x(Rad(0.3))
            * Matrix4::from_angle_y(Rad(-0.6))
            * Matrix4::from_angle_z(Rad(1.1))
            * Matrix4::from_nonuniform_scale(2.0, 0.5, 4.0);

        assert!(matrices_close(node.local_matrix(), expected));
    }

    #[test]
    fn test_world_matrix_is_ancestor_chain_product() {
        // three translation-only nodes: the composed world origin is the
        // sum of the offsets
        let mut root = Node::group("root");
        root.position = Vector3::new(1.0, 0.0, 0.0);
        let mut mid = Node::group("mid");
        mid.position = Vector3::new(0.0, 2.0, 0.0);
        let mut leaf = Node::group("leaf");
        leaf.position = Vector3::new(0.0, 0.0, 3.0);

        let world = leaf.world_matrix(mid.world_matrix(root.world_matrix(Matrix4::identity())));
        let origin = world * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.x - 1.0).abs() < 1e-5);
        assert!((origin.y - 2.0).abs() < 1e-5);
        assert!((origin.z - 3.0).abs() < 1e-5);
        assert!((origin.w - 1.0).abs() < 1e-5);

        // and it equals the explicit ordered product
        let product = root.local_matrix() * mid.local_matrix() * leaf.local_matrix();
        assert!(matrices_close(world, product));
    }

    #[test]
    fn test_override_matrix_bypasses_local_transform() {
        let mut node = Node::group("n");
        node.position = Vector3::new(5.0, 5.0, 5.0);
        node.rotation = Vector3::new(1.0, 2.0, 3.0);
        node.scale = Vector3::new(9.0, 9.0, 9.0);

        let override_matrix = Matrix4::from_translation(Vector3::new(-1.0, 0.0, 0.0));
        node.set_override_matrix(override_matrix);

        let parent = Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0));
        assert!(matrices_close(node.world_matrix(parent), parent * override_matrix));

        node.clear_override_matrix();
        assert!(matrices_close(
            node.world_matrix(parent),
            parent * node.local_matrix()
        ));
    }

    #[test]
    fn test_child_lookup_depth_first() {
        let mut root = Node::group("root");
        let mut branch = Node::group("branch");
        branch.add_child(Node::group("leaf"));
        root.add_child(branch);
        root.add_child(Node::group("sibling"));

        assert!(root.child_named("leaf").is_some());
        assert!(root.child_named("sibling").is_some());
        assert!(root.child_named("missing").is_none());

        if let Some(leaf) = root.child_named_mut("leaf") {
            leaf.position.x = 7.0;
        }
        assert_eq!(root.child_named("leaf").unwrap().position.x, 7.0);
    }

    #[test]
    fn test_material_flag_packs_to_u32() {
        let mut material = Material::default();
        assert_eq!(material.to_gpu().use_texture, 0);
        material.use_texture = true;
        assert_eq!(material.to_gpu().use_texture, 1);
    }
}
