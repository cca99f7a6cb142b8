//! Scene graph and the solar-system layout built on top of it.
//!
//! [`SceneGraph`] is a flat arena of [`Node`]s. Parents are always created
//! before their children, so world matrices resolve in a single forward
//! pass. [`system::SolarSystem`] populates a graph from a
//! [`catalog::Catalog`] and tracks which bodies have a loaded model.

/// Celestial-body descriptors and the default solar-system catalog.
pub mod catalog;
/// Nodes, transforms, and handles.
pub mod node;
/// Solar-system layout: pivots, bodies, lights, draw lists.
pub mod system;

use glam::Mat4;
pub use node::{ModelSlot, Node, NodeId, Transform};

/// Arena-backed transform hierarchy.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Graph containing only an identity root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("root", Transform::IDENTITY, None)],
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append a node under `parent`. Unknown parents fall back to the root.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
    ) -> NodeId {
        let parent = if parent.0 < self.nodes.len() {
            parent
        } else {
            log::warn!("add_node: unknown parent {parent:?}, using root");
            self.root()
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, transform, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Borrow a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// First node with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Attach `slot` to a node, returning the model it replaced.
    pub fn set_model(
        &mut self,
        id: NodeId,
        slot: ModelSlot,
    ) -> Option<ModelSlot> {
        self.nodes.get_mut(id.0)?.model.replace(slot)
    }

    /// Detach and return a node's model.
    pub fn take_model(&mut self, id: NodeId) -> Option<ModelSlot> {
        self.nodes.get_mut(id.0)?.model.take()
    }

    /// World matrix of a single node (walks up to the root).
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = self.nodes.get(id.0);
        while let Some(node) = cursor {
            matrix = node.transform.matrix() * matrix;
            cursor = node.parent.and_then(|p| self.nodes.get(p.0));
        }
        matrix
    }

    /// World matrices of every node, indexed by [`NodeId::index`].
    #[must_use]
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut out: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = node.transform.matrix();
            let world = match node.parent {
                Some(p) => out[p.0] * local,
                None => local,
            };
            out.push(world);
        }
        out
    }

    /// Iterate `(id, node)` pairs in creation order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn world_matrix_composes_parent_chain() {
        let mut graph = SceneGraph::new();
        let pivot = graph.add_node(graph.root(), "pivot", Transform::IDENTITY);
        let body = graph.add_node(
            pivot,
            "body",
            Transform::from_translation_scale(Vec3::new(20.0, 4.0, 0.0), 0.5),
        );
        graph.node_mut(pivot).unwrap().transform.rotation.y =
            std::f32::consts::PI;

        let p = graph.world_matrix(body).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(-20.0, 4.0, 0.0)).length() < 1e-4);

        let all = graph.world_matrices();
        assert_eq!(all.len(), graph.len());
        let q = all[body.index()].transform_point3(Vec3::ZERO);
        assert!((p - q).length() < 1e-5);
    }

    #[test]
    fn child_scale_does_not_leak_to_siblings() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(
            graph.root(),
            "a",
            Transform::from_translation_scale(Vec3::ZERO, 10.0),
        );
        let b = graph.add_node(
            graph.root(),
            "b",
            Transform::from_translation_scale(Vec3::X, 1.0),
        );
        let world = graph.world_matrices();
        assert!(
            (world[a.index()].transform_point3(Vec3::X).x - 10.0).abs() < 1e-5
        );
        assert!(
            (world[b.index()].transform_point3(Vec3::X).x - 2.0).abs() < 1e-5
        );
    }

    #[test]
    fn set_model_replaces_and_returns_previous() {
        let mut graph = SceneGraph::new();
        let id = graph.add_node(graph.root(), "n", Transform::IDENTITY);
        assert_eq!(graph.set_model(id, ModelSlot(1)), None);
        assert_eq!(graph.set_model(id, ModelSlot(2)), Some(ModelSlot(1)));
        assert_eq!(graph.take_model(id), Some(ModelSlot(2)));
        assert_eq!(graph.node(id).unwrap().model, None);
    }

    #[test]
    fn find_and_children() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(graph.root(), "alpha", Transform::IDENTITY);
        let b = graph.add_node(a, "beta", Transform::IDENTITY);
        assert_eq!(graph.find("beta"), Some(b));
        assert_eq!(graph.find("gamma"), None);
        assert_eq!(graph.node(a).unwrap().children(), &[b]);
        assert_eq!(graph.node(b).unwrap().parent(), Some(a));
    }
}
