use glam::{Mat4, Vec3};

use crate::scene::catalog::{BodyDescriptor, Catalog, PointLightDescriptor};
use crate::scene::{ModelSlot, NodeId, SceneGraph, Transform};

/// Index of a body in its [`SolarSystem`] (catalog order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

/// A body placed in the graph.
#[derive(Debug, Clone)]
pub struct Body {
    /// The static descriptor this body was built from.
    pub descriptor: BodyDescriptor,
    /// Empty node at the origin whose rotation carries the body around.
    pub pivot: Option<NodeId>,
    /// The node holding the body's model, position and scale.
    pub node: NodeId,
}

/// Scene graph populated from a [`Catalog`].
pub struct SolarSystem {
    graph: SceneGraph,
    bodies: Vec<Body>,
}

impl SolarSystem {
    /// Build pivots and body nodes for every descriptor. Models start
    /// unloaded.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mut bodies = Vec::with_capacity(catalog.bodies.len());

        for descriptor in &catalog.bodies {
            let pivot = descriptor.orbit_speed.map(|_| {
                graph.add_node(
                    root,
                    format!("{} pivot", descriptor.name),
                    Transform::IDENTITY,
                )
            });
            let node = graph.add_node(
                pivot.unwrap_or(root),
                descriptor.name.clone(),
                Transform::from_translation_scale(
                    Vec3::from_array(descriptor.position),
                    descriptor.scale,
                ),
            );
            bodies.push(Body {
                descriptor: descriptor.clone(),
                pivot,
                node,
            });
        }

        log::debug!(
            "solar system: {} bodies, {} nodes",
            bodies.len(),
            graph.len()
        );
        Self { graph, bodies }
    }

    /// The underlying scene graph.
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable access to the scene graph (transforms only; structure is
    /// fixed after construction).
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// All bodies in catalog order.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Body by id.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    /// Body at `id`, provided it is still called `name`. Ids are positional,
    /// so a model requested for an older catalog may arrive for a body that
    /// has since been replaced.
    #[must_use]
    pub fn body_named(&self, id: BodyId, name: &str) -> Option<&Body> {
        self.body(id).filter(|b| b.descriptor.name == name)
    }

    /// Body id by name.
    #[must_use]
    pub fn body_by_name(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.descriptor.name == name)
            .map(BodyId)
    }

    /// Model currently attached to a body.
    #[must_use]
    pub fn model(&self, id: BodyId) -> Option<ModelSlot> {
        let body = self.bodies.get(id.0)?;
        self.graph.node(body.node)?.model
    }

    /// Whether a body's model has loaded.
    #[must_use]
    pub fn is_loaded(&self, id: BodyId) -> bool {
        self.model(id).is_some()
    }

    /// Attach a loaded model to a body. A body holds at most one model, so
    /// any previous model is returned for the caller to release. Bodies
    /// that carry a light start emitting now.
    pub fn attach_model(
        &mut self,
        id: BodyId,
        slot: ModelSlot,
    ) -> Option<ModelSlot> {
        let Some(body) = self.bodies.get(id.0) else {
            log::warn!("attach_model: unknown body {id:?}");
            return Some(slot);
        };
        let node_id = body.node;
        let light = body.descriptor.light;
        let previous = self.graph.set_model(node_id, slot);
        if let Some(node) = self.graph.node_mut(node_id) {
            node.light = light;
        }
        previous
    }

    /// Detach every model (for disposal), returning their slots.
    pub fn detach_all(&mut self) -> Vec<ModelSlot> {
        let nodes: Vec<NodeId> = self.bodies.iter().map(|b| b.node).collect();
        nodes
            .into_iter()
            .filter_map(|node| {
                if let Some(n) = self.graph.node_mut(node) {
                    n.light = None;
                }
                self.graph.take_model(node)
            })
            .collect()
    }

    /// World position and parameters of the first active light.
    #[must_use]
    pub fn active_light(&self) -> Option<(Vec3, PointLightDescriptor)> {
        self.graph.iter().find_map(|(id, node)| {
            node.light.map(|light| {
                let position =
                    self.graph.world_matrix(id).transform_point3(Vec3::ZERO);
                (position, light)
            })
        })
    }

    /// Models to draw this frame with their world matrices, plus whether
    /// the owning node emits light (drawn unlit).
    #[must_use]
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let world = self.graph.world_matrices();
        self.graph
            .iter()
            .filter_map(|(id, node)| {
                node.model.map(|slot| DrawItem {
                    slot,
                    world: world[id.index()],
                    unlit: node.light.is_some(),
                })
            })
            .collect()
    }
}

/// One model instance to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// GPU model to draw.
    pub slot: ModelSlot,
    /// Node world matrix.
    pub world: Mat4,
    /// Skip lighting (the node is itself the light source).
    pub unlit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> SolarSystem {
        SolarSystem::new(&Catalog::solar_system())
    }

    #[test]
    fn planets_hang_off_pivots_and_sun_off_root() {
        let sys = system();
        let graph = sys.graph();
        // root + sun + 8 * (pivot + planet)
        assert_eq!(graph.len(), 1 + 1 + 16);

        let sun = sys.body(BodyId(0)).unwrap();
        assert!(sun.pivot.is_none());
        assert_eq!(graph.node(sun.node).unwrap().parent(), Some(graph.root()));

        let earth = sys.body(sys.body_by_name("Earth").unwrap()).unwrap();
        let pivot = earth.pivot.unwrap();
        assert_eq!(graph.node(earth.node).unwrap().parent(), Some(pivot));
        assert_eq!(
            graph.node(pivot).unwrap().transform.translation,
            Vec3::ZERO
        );
    }

    #[test]
    fn body_world_position_matches_descriptor() {
        let sys = system();
        let earth = sys.body(sys.body_by_name("Earth").unwrap()).unwrap();
        let p = sys
            .graph()
            .world_matrix(earth.node)
            .transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(45.0, 4.0, -8.0)).length() < 1e-4);
    }

    #[test]
    fn attach_keeps_one_model_per_body() {
        let mut sys = system();
        let mars = sys.body_by_name("Mars").unwrap();
        assert!(!sys.is_loaded(mars));
        assert_eq!(sys.attach_model(mars, ModelSlot(7)), None);
        assert_eq!(sys.attach_model(mars, ModelSlot(8)), Some(ModelSlot(7)));
        assert_eq!(sys.model(mars), Some(ModelSlot(8)));
        assert_eq!(sys.draw_list().len(), 1);
    }

    #[test]
    fn light_activates_only_after_sun_loads() {
        let mut sys = system();
        assert!(sys.active_light().is_none());
        let _ = sys.attach_model(BodyId(0), ModelSlot(0));
        let (position, light) = sys.active_light().unwrap();
        assert!((position - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
        assert_eq!(light.intensity, 300.0);

        let draws = sys.draw_list();
        assert_eq!(draws.len(), 1);
        assert!(draws[0].unlit);
    }

    #[test]
    fn detach_all_returns_every_slot_and_clears_lights() {
        let mut sys = system();
        let _ = sys.attach_model(BodyId(0), ModelSlot(0));
        let _ = sys.attach_model(BodyId(3), ModelSlot(1));
        let mut slots = sys.detach_all();
        slots.sort_by_key(|s| s.0);
        assert_eq!(slots, vec![ModelSlot(0), ModelSlot(1)]);
        assert!(sys.draw_list().is_empty());
        assert!(sys.active_light().is_none());
    }

    #[test]
    fn detach_all_twice_returns_nothing_the_second_time() {
        let mut sys = system();
        let _ = sys.attach_model(BodyId(1), ModelSlot(4));
        assert_eq!(sys.detach_all(), vec![ModelSlot(4)]);
        assert!(sys.detach_all().is_empty());
    }

    #[test]
    fn body_named_requires_the_name_at_that_index() {
        let sys = system();
        let earth = sys.body_by_name("Earth").unwrap();
        assert!(sys.body_named(earth, "Earth").is_some());
        assert!(sys.body_named(earth, "Mars").is_none());
        assert!(sys.body_named(BodyId(99), "Earth").is_none());
    }

    #[test]
    fn stale_ids_do_not_match_a_rebuilt_catalog() {
        let old = system();
        let earth = old.body_by_name("Earth").unwrap();

        let mut catalog = Catalog::solar_system();
        let _ = catalog.bodies.remove(earth.0);
        let rebuilt = SolarSystem::new(&catalog);
        assert!(rebuilt.body(earth).is_some());
        assert!(rebuilt.body_named(earth, "Earth").is_none());
    }

    #[test]
    fn unknown_body_hands_the_slot_back() {
        let mut sys = system();
        assert_eq!(
            sys.attach_model(BodyId(99), ModelSlot(5)),
            Some(ModelSlot(5))
        );
    }
}
