use std::f32::consts::TAU;

use crate::scene::system::{BodyId, SolarSystem};

/// Per-frame rotation of bodies and their orbit pivots.
#[derive(Debug, Clone, Default)]
pub struct SpinAnimator {
    paused: bool,
}

impl SpinAnimator {
    /// Animator starting in the given pause state.
    #[must_use]
    pub fn new(paused: bool) -> Self {
        Self { paused }
    }

    /// Whether motion is stopped.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop or resume motion.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip the pause state, returning the new value.
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Advance every body by `frames` reference frames.
    ///
    /// Self-rotation only applies to bodies whose model has loaded; pivots
    /// turn regardless so a late-loading planet appears at its current
    /// orbital angle.
    pub fn advance(&self, system: &mut SolarSystem, frames: f32) {
        if self.paused || frames <= 0.0 {
            return;
        }
        let steps: Vec<_> = system
            .bodies()
            .iter()
            .enumerate()
            .map(|(i, body)| {
                (
                    system.is_loaded(BodyId(i)).then_some(body.node),
                    body.descriptor.spin_speed,
                    body.pivot.zip(body.descriptor.orbit_speed),
                )
            })
            .collect();

        let graph = system.graph_mut();
        for (node, spin, orbit) in steps {
            if let Some(node) = node.and_then(|n| graph.node_mut(n)) {
                node.transform.rotation.y =
                    wrap_angle(node.transform.rotation.y + spin * frames);
            }
            if let Some((pivot, speed)) = orbit {
                if let Some(pivot) = graph.node_mut(pivot) {
                    pivot.transform.rotation.y = wrap_angle(
                        pivot.transform.rotation.y + speed * frames,
                    );
                }
            }
        }
    }
}

/// Keep accumulated angles in `[0, TAU)` so f32 precision holds over long
/// sessions.
fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::catalog::Catalog;
    use crate::scene::ModelSlot;

    fn yaw(system: &SolarSystem, node: crate::scene::NodeId) -> f32 {
        system.graph().node(node).unwrap().transform.rotation.y
    }

    #[test]
    fn spin_waits_for_model_but_orbit_does_not() {
        let mut system = SolarSystem::new(&Catalog::solar_system());
        let earth_id = system.body_by_name("Earth").unwrap();
        let earth = system.body(earth_id).unwrap().clone();
        let animator = SpinAnimator::default();

        animator.advance(&mut system, 10.0);
        assert_eq!(yaw(&system, earth.node), 0.0);
        assert!((yaw(&system, earth.pivot.unwrap()) - 0.02).abs() < 1e-6);

        let _ = system.attach_model(earth_id, ModelSlot(0));
        animator.advance(&mut system, 10.0);
        assert!((yaw(&system, earth.node) - 0.03).abs() < 1e-6);
        assert!((yaw(&system, earth.pivot.unwrap()) - 0.04).abs() < 1e-6);
    }

    #[test]
    fn retrograde_spin_wraps_into_range() {
        let mut system = SolarSystem::new(&Catalog::solar_system());
        let venus_id = system.body_by_name("Venus").unwrap();
        let _ = system.attach_model(venus_id, ModelSlot(0));
        SpinAnimator::default().advance(&mut system, 1.0);
        let node = system.body(venus_id).unwrap().node;
        let angle = yaw(&system, node);
        assert!((0.0..TAU).contains(&angle));
        assert!((angle - (TAU - 0.002)).abs() < 1e-5);
    }

    #[test]
    fn paused_animator_leaves_scene_untouched() {
        let mut system = SolarSystem::new(&Catalog::solar_system());
        let mut animator = SpinAnimator::new(true);
        animator.advance(&mut system, 100.0);
        assert!(system
            .graph()
            .iter()
            .all(|(_, n)| n.transform.rotation.y == 0.0));
        assert!(!animator.toggle_paused());
        animator.advance(&mut system, 1.0);
        assert!(system
            .graph()
            .iter()
            .any(|(_, n)| n.transform.rotation.y != 0.0));
    }

    #[test]
    fn sun_has_no_pivot_and_spins_in_place() {
        let mut system = SolarSystem::new(&Catalog::solar_system());
        let _ = system.attach_model(BodyId(0), ModelSlot(0));
        SpinAnimator::default().advance(&mut system, 1.0);
        let sun = system.body(BodyId(0)).unwrap();
        assert!((yaw(&system, sun.node) - 0.001).abs() < 1e-6);
        let (pos, _) = system.active_light().unwrap();
        assert!((pos.y - 4.0).abs() < 1e-5 && pos.x.abs() < 1e-5);
    }
}
