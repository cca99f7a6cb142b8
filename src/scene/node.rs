use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::scene::catalog::PointLightDescriptor;

/// Index of a node inside its [`SceneGraph`](super::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the graph's storage.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to GPU-resident model data owned by the body renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelSlot(pub usize);

/// Local transform of a scene node.
///
/// Rotation is stored as Euler angles (radians, applied X then Y then Z) so
/// per-frame spins can accumulate on a single axis without drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset from the parent origin.
    pub translation: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, rotation, or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Transform with a translation and uniform scale.
    #[must_use]
    pub fn from_translation_scale(translation: Vec3, scale: f32) -> Self {
        Self {
            translation,
            scale: Vec3::splat(scale),
            ..Self::IDENTITY
        }
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local matrix: translate · rotate · scale.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.quat(),
            self.translation,
        )
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Human-readable name, used for lookups and logs.
    pub name: String,
    /// Local transform relative to the parent.
    pub transform: Transform,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Loaded model drawn at this node, if any.
    pub model: Option<ModelSlot>,
    /// Point light emitted from this node's origin, if any.
    pub light: Option<PointLightDescriptor>,
}

impl Node {
    #[must_use]
    pub(crate) fn new(
        name: impl Into<String>,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            name: name.into(),
            transform,
            parent,
            children: Vec::new(),
            model: None,
            light: None,
        }
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t =
            Transform::from_translation_scale(Vec3::new(10.0, 0.0, 0.0), 2.0);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn yaw_rotates_about_y() {
        let t = Transform {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ..Transform::IDENTITY
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
