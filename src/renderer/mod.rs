//! Render passes for the scene: a cube-map background and lit body
//! meshes, sharing one per-frame bind group.

/// Mesh renderer for loaded body models.
pub mod body;
/// Camera and lighting bind group shared by all pipelines.
pub mod frame;
/// Uniform block for the point light, ambient term and fog.
pub mod lighting;
pub(crate) mod pipeline_util;
/// Cube-map background.
pub mod skybox;

pub use body::BodyRenderer;
pub use frame::FrameBindings;
pub use lighting::LightingUniform;
pub use skybox::SkyboxRenderer;
