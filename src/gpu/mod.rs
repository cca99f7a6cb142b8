//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, growable buffers, texture
//! upload helpers, and shader composition.

/// Growable GPU buffers and dynamic-offset uniform arrays.
pub mod dynamic_buffer;
/// Shared bind group layout and sampler helpers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Depth targets, 2D textures and cube maps.
pub mod texture;
