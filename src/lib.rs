// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU-accelerated interactive solar-system viewer built on wgpu.
//!
//! Orrery renders a star skybox, a sun and eight planets loaded from GLB
//! models, spins them in place and carries them around the sun, and lets
//! the user orbit, pan and zoom the camera. It runs in the browser as a
//! wasm module and natively in a winit window.
//!
//! # Key entry points
//!
//! - [`engine::OrreryEngine`] - the engine: scene, camera, renderers
//! - [`scene::catalog::Catalog`] - which bodies exist and where
//! - [`options::Options`] - runtime configuration (camera, lighting, fog,
//!   animation, keybindings, catalog)
//! - [`assets`] - model and skybox fetching with ordered, cancellable
//!   loading
//!
//! # Architecture
//!
//! The engine owns a flat [`scene::SceneGraph`] where each planet hangs
//! under a pivot at the origin. Each frame the [`animation`] module turns
//! elapsed time into reference frames, rotates bodies and pivots, and the
//! renderers draw the skybox followed by every loaded body mesh. Assets
//! arrive one at a time and are attached as soon as they decode, so the
//! scene fills in progressively.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
#[cfg(feature = "viewer")]
pub mod viewer;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use engine::command::OrreryCommand;
pub use engine::OrreryEngine;
pub use error::OrreryError;
pub use input::{InputEvent, MouseButton};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
