//! Camera system for the scene view.
//!
//! Provides a perspective camera driven by orbit controls with rotation,
//! panning, dolly, optional damping and reset.

/// Orbit camera controller owning the GPU uniform.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Spherical orbit controls with distance and angle limits.
pub mod orbit;
