//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture or a programmatic call, is represented as an `OrreryCommand`
//! and passed to [`OrreryEngine::execute`](super::OrreryEngine::execute).

use glam::Vec2;

/// A discrete or parameterized operation the engine can perform.
///
/// ```ignore
/// engine.execute(OrreryCommand::ToggleFog);
/// engine.execute(OrreryCommand::Zoom { delta: 1.0 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrreryCommand {
    // ── Camera ──────────────────────────────────────────────────────
    /// Orbit the camera by `delta` pixels of pointer movement.
    RotateCamera {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },
    /// Pan the camera by `delta` pixels of pointer movement.
    PanCamera {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },
    /// Dolly the camera (positive = toward the target).
    Zoom {
        /// Wheel steps.
        delta: f32,
    },
    /// Return the camera to its initial pose.
    ResetCamera,

    // ── Scene ───────────────────────────────────────────────────────
    /// Pause or resume spin and orbit.
    ToggleAnimation,
    /// Turn distance fog on or off.
    ToggleFog,
}
