//! Per-frame transform animation.
//!
//! Bodies spin about their own axis and their pivots carry them around the
//! origin. Speeds are authored per reference frame; [`FrameClock`] turns
//! real frame times into reference frames.

/// Wall-clock to reference-frame conversion.
pub mod clock;
/// Body spin and pivot orbit updates.
pub mod spin;

pub use clock::FrameClock;
pub use spin::SpinAnimator;
