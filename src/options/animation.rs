use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Animation", inline)]
#[serde(default)]
/// Spin and orbit timing.
pub struct AnimationOptions {
    /// Frame rate the catalog's per-frame speeds are authored for.
    #[schemars(skip)]
    pub reference_fps: f32,
    /// Speed multiplier on all motion.
    #[schemars(title = "Time Scale", range(min = 0.0, max = 20.0), extend("step" = 0.1))]
    pub time_scale: f32,
    /// Most reference frames one tick may advance.
    #[schemars(skip)]
    pub max_frames_per_tick: f32,
    /// Start with motion stopped.
    #[schemars(title = "Paused")]
    pub paused: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            reference_fps: 60.0,
            time_scale: 1.0,
            max_frames_per_tick: 4.0,
            paused: false,
        }
    }
}
