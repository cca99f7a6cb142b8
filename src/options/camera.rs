use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
/// Camera projection, initial pose and orbit-control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 120.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Initial eye position, restored on reset.
    #[schemars(skip)]
    pub position: [f32; 3],
    /// Initial look-at target, restored on reset.
    #[schemars(skip)]
    pub target: [f32; 3],
    /// Closest the eye may get to the target.
    #[schemars(title = "Min Distance", range(min = 0.0, max = 100.0), extend("step" = 1.0))]
    pub min_distance: f32,
    /// Farthest the eye may get from the target.
    #[schemars(title = "Max Distance", range(min = 10.0, max = 1000.0), extend("step" = 10.0))]
    pub max_distance: f32,
    /// Ease camera motion over several frames.
    #[schemars(title = "Damping")]
    pub enable_damping: bool,
    /// Fraction of pending motion applied per frame when damping.
    #[schemars(title = "Damping Factor", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Allow panning the target.
    #[schemars(title = "Pan")]
    pub enable_pan: bool,
    /// Rotation sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Pan sensitivity multiplier.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub pan_speed: f32,
    /// Dolly sensitivity multiplier.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub zoom_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            position: [0.0, 20.0, 30.0],
            target: [0.0, 0.0, 0.0],
            min_distance: 0.0,
            max_distance: 150.0,
            enable_damping: false,
            damping_factor: 0.1,
            enable_pan: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}
