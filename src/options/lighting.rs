use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Scene-wide light terms. Point lights come from the catalog.
pub struct LightingOptions {
    /// Ambient light level added to every lit surface.
    #[schemars(title = "Ambient", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub ambient: f32,
    /// Ambient light color.
    #[schemars(skip)]
    pub ambient_color: [f32; 3],
    /// Multiplier on catalog point-light intensities.
    #[schemars(title = "Light Scale", range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub point_light_scale: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient: 0.05,
            ambient_color: [1.0, 1.0, 1.0],
            point_light_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Fog", inline)]
#[serde(default)]
/// Linear distance fog.
pub struct FogOptions {
    /// Blend distant surfaces toward the fog color.
    #[schemars(title = "Enabled")]
    pub enabled: bool,
    /// Fog color.
    #[schemars(skip)]
    pub color: [f32; 3],
    /// Distance where fog starts.
    #[schemars(title = "Near", range(min = 0.0, max = 1000.0), extend("step" = 5.0))]
    pub near: f32,
    /// Distance where fog is opaque.
    #[schemars(title = "Far", range(min = 1.0, max = 2000.0), extend("step" = 10.0))]
    pub far: f32,
}

impl Default for FogOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            color: [1.0, 1.0, 1.0],
            near: 0.0,
            far: 500.0,
        }
    }
}
