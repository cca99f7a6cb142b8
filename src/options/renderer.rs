use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Renderer", inline)]
#[serde(default)]
/// Surface and frame settings.
pub struct RendererOptions {
    /// Fixed device pixel ratio. `None` follows the display.
    #[schemars(skip)]
    pub pixel_ratio: Option<f32>,
    /// Color the frame is cleared to before the skybox.
    #[schemars(skip)]
    pub clear_color: [f32; 4],
    /// Draw the star skybox.
    #[schemars(title = "Skybox")]
    pub skybox: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            skybox: true,
        }
    }
}
