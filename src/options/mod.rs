//! Centralized viewer options with TOML preset support.
//!
//! Camera, lighting, fog, animation, renderer, keybinding and catalog
//! settings are consolidated here. Options serialize to/from TOML so a
//! deployment can override any subset of them.

mod animation;
mod camera;
mod lighting;
mod renderer;

use std::path::Path;

pub use animation::AnimationOptions;
pub use camera::CameraOptions;
pub use lighting::{FogOptions, LightingOptions};
pub use renderer::RendererOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::OrreryError;
use crate::input::KeyBindings;
use crate::scene::catalog::Catalog;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[fog]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Ambient and point-light parameters.
    pub lighting: LightingOptions,
    /// Distance fog parameters.
    pub fog: FogOptions,
    /// Spin and orbit timing.
    pub animation: AnimationOptions,
    /// Surface and frame settings.
    pub renderer: RendererOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeyBindings,
    /// Bodies and skybox to load.
    #[schemars(skip)]
    pub catalog: Catalog,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults; the
    /// catalog is validated.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::OptionsParse`] for malformed TOML and
    /// [`OrreryError::Catalog`] if the catalog is inconsistent.
    pub fn from_toml_str(content: &str) -> Result<Self, OrreryError> {
        let options: Self = toml::from_str(content)
            .map_err(|e| OrreryError::OptionsParse(e.to_string()))?;
        options.catalog.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Io`] if the file cannot be read, otherwise
    /// the errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: &Path) -> Result<Self, OrreryError> {
        let content = std::fs::read_to_string(path).map_err(OrreryError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::OptionsParse`] if serialization fails and
    /// [`OrreryError::Io`] if the file or its directory cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), OrreryError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| OrreryError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(OrreryError::Io)?;
        }
        std::fs::write(path, content).map_err(OrreryError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::command::OrreryCommand;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[fog]
enabled = false

[camera]
enable_damping = true
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert!(!opts.fog.enabled);
        assert_eq!(opts.fog.far, 500.0);
        assert!(opts.camera.enable_damping);
        assert_eq!(opts.camera.fovy, 75.0);
        assert_eq!(opts.catalog.bodies.len(), 9);
        assert_eq!(
            opts.keybindings.lookup("Space"),
            Some(OrreryCommand::ToggleAnimation)
        );
    }

    #[test]
    fn catalog_override_is_validated() {
        let toml_str = r#"
[[catalog.bodies]]
name = "Sun"
model = "models/sun.glb"
scale = 1.0
position = [0.0, 0.0, 0.0]
spin_speed = 0.0

[[catalog.bodies]]
name = "Sun"
model = "models/sun2.glb"
scale = 1.0
position = [0.0, 0.0, 0.0]
spin_speed = 0.0
"#;
        assert!(matches!(
            Options::from_toml_str(toml_str),
            Err(OrreryError::Catalog(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Options::from_toml_str("[camera\nfovy = "),
            Err(OrreryError::OptionsParse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("orrery-options-{}", std::process::id()));
        let path = dir.join("view.toml");
        let mut opts = Options::default();
        opts.animation.time_scale = 3.0;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("lighting"));
        assert!(props.contains_key("fog"));
        assert!(props.contains_key("animation"));
        assert!(props.contains_key("renderer"));

        assert!(!props.contains_key("keybindings"));
        assert!(!props.contains_key("catalog"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("enable_damping").is_some());
        assert!(camera.get("znear").is_none());
        assert!(camera.get("position").is_none());
    }
}
