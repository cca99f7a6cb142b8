use std::borrow::Cow;
use std::fmt;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

/// Shader composition failure.
#[derive(Debug)]
pub enum ShaderError {
    /// A shared `#import` module failed to register.
    Module {
        /// Path of the failing module.
        path: &'static str,
        /// Composer diagnostic.
        source: Box<ComposerError>,
    },
    /// A top-level shader failed to compose.
    Compose {
        /// Path of the failing shader.
        path: String,
        /// Composer diagnostic.
        source: Box<ComposerError>,
    },
    /// No embedded shader exists at the requested path.
    NotFound(String),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module { path, source } => {
                write!(f, "failed to register module '{path}': {source}")
            }
            Self::Compose { path, source } => {
                write!(f, "failed to compose '{path}': {source}")
            }
            Self::NotFound(path) => write!(f, "unknown shader '{path}'"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Module { source, .. } | Self::Compose { source, .. } => {
                Some(source.as_ref())
            }
            Self::NotFound(_) => None,
        }
    }
}

/// Shared module definition.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Shared modules in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/camera.wgsl"),
        file_path: "modules/camera.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/lighting.wgsl"),
        file_path: "modules/lighting.wgsl",
    },
];

/// Embedded top-level shader source for `path` (relative to
/// `assets/shaders/`).
fn shader_source(path: &str) -> Option<&'static str> {
    match path {
        "raster/body.wgsl" => {
            Some(include_str!("../../assets/shaders/raster/body.wgsl"))
        }
        "screen/skybox.wgsl" => {
            Some(include_str!("../../assets/shaders/screen/skybox.wgsl"))
        }
        _ => None,
    }
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Consuming shaders use `#import orrery::camera` / `#import
/// orrery::lighting` to pull in shared structs and functions. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError::Module`] if a shared module fails to parse.
    pub fn new() -> Result<Self, ShaderError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| ShaderError::Module {
                    path: m.file_path,
                    source: Box::new(e),
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose the embedded shader at `path` into a `wgpu::ShaderModule`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the path is unknown or composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        path: &str,
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        let naga_module = self.compose_naga(path)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose the embedded shader at `path` into naga IR without a device.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the path is unknown or composition fails.
    pub fn compose_naga(
        &mut self,
        path: &str,
    ) -> Result<naga::Module, ShaderError> {
        let source = shader_source(path)
            .ok_or_else(|| ShaderError::NotFound(path.to_owned()))?;
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path: path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| ShaderError::Compose {
                path: path.to_owned(),
                source: Box::new(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for path in ["raster/body.wgsl", "screen/skybox.wgsl"] {
            if let Err(e) = composer.compose_naga(path) {
                panic!("shader '{path}' failed to compose: {e}");
            }
        }
    }

    #[test]
    fn unknown_shader_is_reported() {
        let mut composer = ShaderComposer::new().unwrap();
        assert!(matches!(
            composer.compose_naga("raster/missing.wgsl"),
            Err(ShaderError::NotFound(_))
        ));
    }
}
