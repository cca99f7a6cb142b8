//! Crate-level error types.

use std::fmt;

use crate::assets::AssetError;
use crate::gpu::render_context::RenderContextError;
use crate::gpu::shader_composer::ShaderError;
use crate::scene::catalog::CatalogError;

/// Errors produced by the orrery crate.
#[derive(Debug)]
pub enum OrreryError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// WGSL composition failure.
    Shader(ShaderError),
    /// Failed to fetch or decode an asset.
    Asset(AssetError),
    /// The body catalog is inconsistent.
    Catalog(CatalogError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
    /// Browser API failure while mounting or unmounting.
    Web(String),
}

impl fmt::Display for OrreryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(e) => write!(f, "shader error: {e}"),
            Self::Asset(e) => write!(f, "asset error: {e}"),
            Self::Catalog(e) => write!(f, "catalog error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
            Self::Web(msg) => write!(f, "web error: {msg}"),
        }
    }
}

impl std::error::Error for OrreryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::Asset(e) => Some(e),
            Self::Catalog(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for OrreryError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<ShaderError> for OrreryError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<AssetError> for OrreryError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<CatalogError> for OrreryError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<std::io::Error> for OrreryError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
