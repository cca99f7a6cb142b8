//! Asset fetching and decoding.
//!
//! Bytes come from an [`AssetSource`] (a directory on native, `fetch()` on
//! the web). GLB models decode into [`ModelData`], the skybox image into
//! [`CubeFaces`], and [`load_sequential`] drives the whole catalog one
//! request at a time.

/// GLB/glTF parsing into flat vertex and index buffers.
pub mod model;
/// Request queue with cancellation and per-item failure isolation.
pub mod queue;
/// Skybox image decoding into six cube faces.
pub mod skybox;
/// Byte sources for native and browser builds.
pub mod source;

use std::fmt;

pub use model::{MeshVertex, ModelData};
pub use queue::{
    load_sequential, CancelToken, LoadReport, LoadRequest, LoadedAsset,
};
pub use skybox::CubeFaces;
#[cfg(not(target_arch = "wasm32"))]
pub use source::FsSource;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use source::WebSource;
pub use source::AssetSource;

/// Failure fetching or decoding one asset.
#[derive(Debug)]
pub enum AssetError {
    /// The source could not deliver the bytes.
    Fetch {
        /// Path relative to the asset root.
        path: String,
        /// Transport-level reason.
        reason: String,
    },
    /// Filesystem read failure.
    Io {
        /// Path relative to the asset root.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The bytes are not a usable model.
    Model {
        /// Path relative to the asset root.
        path: String,
        /// Parser message.
        reason: String,
    },
    /// The bytes are not a decodable image.
    Image {
        /// Path relative to the asset root.
        path: String,
        /// Decoder message.
        reason: String,
    },
    /// Loading stopped because the owner was disposed.
    Cancelled,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { path, reason } => {
                write!(f, "failed to fetch '{path}': {reason}")
            }
            Self::Io { path, source } => {
                write!(f, "failed to read '{path}': {source}")
            }
            Self::Model { path, reason } => {
                write!(f, "invalid model '{path}': {reason}")
            }
            Self::Image { path, reason } => {
                write!(f, "invalid image '{path}': {reason}")
            }
            Self::Cancelled => write!(f, "loading cancelled"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
