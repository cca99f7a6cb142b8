use std::future::Future;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use super::AssetError;

/// Something that can deliver the raw bytes of an asset path.
///
/// Paths are relative to the source's root and use `/` separators.
pub trait AssetSource {
    /// Fetch the full contents of `path`.
    fn fetch(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, AssetError>>;
}

/// Reads assets from a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsSource {
    /// Source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetSource for FsSource {
    fn fetch(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, AssetError>> {
        let full = self.root.join(path);
        let path = path.to_owned();
        async move {
            std::fs::read(&full)
                .map_err(|source| AssetError::Io { path, source })
        }
    }
}

/// Fetches assets over HTTP relative to a base URL.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[derive(Debug, Clone)]
pub struct WebSource {
    base: String,
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl WebSource {
    /// Source resolving paths against `base` (a trailing `/` is added if
    /// missing).
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl AssetSource for WebSource {
    fn fetch(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, AssetError>> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let url = self.url(path);
        let path = path.to_owned();
        async move {
            let fail = |reason: String| AssetError::Fetch {
                path: path.clone(),
                reason,
            };
            let window = web_sys::window()
                .ok_or_else(|| fail("no window".to_owned()))?;
            let response = JsFuture::from(window.fetch_with_str(&url))
                .await
                .map_err(|e| fail(format!("{e:?}")))?;
            let response: web_sys::Response = response
                .dyn_into()
                .map_err(|_| fail("not a Response".to_owned()))?;
            if !response.ok() {
                return Err(fail(format!("HTTP {}", response.status())));
            }
            let promise = response
                .array_buffer()
                .map_err(|e| fail(format!("{e:?}")))?;
            let buffer = JsFuture::from(promise)
                .await
                .map_err(|e| fail(format!("{e:?}")))?;
            Ok(js_sys::Uint8Array::new(&buffer).to_vec())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn fs_source_reads_relative_paths() {
        let dir = std::env::temp_dir()
            .join(format!("orrery-fs-source-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("models")).unwrap();
        std::fs::write(dir.join("models/a.bin"), [1u8, 2, 3]).unwrap();

        let source = FsSource::new(&dir);
        let bytes = pollster::block_on(source.fetch("models/a.bin")).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let missing = pollster::block_on(source.fetch("models/none.bin"));
        assert!(matches!(
            missing,
            Err(AssetError::Io { ref path, .. }) if path == "models/none.bin"
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
