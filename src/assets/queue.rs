//! Sequential asset loading.
//!
//! Requests resolve strictly one after another: the next fetch only starts
//! once the previous item was delivered or failed. A failed item is logged
//! and skipped without affecting the rest. Cancellation is checked before
//! every fetch and again after it, so nothing is delivered to a disposed
//! owner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::model::ModelData;
use super::skybox::CubeFaces;
use super::source::AssetSource;
use super::AssetError;
use crate::scene::catalog::Catalog;
use crate::scene::system::BodyId;

/// One asset to fetch and decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// Skybox image, used for all six faces.
    Skybox {
        /// Path relative to the asset root.
        path: String,
    },
    /// Model for one body.
    Body {
        /// Body the model belongs to.
        body: BodyId,
        /// Body name, for logging.
        name: String,
        /// Path relative to the asset root.
        path: String,
    },
}

impl LoadRequest {
    /// Everything `catalog` needs, in load order: the skybox first, then
    /// bodies in catalog order.
    #[must_use]
    pub fn for_catalog(catalog: &Catalog) -> Vec<Self> {
        let skybox = catalog
            .skybox
            .iter()
            .map(|path| Self::Skybox { path: path.clone() });
        let bodies =
            catalog
                .bodies
                .iter()
                .enumerate()
                .map(|(i, body)| Self::Body {
                    body: BodyId(i),
                    name: body.name.clone(),
                    path: body.model.clone(),
                });
        skybox.chain(bodies).collect()
    }

    /// Path relative to the asset root.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Skybox { path } | Self::Body { path, .. } => path,
        }
    }

    /// Decode fetched bytes into the matching asset.
    ///
    /// # Errors
    ///
    /// Returns the [`AssetError`] of the model or image decoder.
    pub fn decode(&self, bytes: &[u8]) -> Result<LoadedAsset, AssetError> {
        match self {
            Self::Skybox { path } => {
                CubeFaces::from_single_image(path, bytes)
                    .map(LoadedAsset::Skybox)
            }
            Self::Body { body, name, path } => {
                ModelData::from_slice(path, bytes).map(|model| {
                    LoadedAsset::Body {
                        body: *body,
                        name: name.clone(),
                        model: Box::new(model),
                    }
                })
            }
        }
    }
}

/// A decoded asset ready to hand to the engine.
#[derive(Debug)]
pub enum LoadedAsset {
    /// Decoded skybox faces.
    Skybox(CubeFaces),
    /// Decoded model for a body.
    Body {
        /// Body the model belongs to.
        body: BodyId,
        /// Name of that body when the request was made. A receiver whose
        /// body at `body` has another name must drop the model.
        name: String,
        /// Decoded geometry and textures.
        model: Box<ModelData>,
    },
}

/// Shared disposal flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop all loading that observes this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome counts of a [`load_sequential`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Items delivered to the sink.
    pub loaded: usize,
    /// Items that failed to fetch or decode.
    pub failed: usize,
    /// Items never delivered because loading was cancelled.
    pub skipped: usize,
}

/// Fetch, decode and deliver `requests` in order.
///
/// `sink` receives each decoded asset as soon as it is ready. Errors are
/// logged per item and counted in the report.
#[allow(clippy::future_not_send)]
pub async fn load_sequential<S, F>(
    source: &S,
    requests: Vec<LoadRequest>,
    token: &CancelToken,
    mut sink: F,
) -> LoadReport
where
    S: AssetSource,
    F: FnMut(LoadedAsset),
{
    let total = requests.len();
    let mut report = LoadReport::default();

    for (i, request) in requests.into_iter().enumerate() {
        if token.is_cancelled() {
            report.skipped = total - i;
            break;
        }

        let fetched = source.fetch(request.path()).await;
        if token.is_cancelled() {
            log::debug!("loading cancelled after fetching {}", request.path());
            report.skipped = total - i;
            break;
        }

        match fetched.and_then(|bytes| request.decode(&bytes)) {
            Ok(asset) => {
                log::info!("loaded {}", request.path());
                sink(asset);
                report.loaded += 1;
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", request.path());
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::future::Future;

    use super::*;
    use crate::assets::model::tests::triangle_glb;

    /// In-memory source that records fetch order.
    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
        fetched: RefCell<Vec<String>>,
        cancel_after: Option<(String, CancelToken)>,
    }

    impl AssetSource for MemorySource {
        fn fetch(
            &self,
            path: &str,
        ) -> impl Future<Output = Result<Vec<u8>, AssetError>> {
            self.fetched.borrow_mut().push(path.to_owned());
            if let Some((trigger, token)) = &self.cancel_after {
                if trigger == path {
                    token.cancel();
                }
            }
            let result = self.files.get(path).cloned().ok_or_else(|| {
                AssetError::Fetch {
                    path: path.to_owned(),
                    reason: "404".to_owned(),
                }
            });
            std::future::ready(result)
        }
    }

    fn body(i: usize, path: &str) -> LoadRequest {
        LoadRequest::Body {
            body: BodyId(i),
            name: format!("body {i}"),
            path: path.to_owned(),
        }
    }

    fn source_with(paths: &[&str]) -> MemorySource {
        MemorySource {
            files: paths
                .iter()
                .map(|p| ((*p).to_owned(), triangle_glb()))
                .collect(),
            ..MemorySource::default()
        }
    }

    #[test]
    fn loads_in_request_order() {
        let source = source_with(&["a.glb", "b.glb", "c.glb"]);
        let mut delivered = Vec::new();
        let report = pollster::block_on(load_sequential(
            &source,
            vec![body(2, "c.glb"), body(0, "a.glb"), body(1, "b.glb")],
            &CancelToken::new(),
            |asset| {
                if let LoadedAsset::Body { body, .. } = asset {
                    delivered.push(body.0);
                }
            },
        ));
        assert_eq!(delivered, vec![2, 0, 1]);
        assert_eq!(*source.fetched.borrow(), vec!["c.glb", "a.glb", "b.glb"]);
        assert_eq!(
            report,
            LoadReport {
                loaded: 3,
                failed: 0,
                skipped: 0
            }
        );
    }

    #[test]
    fn failures_are_skipped_and_others_continue() {
        let mut source = source_with(&["a.glb", "c.glb"]);
        let _ = source
            .files
            .insert("broken.glb".to_owned(), b"garbage".to_vec());
        let mut delivered = Vec::new();
        let report = pollster::block_on(load_sequential(
            &source,
            vec![
                body(0, "a.glb"),
                body(1, "missing.glb"),
                body(2, "broken.glb"),
                body(3, "c.glb"),
            ],
            &CancelToken::new(),
            |asset| {
                if let LoadedAsset::Body { body, .. } = asset {
                    delivered.push(body.0);
                }
            },
        ));
        assert_eq!(delivered, vec![0, 3]);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn cancelled_token_delivers_nothing() {
        let source = source_with(&["a.glb"]);
        let token = CancelToken::new();
        token.cancel();
        let mut count = 0;
        let report = pollster::block_on(load_sequential(
            &source,
            vec![body(0, "a.glb")],
            &token,
            |_| count += 1,
        ));
        assert_eq!(count, 0);
        assert!(source.fetched.borrow().is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn cancellation_mid_fetch_drops_result() {
        let token = CancelToken::new();
        let mut source = source_with(&["a.glb", "b.glb", "c.glb"]);
        source.cancel_after = Some(("b.glb".to_owned(), token.clone()));
        let mut delivered = Vec::new();
        let report = pollster::block_on(load_sequential(
            &source,
            vec![body(0, "a.glb"), body(1, "b.glb"), body(2, "c.glb")],
            &token,
            |asset| {
                if let LoadedAsset::Body { body, .. } = asset {
                    delivered.push(body.0);
                }
            },
        ));
        assert_eq!(delivered, vec![0]);
        assert_eq!(*source.fetched.borrow(), vec!["a.glb", "b.glb"]);
        assert_eq!(
            report,
            LoadReport {
                loaded: 1,
                failed: 0,
                skipped: 2
            }
        );
    }

    #[test]
    fn catalog_requests_put_skybox_first_then_bodies_in_order() {
        let catalog = Catalog::solar_system();
        let requests = LoadRequest::for_catalog(&catalog);
        assert_eq!(requests.len(), catalog.bodies.len() + 1);
        assert_eq!(
            requests[0],
            LoadRequest::Skybox {
                path: "textures/starSky.webp".to_owned()
            }
        );
        for (i, (request, body)) in
            requests[1..].iter().zip(&catalog.bodies).enumerate()
        {
            assert_eq!(
                *request,
                LoadRequest::Body {
                    body: BodyId(i),
                    name: body.name.clone(),
                    path: body.model.clone(),
                }
            );
        }
    }

    #[test]
    fn catalog_without_skybox_requests_only_bodies() {
        let catalog = Catalog {
            skybox: None,
            ..Catalog::solar_system()
        };
        let requests = LoadRequest::for_catalog(&catalog);
        assert!(matches!(
            requests.first(),
            Some(LoadRequest::Body { body: BodyId(0), name, .. })
                if name == "Sun"
        ));
    }

    #[test]
    fn decoded_body_carries_the_requested_name() {
        let request = body(3, "earth.glb");
        let asset = request.decode(&triangle_glb()).unwrap();
        assert!(matches!(
            asset,
            LoadedAsset::Body { body: BodyId(3), ref name, .. }
                if name == "body 3"
        ));
    }

    #[test]
    fn skybox_request_decodes_image() {
        let request = LoadRequest::Skybox {
            path: "sky.png".to_owned(),
        };
        assert_eq!(request.path(), "sky.png");
        assert!(matches!(
            request.decode(b"not an image"),
            Err(AssetError::Image { .. })
        ));
    }
}
