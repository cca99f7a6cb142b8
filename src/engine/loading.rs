//! Asset loading methods for OrreryEngine

use super::OrreryEngine;
use crate::assets::{
    load_sequential, AssetSource, CancelToken, LoadReport, LoadRequest,
    LoadedAsset,
};

impl OrreryEngine {
    /// Everything the current catalog needs, in load order.
    #[must_use]
    pub fn load_requests(&self) -> Vec<LoadRequest> {
        LoadRequest::for_catalog(&self.options.catalog)
    }

    /// Take ownership of a decoded asset and upload it. A body's previous
    /// model is released. Models whose body no longer exists under the same
    /// name are dropped. Ignored once disposed.
    pub fn accept(&mut self, asset: LoadedAsset) {
        if self.disposed {
            log::debug!("dropping asset delivered after dispose");
            return;
        }
        match asset {
            LoadedAsset::Skybox(faces) => {
                self.skybox.set_faces(
                    &self.context.device,
                    &self.context.queue,
                    &faces,
                );
            }
            LoadedAsset::Body { body, name, model } => {
                if self.system.body_named(body, &name).is_none() {
                    log::warn!(
                        "dropping model for '{name}': body {} is no longer \
                         in the catalog",
                        body.0
                    );
                    return;
                }
                let slot = self.bodies.upload(
                    &self.context.device,
                    &self.context.queue,
                    &name,
                    &model,
                );
                if let Some(previous) = self.system.attach_model(body, slot) {
                    self.bodies.release(previous);
                }
            }
        }
    }

    /// Load every [`load_requests`](Self::load_requests) item from
    /// `source`, one after another, uploading each as soon as it decodes.
    /// Stops early once `token` is cancelled.
    #[allow(clippy::future_not_send)]
    pub async fn load_assets<S: AssetSource>(
        &mut self,
        source: &S,
        token: &CancelToken,
    ) -> LoadReport {
        let requests = self.load_requests();
        let report = load_sequential(source, requests, token, |asset| {
            self.accept(asset);
        })
        .await;
        log::info!(
            "assets: {} loaded, {} failed, {} skipped",
            report.loaded,
            report.failed,
            report.skipped
        );
        report
    }
}
