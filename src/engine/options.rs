//! Options methods for OrreryEngine

use super::OrreryEngine;
use crate::assets::CancelToken;
use crate::error::OrreryError;
use crate::options::Options;
use crate::scene::system::SolarSystem;

impl OrreryEngine {
    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace options and push them to every subsystem.
    ///
    /// A changed catalog rebuilds the scene: loaded models are released,
    /// loads started with the previous [`cancel_token`](Self::cancel_token)
    /// are cancelled, and the caller should load again from
    /// [`load_requests`](Self::load_requests) with a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Catalog`] (leaving current options in
    /// place) if the new catalog is invalid.
    pub fn set_options(&mut self, new: Options) -> Result<(), OrreryError> {
        new.catalog.validate()?;
        let catalog_changed = new.catalog != self.options.catalog;
        self.options = new;

        self.camera_controller.apply_options(&self.options.camera);
        self.clock.configure(&self.options.animation);
        self.animator.set_paused(self.options.animation.paused);
        self.input.set_key_bindings(self.options.keybindings.clone());

        if catalog_changed {
            log::info!("catalog changed, rebuilding scene");
            self.cancel.cancel();
            self.cancel = CancelToken::new();
            for slot in self.system.detach_all() {
                self.bodies.release(slot);
            }
            self.skybox.release();
            self.system = SolarSystem::new(&self.options.catalog);
        }
        Ok(())
    }
}
