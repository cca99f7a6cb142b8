//! The engine: owns the GPU context, scene, camera and renderers and
//! drives them frame by frame.

/// The engine's interactive vocabulary.
pub mod command;
mod input;
mod loading;
mod options;

use crate::animation::{FrameClock, SpinAnimator};
use crate::assets::CancelToken;
use crate::camera::controller::CameraController;
use crate::error::OrreryError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::DepthTarget;
use crate::input::InputProcessor;
use crate::options::Options;
use crate::renderer::{
    BodyRenderer, FrameBindings, LightingUniform, SkyboxRenderer,
};
use crate::scene::system::SolarSystem;

/// The solar-system viewer engine.
///
/// Owns the GPU context, the scene graph built from the catalog, the orbit
/// camera and both renderers.
///
/// # Construction
///
/// [`OrreryEngine::new`] creates a surface on a window or canvas;
/// [`OrreryEngine::new_from_context`] wraps an existing device. Models are
/// not loaded yet: drive [`load_assets`](Self::load_assets), or fetch
/// [`load_requests`](Self::load_requests) yourself and feed the results to
/// [`accept`](Self::accept).
///
/// # Frame loop
///
/// Each frame, call [`update`](Self::update) with the elapsed seconds and
/// then [`render`](Self::render), or [`frame`](Self::frame) for both plus
/// surface-error recovery. Call [`resize`](Self::resize) when the surface
/// size changes. Input is forwarded via
/// [`handle_input`](Self::handle_input) and
/// [`handle_key_press`](Self::handle_key_press).
///
/// # Teardown
///
/// [`dispose`](Self::dispose) stops loading and destroys every buffer and
/// texture. Dropping the engine disposes it.
pub struct OrreryEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    camera_controller: CameraController,
    frame_bindings: FrameBindings,
    depth: DepthTarget,
    skybox: SkyboxRenderer,
    bodies: BodyRenderer,
    system: SolarSystem,
    animator: SpinAnimator,
    clock: FrameClock,
    input: InputProcessor,
    options: Options,
    device_pixel_ratio: f32,
    cancel: CancelToken,
    disposed: bool,
}

impl OrreryEngine {
    /// Create an engine rendering to `target` at `size` physical pixels.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError`] if GPU initialization, shader composition
    /// or catalog validation fails.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, OrreryError> {
        let context = RenderContext::new(target, size).await?;
        Self::new_from_context(context, options)
    }

    /// Create an engine over an existing render context.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError`] if shader composition or catalog
    /// validation fails.
    pub fn new_from_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, OrreryError> {
        options.catalog.validate()?;

        let mut shader_composer = ShaderComposer::new()?;
        let camera_controller = CameraController::new(&context, &options.camera);
        let system = SolarSystem::new(&options.catalog);

        let frame_bindings = FrameBindings::new(
            &context.device,
            &camera_controller.buffer,
            LightingUniform::new(None, &options.lighting, &options.fog),
        );
        let skybox = SkyboxRenderer::new(
            &context.device,
            context.format(),
            &frame_bindings.layout,
            &mut shader_composer,
        )?;
        let bodies = BodyRenderer::new(
            &context.device,
            &context.queue,
            context.format(),
            &frame_bindings.layout,
            &mut shader_composer,
        )?;
        let depth =
            DepthTarget::new(&context.device, context.width(), context.height());

        log::info!(
            "engine ready: {} bodies, {}x{}",
            system.bodies().len(),
            context.width(),
            context.height()
        );

        Ok(Self {
            camera_controller,
            frame_bindings,
            depth,
            skybox,
            bodies,
            system,
            animator: SpinAnimator::new(options.animation.paused),
            clock: FrameClock::new(&options.animation),
            input: InputProcessor::with_key_bindings(
                options.keybindings.clone(),
            ),
            options,
            device_pixel_ratio: 1.0,
            cancel: CancelToken::new(),
            disposed: false,
            context,
        })
    }

    /// Advance animation by `dt` seconds and upload per-frame uniforms.
    pub fn update(&mut self, dt: f32) {
        if self.disposed {
            return;
        }
        let frames = self.clock.tick(dt);
        self.animator.advance(&mut self.system, frames);

        let _ = self.camera_controller.update_gpu(&self.context.queue);
        self.frame_bindings.update_lighting(
            &self.context.queue,
            LightingUniform::new(
                self.system.active_light(),
                &self.options.lighting,
                &self.options.fog,
            ),
        );
        self.bodies.prepare(
            &self.context.device,
            &self.context.queue,
            &self.system.draw_list(),
        );
    }

    /// Draw and present one frame.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the next surface texture cannot
    /// be acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.disposed {
            return Ok(());
        }
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_view(&view);
        frame.present();
        Ok(())
    }

    /// Record and submit the scene into `view` (same format as the
    /// context).
    pub fn render_to_view(&self, view: &wgpu::TextureView) {
        if self.disposed {
            return;
        }
        let [r, g, b, a] = self.options.renderer.clear_color;
        let mut encoder = self.context.create_encoder();
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view,
                            depth_slice: None,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(r),
                                    g: f64::from(g),
                                    b: f64::from(b),
                                    a: f64::from(a),
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Discard,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

            if self.options.renderer.skybox {
                self.skybox.draw(&mut pass, &self.frame_bindings.bind_group);
            }
            self.bodies.draw(&mut pass, &self.frame_bindings.bind_group);
        }
        self.context.submit(encoder);
    }

    /// [`update`](Self::update) then [`render`](Self::render), recovering
    /// from a lost or outdated surface by reconfiguring it.
    pub fn frame(&mut self, dt: f32) {
        self.update(dt);
        match self.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (self.context.width(), self.context.height());
                log::debug!("surface lost or outdated, reconfiguring {w}x{h}");
                self.context.resize(w, h);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
            }
            Err(e) => log::error!("render error: {e}"),
        }
    }

    /// Resize the surface, depth target and camera aspect. Zero sizes are
    /// ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.camera_controller.resize(width, height);
        self.depth.texture.destroy();
        self.depth = DepthTarget::new(&self.context.device, width, height);
    }

    /// Record the display's device pixel ratio. Hosts size the surface at
    /// logical size times [`pixel_ratio`](Self::pixel_ratio).
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.device_pixel_ratio = ratio;
        }
    }

    /// Effective pixel ratio: the configured override, else the device's.
    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.options
            .renderer
            .pixel_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(self.device_pixel_ratio)
    }

    /// Surface size in physical pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.context.width(), self.context.height())
    }

    /// The scene graph and bodies.
    #[must_use]
    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    /// The orbit camera.
    #[must_use]
    pub fn camera(&self) -> &CameraController {
        &self.camera_controller
    }

    /// Whether spin and orbit are paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.animator.is_paused()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    /// Token that, once cancelled, stops all loading for this engine.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stop loading and destroy every GPU buffer and texture. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cancel.cancel();

        let slots = self.system.detach_all();
        for slot in slots {
            self.bodies.release(slot);
        }
        self.bodies.destroy_all();
        self.skybox.release();
        self.frame_bindings.destroy();
        self.camera_controller.destroy();
        self.depth.texture.destroy();
        log::info!("engine disposed");
    }
}

impl Drop for OrreryEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
