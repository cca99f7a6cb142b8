//! Standalone solar-system window backed by winit.
//!
//! ```no_run
//! # use orrery::Viewer;
//! Viewer::builder()
//!     .with_asset_root("assets")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::{path::PathBuf, sync::Arc};

use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    assets::FsSource, error::OrreryError, options::Options, InputEvent,
    MouseButton, OrreryEngine,
};

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 100.0;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    asset_root: PathBuf,
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with defaults (title "Orrery", assets under
    /// `./assets`, default options).
    fn new() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            options: None,
            title: "Orrery".into(),
        }
    }

    /// Directory the catalog's model and skybox paths are relative to.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            asset_root: self.asset_root,
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays the solar system.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    asset_root: PathBuf,
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Viewer`] if the event loop cannot be created
    /// or exits abnormally.
    pub fn run(self) -> Result<(), OrreryError> {
        let event_loop =
            EventLoop::new().map_err(|e| OrreryError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            last_frame_time: Instant::now(),
            asset_root: self.asset_root,
            options: Some(self.options),
            title: self.title,
        };

        let result = event_loop
            .run_app(&mut app)
            .map_err(|e| OrreryError::Viewer(e.to_string()));
        if let Some(mut engine) = app.engine.take() {
            engine.dispose();
        }
        result
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<OrreryEngine>,
    last_frame_time: Instant,
    asset_root: PathBuf,
    options: Option<Options>,
    title: String,
}

/// Surface size for a window: its logical size times the engine's pixel
/// ratio.
fn surface_size(
    inner: PhysicalSize<u32>,
    scale_factor: f64,
    pixel_ratio: f32,
) -> (u32, u32) {
    let factor = f64::from(pixel_ratio) / scale_factor;
    let w = (f64::from(inner.width) * factor).round() as u32;
    let h = (f64::from(inner.height) * factor).round() as u32;
    (w.max(1), h.max(1))
}

impl ViewerApp {
    /// Ratio between surface pixels and window pixels.
    fn cursor_scale(&self) -> f32 {
        match (&self.window, &self.engine) {
            (Some(window), Some(engine)) => {
                engine.pixel_ratio() / window.scale_factor() as f32
            }
            _ => 1.0,
        }
    }

    /// Resize the engine to the window's current size.
    fn fit_surface(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };
        let (w, h) = surface_size(
            window.inner_size(),
            window.scale_factor(),
            engine.pixel_ratio(),
        );
        engine.resize(w, h);
    }

    fn forward(&mut self, event: InputEvent) {
        if let Some(engine) = &mut self.engine {
            engine.handle_input(event);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let options = self.options.take().unwrap_or_default();
        let scale = window.scale_factor();
        let ratio = options.renderer.pixel_ratio.unwrap_or(scale as f32);
        let size = surface_size(window.inner_size(), scale, ratio);

        let mut engine = match pollster::block_on(OrreryEngine::new(
            window.clone(),
            size,
            options,
        )) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };
        engine.set_pixel_ratio(scale as f32);

        let source = FsSource::new(&self.asset_root);
        let token = engine.cancel_token();
        let report = pollster::block_on(engine.load_assets(&source, &token));
        if report.failed > 0 {
            log::warn!(
                "{} asset(s) under {} failed to load",
                report.failed,
                self.asset_root.display()
            );
        }

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.last_frame_time = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(engine) = &mut self.engine {
                engine.dispose();
            }
            event_loop.exit();
            return;
        }

        // Guard: both window and engine must be initialised.
        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(_) => self.fit_surface(),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_pixel_ratio(scale_factor as f32);
                }
                self.fit_surface();
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame_time).as_secs_f32();
                self.last_frame_time = now;

                if let Some(engine) = &mut self.engine {
                    engine.frame(dt);
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.forward(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let scale = self.cursor_scale();
                self.forward(InputEvent::CursorMoved {
                    x: position.x as f32 * scale,
                    y: position.y as f32 * scale,
                });
            }

            WindowEvent::CursorLeft { .. } => {
                self.forward(InputEvent::CursorLeft);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => {
                        (pos.y / PIXELS_PER_LINE) as f32
                    }
                };
                self.forward(InputEvent::Scroll { delta });
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.forward(InputEvent::ModifiersChanged {
                    shift: modifiers.state().shift_key(),
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                if let Some(engine) = &mut self.engine {
                    let _ = engine.handle_key_press(&key_str);
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_matches_window_at_device_ratio() {
        let inner = PhysicalSize::new(1600, 1200);
        assert_eq!(surface_size(inner, 2.0, 2.0), (1600, 1200));
    }

    #[test]
    fn pixel_ratio_override_scales_logical_size() {
        let inner = PhysicalSize::new(1600, 1200);
        assert_eq!(surface_size(inner, 2.0, 1.0), (800, 600));
    }

    #[test]
    fn surface_is_never_empty() {
        let inner = PhysicalSize::new(0, 0);
        assert_eq!(surface_size(inner, 1.0, 1.0), (1, 1));
    }
}
