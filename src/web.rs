//! Browser entry point: mount the viewer into a DOM element.
//!
//! ```js
//! import init, { mount } from "./pkg/orrery.js";
//! await init();
//! const handle = mount(document.getElementById("app"), "assets/", null);
//! // later
//! handle.unmount();
//! ```
//!
//! [`mount`] returns immediately. GPU setup and asset loading run on
//! `spawn_local`; the engine appears in the shared slot once the device is
//! ready and models are attached one by one as they arrive.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement,
    HtmlElement, KeyboardEvent, MouseEvent, WheelEvent,
};

use crate::assets::{load_sequential, CancelToken, WebSource};
use crate::error::OrreryError;
use crate::input::{InputEvent, MouseButton};
use crate::options::Options;
use crate::OrreryEngine;

/// CSS pixels of wheel travel that count as one line.
const PIXELS_PER_LINE: f64 = 100.0;
/// Lines per page for `DOM_DELTA_PAGE` wheel events.
const LINES_PER_PAGE: f64 = 10.0;

/// A registered DOM listener, kept so it can be removed on unmount.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn remove(&self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

/// Everything a mounted viewer owns.
struct Mounted {
    engine: Rc<RefCell<Option<OrreryEngine>>>,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    cancel: CancelToken,
    frame_id: Cell<Option<i32>>,
    last_time: Cell<Option<f64>>,
    listeners: RefCell<Vec<Listener>>,
    tick: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Mounted {
    fn with_engine(&self, f: impl FnOnce(&mut OrreryEngine)) {
        if let Some(engine) = self.engine.borrow_mut().as_mut() {
            f(engine);
        }
    }

    /// Match the drawing buffer to the canvas' CSS size times the pixel
    /// ratio.
    fn fit(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let device_ratio = window.device_pixel_ratio() as f32;
        let mut engine = self.engine.borrow_mut();
        let Some(engine) = engine.as_mut() else {
            return;
        };
        engine.set_pixel_ratio(device_ratio);
        let (w, h) = canvas_size(&self.canvas, engine.pixel_ratio());
        if (w, h) != engine.size() {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            engine.resize(w, h);
        }
    }

    /// Forward a mouse position in CSS pixels as surface pixels.
    fn cursor_moved(&self, event: &MouseEvent) {
        self.with_engine(|engine| {
            let ratio = engine.pixel_ratio();
            engine.handle_input(InputEvent::CursorMoved {
                x: event.offset_x() as f32 * ratio,
                y: event.offset_y() as f32 * ratio,
            });
        });
    }

    fn request_frame(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let tick = self.tick.borrow();
        let Some(tick) = tick.as_ref() else {
            return;
        };
        match window.request_animation_frame(tick.as_ref().unchecked_ref()) {
            Ok(id) => self.frame_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
    }

    fn on_frame(&self, now_ms: f64) {
        let dt = self
            .last_time
            .replace(Some(now_ms))
            .map_or(0.0, |last| ((now_ms - last) / 1000.0).max(0.0));
        self.with_engine(|engine| engine.frame(dt as f32));
        self.request_frame();
    }

    /// Stop everything and release every resource. Idempotent.
    fn teardown(&self) {
        self.cancel.cancel();

        if let Some(id) = self.frame_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        drop(self.tick.borrow_mut().take());

        for listener in self.listeners.borrow_mut().drain(..) {
            listener.remove();
        }

        if let Some(mut engine) = self.engine.borrow_mut().take() {
            engine.dispose();
        }

        if self.canvas.parent_node().is_some() {
            let _ = self.container.remove_child(&self.canvas);
        }
        log::info!("orrery unmounted");
    }
}

/// Handle to a mounted viewer. Call [`unmount`](Self::unmount) to release
/// it; dropping the handle does the same.
#[wasm_bindgen]
pub struct OrreryHandle {
    state: Option<Rc<Mounted>>,
}

#[wasm_bindgen]
impl OrreryHandle {
    /// Stop loading and rendering, remove listeners, destroy GPU
    /// resources and detach the canvas. Safe to call more than once.
    pub fn unmount(&mut self) {
        if let Some(state) = self.state.take() {
            state.teardown();
        }
    }

    /// Whether the GPU device is ready and the engine is rendering.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn ready(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.engine.borrow().is_some())
    }
}

impl Drop for OrreryHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Create a canvas inside `container` and start the viewer.
///
/// `asset_root` is the URL prefix catalog paths are resolved against.
/// `options_toml` overrides any subset of the default options.
///
/// # Errors
///
/// Fails if the options do not parse or the DOM cannot be set up. GPU
/// initialization errors happen later and are logged.
#[wasm_bindgen]
pub fn mount(
    container: HtmlElement,
    asset_root: String,
    options_toml: Option<String>,
) -> Result<OrreryHandle, JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let options = match options_toml {
        Some(text) => Options::from_toml_str(&text).map_err(to_js)?,
        None => Options::default(),
    };

    let window = web_sys::window().ok_or_else(|| web_error("no window"))?;
    let document =
        window.document().ok_or_else(|| web_error("no document"))?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| web_error("created element is not a canvas"))?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("touch-action", "none")?;
    canvas.set_attribute("tabindex", "0")?;
    let _ = container.append_child(&canvas)?;

    let state = Rc::new(Mounted {
        engine: Rc::new(RefCell::new(None)),
        container,
        canvas,
        cancel: CancelToken::new(),
        frame_id: Cell::new(None),
        last_time: Cell::new(None),
        listeners: RefCell::new(Vec::new()),
        tick: RefCell::new(None),
    });

    if let Err(e) = attach_listeners(&state, &window) {
        state.teardown();
        return Err(e);
    }
    start(&state, &window, options, WebSource::new(asset_root));

    Ok(OrreryHandle { state: Some(state) })
}

/// Create the engine, then begin rendering and loading.
fn start(
    state: &Rc<Mounted>,
    window: &web_sys::Window,
    options: Options,
    source: WebSource,
) {
    let device_ratio = window.device_pixel_ratio() as f32;
    let ratio = options.renderer.pixel_ratio.unwrap_or(device_ratio);
    let size = canvas_size(&state.canvas, ratio);
    state.canvas.set_width(size.0);
    state.canvas.set_height(size.1);

    let weak = Rc::downgrade(state);
    *state.tick.borrow_mut() = Some(Closure::new(move |now: f64| {
        if let Some(state) = weak.upgrade() {
            state.on_frame(now);
        }
    }));

    let weak = Rc::downgrade(state);
    let target = wgpu::SurfaceTarget::Canvas(state.canvas.clone());
    wasm_bindgen_futures::spawn_local(async move {
        let created = OrreryEngine::new(target, size, options).await;
        let Some(state) = weak.upgrade() else {
            return;
        };
        let mut engine = match created {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("failed to initialize orrery: {e}");
                return;
            }
        };
        if state.cancel.is_cancelled() {
            engine.dispose();
            return;
        }
        engine.set_pixel_ratio(device_ratio);
        let requests = engine.load_requests();
        *state.engine.borrow_mut() = Some(engine);
        state.request_frame();

        let token = state.cancel.clone();
        let slot = Rc::clone(&state.engine);
        drop(state);
        let report = load_sequential(&source, requests, &token, |asset| {
            if let Some(engine) = slot.borrow_mut().as_mut() {
                engine.accept(asset);
            }
        })
        .await;
        log::info!(
            "assets: {} loaded, {} failed, {} skipped",
            report.loaded,
            report.failed,
            report.skipped
        );
    });
}

fn attach_listeners(
    state: &Rc<Mounted>,
    window: &web_sys::Window,
) -> Result<(), JsValue> {
    let canvas: &EventTarget = state.canvas.as_ref();
    let window: &EventTarget = window.as_ref();

    listen(state, canvas, "mousedown", false, |state, event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let _ = state.canvas.focus();
        state.cursor_moved(event);
        state.with_engine(|engine| {
            engine.handle_input(InputEvent::ModifiersChanged {
                shift: event.shift_key(),
            });
            engine.handle_input(InputEvent::MouseButton {
                button: MouseButton::from_dom(event.button()),
                pressed: true,
            });
        });
    })?;
    listen(state, canvas, "mousemove", false, |state, event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            state.cursor_moved(event);
        }
    })?;
    listen(state, canvas, "mouseup", false, |state, event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        state.with_engine(|engine| {
            engine.handle_input(InputEvent::MouseButton {
                button: MouseButton::from_dom(event.button()),
                pressed: false,
            });
        });
    })?;
    listen(state, canvas, "mouseleave", false, |state, _| {
        state.with_engine(|engine| engine.handle_input(InputEvent::CursorLeft));
    })?;
    listen(state, canvas, "wheel", true, |state, event| {
        let Some(event) = event.dyn_ref::<WheelEvent>() else {
            return;
        };
        event.prevent_default();
        let lines = match event.delta_mode() {
            WheelEvent::DOM_DELTA_LINE => event.delta_y(),
            WheelEvent::DOM_DELTA_PAGE => event.delta_y() * LINES_PER_PAGE,
            _ => event.delta_y() / PIXELS_PER_LINE,
        };
        // Wheel down (positive deltaY) moves away from the target.
        state.with_engine(|engine| {
            engine.handle_input(InputEvent::Scroll {
                delta: -lines as f32,
            });
        });
    })?;
    listen(state, canvas, "contextmenu", true, |_, event| {
        event.prevent_default();
    })?;
    listen(state, canvas, "keydown", true, |state, event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if event.repeat() {
            return;
        }
        let code = event.code();
        let mut handled = false;
        state.with_engine(|engine| handled = engine.handle_key_press(&code));
        if handled {
            event.prevent_default();
        }
    })?;
    listen(state, window, "resize", false, |state, _| state.fit())?;
    Ok(())
}

/// Register `handler` for `kind` on `target`, recording it on `state`.
/// Handlers only see the state while it is still mounted.
fn listen(
    state: &Rc<Mounted>,
    target: &EventTarget,
    kind: &'static str,
    cancelable: bool,
    handler: impl Fn(&Mounted, &Event) + 'static,
) -> Result<(), JsValue> {
    let weak: Weak<Mounted> = Rc::downgrade(state);
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(state) = weak.upgrade() {
            handler(&state, &event);
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(!cancelable);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        callback.as_ref().unchecked_ref(),
        &options,
    )?;

    state.listeners.borrow_mut().push(Listener {
        target: target.clone(),
        kind,
        callback,
    });
    Ok(())
}

/// Drawing-buffer size for the canvas' CSS box at `ratio`.
fn canvas_size(canvas: &HtmlCanvasElement, ratio: f32) -> (u32, u32) {
    let ratio = f64::from(ratio);
    let w = (f64::from(canvas.client_width().max(1)) * ratio).round();
    let h = (f64::from(canvas.client_height().max(1)) * ratio).round();
    ((w as u32).max(1), (h as u32).max(1))
}

fn web_error(message: &str) -> JsValue {
    to_js(OrreryError::Web(message.to_owned()))
}

#[allow(clippy::needless_pass_by_value)]
fn to_js(error: OrreryError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
