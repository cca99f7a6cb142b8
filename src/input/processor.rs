//! Converts raw platform events into engine commands.
//!
//! The `InputProcessor` owns all transient input state (cursor tracking,
//! the active drag gesture, modifier keys) and the key-binding map. It is
//! the only thing between raw window events and the engine's
//! [`execute`](crate::OrreryEngine::execute) method.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::{InputEvent, MouseButton};
use crate::engine::command::OrreryCommand;

/// Maps physical key strings to [`OrreryCommand`] variants.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format, which
/// matches the DOM `KeyboardEvent.code` values: `"KeyR"`, `"Space"`, etc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Forward map: key string → command tag.
    bindings: HashMap<String, KeyCommandTag>,
}

/// Serializable tag for the subset of [`OrreryCommand`] that can be
/// key-bound (parameterless actions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommandTag {
    /// Return the camera to its initial pose.
    ResetCamera,
    /// Pause or resume spin and orbit.
    ToggleAnimation,
    /// Turn distance fog on or off.
    ToggleFog,
}

impl KeyCommandTag {
    fn to_command(self) -> OrreryCommand {
        match self {
            Self::ResetCamera => OrreryCommand::ResetCamera,
            Self::ToggleAnimation => OrreryCommand::ToggleAnimation,
            Self::ToggleFog => OrreryCommand::ToggleFog,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyR".into(), KeyCommandTag::ResetCamera),
            ("Space".into(), KeyCommandTag::ToggleAnimation),
            ("KeyF".into(), KeyCommandTag::ToggleFog),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the command for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<OrreryCommand> {
        self.bindings.get(key).map(|tag| tag.to_command())
    }

    /// Bind `key` to `tag`, returning the tag it replaces.
    pub fn bind(
        &mut self,
        key: impl Into<String>,
        tag: KeyCommandTag,
    ) -> Option<KeyCommandTag> {
        self.bindings.insert(key.into(), tag)
    }

    /// Remove the binding for `key`.
    pub fn unbind(&mut self, key: &str) -> Option<KeyCommandTag> {
        self.bindings.remove(key)
    }
}

/// Camera gesture chosen when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
}

/// Converts raw window events into [`OrreryCommand`]s.
///
/// # Usage
///
/// ```ignore
/// if let Some(cmd) = input_processor.handle_event(event) {
///     engine.execute(cmd);
/// }
///
/// if let Some(cmd) = input_processor.handle_key_press("KeyR") {
///     engine.execute(cmd);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    /// Last cursor position, `None` until the first move.
    cursor: Option<Vec2>,
    /// Gesture in progress and the button that started it.
    drag: Option<(MouseButton, Drag)>,
    /// Whether the shift modifier is currently held.
    shift_pressed: bool,
    /// Key string → command mapping.
    key_bindings: KeyBindings,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeyBindings) -> Self {
        Self {
            key_bindings,
            ..Self::default()
        }
    }

    /// Current cursor position in physical pixels.
    #[must_use]
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Whether a rotate or pan drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the shift modifier is held.
    #[must_use]
    pub fn shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    /// Replace the key bindings.
    pub fn set_key_bindings(&mut self, key_bindings: KeyBindings) {
        self.key_bindings = key_bindings;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<OrreryCommand> {
        self.key_bindings.lookup(key)
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<OrreryCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::CursorLeft => {
                self.drag = None;
                self.cursor = None;
                None
            }
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed);
                None
            }
            InputEvent::Scroll { delta } => {
                (delta != 0.0).then_some(OrreryCommand::Zoom { delta })
            }
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<OrreryCommand> {
        let position = Vec2::new(x, y);
        let delta = self.cursor.map_or(Vec2::ZERO, |last| position - last);
        self.cursor = Some(position);

        let (_, drag) = self.drag?;
        if delta == Vec2::ZERO {
            return None;
        }
        Some(match drag {
            Drag::Rotate => OrreryCommand::RotateCamera { delta },
            Drag::Pan => OrreryCommand::PanCamera { delta },
        })
    }

    /// The gesture is fixed at press time, so releasing shift mid-drag
    /// keeps panning.
    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.drag.is_some() {
                return;
            }
            let drag = match button {
                MouseButton::Left if self.shift_pressed => Drag::Pan,
                MouseButton::Left => Drag::Rotate,
                MouseButton::Right | MouseButton::Middle => Drag::Pan,
                MouseButton::Other => return,
            };
            self.drag = Some((button, drag));
        } else if self.drag.is_some_and(|(held, _)| held == button) {
            self.drag = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::MouseButton {
            button,
            pressed: true,
        }
    }

    fn release(button: MouseButton) -> InputEvent {
        InputEvent::MouseButton {
            button,
            pressed: false,
        }
    }

    fn drag(
        processor: &mut InputProcessor,
        button: MouseButton,
    ) -> Option<OrreryCommand> {
        let _ = processor.handle_event(InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        let _ = processor.handle_event(press(button));
        processor.handle_event(InputEvent::CursorMoved { x: 15.0, y: 7.0 })
    }

    #[test]
    fn left_drag_rotates() {
        let mut p = InputProcessor::new();
        assert_eq!(
            drag(&mut p, MouseButton::Left),
            Some(OrreryCommand::RotateCamera {
                delta: Vec2::new(5.0, -3.0)
            })
        );
        let _ = p.handle_event(release(MouseButton::Left));
        assert!(!p.is_dragging());
        assert_eq!(
            p.handle_event(InputEvent::CursorMoved { x: 30.0, y: 30.0 }),
            None
        );
    }

    #[test]
    fn right_and_middle_drag_pan() {
        for button in [MouseButton::Right, MouseButton::Middle] {
            let mut p = InputProcessor::new();
            assert!(matches!(
                drag(&mut p, button),
                Some(OrreryCommand::PanCamera { .. })
            ));
        }
    }

    #[test]
    fn shift_left_drag_pans() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: true });
        assert!(matches!(
            drag(&mut p, MouseButton::Left),
            Some(OrreryCommand::PanCamera { .. })
        ));
        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: false });
        assert!(matches!(
            p.handle_event(InputEvent::CursorMoved { x: 20.0, y: 7.0 }),
            Some(OrreryCommand::PanCamera { .. })
        ));
    }

    #[test]
    fn wheel_zooms() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(InputEvent::Scroll { delta: 2.0 }),
            Some(OrreryCommand::Zoom { delta: 2.0 })
        );
        assert_eq!(p.handle_event(InputEvent::Scroll { delta: 0.0 }), None);
    }

    #[test]
    fn cursor_leaving_ends_drag() {
        let mut p = InputProcessor::new();
        let _ = drag(&mut p, MouseButton::Left);
        let _ = p.handle_event(InputEvent::CursorLeft);
        assert!(!p.is_dragging());
    }

    #[test]
    fn releasing_other_button_keeps_drag() {
        let mut p = InputProcessor::new();
        let _ = drag(&mut p, MouseButton::Left);
        let _ = p.handle_event(release(MouseButton::Right));
        assert!(p.is_dragging());
    }

    #[test]
    fn default_key_lookup() {
        let p = InputProcessor::new();
        assert_eq!(p.handle_key_press("KeyR"), Some(OrreryCommand::ResetCamera));
        assert_eq!(
            p.handle_key_press("Space"),
            Some(OrreryCommand::ToggleAnimation)
        );
        assert_eq!(p.handle_key_press("KeyF"), Some(OrreryCommand::ToggleFog));
        assert_eq!(p.handle_key_press("KeyZ"), None);
    }

    #[test]
    fn key_bindings_deserialize_from_toml() {
        let bindings: KeyBindings =
            toml::from_str("[bindings]\nKeyP = \"toggle_animation\"\n")
                .unwrap();
        assert_eq!(bindings.lookup("KeyP"), Some(OrreryCommand::ToggleAnimation));
        assert_eq!(bindings.lookup("Space"), None);
    }
}
