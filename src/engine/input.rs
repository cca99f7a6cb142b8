//! Input and command dispatch for OrreryEngine

use super::command::OrreryCommand;
use super::OrreryEngine;
use crate::input::InputEvent;

impl OrreryEngine {
    /// Process a platform-agnostic input event, executing any camera
    /// command it produces.
    ///
    /// ```ignore
    /// engine.handle_input(InputEvent::CursorMoved { x, y });
    /// engine.handle_input(InputEvent::Scroll { delta: 1.0 });
    /// ```
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(command) = self.input.handle_event(event) {
            self.execute(command);
        }
    }

    /// Execute the command bound to `key`, if any. Returns whether the key
    /// was bound.
    pub fn handle_key_press(&mut self, key: &str) -> bool {
        let Some(command) = self.input.handle_key_press(key) else {
            return false;
        };
        self.execute(command);
        true
    }

    /// Perform a command.
    pub fn execute(&mut self, command: OrreryCommand) {
        if self.disposed {
            return;
        }
        let viewport_height = self.context.height() as f32;
        match command {
            OrreryCommand::RotateCamera { delta } => {
                self.camera_controller.rotate(delta, viewport_height);
            }
            OrreryCommand::PanCamera { delta } => {
                self.camera_controller.pan(delta, viewport_height);
            }
            OrreryCommand::Zoom { delta } => self.camera_controller.zoom(delta),
            OrreryCommand::ResetCamera => self.camera_controller.reset(),
            OrreryCommand::ToggleAnimation => {
                let paused = self.animator.toggle_paused();
                log::info!(
                    "animation {}",
                    if paused { "paused" } else { "resumed" }
                );
            }
            OrreryCommand::ToggleFog => {
                self.options.fog.enabled = !self.options.fog.enabled;
                log::info!(
                    "fog {}",
                    if self.options.fog.enabled { "on" } else { "off" }
                );
            }
        }
    }
}
