//! Keyboard and mouse state folded into per-frame character controls.

use glam::Vec2;
use std::collections::HashSet;

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame.
    mouse_pressed: HashSet<MouseButton>,
    /// Mouse buttons released this frame.
    mouse_released: HashSet<MouseButton>,

    /// Cursor position in window coordinates (y down).
    cursor_position: Vec2,
    /// Window position the aim direction is measured from, usually the
    /// controlled character's on-screen position.
    aim_origin: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.clear();
        self.mouse_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                if self.keys_held.remove(&key) {
                    self.keys_released.insert(key);
                }
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.mouse_held.insert(button) {
                    self.mouse_pressed.insert(button);
                }
            }
            ElementState::Released => {
                if self.mouse_held.remove(&button) {
                    self.mouse_released.insert(button);
                }
            }
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.cursor_position = Vec2::new(position.0 as f32, position.1 as f32);
    }

    pub fn set_aim_origin(&mut self, origin: Vec2) {
        self.aim_origin = origin;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }

    /// Aim in world orientation (y up). Zero when the cursor sits on the origin.
    pub fn aim_direction(&self) -> Vec2 {
        let offset = self.cursor_position - self.aim_origin;
        Vec2::new(offset.x, -offset.y).normalize_or_zero()
    }

    fn edge(&self, binding: Binding) -> ButtonEdge {
        match binding {
            Binding::Key(key) => ButtonEdge {
                pressed: self.keys_pressed.contains(&key),
                held: self.keys_held.contains(&key),
                released: self.keys_released.contains(&key),
            },
            Binding::Mouse(button) => ButtonEdge {
                pressed: self.mouse_pressed.contains(&button),
                held: self.mouse_held.contains(&button),
                released: self.mouse_released.contains(&button),
            },
        }
    }

    fn axis(&self, negative: Binding, positive: Binding) -> f32 {
        let mut value = 0.0;
        if self.edge(negative).held {
            value -= 1.0;
        }
        if self.edge(positive).held {
            value += 1.0;
        }
        value
    }

    /// Everything a character needs from this frame's input.
    pub fn control_frame(&self, bindings: &ControlBindings) -> ControlFrame {
        ControlFrame {
            axis: Vec2::new(
                self.axis(bindings.left, bindings.right),
                self.axis(bindings.down, bindings.up),
            ),
            grab_held: self.edge(bindings.grab).held,
            primary: self.edge(bindings.primary),
            secondary: self.edge(bindings.secondary),
            aim: self.aim_direction(),
            toggle_light: self.edge(bindings.light).pressed,
        }
    }
}

/// A key or mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(KeyCode),
    Mouse(MouseButton),
}

/// Which inputs drive which character control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlBindings {
    pub left: Binding,
    pub right: Binding,
    pub up: Binding,
    pub down: Binding,
    pub grab: Binding,
    pub primary: Binding,
    pub secondary: Binding,
    pub light: Binding,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            left: Binding::Key(KeyCode::KeyA),
            right: Binding::Key(KeyCode::KeyD),
            up: Binding::Key(KeyCode::KeyW),
            down: Binding::Key(KeyCode::KeyS),
            grab: Binding::Key(KeyCode::ShiftLeft),
            primary: Binding::Key(KeyCode::Space),
            secondary: Binding::Mouse(MouseButton::Left),
            light: Binding::Key(KeyCode::KeyF),
        }
    }
}

/// Transitions of one button during a frame. A tap shorter than a frame
/// reports both `pressed` and `released`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEdge {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

/// Per-frame controls for one character.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlFrame {
    /// Digital stick, each axis in {-1, 0, 1}.
    pub axis: Vec2,
    pub grab_held: bool,
    pub primary: ButtonEdge,
    pub secondary: ButtonEdge,
    pub aim: Vec2,
    pub toggle_light: bool,
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;
