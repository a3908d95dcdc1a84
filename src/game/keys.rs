//! Keyboard and pointer input handling.
//!
//! This module defines the [`GameKey`] enum for abstracting actions from physical keys,
//! [`KeyState`] for tracking pressed keys between frames, and [`ControlState`], the
//! per-frame snapshot the session consumes. It also maps winit key events to actions.

use std::collections::HashSet;
use std::fmt;

use winit::keyboard;

/// All in-game actions that can be triggered from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Move forward (W or Up Arrow).
    MoveForward,
    /// Move backward (S or Down Arrow).
    MoveBackward,
    /// Strafe left (A or Left Arrow).
    MoveLeft,
    /// Strafe right (D or Right Arrow).
    MoveRight,
    /// Jump (Space).
    Jump,
    /// Release pointer capture (Escape).
    Escape,
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            GameKey::MoveForward => "KeyW",
            GameKey::MoveBackward => "KeyS",
            GameKey::MoveLeft => "KeyA",
            GameKey::MoveRight => "KeyD",
            GameKey::Jump => "Space",
            GameKey::Escape => "Escape",
        };
        f.write_str(code)
    }
}

/// Normalized control input for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Jump was pressed since the previous snapshot.
    pub jump: bool,
    /// Pointer movement accumulated since the previous snapshot.
    pub look_delta: (f32, f32),
}

/// Tracks pressed keys and pointer movement between frames.
///
/// Use [`KeyState::press_key`] and [`KeyState::release_key`] from the event loop and
/// take one [`KeyState::snapshot`] per frame.
#[derive(Debug, Default)]
pub struct KeyState {
    /// Set of currently pressed keys.
    pub pressed_keys: HashSet<GameKey>,
    jump_edge: bool,
    look_delta: (f32, f32),
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as pressed. Returns `false` for auto-repeat of a held key.
    pub fn press_key(&mut self, key: GameKey) -> bool {
        let fresh = self.pressed_keys.insert(key);
        if fresh && key == GameKey::Jump {
            self.jump_edge = true;
        }
        fresh
    }

    /// Marks a key as released.
    pub fn release_key(&mut self, key: GameKey) {
        self.pressed_keys.remove(&key);
        if key == GameKey::Jump {
            self.jump_edge = false;
        }
    }

    /// Checks if a key is currently pressed.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Accumulates raw pointer movement until the next snapshot.
    pub fn add_look_delta(&mut self, dx: f32, dy: f32) {
        self.look_delta.0 += dx;
        self.look_delta.1 += dy;
    }

    /// Drops every key and pending delta, e.g. when pointer capture is lost.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.jump_edge = false;
        self.look_delta = (0.0, 0.0);
    }

    /// Builds this frame's control snapshot and resets the per-frame accumulators.
    pub fn snapshot(&mut self) -> ControlState {
        let state = ControlState {
            move_forward: self.is_pressed(GameKey::MoveForward),
            move_backward: self.is_pressed(GameKey::MoveBackward),
            move_left: self.is_pressed(GameKey::MoveLeft),
            move_right: self.is_pressed(GameKey::MoveRight),
            jump: self.jump_edge,
            look_delta: self.look_delta,
        };
        self.jump_edge = false;
        self.look_delta = (0.0, 0.0);
        state
    }
}

macro_rules! match_char_key {
    ($c:expr, {
        $($key:literal => $variant:expr),* $(,)?
    }) => {{
        match $c.to_ascii_lowercase().as_str() {
            $($key => Some($variant),)*
            _ => None,
        }
    }};
}

macro_rules! match_named_key {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(winit::keyboard::NamedKey::$key => Some($variant),)*
            _ => None,
        }
    }};
}

/// Converts a winit [`keyboard::Key`] to a [`GameKey`] if it maps to an action.
///
/// Supports arrows, Space and Escape as named keys, and WASD as characters.
pub fn winit_key_to_game_key(key: &keyboard::Key) -> Option<GameKey> {
    match key {
        keyboard::Key::Named(named) => match_named_key!(named, {
            ArrowUp => GameKey::MoveForward,
            ArrowDown => GameKey::MoveBackward,
            ArrowLeft => GameKey::MoveLeft,
            ArrowRight => GameKey::MoveRight,
            Space => GameKey::Jump,
            Escape => GameKey::Escape,
        }),

        keyboard::Key::Character(c) => match_char_key!(c, {
            "w" => GameKey::MoveForward,
            "s" => GameKey::MoveBackward,
            "a" => GameKey::MoveLeft,
            "d" => GameKey::MoveRight,
        }),

        _ => None,
    }
}
