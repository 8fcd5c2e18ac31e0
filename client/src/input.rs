//! Keyboard controls for the local rocket with press/release edge detection

use crate::player::LocalPlayer;
use macroquad::prelude::*;

/// Movement keys held during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
}

impl KeyState {
    /// Samples arrow keys (and WASD) from the window
    pub fn sample() -> Self {
        Self {
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            forward: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
        }
    }
}

/// Turns key transitions into start/halt calls on the local player
#[derive(Debug, Default)]
pub struct InputManager {
    previous: KeyState,
}

impl InputManager {
    /// Manager that treats every key as released
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the keyboard and applies the changes to `player`
    pub fn update(&mut self, player: &mut LocalPlayer) {
        self.apply(KeyState::sample(), player);
    }

    /// Starts controls whose key went down and halts those whose key came
    /// up since the previous call
    pub fn apply(&mut self, current: KeyState, player: &mut LocalPlayer) {
        let previous = self.previous;

        if current.left && !previous.left {
            player.rotate_left();
        } else if !current.left && previous.left {
            player.halt_rotate_left();
        }

        if current.right && !previous.right {
            player.rotate_right();
        } else if !current.right && previous.right {
            player.halt_rotate_right();
        }

        if current.forward && !previous.forward {
            player.move_forward();
        } else if !current.forward && previous.forward {
            player.halt_move();
        }

        self.previous = current;
    }
}
