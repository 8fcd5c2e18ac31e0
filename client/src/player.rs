//! Local and remote rocket state
//!
//! The local player is simulated here one fixed step at a time; remote
//! players are only ever moved by protocol frames.

use crate::rendering::{Colour, Surface};
use shared::{PlayerId, DAMPING, MAX_SPEED, ROTATION_SPEED, THRUST};

/// The rocket this client steers and simulates
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    /// Assigned by the server, absent until the first identifying frame
    pub id: Option<PlayerId>,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub angle: f32,
    /// Parsed once when the server assigns it
    pub colour: Colour,

    pub rotating_left: bool,
    pub rotating_right: bool,
    pub moving: bool,

    send_update: bool,
}

impl LocalPlayer {
    /// Stationary white rocket facing up at `(x, y)`
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            id: None,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            angle: 0.0,
            colour: Colour::WHITE,
            rotating_left: false,
            rotating_right: false,
            moving: false,
            send_update: false,
        }
    }

    /// Starts turning anticlockwise until halted
    pub fn rotate_left(&mut self) {
        self.rotating_left = true;
    }

    /// Starts turning clockwise until halted
    pub fn rotate_right(&mut self) {
        self.rotating_right = true;
    }

    /// Starts thrusting along the facing direction until halted
    pub fn move_forward(&mut self) {
        self.moving = true;
    }

    pub fn halt_rotate_left(&mut self) {
        self.rotating_left = false;
    }

    pub fn halt_rotate_right(&mut self) {
        self.rotating_right = false;
    }

    pub fn halt_move(&mut self) {
        self.moving = false;
    }

    /// Advances one simulation step and flags a pending broadcast when the
    /// position or facing changed.
    pub fn update(&mut self) {
        let (prev_x, prev_y, prev_angle) = (self.x, self.y, self.angle);

        if self.rotating_left {
            self.angle -= ROTATION_SPEED;
        }
        if self.rotating_right {
            self.angle += ROTATION_SPEED;
        }

        if self.moving {
            let (sin, cos) = self.angle.sin_cos();
            self.vel_x += sin * THRUST;
            self.vel_y -= cos * THRUST;

            let speed = (self.vel_x * self.vel_x + self.vel_y * self.vel_y).sqrt();
            if speed > MAX_SPEED {
                self.vel_x *= MAX_SPEED / speed;
                self.vel_y *= MAX_SPEED / speed;
            }
        } else {
            self.vel_x *= DAMPING;
            self.vel_y *= DAMPING;

            if self.vel_x.abs() < 0.01 {
                self.vel_x = 0.0;
            }
            if self.vel_y.abs() < 0.01 {
                self.vel_y = 0.0;
            }
        }

        self.x += self.vel_x;
        self.y += self.vel_y;

        if self.x != prev_x || self.y != prev_y || self.angle != prev_angle {
            self.send_update = true;
        }
    }

    /// Whether the last step changed anything peers should hear about
    pub fn needs_update(&self) -> bool {
        self.send_update
    }

    /// Returns whether a broadcast was pending and clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.send_update, false)
    }

    /// Draws the rocket at a screen position supplied by the viewport
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, screen_x: f32, screen_y: f32) {
        surface.draw_rocket(screen_x, screen_y, self.angle, self.colour);
    }
}

/// A peer as last reported by the server. The id is fixed at construction
/// because the roster indexes players by it.
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub colour: Colour,
    /// Last latency the server reported for this peer, in milliseconds
    pub ping: Option<f32>,
    pub screen_x: f32,
    pub screen_y: f32,
}

impl RemotePlayer {
    /// Remote player with no latency yet and an unprojected screen position
    pub fn new(id: PlayerId, x: f32, y: f32, angle: f32, colour: Colour) -> Self {
        Self {
            id,
            x,
            y,
            angle,
            colour,
            ping: None,
            screen_x: 0.0,
            screen_y: 0.0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Draws the rocket at its cached screen position, with the latest ping
    /// next to it
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let colour = self.colour;
        surface.draw_rocket(self.screen_x, self.screen_y, self.angle, colour);

        if let Some(ping) = self.ping {
            surface.draw_text(
                &format!("{:.0}ms", ping),
                self.screen_x + 12.0,
                self.screen_y - 12.0,
                colour,
            );
        }
    }
}
