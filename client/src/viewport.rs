use crate::rendering::{Colour, Surface};

/// Camera onto the world. `x`/`y` is the world point shown at the centre of
/// the screen.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Viewport {
    /// Camera at the world origin. Call `center_on` before drawing.
    pub fn new(width: f32, height: f32, world_width: f32, world_height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            world_width,
            world_height,
        }
    }

    /// Screen position of a world point, relative to the camera centre
    pub fn project_to_screen(&self, world_x: f32, world_y: f32) -> (f32, f32) {
        (
            world_x - self.x + self.width / 2.0,
            world_y - self.y + self.height / 2.0,
        )
    }

    /// Whether a world point lands on screen, edges included
    pub fn is_within_viewport(&self, world_x: f32, world_y: f32) -> bool {
        let (sx, sy) = self.project_to_screen(world_x, world_y);
        (0.0..=self.width).contains(&sx) && (0.0..=self.height).contains(&sy)
    }

    pub fn is_within_world_bounds(&self, x: f32, y: f32) -> bool {
        (0.0..=self.world_width).contains(&x) && (0.0..=self.world_height).contains(&y)
    }

    /// Clamps each axis independently into `[0, world dimension]`. A world
    /// dimension that is not a positive number collapses that axis to 0.
    pub fn clamp_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.min(self.world_width).max(0.0),
            y.min(self.world_height).max(0.0),
        )
    }

    /// Moves the camera so `(x, y)` is at the centre of the screen
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Outlines the world edge where it crosses the screen
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let (left, top) = self.project_to_screen(0.0, 0.0);
        surface.stroke_rect(
            left,
            top,
            self.world_width,
            self.world_height,
            Colour::BORDER,
        );
    }
}
