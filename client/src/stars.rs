//! Parallax star field drawn behind the rockets

use crate::rendering::{Colour, Surface};
use rand::Rng;

/// Background star in screen coordinates
#[derive(Debug, Clone)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    /// Parallax factor, nearer stars drift faster
    pub depth: f32,
    pub size: f32,
}

impl Star {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self {
            x,
            y,
            depth,
            size: if depth > 0.6 { 2.0 } else { 1.0 },
        }
    }

    /// `count` stars placed uniformly over a `width` x `height` screen.
    /// An empty screen puts every star at the origin.
    pub fn scatter<R: Rng>(count: usize, width: f32, height: f32, rng: &mut R) -> Vec<Star> {
        (0..count)
            .map(|_| {
                Star::new(
                    rng.gen::<f32>() * width.max(0.0),
                    rng.gen::<f32>() * height.max(0.0),
                    rng.gen_range(0.2..1.0),
                )
            })
            .collect()
    }

    /// Drifts opposite to the camera movement of this step
    pub fn update(&mut self, delta_x: f32, delta_y: f32) {
        self.x -= delta_x * self.depth;
        self.y -= delta_y * self.depth;
    }

    /// Moves a star that left the screen to the opposite edge
    pub fn wrap(&mut self, width: f32, height: f32) {
        if self.x < 0.0 {
            self.x = width;
        }
        if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        }
        if self.y > height {
            self.y = 0.0;
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_rect(self.x, self.y, self.size, self.size, Colour::STAR);
    }
}
