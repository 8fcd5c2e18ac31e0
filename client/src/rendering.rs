use macroquad::prelude::*;

/// RGBA colour as sent on the wire (CSS-style strings) and drawn on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const BACKGROUND: Colour = Colour::rgb(10, 10, 20);
    pub const MARKER: Colour = Colour::rgb(255, 0, 0);
    pub const STAR: Colour = Colour::rgb(200, 200, 200);
    pub const BORDER: Colour = Colour::rgb(70, 70, 90);

    /// Opaque colour from its channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and a
    /// handful of named colours.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();

        if let Some(hex) = text.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(body) = text
            .strip_prefix("rgba(")
            .or_else(|| text.strip_prefix("rgb("))
        {
            return Self::parse_functional(body.strip_suffix(')')?);
        }

        let named = match text.as_str() {
            "white" => Colour::rgb(255, 255, 255),
            "black" => Colour::rgb(0, 0, 0),
            "red" => Colour::rgb(255, 0, 0),
            "green" => Colour::rgb(0, 128, 0),
            "lime" => Colour::rgb(0, 255, 0),
            "blue" => Colour::rgb(0, 0, 255),
            "yellow" => Colour::rgb(255, 255, 0),
            "cyan" => Colour::rgb(0, 255, 255),
            "magenta" => Colour::rgb(255, 0, 255),
            "purple" => Colour::rgb(128, 0, 128),
            "orange" => Colour::rgb(255, 165, 0),
            "grey" | "gray" => Colour::rgb(128, 128, 128),
            _ => return None,
        };
        Some(named)
    }

    /// Like [`Colour::parse`], falling back to white for unparseable text
    pub fn parse_or_white(text: &str) -> Self {
        Self::parse(text).unwrap_or(Colour::WHITE)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        // Channels are sliced by byte offset
        if !hex.is_ascii() {
            return None;
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Colour::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Colour::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    fn parse_functional(body: &str) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }

        let channel = |s: &str| s.parse::<u16>().ok().map(|v| v.min(255) as u8);
        let mut colour = Colour::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
        if let Some(alpha) = parts.get(3) {
            let alpha: f32 = alpha.parse().ok()?;
            colour.a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        Some(colour)
    }
}

impl From<Colour> for Color {
    fn from(colour: Colour) -> Self {
        Color::from_rgba(colour.r, colour.g, colour.b, colour.a)
    }
}

/// Drawing operations the game needs from a canvas
pub trait Surface {
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour);
    fn draw_rocket(&mut self, x: f32, y: f32, angle: f32, colour: Colour);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, colour: Colour);
}

/// Triangle for a rocket centred on `(x, y)`, nose first. Angle 0 points up.
pub fn rocket_outline(x: f32, y: f32, angle: f32, size: f32) -> [(f32, f32); 3] {
    let (sin, cos) = angle.sin_cos();
    let rotate = |lx: f32, ly: f32| (x + lx * cos - ly * sin, y + lx * sin + ly * cos);

    [
        rotate(0.0, -size),
        rotate(-0.6 * size, 0.7 * size),
        rotate(0.6 * size, 0.7 * size),
    ]
}

/// Macroquad canvas. Frames are drawn into an off-screen target whenever a
/// simulation step renders, and the last finished frame is presented on
/// every display refresh.
pub struct MacroquadSurface {
    target: RenderTarget,
    camera: Camera2D,
}

impl MacroquadSurface {
    /// Canvas of `width` x `height` pixels
    pub fn new(width: usize, height: usize) -> Self {
        let target = render_target(width as u32, height as u32);
        target.texture.set_filter(FilterMode::Linear);

        let mut camera =
            Camera2D::from_display_rect(Rect::new(0.0, 0.0, width as f32, height as f32));
        camera.render_target = Some(target.clone());

        Self { target, camera }
    }

    /// Draws the last rendered frame scaled to the window
    pub fn present(&self) {
        set_default_camera();
        clear_background(BLACK);
        draw_texture_ex(
            &self.target.texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                flip_y: true,
                ..Default::default()
            },
        );
    }
}

impl Surface for MacroquadSurface {
    fn clear(&mut self) {
        set_camera(&self.camera);
        clear_background(Colour::BACKGROUND.into());
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
        draw_rectangle(x, y, w, h, colour.into());
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
        draw_rectangle_lines(x, y, w, h, 1.0, colour.into());
    }

    fn draw_rocket(&mut self, x: f32, y: f32, angle: f32, colour: Colour) {
        let [nose, left, right] = rocket_outline(x, y, angle, shared::ROCKET_SIZE);
        draw_triangle(
            vec2(nose.0, nose.1),
            vec2(left.0, left.1),
            vec2(right.0, right.1),
            colour.into(),
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, colour: Colour) {
        macroquad::text::draw_text(text, x, y, 16.0, colour.into());
    }
}

/// One call recorded by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        colour: Colour,
        filled: bool,
    },
    Rocket {
        x: f32,
        y: f32,
        angle: f32,
        colour: Colour,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
    },
}

/// Window-less surface that keeps the draw operations of the current frame.
/// Used by headless clients and for inspecting what a frame drew.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    pub frames: u64,
}

impl RecordingSurface {
    pub fn rockets(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rocket { .. }))
    }

    /// Top-left corners of filled rectangles in `colour`
    pub fn filled_rects_of(&self, colour: Colour) -> Vec<(f32, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect {
                    x,
                    y,
                    colour: c,
                    filled: true,
                    ..
                } if *c == colour => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.clear();
        self.frames += 1;
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            colour,
            filled: true,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            colour,
            filled: false,
        });
    }

    fn draw_rocket(&mut self, x: f32, y: f32, angle: f32, colour: Colour) {
        self.ops.push(DrawOp::Rocket {
            x,
            y,
            angle,
            colour,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _colour: Colour) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_parse_functional_colours() {
        assert_eq!(Colour::parse("rgb(255, 0, 0)"), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(Colour::parse(" RGB(1,2,3) "), Some(Colour::rgb(1, 2, 3)));

        let translucent = Colour::parse("rgba(10, 20, 30, 0.5)").unwrap();
        assert_eq!((translucent.r, translucent.g, translucent.b), (10, 20, 30));
        assert_eq!(translucent.a, 128);
    }

    #[test]
    fn test_parse_hex_and_named() {
        assert_eq!(Colour::parse("#ff8000"), Some(Colour::rgb(255, 128, 0)));
        assert_eq!(Colour::parse("#0f0"), Some(Colour::rgb(0, 255, 0)));
        assert_eq!(Colour::parse("Orange"), Some(Colour::rgb(255, 165, 0)));
    }

    #[test]
    fn test_unparseable_colour_falls_back_to_white() {
        assert_eq!(Colour::parse("rgb(1, 2)"), None);
        assert_eq!(Colour::parse("#12345"), None);
        assert_eq!(Colour::parse_or_white("not-a-colour"), Colour::WHITE);
    }

    #[test]
    fn test_multibyte_hex_is_rejected() {
        assert_eq!(Colour::parse("#aé"), None);
        assert_eq!(Colour::parse("#a€bc"), None);
        assert_eq!(Colour::parse("#ééé"), None);
        assert_eq!(Colour::parse_or_white("#a€bc"), Colour::WHITE);
    }

    #[test]
    fn test_rocket_outline_nose_follows_angle() {
        let [nose, _, _] = rocket_outline(100.0, 100.0, 0.0, 10.0);
        assert_approx_eq!(nose.0, 100.0, 1e-4);
        assert_approx_eq!(nose.1, 90.0, 1e-4);

        let [nose, _, _] = rocket_outline(100.0, 100.0, std::f32::consts::FRAC_PI_2, 10.0);
        assert_approx_eq!(nose.0, 110.0, 1e-4);
        assert_approx_eq!(nose.1, 100.0, 1e-4);
    }

    #[test]
    fn test_recording_surface_clear_starts_new_frame() {
        let mut surface = RecordingSurface::default();
        surface.fill_rect(1.0, 2.0, 3.0, 4.0, Colour::MARKER);
        surface.clear();

        assert!(surface.ops.is_empty());
        assert_eq!(surface.frames, 1);
    }
}
