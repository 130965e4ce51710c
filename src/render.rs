// render.rs - Project simulation state onto a drawing surface
//
// Scenes never touch a canvas directly. They draw through `Surface`:
//   - the browser implements it on CanvasRenderingContext2d (web.rs)
//   - `Encoder` records shapes for tests and the native rasterizer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fill color. Serialized as `#rrggbb` or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)? as f32 / 255.0)),
            _ => None,
        }
    }

    /// CSS color string for canvas fill styles.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a < 1.0 {
            write!(f, "{:02x}", (self.a * 255.0).round() as u8)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&s).ok_or_else(|| format!("expected #rrggbb or #rrggbbaa, got '{}'", s))
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_string()
    }
}

/// Something a frame can be drawn onto.
pub trait Surface {
    fn clear(&mut self, width: f32, height: f32);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn fill_chevron(&mut self, x: f32, y: f32, rotation: f32, size: f32, color: Rgba);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle { x: f32, y: f32, radius: f32, color: Rgba },
    Chevron { x: f32, y: f32, rotation: f32, size: f32, color: Rgba },
}

/// Recording surface: keeps the shapes of the last frame.
#[derive(Default)]
pub struct Encoder {
    shapes: Vec<Shape>,
    w: f32,
    h: f32,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn width(&self) -> f32 { self.w }
    pub fn height(&self) -> f32 { self.h }

    /// Replay the recorded frame onto another surface.
    pub fn replay(&self, target: &mut dyn Surface) {
        target.clear(self.w, self.h);
        for shape in &self.shapes {
            match *shape {
                Shape::Circle { x, y, radius, color } => target.fill_circle(x, y, radius, color),
                Shape::Chevron { x, y, rotation, size, color } => {
                    target.fill_chevron(x, y, rotation, size, color)
                }
            }
        }
    }
}

impl Surface for Encoder {
    fn clear(&mut self, width: f32, height: f32) {
        self.shapes.clear();
        self.w = width;
        self.h = height;
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.shapes.push(Shape::Circle { x, y, radius, color });
    }

    fn fill_chevron(&mut self, x: f32, y: f32, rotation: f32, size: f32, color: Rgba) {
        self.shapes.push(Shape::Chevron { x, y, rotation, size, color });
    }
}

/// Corners of the elongated arrow drawn by the triangle field,
/// rotated about (x, y). Tip first.
pub fn chevron_points(x: f32, y: f32, rotation: f32, size: f32) -> [(f32, f32); 3] {
    let (sin, cos) = rotation.sin_cos();
    let local = [
        (size * 1.2, 0.0),
        (-size * 0.4, -size * 0.35),
        (-size * 0.4, size * 0.35),
    ];
    local.map(|(lx, ly)| (x + lx * cos - ly * sin, y + lx * sin + ly * cos))
}
