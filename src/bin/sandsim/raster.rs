// raster.rs - Software rasterizer for recorded frames
//
// Straight alpha blending over an opaque background, pixel centers
// sampled at +0.5. Good enough for eyeballing a run.

use image::{Rgba as Pixel, RgbaImage};
use sand_engine::render::{chevron_points, Encoder, Rgba, Shape};

const BACKGROUND: Pixel<u8> = Pixel([250, 250, 250, 255]);

pub fn rasterize(frame: &Encoder) -> RgbaImage {
    let w = frame.width().max(1.0) as u32;
    let h = frame.height().max(1.0) as u32;
    let mut img = RgbaImage::from_pixel(w, h, BACKGROUND);

    for shape in frame.shapes() {
        match *shape {
            Shape::Circle { x, y, radius, color } => fill_circle(&mut img, x, y, radius, color),
            Shape::Chevron { x, y, rotation, size, color } => {
                fill_triangle(&mut img, chevron_points(x, y, rotation, size), color)
            }
        }
    }
    img
}

fn blend(img: &mut RgbaImage, px: i64, py: i64, c: Rgba) {
    if px < 0 || py < 0 || px >= img.width() as i64 || py >= img.height() as i64 {
        return;
    }
    let p = img.get_pixel_mut(px as u32, py as u32);
    for (dst, src) in p.0.iter_mut().zip([c.r, c.g, c.b]) {
        *dst = (src as f32 * c.a + *dst as f32 * (1.0 - c.a)).round() as u8;
    }
}

fn fill_circle(img: &mut RgbaImage, x: f32, y: f32, r: f32, c: Rgba) {
    let r2 = r * r;
    for py in (y - r).floor() as i64..=(y + r).ceil() as i64 {
        for px in (x - r).floor() as i64..=(x + r).ceil() as i64 {
            let dx = px as f32 + 0.5 - x;
            let dy = py as f32 + 0.5 - y;
            if dx * dx + dy * dy <= r2 {
                blend(img, px, py, c);
            }
        }
    }
}

fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

fn fill_triangle(img: &mut RgbaImage, [a, b, c]: [(f32, f32); 3], color: Rgba) {
    let min_x = a.0.min(b.0).min(c.0).floor() as i64;
    let max_x = a.0.max(b.0).max(c.0).ceil() as i64;
    let min_y = a.1.min(b.1).min(c.1).floor() as i64;
    let max_y = a.1.max(b.1).max(c.1).ceil() as i64;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let p = (px as f32 + 0.5, py as f32 + 0.5);
            let (e0, e1, e2) = (edge(a, b, p), edge(b, c, p), edge(c, a, p));
            // Either winding
            if (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0) {
                blend(img, px, py, color);
            }
        }
    }
}
