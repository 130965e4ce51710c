// sim/ - Particle simulation
//
// One scene per canvas variant. All of them share the same loop shape:
// accumulate forces, integrate, resolve collisions, draw.

pub mod collide;
pub mod forces;

mod drift;
mod grid;
mod particles;
mod sand;
mod triangles;

pub use drift::DriftWorld;
pub use grid::GridWorld;
pub use particles::{Look, Particles, SpawnPolicy, Tint};
pub use sand::SandWorld;
pub use triangles::TriangleField;

use crate::input::Pointer;
use crate::render::Surface;
use crate::world::Obstacles;

/// Working copy of one particle during a step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, r: f32) -> Self {
        Self { x, y, vx, vy, r }
    }

    #[inline]
    pub fn integrate(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }
}

/// What a step gets to see. Built by the loop from its own state, so
/// scenes never read globals.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Pointer as of this frame. `click` is the click to apply on this step.
    pub pointer: Pointer,
    pub width: f32,
    pub height: f32,
    pub obstacles: &'a Obstacles,
}

/// A simulation variant driven by the frame loop.
pub trait Scene {
    /// Discard the store and regenerate it for a new viewport.
    fn reset(&mut self, width: f32, height: f32, obstacles: &Obstacles);

    /// First activation signal (e.g. the input gained focus).
    fn activate(&mut self, _obstacles: &Obstacles) {}

    /// Advance by one frame.
    fn step(&mut self, input: &FrameInput<'_>);

    /// Project current state; no simulation happens here.
    fn draw(&self, surface: &mut dyn Surface);

    /// Number of live elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn reset(&mut self, width: f32, height: f32, obstacles: &Obstacles) {
        (**self).reset(width, height, obstacles)
    }

    fn activate(&mut self, obstacles: &Obstacles) {
        (**self).activate(obstacles)
    }

    fn step(&mut self, input: &FrameInput<'_>) {
        (**self).step(input)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        (**self).draw(surface)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

// Random number generator (xorshift32), uniform in [0, 1)
#[inline(always)]
pub fn rand(rng: &mut u32) -> f32 {
    *rng ^= *rng << 13;
    *rng ^= *rng >> 17;
    *rng ^= *rng << 5;
    (*rng >> 8) as f32 * (1.0 / 16777216.0)
}

/// Uniform in [-0.5, 0.5) scaled by `spread`.
#[inline]
pub fn centered(rng: &mut u32, spread: f32) -> f32 {
    (rand(rng) - 0.5) * spread
}

/// xorshift gets stuck on zero.
pub fn seed(s: u32) -> u32 {
    if s == 0 { 0xDEADBEEF } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_stays_in_unit_interval() {
        let mut rng = seed(0);
        for _ in 0..10_000 {
            let r = rand(&mut rng);
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn centered_is_symmetric_range() {
        let mut rng = seed(7);
        for _ in 0..1000 {
            let v = centered(&mut rng, 2.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }
}
