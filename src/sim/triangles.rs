// triangles.rs - Field of arrows that turn to face the pointer
//
// Arrows sit on a fixed grid and never move. Nearby arrows turn faster
// and glow brighter, which reads as an energy map around the pointer.

use std::f32::consts::{PI, TAU};

use super::{rand, seed, FrameInput, Scene};
use crate::config::TriangleConfig;
use crate::input::FAR_AWAY;
use crate::render::Surface;
use crate::world::Obstacles;

pub struct TriangleField {
    cfg: TriangleConfig,

    // Grid position
    pub x: Vec<f32>,
    pub y: Vec<f32>,

    // Heading in radians
    pub rotation: Vec<f32>,

    // Pointer as of the last step, for opacity
    pointer: (f32, f32),

    rng: u32,
}

/// Wrap an angle into [-PI, PI).
#[inline]
pub fn normalize_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

impl TriangleField {
    pub fn new(cfg: TriangleConfig) -> Self {
        Self::with_seed(cfg, 0x85EBCA6B)
    }

    pub fn with_seed(cfg: TriangleConfig, s: u32) -> Self {
        Self {
            cfg,
            x: Vec::new(),
            y: Vec::new(),
            rotation: Vec::new(),
            pointer: (FAR_AWAY, FAR_AWAY),
            rng: seed(s),
        }
    }

    /// Fraction of the remaining angle covered per step at `dist`.
    pub fn turn_speed(&self, dist: f32) -> f32 {
        let c = &self.cfg;
        (c.max_turn * (1.0 - dist.min(c.turn_range) / c.turn_range)).max(c.min_turn)
    }

    pub fn opacity(&self, dist: f32) -> f32 {
        let c = &self.cfg;
        c.base_opacity + (1.0 - dist / c.glow_range).max(0.0) * (c.max_opacity - c.base_opacity)
    }

    fn distance(&self, i: usize) -> f32 {
        let dx = self.pointer.0 - self.x[i];
        let dy = self.pointer.1 - self.y[i];
        (dx * dx + dy * dy).sqrt()
    }
}

impl Scene for TriangleField {
    fn reset(&mut self, width: f32, height: f32, _obstacles: &Obstacles) {
        let s = self.cfg.spacing;
        let cols = (width.max(0.0) / s).ceil() as usize + 1;
        let rows = (height.max(0.0) / s).ceil() as usize + 1;

        self.x.clear();
        self.y.clear();
        self.rotation.clear();
        for i in 0..cols {
            for j in 0..rows {
                self.x.push(i as f32 * s);
                self.y.push(j as f32 * s);
                self.rotation.push(rand(&mut self.rng) * TAU);
            }
        }
    }

    fn step(&mut self, input: &FrameInput<'_>) {
        self.pointer = (input.pointer.x, input.pointer.y);
        for i in 0..self.x.len() {
            let dx = input.pointer.x - self.x[i];
            let dy = input.pointer.y - self.y[i];
            let dist = (dx * dx + dy * dy).sqrt();
            let diff = normalize_angle(dy.atan2(dx) - self.rotation[i]);
            self.rotation[i] += diff * self.turn_speed(dist);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for i in 0..self.x.len() {
            let color = self.cfg.color.with_alpha(self.opacity(self.distance(i)));
            surface.fill_chevron(self.x[i], self.y[i], self.rotation[i], self.cfg.size, color);
        }
    }

    fn len(&self) -> usize {
        self.x.len()
    }
}
