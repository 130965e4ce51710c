// particles.rs - Particle store
//
// Structure-of-Arrays layout. Particles have no identity beyond their
// index; the store is only ever cleared and refilled as a whole.

use super::{centered, rand, Body};
use crate::render::Rgba;
use crate::world::Bounds;

/// How particles are colored at spawn.
#[derive(Clone, Debug, PartialEq)]
pub enum Tint {
    /// Pick uniformly from a palette.
    Palette(Vec<Rgba>),
    /// One color with a random opacity in [min, min + span).
    Fade { color: Rgba, min: f32, span: f32 },
}

/// Per-particle appearance drawn at spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Look {
    pub size_min: f32,
    pub size_span: f32,
    pub tint: Tint,
}

impl Look {
    fn size(&self, rng: &mut u32) -> f32 {
        self.size_min + rand(rng) * self.size_span
    }

    fn color(&self, rng: &mut u32) -> Rgba {
        match &self.tint {
            Tint::Palette(colors) => {
                let i = ((rand(rng) * colors.len() as f32) as usize).min(colors.len().saturating_sub(1));
                colors.get(i).copied().unwrap_or(Rgba::rgb(0, 0, 0))
            }
            Tint::Fade { color, min, span } => color.with_alpha(min + rand(rng) * span),
        }
    }
}

/// Initial placement and velocity.
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnPolicy {
    /// Anywhere in the viewport, velocity in [-speed, speed) per axis.
    Uniform { count: usize, speed: f32 },
    /// One particle per grid node, jittered, anchored where it spawned.
    Grid { spacing: f32, jitter: f32 },
    /// Falling out of `region`: x across its width, y staggered below its
    /// top by up to `stagger` so the burst arrives in waves.
    Burst {
        region: Bounds,
        count: usize,
        stagger: f32,
        vy_min: f32,
        vy_max: f32,
        vx_spread: f32,
    },
}

impl SpawnPolicy {
    /// How many particles this policy produces for a viewport.
    pub fn count(&self, width: f32, height: f32) -> usize {
        match *self {
            SpawnPolicy::Uniform { count, .. } | SpawnPolicy::Burst { count, .. } => count,
            SpawnPolicy::Grid { spacing, .. } => {
                let (cols, rows) = grid_dims(spacing, width, height);
                cols * rows
            }
        }
    }
}

fn grid_dims(spacing: f32, width: f32, height: f32) -> (usize, usize) {
    let cols = (width.max(0.0) / spacing).ceil() as usize + 1;
    let rows = (height.max(0.0) / spacing).ceil() as usize + 1;
    (cols, rows)
}

#[derive(Default)]
pub struct Particles {
    // Position
    pub x: Vec<f32>,
    pub y: Vec<f32>,

    // Velocity
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,

    // Appearance
    pub size: Vec<f32>,
    pub color: Vec<Rgba>,

    // Spring anchors; empty unless spawned on a grid
    pub base_x: Vec<f32>,
    pub base_y: Vec<f32>,
}

impl Particles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.vx.clear();
        self.vy.clear();
        self.size.clear();
        self.color.clear();
        self.base_x.clear();
        self.base_y.clear();
    }

    pub fn push(&mut self, b: Body, color: Rgba) {
        self.x.push(b.x);
        self.y.push(b.y);
        self.vx.push(b.vx);
        self.vy.push(b.vy);
        self.size.push(b.r);
        self.color.push(color);
    }

    /// Push with a spring anchor at the spawn position.
    pub fn push_anchored(&mut self, b: Body, color: Rgba) {
        self.base_x.push(b.x);
        self.base_y.push(b.y);
        self.push(b, color);
    }

    #[inline]
    pub fn body(&self, i: usize) -> Body {
        Body::new(self.x[i], self.y[i], self.vx[i], self.vy[i], self.size[i])
    }

    #[inline]
    pub fn set_body(&mut self, i: usize, b: &Body) {
        self.x[i] = b.x;
        self.y[i] = b.y;
        self.vx[i] = b.vx;
        self.vy[i] = b.vy;
    }

    /// Anchor of particle `i`, if the store is anchored.
    #[inline]
    pub fn base(&self, i: usize) -> Option<(f32, f32)> {
        Some((*self.base_x.get(i)?, *self.base_y.get(i)?))
    }

    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        (0..self.len()).map(|i| self.body(i))
    }

    /// Append particles according to `policy`.
    pub fn initialize(&mut self, policy: &SpawnPolicy, look: &Look, width: f32, height: f32, rng: &mut u32) {
        match *policy {
            SpawnPolicy::Uniform { count, speed } => {
                for _ in 0..count {
                    let x = rand(rng) * width;
                    let y = rand(rng) * height;
                    let vx = centered(rng, speed * 2.0);
                    let vy = centered(rng, speed * 2.0);
                    let r = look.size(rng);
                    let c = look.color(rng);
                    self.push(Body::new(x, y, vx, vy, r), c);
                }
            }
            SpawnPolicy::Grid { spacing, jitter } => {
                let (cols, rows) = grid_dims(spacing, width, height);
                for i in 0..cols {
                    for j in 0..rows {
                        let x = i as f32 * spacing + centered(rng, jitter);
                        let y = j as f32 * spacing + centered(rng, jitter);
                        let r = look.size(rng);
                        let c = look.color(rng);
                        self.push_anchored(Body::new(x, y, 0.0, 0.0, r), c);
                    }
                }
            }
            SpawnPolicy::Burst { region, count, stagger, vy_min, vy_max, vx_spread } => {
                for _ in 0..count {
                    let x = region.left + rand(rng) * region.width;
                    let y = region.top + rand(rng) * stagger;
                    let vy = vy_min + rand(rng) * (vy_max - vy_min);
                    let vx = centered(rng, vx_spread);
                    let r = look.size(rng);
                    let c = look.color(rng);
                    self.push(Body::new(x, y, vx, vy, r), c);
                }
            }
        }
    }

    /// Throw everything away and respawn for a new viewport.
    pub fn reset(&mut self, policy: &SpawnPolicy, look: &Look, width: f32, height: f32, rng: &mut u32) {
        self.clear();
        self.initialize(policy, look, width, height, rng);
    }
}
