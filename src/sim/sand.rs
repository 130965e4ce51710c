// sand.rs - Sand falling out of the prompt input
//
// Particles burst from beneath the input when it is first focused, fall
// under gravity, pile up on glyphs and on the floor, roll along the
// pill-shaped input and scatter away from the pointer and from clicks.

use super::particles::{Look, Particles, SpawnPolicy, Tint};
use super::{collide, forces, seed, Body, FrameInput, Scene};
use crate::config::SandConfig;
use crate::render::Surface;
use crate::world::{Bounds, Obstacles};

pub struct SandWorld {
    cfg: SandConfig,
    look: Look,
    particles: Particles,

    // Screen dimensions
    w: f32,
    h: f32,

    // Activation signal seen; the burst follows as soon as there is an
    // input to fall from
    activated: bool,
    // Burst is in the store
    spawned: bool,

    rng: u32,
}

impl SandWorld {
    pub fn new(cfg: SandConfig) -> Self {
        Self::with_seed(cfg, 0xDEADBEEF)
    }

    pub fn with_seed(cfg: SandConfig, s: u32) -> Self {
        let look = Look {
            size_min: cfg.size_min,
            size_span: cfg.size_span,
            tint: Tint::Palette(cfg.colors.clone()),
        };
        Self {
            cfg,
            look,
            particles: Particles::new(),
            w: 0.0,
            h: 0.0,
            activated: false,
            spawned: false,
            rng: seed(s),
        }
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn config(&self) -> &SandConfig {
        &self.cfg
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Whether the burst is currently in the store.
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    /// Burst region under the input: the middle share of its width,
    /// starting at its bottom edge.
    pub fn burst_policy(&self, input: &Bounds) -> SpawnPolicy {
        let width = input.width * self.cfg.spawn_width;
        let left = input.left + (input.width - width) * 0.5;
        SpawnPolicy::Burst {
            region: Bounds::new(left, input.bottom(), width, 0.0),
            count: self.cfg.count,
            stagger: self.cfg.spawn_stagger,
            vy_min: self.cfg.spawn_vy_min,
            vy_max: self.cfg.spawn_vy_max,
            vx_spread: self.cfg.spawn_vx_spread,
        }
    }

    /// Spawn the burst below `input`. Does nothing while a burst is
    /// already in the store.
    pub fn trigger(&mut self, input: Bounds) -> bool {
        self.activated = true;
        if self.spawned {
            return false;
        }
        let policy = self.burst_policy(&input);
        self.particles.initialize(&policy, &self.look, self.w, self.h, &mut self.rng);
        self.spawned = true;
        log::debug!("sand: burst of {} below input at y={}", self.particles.len(), input.bottom());
        true
    }

    /// Radial kick with upward lift for everything near (cx, cy).
    /// Returns how many particles were affected.
    pub fn click(&mut self, cx: f32, cy: f32) -> usize {
        let cfg = &self.cfg;
        let p = &mut self.particles;
        let mut hit = 0;
        for i in 0..p.len() {
            if let Some((ix, iy)) =
                forces::click_impulse(p.x[i], p.y[i], cx, cy, cfg.click_radius, cfg.click_force, cfg.click_lift)
            {
                p.vx[i] += ix;
                p.vy[i] += iy;
                hit += 1;
            }
        }
        hit
    }

    // Obstacles, then the viewport
    fn resolve_solids(b: &mut Body, input: &FrameInput<'_>, cfg: &SandConfig) {
        let k = &cfg.collision;
        if let Some(c) = &input.obstacles.capsule {
            collide::capsule(b, c, k);
        }
        for glyph in &input.obstacles.glyphs {
            collide::rect(b, glyph, cfg.glyph_padding, k);
        }
        collide::walls(b, input.width, input.height, k);
    }

    fn settle(&mut self, input: &FrameInput<'_>) {
        let cfg = &self.cfg;
        let k = &cfg.collision;
        let (w, h) = (input.width, input.height);
        let n = self.particles.len();

        for i in 0..n {
            let mut b = self.particles.body(i);

            // Forces
            forces::gravity(&mut b, cfg.gravity);
            forces::repel(&mut b, input.pointer.x, input.pointer.y, cfg.pointer_radius, cfg.pointer_force);
            forces::friction(&mut b, cfg.friction);
            b.integrate();

            Self::resolve_solids(&mut b, input, cfg);
            self.particles.set_body(i, &b);

            // Each unordered pair once per step
            for j in (i + 1)..n {
                let mut a = self.particles.body(i);
                let mut o = self.particles.body(j);
                if collide::pair(&mut a, &mut o, k.pair_restitution).is_some() {
                    self.particles.set_body(i, &a);
                    self.particles.set_body(j, &o);
                }
            }
        }

        // Resting contacts deep in a pile need more than one sweep
        for _ in 0..k.relax_passes {
            for i in 0..n {
                for j in (i + 1)..n {
                    let mut a = self.particles.body(i);
                    let mut o = self.particles.body(j);
                    if collide::rest(&mut a, &mut o) {
                        self.particles.set_body(i, &a);
                        self.particles.set_body(j, &o);
                    }
                }
            }
            for i in 0..n {
                let mut b = self.particles.body(i);
                Self::resolve_solids(&mut b, input, cfg);
                self.particles.set_body(i, &b);
            }
        }

        for i in 0..n {
            let mut b = self.particles.body(i);
            collide::confine(&mut b, w, h);
            self.particles.set_body(i, &b);
        }
    }
}

impl Scene for SandWorld {
    fn reset(&mut self, width: f32, height: f32, obstacles: &Obstacles) {
        self.w = width;
        self.h = height;
        self.particles.clear();
        self.spawned = false;
        // Respawn from the freshly measured input, if it's there. Otherwise
        // the next step with an input does it.
        if self.activated {
            if let Some(c) = &obstacles.capsule {
                self.trigger(c.bounds);
            }
        }
    }

    fn activate(&mut self, obstacles: &Obstacles) {
        self.activated = true;
        match &obstacles.capsule {
            Some(c) => {
                self.trigger(c.bounds);
            }
            None => log::debug!("sand: activated without an input, waiting for one"),
        }
    }

    fn step(&mut self, input: &FrameInput<'_>) {
        self.w = input.width;
        self.h = input.height;
        if self.activated && !self.spawned {
            if let Some(c) = &input.obstacles.capsule {
                self.trigger(c.bounds);
            }
        }
        if let Some((cx, cy)) = input.pointer.click {
            self.click(cx, cy);
        }
        self.settle(input);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let p = &self.particles;
        for i in 0..p.len() {
            surface.fill_circle(p.x[i], p.y[i], p.size[i], p.color[i]);
        }
    }

    fn len(&self) -> usize {
        self.particles.len()
    }
}
