// drift.rs - Ambient particles that trail the pointer
//
// Bodies wander randomly, drift toward the pointer while it's on screen,
// keep a little distance from it and from each other, and wrap around
// the viewport edges.

use super::particles::{Look, Particles, SpawnPolicy, Tint};
use super::{forces, seed, Body, FrameInput, Scene};
use crate::config::DriftConfig;
use crate::render::Surface;
use crate::world::Obstacles;

pub struct DriftWorld {
    cfg: DriftConfig,
    look: Look,
    particles: Particles,
    rng: u32,
}

impl DriftWorld {
    pub fn new(cfg: DriftConfig) -> Self {
        Self::with_seed(cfg, 0x2545F491)
    }

    pub fn with_seed(cfg: DriftConfig, s: u32) -> Self {
        let look = Look {
            size_min: cfg.size_min,
            size_span: cfg.size_span,
            tint: Tint::Fade { color: cfg.color, min: cfg.opacity_min, span: cfg.opacity_span },
        };
        Self { cfg, look, particles: Particles::new(), rng: seed(s) }
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    fn policy(&self) -> SpawnPolicy {
        SpawnPolicy::Uniform { count: self.cfg.count, speed: self.cfg.initial_speed }
    }
}

/// Teleport to the opposite edge once `margin` past it.
pub fn wrap(b: &mut Body, width: f32, height: f32, margin: f32) {
    if b.x < -margin {
        b.x = width + margin;
    } else if b.x > width + margin {
        b.x = -margin;
    }
    if b.y < -margin {
        b.y = height + margin;
    } else if b.y > height + margin {
        b.y = -margin;
    }
}

impl Scene for DriftWorld {
    fn reset(&mut self, width: f32, height: f32, _obstacles: &Obstacles) {
        let policy = self.policy();
        self.particles.reset(&policy, &self.look, width, height, &mut self.rng);
    }

    fn step(&mut self, input: &FrameInput<'_>) {
        let cfg = &self.cfg;
        let n = self.particles.len();
        let follow = input.pointer.on_screen();

        for i in 0..n {
            let mut b = self.particles.body(i);
            forces::wander(&mut b, &mut self.rng, cfg.wander);
            if follow {
                forces::attract(
                    &mut b,
                    input.pointer.x,
                    input.pointer.y,
                    cfg.attract_range,
                    cfg.attract_cap,
                    cfg.attract_strength,
                    cfg.repel_below,
                    cfg.repel_force,
                );
            }
            self.particles.set_body(i, &b);

            for j in (i + 1)..n {
                let mut a = self.particles.body(i);
                let mut o = self.particles.body(j);
                if forces::pair_push(&mut a, &mut o, cfg.pair_below, cfg.pair_push) {
                    self.particles.set_body(i, &a);
                    self.particles.set_body(j, &o);
                }
            }

            let mut b = self.particles.body(i);
            forces::friction(&mut b, cfg.friction);
            forces::clamp_speed(&mut b, cfg.max_speed);
            b.integrate();
            wrap(&mut b, input.width, input.height, cfg.wrap_margin);
            self.particles.set_body(i, &b);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Pointer;

    fn frame(obstacles: &Obstacles, px: f32, py: f32) -> FrameInput<'_> {
        FrameInput { pointer: Pointer::at(px, py), width: 800.0, height: 600.0, obstacles }
    }

    #[test]
    fn reset_spawns_configured_count() {
        let mut drift = DriftWorld::new(DriftConfig::default());
        drift.reset(800.0, 600.0, &Obstacles::none());
        assert_eq!(drift.len(), 80);
        drift.reset(200.0, 100.0, &Obstacles::none());
        assert_eq!(drift.len(), 80);
    }

    #[test]
    fn wrap_teleports_across() {
        let mut b = Body::new(-21.0, 620.5, 0.0, 0.0, 1.0);
        wrap(&mut b, 800.0, 600.0, 20.0);
        assert_eq!((b.x, b.y), (820.0, -20.0));

        let mut inside = Body::new(-19.0, 619.0, 0.0, 0.0, 1.0);
        wrap(&mut inside, 800.0, 600.0, 20.0);
        assert_eq!((inside.x, inside.y), (-19.0, 619.0));
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let obs = Obstacles::none();
        let mut drift = DriftWorld::new(DriftConfig::default());
        drift.reset(800.0, 600.0, &obs);
        for step in 0..300 {
            let px = (step * 7 % 800) as f32 + 1.0;
            drift.step(&frame(&obs, px, 300.0));
            for b in drift.particles().bodies() {
                assert!(b.is_finite());
                assert!(b.speed() <= 8.0 + 1e-4);
            }
        }
    }

    #[test]
    fn particles_gather_near_pointer() {
        let obs = Obstacles::none();
        let mut drift = DriftWorld::new(DriftConfig::default());
        drift.reset(800.0, 600.0, &obs);

        let mean_dist = |d: &DriftWorld| {
            let sum: f32 = d.particles().bodies().map(|b| ((b.x - 400.0).powi(2) + (b.y - 300.0).powi(2)).sqrt()).sum();
            sum / d.len() as f32
        };
        let before = mean_dist(&drift);
        for _ in 0..200 {
            drift.step(&frame(&obs, 400.0, 300.0));
        }
        assert!(mean_dist(&drift) < before);
    }

    #[test]
    fn off_screen_pointer_is_ignored() {
        let obs = Obstacles::none();
        let mut drift = DriftWorld::new(DriftConfig::default());
        drift.reset(800.0, 600.0, &obs);
        for _ in 0..100 {
            drift.step(&frame(&obs, -1000.0, -1000.0));
        }
        for b in drift.particles().bodies() {
            assert!((-20.0..=820.0).contains(&b.x));
            assert!((-20.0..=620.0).contains(&b.y));
        }
    }
}
