// grid.rs - Jittered dot grid that springs back into place
//
// Each dot is anchored where it spawned. The pointer shoves dots out of
// its way; a spring pulls them home once it has passed.

use super::particles::{Look, Particles, SpawnPolicy, Tint};
use super::{forces, seed, FrameInput, Scene};
use crate::config::GridConfig;
use crate::render::Surface;
use crate::world::Obstacles;

pub struct GridWorld {
    cfg: GridConfig,
    look: Look,
    particles: Particles,
    rng: u32,
}

impl GridWorld {
    pub fn new(cfg: GridConfig) -> Self {
        Self::with_seed(cfg, 0x9E3779B9)
    }

    pub fn with_seed(cfg: GridConfig, s: u32) -> Self {
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

    pub fn policy(&self) -> SpawnPolicy {
        SpawnPolicy::Grid { spacing: self.cfg.spacing, jitter: self.cfg.jitter }
    }
}

impl Scene for GridWorld {
    fn reset(&mut self, width: f32, height: f32, _obstacles: &Obstacles) {
        let policy = self.policy();
        self.particles.reset(&policy, &self.look, width, height, &mut self.rng);
        log::debug!("grid: {} dots for {}x{}", self.particles.len(), width, height);
    }

    fn step(&mut self, input: &FrameInput<'_>) {
        let cfg = &self.cfg;
        let n = self.particles.len();

        for i in 0..n {
            let mut b = self.particles.body(i);
            forces::repel(&mut b, input.pointer.x, input.pointer.y, cfg.pointer_radius, cfg.pointer_force);
            if let Some((bx, by)) = self.particles.base(i) {
                forces::spring(&mut b, bx, by, cfg.spring);
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
            b.integrate();
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

    fn still_grid() -> GridConfig {
        GridConfig { jitter: 0.0, ..GridConfig::default() }
    }

    #[test]
    fn resize_regenerates_grid_for_new_viewport() {
        let mut grid = GridWorld::new(GridConfig::default());
        grid.reset(800.0, 600.0, &Obstacles::none());
        // ceil(800/60)+1 = 15, ceil(600/60)+1 = 11
        assert_eq!(grid.len(), 165);

        grid.reset(300.0, 300.0, &Obstacles::none());
        assert_eq!(grid.len(), 36);
        assert_eq!(grid.len(), grid.policy().count(300.0, 300.0));
    }

    #[test]
    fn pointer_pushes_dots_then_they_return() {
        let obs = Obstacles::none();
        let mut grid = GridWorld::new(still_grid());
        grid.reset(800.0, 600.0, &obs);

        // Dot (7, 5) anchors at (420, 300); park the pointer just left of it
        let idx = 7 * 11 + 5;
        assert_eq!(grid.particles().base(idx), Some((420.0, 300.0)));
        for _ in 0..5 {
            grid.step(&frame(&obs, 400.0, 300.0));
        }
        assert!(grid.particles().x[idx] > 420.0);

        for _ in 0..600 {
            grid.step(&frame(&obs, -1000.0, -1000.0));
        }
        for i in 0..grid.len() {
            let (bx, by) = grid.particles().base(i).unwrap();
            assert!((grid.particles().x[i] - bx).abs() < 0.5);
            assert!((grid.particles().y[i] - by).abs() < 0.5);
        }
    }

    #[test]
    fn undisturbed_grid_stays_put() {
        let obs = Obstacles::none();
        let mut grid = GridWorld::new(still_grid());
        grid.reset(400.0, 400.0, &obs);
        for _ in 0..50 {
            grid.step(&frame(&obs, -1000.0, -1000.0));
        }
        for i in 0..grid.len() {
            assert_eq!(grid.particles().base(i), Some((grid.particles().x[i], grid.particles().y[i])));
        }
    }
}
