// forces.rs - Velocity deltas accumulated before integration
//
// Every function only touches velocity. Zero-length distance vectors
// are skipped instead of producing NaN normals.

use super::{centered, Body};

#[inline]
pub fn gravity(b: &mut Body, g: f32) {
    b.vy += g;
}

/// Multiplicative decay, applied once per step.
#[inline]
pub fn friction(b: &mut Body, f: f32) {
    b.vx *= f;
    b.vy *= f;
}

/// Speed a body settles at under constant acceleration `g` with
/// per-step decay `f` applied after the acceleration.
pub fn terminal_velocity(g: f32, f: f32) -> f32 {
    g * f / (1.0 - f)
}

/// Rescale velocity so its magnitude is at most `max`.
pub fn clamp_speed(b: &mut Body, max: f32) {
    let speed = b.speed();
    if speed > max {
        b.vx = b.vx / speed * max;
        b.vy = b.vy / speed * max;
    }
}

/// Push away from (px, py) inside `radius`. Strength falls off linearly
/// from `strength` at the center to zero at the edge.
pub fn repel(b: &mut Body, px: f32, py: f32, radius: f32, strength: f32) -> bool {
    let dx = b.x - px;
    let dy = b.y - py;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq >= radius * radius || dist_sq <= 0.0 {
        return false;
    }
    let dist = dist_sq.sqrt();
    let force = (radius - dist) / radius * strength;
    b.vx += dx / dist * force;
    b.vy += dy / dist * force;
    true
}

/// Pull toward (px, py), harder the further away, up to `cap`.
/// Inside `too_close` an extra push keeps bodies off the exact point.
pub fn attract(b: &mut Body, px: f32, py: f32, range: f32, cap: f32, strength: f32, too_close: f32, push: f32) {
    let dx = px - b.x;
    let dy = py - b.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= 0.0 {
        return;
    }
    let (nx, ny) = (dx / dist, dy / dist);
    let pull = (dist / range).min(cap) * strength;
    b.vx += nx * pull;
    b.vy += ny * pull;

    if dist < too_close {
        b.vx -= nx * push;
        b.vy -= ny * push;
    }
}

/// Small random kick so idle bodies never freeze.
#[inline]
pub fn wander(b: &mut Body, rng: &mut u32, amount: f32) {
    b.vx += centered(rng, amount);
    b.vy += centered(rng, amount);
}

/// Pull toward the anchor, proportional to displacement.
#[inline]
pub fn spring(b: &mut Body, base_x: f32, base_y: f32, k: f32) {
    b.vx += (base_x - b.x) * k;
    b.vy += (base_y - b.y) * k;
}

/// Impulse from a click at (cx, cy) on a body at (x, y): radial push
/// scaled by proximity, then `lift` upward. `None` outside the radius.
pub fn click_impulse(x: f32, y: f32, cx: f32, cy: f32, radius: f32, force: f32, lift: f32) -> Option<(f32, f32)> {
    let dx = x - cx;
    let dy = y - cy;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq >= radius * radius || dist_sq <= 0.0 {
        return None;
    }
    let dist = dist_sq.sqrt();
    let f = (radius - dist) / radius * force;
    Some((dx / dist * f, dy / dist * f - lift))
}

/// Short-range symmetric nudge apart. No position correction.
pub fn pair_push(a: &mut Body, b: &mut Body, below: f32, push: f32) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist >= below || dist <= 0.0 {
        return false;
    }
    let (nx, ny) = (dx / dist * push, dy / dist * push);
    a.vx += nx;
    a.vy += ny;
    b.vx -= nx;
    b.vy -= ny;
    true
}
