// collide.rs - Collision resolution
//
// Order per particle per step: capsule, each glyph box, floor and walls,
// then pairs. Each resolver pushes the body out of the solid and only
// then adjusts velocity.

use super::Body;
use crate::config::CollisionConfig;
use crate::world::{Bounds, Capsule};

/// Face of a box a body was resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    Top,
    Bottom,
    Left,
    Right,
}

/// Resolve against a horizontal capsule. Only the velocity component
/// pointing into the surface is removed (and slightly reflected), so
/// bodies roll along it. Returns whether there was contact.
pub fn capsule(b: &mut Body, c: &Capsule, k: &CollisionConfig) -> bool {
    let cx = c.closest_x(b.x);
    let dx = b.x - cx;
    let dy = b.y - c.center_y;
    let dist_sq = dx * dx + dy * dy;
    let min_dist = c.radius + b.r;

    if dist_sq >= min_dist * min_dist {
        return false;
    }

    let dist = dist_sq.sqrt();
    if dist > 0.1 {
        // Outward normal at the contact point
        let nx = dx / dist;
        let ny = dy / dist;

        b.x = cx + nx * min_dist;
        b.y = c.center_y + ny * min_dist;

        let into = -(b.vx * nx + b.vy * ny);
        if into > 0.0 {
            b.vx += into * nx * k.capsule_restitution;
            b.vy += into * ny * k.capsule_restitution;
            b.vx *= k.capsule_friction;
            b.vy *= k.capsule_friction;
        }
    } else {
        // On the center line there is no normal; escape upward.
        b.y = c.top() - b.r;
        b.vy = -k.capsule_escape_speed;
    }
    true
}

/// Resolve against a glyph box grown by `pad`, along the axis of least
/// penetration only. The bottom face only catches bodies moving up and
/// side faces only bodies moving into them, so settled bodies are never
/// dragged back in from below.
pub fn rect(b: &mut Body, r: &Bounds, pad: f32, k: &CollisionConfig) -> Option<Face> {
    let left = r.left - pad;
    let right = r.right() + pad;
    let top = r.top - pad;
    let bottom = r.bottom() + pad;

    if !(b.x + b.r > left && b.x - b.r < right && b.y + b.r > top && b.y - b.r < bottom) {
        return None;
    }

    let over_left = (b.x + b.r) - left;
    let over_right = right - (b.x - b.r);
    let over_top = (b.y + b.r) - top;
    let over_bottom = bottom - (b.y - b.r);
    let min = over_left.min(over_right).min(over_top).min(over_bottom);

    if min == over_top {
        b.y = top - b.r;
        b.vy *= -k.face_bounce;
        // Break symmetry so piles slide off glyph tops
        if b.vx.abs() < k.nudge_below {
            let center = (left + right) * 0.5;
            b.vx += if b.x > center { k.nudge } else { -k.nudge };
        }
        Some(Face::Top)
    } else if min == over_bottom && b.vy < 0.0 {
        b.y = bottom + b.r;
        b.vy *= -k.face_bounce;
        Some(Face::Bottom)
    } else if min == over_left && b.vx > 0.0 {
        b.x = left - b.r;
        b.vx *= -k.side_bounce;
        Some(Face::Left)
    } else if min == over_right && b.vx < 0.0 {
        b.x = right + b.r;
        b.vx *= -k.side_bounce;
        Some(Face::Right)
    } else {
        None
    }
}

/// Floor and side walls. There is no ceiling.
pub fn walls(b: &mut Body, width: f32, height: f32, k: &CollisionConfig) {
    if b.y + b.r > height {
        b.y = height - b.r;
        b.vy *= -k.floor_bounce;
        b.vx *= k.floor_drag;
    }

    if b.x < b.r {
        b.x = b.r;
        b.vx *= -k.wall_bounce;
    } else if b.x > width - b.r {
        b.x = width - b.r;
        b.vx *= -k.wall_bounce;
    }
}

/// Resting contact: separate like `pair` and cancel the whole closing
/// part of the relative velocity. Used by the relaxation sweeps that
/// follow the main pair pass.
pub fn rest(a: &mut Body, b: &mut Body) -> bool {
    pair(a, b, RESTING).is_some()
}

/// Restitution at which `pair` leaves no closing velocity.
pub const RESTING: f32 = 0.5;

/// Position-only clamp into the viewport. Used after the pair pass,
/// which can nudge an already clamped body back out.
pub fn confine(b: &mut Body, width: f32, height: f32) {
    b.x = b.x.max(b.r).min((width - b.r).max(b.r));
    b.y = b.y.min(height - b.r);
}

/// Two overlapping bodies: separate each by half the overlap along the
/// contact normal, then damp only the closing part of their relative
/// velocity, equally and oppositely. Returns the normal impulse (zero if
/// they were already separating), or `None` without contact.
pub fn pair(a: &mut Body, b: &mut Body, restitution: f32) -> Option<f32> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dist_sq = dx * dx + dy * dy;
    let min_dist = a.r + b.r;

    if dist_sq >= min_dist * min_dist || dist_sq <= 0.0 {
        return None;
    }

    let dist = dist_sq.sqrt();
    let overlap = (min_dist - dist) * 0.5;
    let nx = dx / dist;
    let ny = dy / dist;

    a.x -= nx * overlap;
    a.y -= ny * overlap;
    b.x += nx * overlap;
    b.y += ny * overlap;

    let rel_vn = (a.vx - b.vx) * nx + (a.vy - b.vy) * ny;
    if rel_vn <= 0.0 {
        return Some(0.0);
    }

    let j = rel_vn * restitution;
    a.vx -= j * nx;
    a.vy -= j * ny;
    b.vx += j * nx;
    b.vy += j * ny;
    Some(j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k() -> CollisionConfig {
        CollisionConfig::default()
    }

    fn pill() -> Capsule {
        Capsule::from_bounds(Bounds::new(300.0, 200.0, 200.0, 40.0))
    }

    #[test]
    fn capsule_keeps_tangential_motion() {
        let c = pill();
        // Resting on the flat top, 1 px into it, sliding right
        let mut b = Body::new(400.0, c.top() - 4.0 + 1.0, 2.0, 0.0, 4.0);
        assert!(capsule(&mut b, &c, &k()));
        assert_eq!(b.vx, 2.0);
        assert_eq!(b.vy, 0.0);
        assert!((b.y - (c.top() - 4.0)).abs() < 1e-4);
    }

    #[test]
    fn capsule_rolls_along_rounded_end() {
        let c = pill();
        // 45 degrees up-left on the left cap, moving along the tangent
        let d = (c.radius + 4.0 - 0.5) / std::f32::consts::SQRT_2;
        let mut b = Body::new(c.left - d, c.center_y - d, -1.0, 1.0, 4.0);
        assert!(capsule(&mut b, &c, &k()));
        assert!(b.vx < 0.0 && b.vy > 0.0);
        assert!(c.signed_distance(b.x, b.y) >= 4.0 - 1e-3);
    }

    #[test]
    fn capsule_reflects_normal_component() {
        let c = pill();
        let mut b = Body::new(400.0, c.top() - 3.0, 0.5, 3.0, 4.0);
        capsule(&mut b, &c, &k());
        // 3 - 3 * 1.2 = -0.6, then tangential friction
        assert!((b.vy - (-0.6 * 0.95)).abs() < 1e-5);
        assert!((b.vx - 0.5 * 0.95).abs() < 1e-6);
    }

    #[test]
    fn capsule_center_line_escapes_up() {
        let c = pill();
        let mut b = Body::new(400.0, c.center_y, 0.0, 1.0, 4.0);
        assert!(capsule(&mut b, &c, &k()));
        assert_eq!(b.y, c.top() - 4.0);
        assert_eq!(b.vy, -2.0);
        assert!(b.is_finite());
    }

    #[test]
    fn capsule_misses_outside() {
        let c = pill();
        let mut b = Body::new(400.0, c.top() - 10.0, 0.0, 1.0, 4.0);
        assert!(!capsule(&mut b, &c, &k()));
        assert_eq!(b.vy, 1.0);
    }

    #[test]
    fn rect_top_inverts_and_damps() {
        let glyph = Bounds::new(100.0, 100.0, 20.0, 30.0);
        let mut b = Body::new(115.0, 100.0 - 1.0 - 4.0 + 1.0, 0.0, 2.0, 4.0);
        assert_eq!(rect(&mut b, &glyph, 1.0, &k()), Some(Face::Top));
        assert!(b.vy < 0.0);
        assert!(b.vy.abs() < 2.0 && b.vy.abs() > 0.0);
        assert_eq!(b.y, 99.0 - 4.0);
        // Right of center gets nudged right
        assert!(b.vx > 0.0);
    }

    #[test]
    fn rect_bottom_only_catches_rising_bodies() {
        let glyph = Bounds::new(100.0, 100.0, 40.0, 30.0);
        let below = 131.0 + 4.0 - 1.0;

        let mut falling = Body::new(120.0, below, 0.0, 1.0, 4.0);
        assert_eq!(rect(&mut falling, &glyph, 1.0, &k()), None);
        assert_eq!(falling.y, below);

        let mut rising = Body::new(120.0, below, 0.0, -2.0, 4.0);
        assert_eq!(rect(&mut rising, &glyph, 1.0, &k()), Some(Face::Bottom));
        assert_eq!(rising.y, 135.0);
        assert!(rising.vy > 0.0);
    }

    #[test]
    fn rect_side_faces() {
        let glyph = Bounds::new(100.0, 100.0, 20.0, 60.0);
        let mut b = Body::new(99.0 - 4.0 + 1.0, 130.0, 1.5, 0.0, 4.0);
        assert_eq!(rect(&mut b, &glyph, 1.0, &k()), Some(Face::Left));
        assert_eq!(b.x, 95.0);
        assert!((b.vx + 1.5 * 0.4).abs() < 1e-6);

        let mut b = Body::new(121.0 + 4.0 - 1.0, 130.0, -1.5, 0.0, 4.0);
        assert_eq!(rect(&mut b, &glyph, 1.0, &k()), Some(Face::Right));
        assert_eq!(b.x, 125.0);
    }

    #[test]
    fn floor_and_walls_clamp() {
        let mut b = Body::new(-2.0, 610.0, -3.0, 5.0, 4.0);
        walls(&mut b, 800.0, 600.0, &k());
        assert_eq!((b.x, b.y), (4.0, 596.0));
        assert!((b.vy + 1.0).abs() < 1e-6);
        assert!(b.vx > 0.0);

        let mut b = Body::new(805.0, -50.0, 3.0, -5.0, 4.0);
        walls(&mut b, 800.0, 600.0, &k());
        assert_eq!(b.x, 796.0);
        // No ceiling
        assert_eq!(b.y, -50.0);
        assert_eq!(b.vy, -5.0);
    }

    #[test]
    fn pair_correction_is_equal_and_opposite() {
        let mut a = Body::new(0.0, 0.0, 2.0, 1.0, 4.0);
        let mut b = Body::new(6.0, 0.0, -1.0, 0.5, 4.0);
        let (a0, b0) = (a, b);
        let j = pair(&mut a, &mut b, 0.3).unwrap();
        assert!(j > 0.0);

        let da = (a.vx - a0.vx, a.vy - a0.vy);
        let db = (b.vx - b0.vx, b.vy - b0.vy);
        assert!((da.0 + db.0).abs() < 1e-6);
        assert!((da.1 + db.1).abs() < 1e-6);
        assert!(da.0 < 0.0);

        // Separated to exactly touching
        let gap = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        assert!((gap - 8.0).abs() < 1e-5);
    }

    #[test]
    fn pair_leaves_separating_velocity_alone() {
        let mut a = Body::new(0.0, 0.0, -1.0, 0.0, 4.0);
        let mut b = Body::new(6.0, 0.0, 1.0, 0.0, 4.0);
        assert_eq!(pair(&mut a, &mut b, 0.3), Some(0.0));
        assert_eq!((a.vx, b.vx), (-1.0, 1.0));
    }

    #[test]
    fn resting_contact_stops_closing_motion() {
        let mut a = Body::new(0.0, 0.0, 0.0, 1.0, 4.0);
        let mut b = Body::new(0.0, 7.0, 0.0, 0.0, 4.0);
        assert!(rest(&mut a, &mut b));
        assert!((a.vy - b.vy).abs() < 1e-6);
        assert!((a.vy + b.vy - 1.0).abs() < 1e-6);
        assert!((b.y - a.y - 8.0).abs() < 1e-5);

        // Apart: untouched
        let mut c = Body::new(0.0, 20.0, 0.0, -1.0, 4.0);
        assert!(!rest(&mut a, &mut c));
        assert_eq!(c.vy, -1.0);
    }

    #[test]
    fn coincident_pair_is_skipped() {
        let mut a = Body::new(5.0, 5.0, 0.0, 0.0, 4.0);
        let mut b = a;
        assert_eq!(pair(&mut a, &mut b, 0.3), None);
        assert!(a.is_finite() && b.is_finite());
    }

    #[test]
    fn confine_only_moves_position() {
        let mut b = Body::new(801.0, 602.0, 1.0, 1.0, 4.0);
        confine(&mut b, 800.0, 600.0);
        assert_eq!((b.x, b.y), (796.0, 596.0));
        assert_eq!((b.vx, b.vy), (1.0, 1.0));
    }
}
