// shapes.rs - Obstacle shapes in viewport (client pixel) space
//
// y grows downward, matching getBoundingClientRect.

/// Axis-aligned box as measured from the DOM.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 { self.left + self.width }

    #[inline]
    pub fn bottom(&self) -> f32 { self.top + self.height }

    #[inline]
    pub fn center_x(&self) -> f32 { self.left + self.width * 0.5 }

    /// Grow on every side by `pad`.
    pub fn padded(&self, pad: f32) -> Self {
        Self::new(self.left - pad, self.top - pad, self.width + pad * 2.0, self.height + pad * 2.0)
    }

    /// Zero-area boxes are what unmounted or hidden elements report.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Horizontal stadium: the segment [left, right] at height `center_y`,
/// swept by `radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub left: f32,
    pub right: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Box the capsule was derived from.
    pub bounds: Bounds,
}

impl Capsule {
    /// Pill-shaped control: radius is half the height, focal points are
    /// inset by the radius from each end.
    pub fn from_bounds(b: Bounds) -> Self {
        let radius = b.height * 0.5;
        let left = b.left + radius;
        // Narrower than tall: collapse to a circle at the center.
        let right = (b.right() - radius).max(left);
        let (left, right) = if b.width < b.height {
            (b.center_x(), b.center_x())
        } else {
            (left, right)
        };
        Self { left, right, center_y: b.top + radius, radius, bounds: b }
    }

    #[inline]
    pub fn top(&self) -> f32 { self.center_y - self.radius }

    #[inline]
    pub fn bottom(&self) -> f32 { self.center_y + self.radius }

    /// Closest point on the center segment to `x`.
    #[inline]
    pub fn closest_x(&self, x: f32) -> f32 {
        x.clamp(self.left, self.right)
    }

    /// Distance from (x, y) to the capsule surface; negative inside.
    pub fn signed_distance(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.closest_x(x);
        let dy = y - self.center_y;
        (dx * dx + dy * dy).sqrt() - self.radius
    }
}

/// Everything solid for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Obstacles {
    pub capsule: Option<Capsule>,
    pub glyphs: Vec<Bounds>,
}

impl Obstacles {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.capsule.is_none() && self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capsule_from_pill_bounds() {
        let c = Capsule::from_bounds(Bounds::new(300.0, 200.0, 200.0, 40.0));
        assert_eq!(c.radius, 20.0);
        assert_eq!((c.left, c.right), (320.0, 480.0));
        assert_eq!(c.center_y, 220.0);
        assert_eq!((c.top(), c.bottom()), (200.0, 240.0));
    }

    #[test]
    fn signed_distance_on_rounded_end() {
        let c = Capsule::from_bounds(Bounds::new(0.0, 0.0, 100.0, 20.0));
        // 10 px left of the left focal point, level with it: on the surface
        assert!(c.signed_distance(0.0, 10.0).abs() < 1e-5);
        assert!(c.signed_distance(50.0, 10.0) < 0.0);
        assert!((c.signed_distance(50.0, -5.0) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn narrow_bounds_collapse_to_circle() {
        let c = Capsule::from_bounds(Bounds::new(10.0, 0.0, 10.0, 40.0));
        assert_eq!(c.left, c.right);
        assert_eq!(c.left, 15.0);
    }

    #[test]
    fn empty_bounds() {
        assert!(Bounds::new(5.0, 5.0, 0.0, 10.0).is_empty());
        assert!(!Bounds::new(5.0, 5.0, 1.0, 1.0).is_empty());
    }
}
