// world/ - Obstacle geometry
//
// Plain snapshots of the UI the particles collide with.
// Shapes are pure data; the probe decides when to re-measure them.

mod probe;
mod shapes;

pub use probe::*;
pub use shapes::*;
