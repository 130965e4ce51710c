// probe.rs - Geometry probe
//
// Measures tracked UI elements and turns them into an `Obstacles`
// snapshot. The input is re-read on every refresh, since it can move
// with scrolling or layout. Glyph boxes are re-measured only when the
// tracked text changes or the viewport resizes. The snapshot is
// read-only for the simulation.

use super::{Bounds, Capsule, Obstacles};

/// Where measurements come from. `None` / empty boxes mean the element
/// isn't mounted yet, which is "no obstacle", not an error.
pub trait GeometrySource {
    fn input_bounds(&self) -> Option<Bounds>;
    fn glyph_bounds(&self) -> Vec<Bounds>;
}

/// Fixed measurements. Used headless and when the page pushes rects in.
#[derive(Clone, Debug, Default)]
pub struct StaticGeometry {
    pub input: Option<Bounds>,
    pub glyphs: Vec<Bounds>,
}

impl GeometrySource for StaticGeometry {
    fn input_bounds(&self) -> Option<Bounds> {
        self.input
    }

    fn glyph_bounds(&self) -> Vec<Bounds> {
        self.glyphs.clone()
    }
}

pub struct GeometryProbe {
    snapshot: Obstacles,
    text: String,
    dirty: bool,
}

impl Default for GeometryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryProbe {
    pub fn new() -> Self {
        Self { snapshot: Obstacles::none(), text: String::new(), dirty: true }
    }

    pub fn snapshot(&self) -> &Obstacles {
        &self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a glyph re-measure on the next refresh (viewport resize,
    /// layout shift).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Tracked glyph text changed; only a real change re-measures.
    pub fn text_changed(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
            self.dirty = true;
        }
    }

    /// Re-read the input, and the glyphs if anything invalidated them.
    /// Returns whether the snapshot changed.
    pub fn refresh(&mut self, source: &dyn GeometrySource) -> bool {
        let capsule = measure_input(source);
        let moved = capsule != self.snapshot.capsule;
        self.snapshot.capsule = capsule;
        if !self.dirty {
            return moved;
        }
        self.snapshot.glyphs = measure_glyphs(source);
        self.dirty = false;
        log::debug!(
            "geometry probe: capsule={} glyphs={}",
            self.snapshot.capsule.is_some(),
            self.snapshot.glyphs.len()
        );
        true
    }
}

/// One-shot measurement, dropping anything that isn't laid out.
pub fn measure(source: &dyn GeometrySource) -> Obstacles {
    Obstacles { capsule: measure_input(source), glyphs: measure_glyphs(source) }
}

fn measure_input(source: &dyn GeometrySource) -> Option<Capsule> {
    source.input_bounds().filter(|b| !b.is_empty()).map(Capsule::from_bounds)
}

fn measure_glyphs(source: &dyn GeometrySource) -> Vec<Bounds> {
    source.glyph_bounds().into_iter().filter(|b| !b.is_empty()).collect()
}
