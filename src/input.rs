// input.rs - Pointer and visibility state
//
// Events write here directly (last write wins); the loop reads a copy
// once per frame.

/// Coordinate meaning "pointer is nowhere near the canvas".
pub const FAR_AWAY: f32 = -1000.0;

/// Storage key for the visualization toggle.
pub const VISIBILITY_KEY: &str = "particlesVisible";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    /// Click waiting to be applied on the next step.
    pub click: Option<(f32, f32)>,
}

impl Default for Pointer {
    fn default() -> Self {
        Self { x: FAR_AWAY, y: FAR_AWAY, click: None }
    }
}

impl Pointer {
    /// Pointer resting at (x, y) with no pending click.
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, click: None }
    }

    pub fn moved(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn left(&mut self) {
        self.x = FAR_AWAY;
        self.y = FAR_AWAY;
    }

    pub fn clicked(&mut self, x: f32, y: f32) {
        self.click = Some((x, y));
    }

    /// Hand the pending click to the step that applies it.
    pub fn take_click(&mut self) -> Option<(f32, f32)> {
        self.click.take()
    }

    /// Inside the viewport's positive quadrant. The sentinel never is.
    pub fn on_screen(&self) -> bool {
        self.x > 0.0 && self.y > 0.0
    }
}

/// Whether the particle canvas is shown. Hiding only fades the canvas;
/// the simulation keeps running underneath.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility(bool);

impl Default for Visibility {
    fn default() -> Self {
        Self(true)
    }
}

impl Visibility {
    /// Restore from the persisted string. Anything but `"true"` hides,
    /// a missing value shows.
    pub fn from_stored(stored: Option<&str>) -> Self {
        match stored {
            Some(v) => Self(v == "true"),
            None => Self::default(),
        }
    }

    pub fn visible(&self) -> bool {
        self.0
    }

    pub fn toggle(&mut self) -> bool {
        self.0 = !self.0;
        self.0
    }

    pub fn stored_value(&self) -> &'static str {
        if self.0 { "true" } else { "false" }
    }

    /// CSS opacity for the canvas element.
    pub fn opacity(&self) -> &'static str {
        if self.0 { "1" } else { "0" }
    }
}
