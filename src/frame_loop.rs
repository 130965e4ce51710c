// frame_loop.rs - Simulation loop
//
// Drives one scene: step once per display refresh, draw, ask for the
// next refresh. Idle -> Armed -> Running -> TornDown, never backwards.
// The refresh source sits behind `FrameScheduler` so the same loop runs
// on requestAnimationFrame in the browser and by hand in tests.

use crate::input::{Pointer, Visibility};
use crate::render::Surface;
use crate::sim::{FrameInput, Scene};
use crate::world::{GeometryProbe, GeometrySource, Obstacles};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing allocated yet.
    Idle,
    /// Store allocated, waiting for the activation signal.
    Armed,
    /// Stepping once per refresh.
    Running,
    /// Pending refresh cancelled, store dropped.
    TornDown,
}

/// Id of a requested refresh callback, for cancelling it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

pub trait FrameScheduler {
    /// Ask for `FrameLoop::frame` to be called on the next refresh.
    /// `None` if the request could not be made.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler for headless runs: records requests, the caller decides
/// when a refresh happens.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: i32,
    outstanding: Option<FrameHandle>,
    pub requested: usize,
    pub cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request a refresh would currently answer.
    pub fn outstanding(&self) -> Option<FrameHandle> {
        self.outstanding
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next);
        self.outstanding = Some(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
        self.cancelled += 1;
    }
}

pub struct FrameLoop<S: Scene, F: FrameScheduler> {
    state: LoopState,
    scene: Option<S>,
    scheduler: F,
    pending: Option<FrameHandle>,

    // Written by events, read once per frame
    pointer: Pointer,
    visibility: Visibility,

    probe: GeometryProbe,
    source: Box<dyn GeometrySource>,

    w: f32,
    h: f32,
    frames: u64,
}

impl<S: Scene, F: FrameScheduler> FrameLoop<S, F> {
    pub fn new(scheduler: F, source: Box<dyn GeometrySource>, width: f32, height: f32) -> Self {
        Self {
            state: LoopState::Idle,
            scene: None,
            scheduler,
            pending: None,
            pointer: Pointer::default(),
            visibility: Visibility::default(),
            probe: GeometryProbe::new(),
            source,
            w: width,
            h: height,
            frames: 0,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn obstacles(&self) -> &Obstacles {
        self.probe.snapshot()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn width(&self) -> f32 {
        self.w
    }

    pub fn height(&self) -> f32 {
        self.h
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Idle -> Armed: measure obstacles and allocate the store.
    pub fn arm(&mut self, mut scene: S) -> bool {
        if self.state != LoopState::Idle {
            log::debug!("frame loop: arm ignored in {:?}", self.state);
            return false;
        }
        self.probe.refresh(self.source.as_ref());
        scene.reset(self.w, self.h, self.probe.snapshot());
        self.scene = Some(scene);
        self.state = LoopState::Armed;
        log::debug!("frame loop: armed at {}x{}", self.w, self.h);
        true
    }

    /// Armed -> Running on the first activation signal. Later signals
    /// are ignored.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Armed {
            return false;
        }
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        self.probe.refresh(self.source.as_ref());
        scene.activate(self.probe.snapshot());
        self.pending = self.scheduler.request_frame();
        self.state = LoopState::Running;
        log::debug!("frame loop: running with {} particles", scene.len());
        true
    }

    /// One refresh callback: step, draw, request the next one.
    /// Returns false when the loop isn't running.
    pub fn frame(&mut self, surface: &mut dyn Surface) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.pending = None;
        self.probe.refresh(self.source.as_ref());

        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        // The step gets the pending click; the loop's copy drops it
        let pointer = self.pointer;
        self.pointer.take_click();
        let input = FrameInput {
            pointer,
            width: self.w,
            height: self.h,
            obstacles: self.probe.snapshot(),
        };
        scene.step(&input);
        surface.clear(self.w, self.h);
        scene.draw(surface);

        self.frames += 1;
        self.pending = self.scheduler.request_frame();
        true
    }

    /// Any state -> TornDown. Cancels the pending refresh and drops the
    /// store. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == LoopState::TornDown {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.scene = None;
        log::debug!("frame loop: torn down after {} frames", self.frames);
        self.state = LoopState::TornDown;
    }

    /// Viewport changed. Regenerates the store in place; the loop state
    /// doesn't change.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.w = width;
        self.h = height;
        self.probe.invalidate();
        if !matches!(self.state, LoopState::Armed | LoopState::Running) {
            return;
        }
        self.probe.refresh(self.source.as_ref());
        if let Some(scene) = self.scene.as_mut() {
            scene.reset(width, height, self.probe.snapshot());
            log::debug!("frame loop: resized to {}x{}, {} particles", width, height, scene.len());
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.moved(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.pointer.left();
    }

    pub fn clicked(&mut self, x: f32, y: f32) {
        self.pointer.clicked(x, y);
    }

    /// Tracked glyph text changed; obstacles are re-measured before the
    /// next step if it really differs.
    pub fn text_changed(&mut self, text: &str) {
        self.probe.text_changed(text);
    }

    /// Flip visibility. The loop keeps running either way.
    pub fn toggle_visibility(&mut self) -> Visibility {
        self.visibility.toggle();
        self.visibility
    }

    pub fn set_geometry_source(&mut self, source: Box<dyn GeometrySource>) {
        self.source = source;
        self.probe.invalidate();
    }
}
