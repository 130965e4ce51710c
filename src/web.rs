// web.rs - Browser glue
//
// Mounts a scene on a <canvas>, drives it with requestAnimationFrame,
// measures obstacles from the DOM and wires up pointer, resize and
// double-click listeners. Everything here is wasm32-only; the rest of
// the crate never sees a JS type.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, DomRect, Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::config::{from_json, DriftConfig, GridConfig, SandConfig, TriangleConfig, Validate};
use crate::error::EngineError;
use crate::frame_loop::{FrameHandle, FrameLoop, FrameScheduler};
use crate::input::{Visibility, VISIBILITY_KEY};
use crate::render::{chevron_points, Rgba, Surface};
use crate::sim::{DriftWorld, GridWorld, SandWorld, Scene, TriangleField};
use crate::world::{Bounds, GeometrySource};

// ============================================================================
// Logging
// ============================================================================

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            _ => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// "error", "warn", "info", "debug" or "trace". Unknown levels are ignored.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("unknown log level '{}'", level),
    }
}

// ============================================================================
// Frame scheduling
// ============================================================================

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let callback = self.callback.borrow();
        let f = callback.as_ref()?;
        match self.window.request_animation_frame(f.as_ref().unchecked_ref()) {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }
}

// ============================================================================
// Drawing
// ============================================================================

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        if self.ctx.arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, TAU).is_err() {
            return;
        }
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn fill_chevron(&mut self, x: f32, y: f32, rotation: f32, size: f32, color: Rgba) {
        let [tip, left, right] = chevron_points(x, y, rotation, size);
        self.ctx.begin_path();
        self.ctx.move_to(tip.0 as f64, tip.1 as f64);
        self.ctx.line_to(left.0 as f64, left.1 as f64);
        self.ctx.line_to(right.0 as f64, right.1 as f64);
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Reads obstacle boxes from the live layout. The canvas is fixed over
/// the viewport, so client rects are canvas coordinates.
pub struct DomGeometry {
    document: Document,
    input_id: Option<String>,
    glyphs_id: Option<String>,
}

fn rect_bounds(r: &DomRect) -> Bounds {
    Bounds::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}

impl GeometrySource for DomGeometry {
    fn input_bounds(&self) -> Option<Bounds> {
        let el = self.document.get_element_by_id(self.input_id.as_deref()?)?;
        Some(rect_bounds(&el.get_bounding_client_rect()))
    }

    fn glyph_bounds(&self) -> Vec<Bounds> {
        let Some(container) = self.glyphs_id.as_deref().and_then(|id| self.document.get_element_by_id(id)) else {
            return Vec::new();
        };
        let children = container.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|el| rect_bounds(&el.get_bounding_client_rect()))
            .collect()
    }
}

// ============================================================================
// Mounted canvas
// ============================================================================

type SharedLoop = Rc<RefCell<FrameLoop<Box<dyn Scene>, RafScheduler>>>;

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// A particle scene running on a canvas until `destroy` (or drop).
#[wasm_bindgen]
pub struct ParticleCanvas {
    inner: SharedLoop,
    window: Window,
    canvas: HtmlCanvasElement,
    callback: FrameCallback,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl ParticleCanvas {
    /// Sand pouring out of the input `input_id` once it gains focus,
    /// landing on the children of `glyphs_id`.
    pub fn sand(
        canvas_id: &str,
        input_id: &str,
        glyphs_id: Option<String>,
        config: Option<String>,
    ) -> Option<ParticleCanvas> {
        let mounted = parse::<SandConfig>(config).and_then(|cfg| {
            let mut pc = mount(
                canvas_id,
                Some(input_id.to_string()),
                glyphs_id,
                Box::new(SandWorld::with_seed(cfg, (js_sys::Math::random() * u32::MAX as f64) as u32)),
            )?;
            pc.listen_for_focus(input_id)?;
            Ok(pc)
        });
        report(canvas_id, mounted)
    }

    /// Ambient particles drifting after the pointer.
    pub fn drift(canvas_id: &str, config: Option<String>) -> Option<ParticleCanvas> {
        let mounted = parse::<DriftConfig>(config)
            .and_then(|cfg| mount(canvas_id, None, None, Box::new(DriftWorld::new(cfg))))
            .map(ParticleCanvas::started);
        report(canvas_id, mounted)
    }

    /// Dot grid the pointer pushes around.
    pub fn grid(canvas_id: &str, config: Option<String>) -> Option<ParticleCanvas> {
        let mounted = parse::<GridConfig>(config)
            .and_then(|cfg| mount(canvas_id, None, None, Box::new(GridWorld::new(cfg))))
            .map(ParticleCanvas::started);
        report(canvas_id, mounted)
    }

    /// Arrows turning to face the pointer.
    pub fn triangles(canvas_id: &str, config: Option<String>) -> Option<ParticleCanvas> {
        let mounted = parse::<TriangleConfig>(config)
            .and_then(|cfg| mount(canvas_id, None, None, Box::new(TriangleField::new(cfg))))
            .map(ParticleCanvas::started);
        report(canvas_id, mounted)
    }

    /// Activation signal. Starts the loop the first time only.
    pub fn trigger(&self) -> bool {
        self.inner.borrow_mut().start()
    }

    /// Tracked glyph text changed; obstacles are re-measured lazily.
    pub fn text_changed(&self, text: &str) {
        self.inner.borrow_mut().text_changed(text);
    }

    pub fn particle_count(&self) -> usize {
        self.inner.borrow().scene().map_or(0, |s| s.len())
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visibility().visible()
    }

    /// Cancel the pending frame and detach every listener.
    pub fn destroy(&mut self) {
        for l in self.listeners.drain(..) {
            if let Err(e) = l.target.remove_event_listener_with_callback(l.event, l.closure.as_ref().unchecked_ref()) {
                log::warn!("failed to detach {} listener: {:?}", l.event, e);
            }
        }
        self.inner.borrow_mut().teardown();
        self.callback.borrow_mut().take();
    }
}

impl Drop for ParticleCanvas {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl ParticleCanvas {
    fn started(self) -> Self {
        self.inner.borrow_mut().start();
        self
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), EngineError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener { target: target.clone(), event, closure });
        Ok(())
    }

    fn listen_for_focus(&mut self, input_id: &str) -> Result<(), EngineError> {
        let Some(input) = self.window.document().and_then(|d| d.get_element_by_id(input_id)) else {
            log::warn!("sand: no input '{}', call trigger() to start", input_id);
            return Ok(());
        };
        let weak = Rc::downgrade(&self.inner);
        self.listen(&input, "focus", move |_| {
            with_loop(&weak, |lp| {
                lp.start();
            })
        })
    }

    fn attach_listeners(&mut self) -> Result<(), EngineError> {
        let window = self.window.clone();
        let document = window.document().ok_or_else(|| EngineError::Js("no document".into()))?;

        let weak = Rc::downgrade(&self.inner);
        self.listen(&window, "mousemove", move |e| {
            if let Some(m) = e.dyn_ref::<MouseEvent>() {
                with_loop(&weak, |lp| lp.pointer_moved(m.client_x() as f32, m.client_y() as f32));
            }
        })?;

        let weak = Rc::downgrade(&self.inner);
        self.listen(&document, "mouseleave", move |_| with_loop(&weak, |lp| lp.pointer_left()))?;

        let weak = Rc::downgrade(&self.inner);
        self.listen(&window, "click", move |e| {
            if let Some(m) = e.dyn_ref::<MouseEvent>() {
                with_loop(&weak, |lp| lp.clicked(m.client_x() as f32, m.client_y() as f32));
            }
        })?;

        let weak = Rc::downgrade(&self.inner);
        let (win, canvas) = (window.clone(), self.canvas.clone());
        self.listen(&window, "resize", move |_| {
            let (w, h) = fit_to_viewport(&win, &canvas);
            with_loop(&weak, |lp| lp.resize(w, h));
        })?;

        let weak = Rc::downgrade(&self.inner);
        let (win, canvas) = (window.clone(), self.canvas.clone());
        self.listen(&window, "dblclick", move |_| {
            with_loop(&weak, |lp| {
                let vis = lp.toggle_visibility();
                store_visibility(&win, vis);
                apply_visibility(&canvas, vis);
                log::debug!("particles visible: {}", vis.visible());
            })
        })?;

        Ok(())
    }
}

fn mount(
    canvas_id: &str,
    input_id: Option<String>,
    glyphs_id: Option<String>,
    scene: Box<dyn Scene>,
) -> Result<ParticleCanvas, EngineError> {
    let window = web_sys::window().ok_or_else(|| EngineError::Js("no window".into()))?;
    let document = window.document().ok_or_else(|| EngineError::Js("no document".into()))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| EngineError::MissingCanvas(canvas_id.to_string()))?;
    let ctx = canvas
        .get_context("2d")?
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or(EngineError::MissingContext)?;

    let (w, h) = fit_to_viewport(&window, &canvas);
    let visibility = load_visibility(&window);
    apply_visibility(&canvas, visibility);

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let scheduler = RafScheduler { window: window.clone(), callback: callback.clone() };
    let geometry = DomGeometry { document, input_id, glyphs_id };
    let mut frame_loop = FrameLoop::new(scheduler, Box::new(geometry), w, h).with_visibility(visibility);
    frame_loop.arm(scene);
    let inner: SharedLoop = Rc::new(RefCell::new(frame_loop));

    // The frame callback only holds a weak ref; the canvas owns the loop
    let weak = Rc::downgrade(&inner);
    let mut surface = CanvasSurface::new(ctx);
    *callback.borrow_mut() = Some(Closure::new(move || {
        with_loop(&weak, |lp| {
            lp.frame(&mut surface);
        })
    }));

    let mut pc = ParticleCanvas { inner, window, canvas, callback, listeners: Vec::new() };
    pc.attach_listeners()?;
    log::debug!("mounted particle canvas '{}' at {}x{}", canvas_id, w, h);
    Ok(pc)
}

fn with_loop(weak: &Weak<RefCell<FrameLoop<Box<dyn Scene>, RafScheduler>>>, f: impl FnOnce(&mut FrameLoop<Box<dyn Scene>, RafScheduler>)) {
    if let Some(lp) = weak.upgrade() {
        f(&mut lp.borrow_mut());
    }
}

fn parse<T: Default + DeserializeOwned + Validate>(json: Option<String>) -> Result<T, EngineError> {
    match json {
        Some(j) => from_json(&j),
        None => Ok(T::default()),
    }
}

// Missing canvas/context means the view isn't there; that's a warning,
// not a failure
fn report(canvas_id: &str, mounted: Result<ParticleCanvas, EngineError>) -> Option<ParticleCanvas> {
    match mounted {
        Ok(pc) => Some(pc),
        Err(e @ (EngineError::MissingCanvas(_) | EngineError::MissingContext)) => {
            log::warn!("{}", e);
            None
        }
        Err(e) => {
            log::error!("failed to mount '{}': {}", canvas_id, e);
            None
        }
    }
}

fn fit_to_viewport(window: &Window, canvas: &HtmlCanvasElement) -> (f32, f32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0);
    let w = dim(window.inner_width());
    let h = dim(window.inner_height());
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
    (w as f32, h as f32)
}

fn load_visibility(window: &Window) -> Visibility {
    let stored = window
        .local_storage()
        .ok()
        .flatten()
        .and_then(|s| s.get_item(VISIBILITY_KEY).ok().flatten());
    Visibility::from_stored(stored.as_deref())
}

fn store_visibility(window: &Window, vis: Visibility) {
    let Some(storage) = window.local_storage().ok().flatten() else {
        return;
    };
    if let Err(e) = storage.set_item(VISIBILITY_KEY, vis.stored_value()) {
        log::warn!("failed to persist visibility: {:?}", e);
    }
}

fn apply_visibility(canvas: &HtmlCanvasElement, vis: Visibility) {
    if let Err(e) = canvas.style().set_property("opacity", vis.opacity()) {
        log::warn!("failed to set canvas opacity: {:?}", e);
    }
}
