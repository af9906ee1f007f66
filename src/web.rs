// Browser side: a 2d canvas surface, requestAnimationFrame scheduling, and the
// DOM listeners that feed the controller.

use crate::backdrop::{Backdrop, Launch};
use crate::color::Color;
use crate::params::{Config, Params};
use crate::debounce::Debounce;
use crate::surface::{FrameScheduler, Surface, Timers};
use crate::viewport::Viewport;
use rand::rngs::ThreadRng;
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use vecmath::Vector2;
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement,
    MouseEvent, Window,
};

pub type WebBackdrop = Backdrop<CanvasSurface, AnimationFrames, ThreadRng>;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, context: CanvasRenderingContext2d) -> Self {
        CanvasSurface { canvas, context }
    }

    /// `None` when the canvas has no 2d context to hand out.
    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Option<Self>, JsValue> {
        let context = match canvas.get_context("2d")? {
            Some(context) => context.dyn_into::<CanvasRenderingContext2d>()?,
            None => return Ok(None),
        };
        Ok(Some(CanvasSurface::new(canvas, context)))
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, viewport: &Viewport) -> Result<(), JsValue> {
        let (width, height) = viewport.physical_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", viewport.width))?;
        style.set_property("height", &format!("{}px", viewport.height))?;

        let dpr = viewport.device_pixel_ratio;
        self.context.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
    }

    fn clear(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.context.clear_rect(0.0, 0.0, width, height);
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: Vector2<f64>,
        radius: f64,
        color: Color,
        alpha: f64,
    ) -> Result<(), JsValue> {
        self.context.begin_path();
        self.context.set_fill_style_str(&color.to_hex());
        self.context.set_global_alpha(alpha);
        self.context.arc(center[0], center[1], radius, 0.0, TAU)?;
        self.context.fill();
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Vector2<f64>,
        to: Vector2<f64>,
        width: f64,
        color: Color,
        alpha: f64,
    ) -> Result<(), JsValue> {
        // Link opacity lives in the stroke color, not the global alpha
        self.context.set_global_alpha(1.0);
        self.context.begin_path();
        self.context.set_stroke_style_str(&color.to_rgba(alpha));
        self.context.set_line_width(width);
        self.context.move_to(from[0], from[1]);
        self.context.line_to(to[0], to[1]);
        self.context.stroke();
        Ok(())
    }
}

/// requestAnimationFrame-backed scheduler. The callback is installed after the
/// controller exists, since the callback itself needs a handle to it.
pub struct AnimationFrames {
    window: Window,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        AnimationFrames {
            window,
            callback: RefCell::new(None),
        }
    }

    pub fn install(&self, callback: Closure<dyn FnMut(f64)>) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&mut self) -> Result<i32, JsValue> {
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or("animation frame callback not installed")?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
    }

    fn cancel_frame(&mut self, handle: i32) -> Result<(), JsValue> {
        self.window.cancel_animation_frame(handle)
    }
}

/// setTimeout-backed timers that always call back into the same closure,
/// installed once the debounced action exists.
pub struct WindowTimers {
    window: Window,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl WindowTimers {
    pub fn new(window: Window) -> Self {
        WindowTimers {
            window,
            callback: RefCell::new(None),
        }
    }

    pub fn install(&self, callback: Closure<dyn FnMut()>) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl Timers for WindowTimers {
    fn set_timeout(&mut self, delay_ms: i32) -> Result<i32, JsValue> {
        let callback = self.callback.borrow();
        let callback = callback.as_ref().ok_or("timer callback not installed")?;
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms,
            )
    }

    fn clear_timeout(&mut self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}

/// Finds the backdrop canvas and starts animating it, unless the page has no
/// such canvas or the user prefers reduced motion.
pub fn mount() -> Result<Option<Rc<RefCell<WebBackdrop>>>, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let canvas = document
        .get_element_by_id(Params::CANVAS_ID)
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok());
    mount_on(canvas)
}

/// Starts the backdrop on `canvas` and wires it to the page. `None` means
/// nothing was touched and no listener was added.
pub fn mount_on(
    canvas: Option<HtmlCanvasElement>,
) -> Result<Option<Rc<RefCell<WebBackdrop>>>, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    match Launch::assess(canvas.is_some(), prefers_reduced_motion(&window)?) {
        Launch::Animate => {}
        Launch::NoSurface => {
            log::info!("no #{} canvas, backdrop disabled", Params::CANVAS_ID);
            return Ok(None);
        }
        Launch::ReducedMotion => {
            log::info!("reduced motion requested, backdrop disabled");
            return Ok(None);
        }
    }

    let surface = match canvas.map(CanvasSurface::from_canvas).transpose()?.flatten() {
        Some(surface) => surface,
        None => {
            log::info!("no 2d context on #{}, backdrop disabled", Params::CANVAS_ID);
            return Ok(None);
        }
    };

    let frames = AnimationFrames::new(window.clone());
    let backdrop = Rc::new(RefCell::new(Backdrop::new(
        surface,
        frames,
        rand::thread_rng(),
        Config::default(),
        read_viewport(&window)?,
    )?));

    {
        let backdrop_for_frame = backdrop.clone();
        let on_frame = Closure::wrap(Box::new(move |timestamp: f64| {
            if let Err(e) = backdrop_for_frame.borrow_mut().tick(timestamp) {
                log::error!("frame error: {:?}", e);
            }
        }) as Box<dyn FnMut(f64)>);
        backdrop.borrow().frames().install(on_frame);
    }

    install_listeners(&window, &document, &backdrop)?;

    backdrop.borrow_mut().start(now(&window), document.hidden())?;
    log::info!(
        "backdrop running with {} particles",
        backdrop.borrow().particles().len()
    );
    Ok(Some(backdrop))
}

fn install_listeners(
    window: &Window,
    document: &Document,
    backdrop: &Rc<RefCell<WebBackdrop>>,
) -> Result<(), JsValue> {
    {
        let backdrop = backdrop.clone();
        let on_move = Closure::wrap(Box::new(move |event: MouseEvent| {
            backdrop
                .borrow_mut()
                .pointer_moved(event.client_x() as f64, event.client_y() as f64);
        }) as Box<dyn FnMut(MouseEvent)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        window.add_event_listener_with_callback_and_add_event_listener_options(
            "mousemove",
            on_move.as_ref().unchecked_ref(),
            &options,
        )?;
        on_move.forget();
    }

    {
        // mouseout with no related target means the pointer left the window
        let backdrop = backdrop.clone();
        let on_leave = Closure::wrap(Box::new(move |event: MouseEvent| {
            if event.related_target().is_none() {
                backdrop.borrow_mut().pointer_left();
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        listen(window, "mouseout", on_leave)?;
    }

    {
        let debounce = Rc::new(RefCell::new(Debounce::new(
            WindowTimers::new(window.clone()),
            Params::RESIZE_DEBOUNCE_MS,
        )));
        let apply = {
            let backdrop = backdrop.clone();
            let debounce = debounce.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                debounce.borrow_mut().fired();
                let result = read_viewport(&window).and_then(|v| backdrop.borrow_mut().resize(v));
                if let Err(e) = result {
                    log::error!("resize error: {:?}", e);
                }
            }) as Box<dyn FnMut()>)
        };
        debounce.borrow().timers().install(apply);

        let on_resize = Closure::wrap(Box::new(move || {
            if let Err(e) = debounce.borrow_mut().trigger() {
                log::error!("resize scheduling error: {:?}", e);
            }
        }) as Box<dyn FnMut()>);
        listen(window, "resize", on_resize)?;
    }

    {
        let backdrop = backdrop.clone();
        let window = window.clone();
        let doc = document.clone();
        let on_visibility = Closure::wrap(Box::new(move || {
            if let Err(e) = backdrop.borrow_mut().set_hidden(doc.hidden(), now(&window)) {
                log::error!("visibility error: {:?}", e);
            }
        }) as Box<dyn FnMut()>);
        listen(document, "visibilitychange", on_visibility)?;
    }

    {
        let backdrop = backdrop.clone();
        let on_page_hide = Closure::wrap(Box::new(move || {
            if let Err(e) = backdrop.borrow_mut().shutdown() {
                log::error!("shutdown error: {:?}", e);
            }
        }) as Box<dyn FnMut()>);
        listen(window, "pagehide", on_page_hide)?;
    }

    Ok(())
}

// Listeners live as long as the page does
fn listen<T: ?Sized + WasmClosure>(
    target: &EventTarget,
    event: &str,
    closure: Closure<T>,
) -> Result<(), JsValue> {
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn prefers_reduced_motion(window: &Window) -> Result<bool, JsValue> {
    Ok(window
        .match_media("(prefers-reduced-motion: reduce)")?
        .map(|query| query.matches())
        .unwrap_or(false))
}

fn read_viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok(Viewport::new(width, height, window.device_pixel_ratio()))
}

fn now(window: &Window) -> f64 {
    window
        .performance()
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}
