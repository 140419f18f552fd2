//! Canvas-backed falling-petal layer.
//!
//! Lifecycle: the sprite loads asynchronously; only once it has loaded is the
//! petal field populated and the self-rescheduling animation frame started.
//! Window listeners update a shared pointer offset that each frame reads.
//! Everything is released on `destroy()` or when the JS handle is freed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use sakura_tilt_core::config::clamp_petal_count;
use sakura_tilt_core::{
    Direction, Engine, PetalConfig, PetalSimulation, Sprite, Viewport, Xorshift64,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent, Window};

use crate::canvas::CanvasSurface;
use crate::{js_err, window};

/// Falling petals drawn onto a full-viewport canvas.
///
/// ```js
/// const petals = new FallingPetals(canvas, JSON.stringify({ speed: 0.5, count: 25 }));
/// petals.set_speed(0.01);
/// petals.destroy();
/// ```
#[wasm_bindgen]
pub struct FallingPetals {
    layer: Rc<PetalLayer>,
}

#[wasm_bindgen]
impl FallingPetals {
    /// Binds to `canvas` and starts loading the petal image.
    ///
    /// `config` is an optional JSON object with `speed`, `count`,
    /// `image_url` and `direction`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> Result<FallingPetals, JsValue> {
        let config = PetalConfig::from_json_str(config.as_deref().unwrap_or("")).map_err(js_err)?;
        let window = window()?;
        let layer = Rc::new(PetalLayer {
            surface: RefCell::new(CanvasSurface::new(canvas)?),
            simulation: RefCell::new(None),
            config: RefCell::new(config),
            pointer_x: Rc::new(Cell::new(0.0)),
            frame: RefCell::new(None),
            image_listeners: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            running: Cell::new(false),
            destroyed: Cell::new(false),
            window,
        });
        layer.fit_viewport();
        layer.install_listeners();
        layer.load_image()?;
        Ok(FallingPetals { layer })
    }

    /// Changes the speed of every petal without recreating them.
    ///
    /// Non-finite values (including `undefined` from JS) are ignored.
    pub fn set_speed(&self, speed: f64) {
        if !speed.is_finite() {
            log::warn!("ignoring non-finite petal speed {speed}");
            return;
        }
        self.layer.config.borrow_mut().speed = speed;
        if let Some(sim) = self.layer.simulation.borrow_mut().as_mut() {
            sim.set_speed(speed);
        }
    }

    /// Changes the travel direction; unknown names mean "down".
    pub fn set_direction(&self, direction: &str) {
        let direction = Direction::from_name_or_down(direction);
        self.layer.config.borrow_mut().direction = direction;
        if let Some(sim) = self.layer.simulation.borrow_mut().as_mut() {
            sim.set_direction(direction);
        }
    }

    /// Rebuilds the field with `count` petals, capped at 1000.
    pub fn set_count(&self, count: u32) {
        let count = clamp_petal_count(u64::from(count));
        self.layer.config.borrow_mut().count = count;
        if let Some(sim) = self.layer.simulation.borrow_mut().as_mut() {
            sim.repopulate(count);
        }
    }

    /// Loads a new petal image; the field is rebuilt once it arrives.
    pub fn set_image_url(&self, url: String) -> Result<(), JsValue> {
        self.layer.config.borrow_mut().image_url = url;
        self.layer.load_image()
    }

    /// Current simulation params as JSON, or the pending config before load.
    pub fn params(&self) -> String {
        match self.layer.simulation.borrow().as_ref() {
            Some(sim) => sim.params().to_string(),
            None => serde_json::to_string(&*self.layer.config.borrow())
                .unwrap_or_else(|_| "{}".to_string()),
        }
    }

    /// Parameter schema as JSON; `None` until the image has loaded.
    pub fn param_schema(&self) -> Option<String> {
        self.layer
            .simulation
            .borrow()
            .as_ref()
            .map(|sim| sim.param_schema().to_string())
    }

    /// Number of live petals; 0 until the image has loaded.
    pub fn petal_count(&self) -> usize {
        self.layer
            .simulation
            .borrow()
            .as_ref()
            .map_or(0, PetalSimulation::len)
    }

    pub fn is_running(&self) -> bool {
        self.layer.running.get()
    }

    /// Stops the animation and removes every listener. A destroyed layer
    /// never restarts, even if a new image is requested.
    pub fn destroy(&self) {
        self.layer.teardown();
    }
}

impl Drop for FallingPetals {
    fn drop(&mut self) {
        self.layer.teardown();
    }
}

struct PetalLayer {
    window: Window,
    surface: RefCell<CanvasSurface>,
    simulation: RefCell<Option<PetalSimulation>>,
    config: RefCell<PetalConfig>,
    /// Horizontal pointer position in [0, 1] of the viewport width.
    pointer_x: Rc<Cell<f64>>,
    frame: RefCell<Option<AnimationFrame>>,
    image_listeners: RefCell<Vec<EventListener>>,
    listeners: RefCell<Vec<EventListener>>,
    running: Cell<bool>,
    destroyed: Cell<bool>,
}

impl PetalLayer {
    fn viewport(&self) -> Viewport {
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn fit_viewport(&self) {
        let viewport = self.viewport();
        self.surface.borrow().fit_to(viewport);
        if let Some(sim) = self.simulation.borrow_mut().as_mut() {
            sim.resize(viewport);
        }
    }

    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = self.listeners.borrow_mut();

        let pointer = Rc::clone(&self.pointer_x);
        let win = self.window.clone();
        listeners.push(EventListener::new(&self.window, "mousemove", move |event: &Event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                pointer.set(normalize_x(f64::from(event.client_x()), &win));
            }
        }));

        let pointer = Rc::clone(&self.pointer_x);
        let win = self.window.clone();
        listeners.push(EventListener::new(&self.window, "touchmove", move |event: &Event| {
            let touch = event
                .dyn_ref::<TouchEvent>()
                .and_then(|event| event.touches().get(0));
            if let Some(touch) = touch {
                pointer.set(normalize_x(f64::from(touch.client_x()), &win));
            }
        }));

        let layer = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.window, "resize", move |_| {
            if let Some(layer) = layer.upgrade() {
                layer.fit_viewport();
            }
        }));
    }

    /// Starts fetching the configured image. A previous pending load is dropped.
    fn load_image(self: &Rc<Self>) -> Result<(), JsValue> {
        if self.destroyed.get() {
            log::debug!("petal layer destroyed, not loading image");
            return Ok(());
        }
        let image = HtmlImageElement::new()?;
        let url = self.config.borrow().image_url.clone();

        let layer = Rc::downgrade(self);
        let loaded = image.clone();
        let on_load = EventListener::once(&image, "load", move |_| {
            if let Some(layer) = layer.upgrade() {
                layer.on_image_loaded(loaded);
            }
        });
        let failed_url = url.clone();
        let on_error = EventListener::once(&image, "error", move |_| {
            log::warn!("petal image failed to load: {failed_url}");
        });
        *self.image_listeners.borrow_mut() = vec![on_load, on_error];

        image.set_src(&url);
        Ok(())
    }

    fn on_image_loaded(self: &Rc<Self>, image: HtmlImageElement) {
        self.image_listeners.borrow_mut().clear();
        let sprite = Sprite::new(
            f64::from(image.natural_width()),
            f64::from(image.natural_height()),
        );
        self.surface.borrow_mut().set_sprite(image);

        let mut simulation = self.simulation.borrow_mut();
        match simulation.as_mut() {
            Some(sim) => sim.set_sprite(sprite),
            None => {
                let config = self.config.borrow();
                let rng = Xorshift64::from_timestamp(js_sys::Date::now());
                *simulation = Some(PetalSimulation::new(&config, self.viewport(), sprite, rng));
                log::info!("petal layer started with {} petals", config.count);
            }
        }
        drop(simulation);
        self.start();
    }

    fn start(self: &Rc<Self>) {
        if self.destroyed.get() || self.running.replace(true) {
            return;
        }
        self.schedule_frame();
    }

    fn schedule_frame(self: &Rc<Self>) {
        let layer: Weak<Self> = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            if let Some(layer) = layer.upgrade() {
                layer.tick();
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    /// One animation frame: clear, step and draw every petal, then re-arm.
    fn tick(self: &Rc<Self>) {
        self.frame.borrow_mut().take();
        if !self.running.get() {
            return;
        }
        if let Some(sim) = self.simulation.borrow_mut().as_mut() {
            sim.frame(self.pointer_x.get(), &mut *self.surface.borrow_mut());
        }
        self.schedule_frame();
    }

    fn teardown(&self) {
        self.destroyed.set(true);
        if self.running.replace(false) {
            log::debug!("petal layer stopped");
        }
        self.frame.borrow_mut().take();
        self.listeners.borrow_mut().clear();
        self.image_listeners.borrow_mut().clear();
    }
}

fn normalize_x(client_x: f64, window: &Window) -> f64 {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    if width > 0.0 {
        client_x / width
    } else {
        0.0
    }
}
