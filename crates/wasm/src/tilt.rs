//! DOM host for [`TiltTracker`]: listeners in, style writes out.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use sakura_tilt_core::depth::DEPTH_SELECTOR;
use sakura_tilt_core::{
    Bounds, DepthMarker, PointerSample, TiltConfig, TiltEffect, TiltPhase, TiltTracker, TiltUpdate,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, MouseEvent};

use crate::js_err;

/// Pointer-driven 3D tilt on one element.
///
/// Descendants whose class contains `pop-out-` are lifted along Z while the
/// pointer is over the element, e.g. `pop-out-[36px]`.
#[wasm_bindgen]
pub struct Tilt {
    binding: Rc<TiltBinding>,
}

#[wasm_bindgen]
impl Tilt {
    /// Attaches to `element`.
    ///
    /// `config` is an optional JSON object with `max_tilt`, `perspective`,
    /// `easing`, `scale`, `speed` (ms) and `disable_axis` (`"x"` or `"y"`).
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, config: Option<String>) -> Result<Tilt, JsValue> {
        let config = TiltConfig::from_json_str(config.as_deref().unwrap_or("")).map_err(js_err)?;
        prepare_element(&element)?;
        let binding = Rc::new(TiltBinding {
            element,
            tracker: RefCell::new(TiltTracker::new(config)),
            frame: RefCell::new(None),
            reset: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        binding.install_listeners();
        Ok(Tilt { binding })
    }

    /// `"idle"`, `"tracking"` or `"settling"`.
    pub fn phase(&self) -> String {
        match self.binding.tracker.borrow().phase() {
            TiltPhase::Idle => "idle",
            TiltPhase::Tracking => "tracking",
            TiltPhase::Settling => "settling",
        }
        .to_owned()
    }

    /// Removes listeners and drops any pending frame or reset timer.
    ///
    /// The element keeps whatever transform it had last.
    pub fn destroy(&self) {
        self.binding.teardown();
    }
}

impl Drop for Tilt {
    fn drop(&mut self) {
        self.binding.teardown();
    }
}

fn prepare_element(element: &HtmlElement) -> Result<(), JsValue> {
    let style = element.style();
    style.set_property("will-change", "transform")?;
    style.set_property("transform-style", "preserve-3d")?;
    style.set_property("position", "relative")?;
    Ok(())
}

struct TiltBinding {
    element: HtmlElement,
    tracker: RefCell<TiltTracker>,
    frame: RefCell<Option<AnimationFrame>>,
    reset: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl TiltBinding {
    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = self.listeners.borrow_mut();

        let binding = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.element, "mouseenter", move |_| {
            with_binding(&binding, |b| {
                let effects = b.tracker.borrow_mut().pointer_enter();
                b.run(effects);
            });
        }));

        let binding = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.element, "mousemove", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let (client_x, client_y) = (f64::from(event.client_x()), f64::from(event.client_y()));
            with_binding(&binding, |b| {
                let sample = PointerSample::relative_to(client_x, client_y, b.bounds());
                let effects = b.tracker.borrow_mut().pointer_move(sample);
                b.run(effects);
            });
        }));

        let binding = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.element, "mouseleave", move |_| {
            with_binding(&binding, |b| {
                let effects = b.tracker.borrow_mut().pointer_leave();
                b.run(effects);
            });
        }));
    }

    /// Client rect of the element, or `None` once it has left the document.
    fn bounds(&self) -> Option<Bounds> {
        if !self.element.is_connected() {
            return None;
        }
        let rect = self.element.get_bounding_client_rect();
        Some(Bounds {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        })
    }

    /// Performs tracker effects. The tracker must not be borrowed.
    fn run(self: &Rc<Self>, effects: Vec<TiltEffect>) {
        for effect in effects {
            match effect {
                TiltEffect::SetTransition(transition) => {
                    set_style(&self.element, "transition", &transition);
                }
                TiltEffect::RequestFrame => self.request_frame(),
                TiltEffect::ScheduleReset { after_ms } => self.schedule_reset(after_ms),
                TiltEffect::CancelReset => {
                    self.reset.borrow_mut().take();
                }
                TiltEffect::Apply(update) => self.apply(&update),
            }
        }
    }

    fn request_frame(self: &Rc<Self>) {
        let binding = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            with_binding(&binding, |b| {
                b.frame.borrow_mut().take();
                let effects = b.tracker.borrow_mut().frame();
                b.run(effects);
            });
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn schedule_reset(self: &Rc<Self>, after_ms: u32) {
        let binding = Rc::downgrade(self);
        let timer = Timeout::new(after_ms, move || {
            with_binding(&binding, |b| {
                b.reset.borrow_mut().take();
                let effects = b.tracker.borrow_mut().reset_elapsed();
                b.run(effects);
            });
        });
        *self.reset.borrow_mut() = Some(timer);
    }

    fn apply(&self, update: &TiltUpdate) {
        set_style(&self.element, "transform", &update.element_css());

        let nodes = match self.element.query_selector_all(DEPTH_SELECTOR) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("pop-out lookup failed: {e:?}");
                return;
            }
        };
        for i in 0..nodes.length() {
            let Some(child) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let Some(marker) = DepthMarker::from_class_name(&child.class_name()) else {
                continue;
            };
            if let Some(transition) = update.depth_transition() {
                set_style(&child, "transition", transition);
            }
            set_style(&child, "transform", &update.depth_css(&marker));
        }
    }

    fn teardown(&self) {
        self.listeners.borrow_mut().clear();
        self.frame.borrow_mut().take();
        self.reset.borrow_mut().take();
    }
}

fn set_style(target: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = target.style().set_property(property, value) {
        log::warn!("failed to set {property}: {e:?}");
    }
}

fn with_binding(binding: &Weak<TiltBinding>, f: impl FnOnce(&Rc<TiltBinding>)) {
    if let Some(binding) = binding.upgrade() {
        f(&binding);
    }
}
