#![deny(unsafe_code)]
//! WASM bindings for sakura-tilt.
//!
//! Exposes two independent components to JavaScript:
//! - [`FallingPetals`] -- a full-viewport canvas of drifting petals.
//! - [`Tilt`] -- pointer-driven 3D tilt on an element and its pop-out children.
//!
//! Both take an optional JSON config string and release their listeners and
//! animation frames on `destroy()` or when freed from JS.

mod canvas;
mod petals;
mod tilt;

use std::fmt::Display;

use wasm_bindgen::prelude::*;

pub use petals::FallingPetals;
pub use tilt::Tilt;

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // a second init (e.g. in tests) keeps the first logger
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sakura-tilt {} ready", env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| js_err("no global window"))
}

pub(crate) fn js_err(message: impl Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}
