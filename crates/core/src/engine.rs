//! The `Engine` trait for per-frame animated layers.
//!
//! The trait is object-safe so hosts can hold a layer as `Box<dyn Engine>`
//! and drive it from their animation-frame callback without knowing which
//! random source it was built with.

use serde_json::Value;

use crate::surface::Surface;

/// A layer advanced and redrawn once per animation frame.
pub trait Engine {
    /// Advance the simulation by one frame.
    ///
    /// `pointer_x` is the shared horizontal pointer offset normalized to
    /// [0, 1] of the viewport width. The engine reads it; it does not own it.
    fn step(&mut self, pointer_x: f64);

    /// Draw the current state. Does not clear the surface.
    fn render(&self, surface: &mut dyn Surface);

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// One full animation frame: clear, step, draw.
    fn frame(&mut self, pointer_x: f64, surface: &mut dyn Surface) {
        surface.clear();
        self.step(pointer_x);
        self.render(surface);
    }
}
