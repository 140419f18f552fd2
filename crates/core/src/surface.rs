//! Drawing surface abstraction for the petal layer.
//!
//! The simulation never touches a browser canvas directly. It draws through
//! the [`Surface`] trait: the wasm crate implements it on top of a 2D canvas
//! context, and [`RecordingSurface`] captures draw calls headlessly.

use serde::{Deserialize, Serialize};

/// Size of the full-viewport drawing area in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Negative or non-finite dimensions are stored as 0.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Natural size of the loaded petal image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub width: f64,
    pub height: f64,
}

impl Sprite {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// A 2D raster target the petal sprite can be drawn onto.
pub trait Surface {
    /// Clears the whole surface.
    fn clear(&mut self);

    /// Draws the petal sprite scaled to `width` x `height` at (`x`, `y`)
    /// with the given global alpha.
    fn draw_sprite(&mut self, x: f64, y: f64, width: f64, height: f64, alpha: f64);
}

/// One captured operation on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Sprite {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: f64,
    },
}

/// Headless surface that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Sprite draws only, skipping clears.
    pub fn sprites(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Sprite { .. }))
    }

    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn draw_sprite(&mut self, x: f64, y: f64, width: f64, height: f64, alpha: f64) {
        self.calls.push(DrawCall::Sprite {
            x,
            y,
            width,
            height,
            alpha,
        });
    }
}
