//! [`Surface`] implementation over a 2D canvas context.

use sakura_tilt_core::{Surface, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::js_err;

/// A full-viewport canvas plus the petal image drawn onto it.
pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sprite: Option<HtmlImageElement>,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| js_err("2d canvas context is unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            sprite: None,
        })
    }

    /// Resizes the backing store to the viewport.
    pub(crate) fn fit_to(&self, viewport: Viewport) {
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
    }

    pub(crate) fn set_sprite(&mut self, image: HtmlImageElement) {
        self.sprite = Some(image);
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn draw_sprite(&mut self, x: f64, y: f64, width: f64, height: f64, alpha: f64) {
        let Some(image) = &self.sprite else {
            return;
        };
        self.ctx.set_global_alpha(alpha);
        // fails only for a broken image, which never fired `load`
        if let Err(e) = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height)
        {
            log::trace!("drawImage failed: {e:?}");
        }
    }
}
