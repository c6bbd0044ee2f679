use platja_core::{DrawSurface, Intrinsic, RenderError};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// A fully decoded `<img>`, ready to be painted.
pub struct LoadedImage(pub(super) HtmlImageElement);

impl Intrinsic for LoadedImage {
    fn intrinsic_size(&self) -> (u32, u32) {
        (self.0.natural_width(), self.0.natural_height())
    }
}

/// The preview/result `<canvas>` of an upload form.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    fn context(&self) -> Result<CanvasRenderingContext2d, RenderError> {
        self.canvas
            .get_context("2d")
            .map_err(|e| RenderError::Surface(format!("{e:?}")))?
            .ok_or_else(|| RenderError::Surface("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Surface("context is not a CanvasRenderingContext2d".into()))
    }
}

impl DrawSurface for CanvasSurface {
    type Image = LoadedImage;

    fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn draw(&self, image: &LoadedImage) -> Result<(), RenderError> {
        self.context()?
            .draw_image_with_html_image_element(&image.0, 0.0, 0.0)
            .map_err(|e| RenderError::Surface(format!("{e:?}")))
    }

    fn set_visible(&self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        if let Err(e) = self.canvas.style().set_property("display", display) {
            log::error!("Failed to set canvas display: {e:?}");
        }
    }
}
