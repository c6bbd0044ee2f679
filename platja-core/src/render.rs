//! Load-then-draw contract shared by the local preview and the analysed result.
//!
//! The browser crate supplies the concrete surface (an `HtmlCanvasElement`)
//! and image source (an `HtmlImageElement` fed from a blob URL). Everything
//! here only sees the traits, so the ordering can be exercised natively.

use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image failed to load: {0}")]
    Load(String),
    #[error("image has no intrinsic size ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("drawing surface unavailable: {0}")]
    Surface(String),
}

/// Anything with a natural pixel size once it has finished loading.
pub trait Intrinsic {
    fn intrinsic_size(&self) -> (u32, u32);
}

/// An image source that becomes drawable after a single awaitable load.
pub trait LoadImage {
    type Image;

    fn load(self) -> impl Future<Output = Result<Self::Image, RenderError>>;
}

/// A 2D drawing surface that can be resized, painted at its origin, and
/// shown or hidden.
pub trait DrawSurface {
    type Image: Intrinsic;

    fn resize(&self, width: u32, height: u32);
    fn draw(&self, image: &Self::Image) -> Result<(), RenderError>;
    fn set_visible(&self, visible: bool);
}

/// Wait for `source` to load, size `surface` to the image, draw it and show
/// the surface.
///
/// The surface is resized before any pixels are copied, so the draw is never
/// clipped. Calling this again with another image simply replaces the
/// previous contents. A failed load leaves the surface untouched; a failed
/// draw hides it, since resizing a canvas discards what it held.
pub async fn render<S, L>(surface: &S, source: L) -> Result<(), RenderError>
where
    S: DrawSurface,
    L: LoadImage<Image = S::Image>,
{
    let image = load(source).await?;
    paint(surface, &image)
}

/// Load `source` and reject images without a usable size.
pub async fn load<L>(source: L) -> Result<L::Image, RenderError>
where
    L: LoadImage,
    L::Image: Intrinsic,
{
    let image = source.load().await?;
    let (width, height) = image.intrinsic_size();
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }
    Ok(image)
}

/// Second half of [`render`], for callers that check something between the
/// load and the draw.
pub fn paint<S: DrawSurface>(surface: &S, image: &S::Image) -> Result<(), RenderError> {
    let (width, height) = image.intrinsic_size();
    surface.resize(width, height);
    if let Err(e) = surface.draw(image) {
        surface.set_visible(false);
        return Err(e);
    }
    surface.set_visible(true);
    Ok(())
}
