use platja_core::{LoadImage, RenderError};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlImageElement, Url};

use super::surface::LoadedImage;

/// An image held in a `Blob`: either the user's `File` or bytes returned by
/// the analysis endpoint.
pub struct BlobImage {
    blob: Blob,
}

impl BlobImage {
    pub fn from_blob(blob: Blob) -> Self {
        Self { blob }
    }

    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Result<Self, RenderError> {
        let array = js_sys::Uint8Array::from(bytes);
        let parts = js_sys::Array::of1(&array);
        let options = BlobPropertyBag::new();
        options.set_type(media_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| RenderError::Load(format!("could not build blob: {e:?}")))?;
        Ok(Self { blob })
    }
}

impl LoadImage for BlobImage {
    type Image = LoadedImage;

    /// Point an `<img>` at a temporary object URL and await `decode()`, which
    /// settles once the natural size is known.
    async fn load(self) -> Result<LoadedImage, RenderError> {
        let url = Url::create_object_url_with_blob(&self.blob)
            .map_err(|e| RenderError::Load(format!("{e:?}")))?;
        let image = match HtmlImageElement::new() {
            Ok(img) => img,
            Err(e) => {
                let _ = Url::revoke_object_url(&url);
                return Err(RenderError::Load(format!("{e:?}")));
            }
        };
        image.set_src(&url);

        let decoded = JsFuture::from(image.decode()).await;
        let _ = Url::revoke_object_url(&url);
        decoded.map_err(|e| RenderError::Load(format!("{e:?}")))?;
        Ok(LoadedImage(image))
    }
}
