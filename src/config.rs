use platja_core::UploaderConfig;
use web_sys::Document;

/// `<script type="application/json">` block a page may use to override the
/// uploader defaults.
pub const CONFIG_ELEMENT_ID: &str = "image-uploader-config";

pub fn load(document: &Document) -> UploaderConfig {
    let Some(json) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return UploaderConfig::default();
    };

    match UploaderConfig::from_json(&json) {
        Ok(config) => {
            log::debug!("Loaded uploader config from #{CONFIG_ELEMENT_ID}");
            config
        }
        Err(e) => {
            log::warn!("{e}; using defaults");
            UploaderConfig::default()
        }
    }
}
