mod canvas;
mod components;
mod config;
mod map;
mod state;
mod upload;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use crate::components::toasts::Toasts;
use crate::state::ToastState;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    let _ = console_log::init_with_level(level);

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::error!("No document; uploader not started");
        return;
    };

    let config = config::load(&document);
    let toasts = ToastState::new(config.notification_ms);
    leptos::mount::mount_to_body(move || view! { <Toasts state=toasts /> });

    let forms = upload::init_forms(&document, &config, toasts);
    log::info!("Initialised {forms} image uploader form(s)");

    map::mount_from_page(&document);
}
