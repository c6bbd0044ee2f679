//! Wiring between page markup and one `UploadController` per uploader form.

pub mod dom_form;
pub mod http;

use std::rc::Rc;

use platja_core::analysis::request_analysis;
use platja_core::{SelectedFile, UploadController, UploaderConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlFormElement, HtmlInputElement};

use crate::canvas::image_source::BlobImage;
use crate::state::ToastState;
use dom_form::DomForm;
use http::HttpClient;

type Controller = UploadController<DomForm>;

/// Attach a controller to every uploader form on the page. Returns how many
/// were found.
pub fn init_forms(document: &Document, config: &UploaderConfig, toasts: ToastState) -> u32 {
    let forms = match document.query_selector_all(&config.selectors.form) {
        Ok(list) => list,
        Err(e) => {
            log::error!("Invalid form selector {:?}: {e:?}", config.selectors.form);
            return 0;
        }
    };

    let mut attached = 0;
    for i in 0..forms.length() {
        let Some(form) = forms.item(i).and_then(|n| n.dyn_into::<HtmlFormElement>().ok()) else {
            continue;
        };
        attach(form, document, config, toasts);
        attached += 1;
    }
    attached
}

fn attach(form: HtmlFormElement, document: &Document, config: &UploaderConfig, toasts: ToastState) {
    let file_input = form
        .query_selector(&config.selectors.file_input)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());

    let controller: Rc<Controller> = Rc::new(UploadController::new(
        DomForm::new(form.clone(), document.clone(), config),
        config.messages.clone(),
    ));

    match file_input {
        Some(input) => {
            let ctrl = Rc::clone(&controller);
            let on_change = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
                let selection = selected_image(&ev);
                let ctrl = Rc::clone(&ctrl);
                spawn_local(async move {
                    ctrl.select_file(selection).await;
                });
            });
            if let Err(e) = input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref()) {
                log::error!("Failed to listen for file selection: {e:?}");
            }
            on_change.forget();
        }
        None => log::warn!("Upload form has no input matching {:?}", config.selectors.file_input),
    }

    // The submit event covers both the button and implicit submission.
    let ctrl = controller;
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        ev.prevent_default();
        // Disable before anything is scheduled.
        let Some(payload) = ctrl.begin_submit() else {
            return;
        };
        let ctrl = Rc::clone(&ctrl);
        spawn_local(async move {
            let outcome = request_analysis(&HttpClient, &toasts, ctrl.messages(), payload).await;
            ctrl.finish_submit(outcome).await;
        });
    });
    if let Err(e) = form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref()) {
        log::error!("Failed to listen for form submission: {e:?}");
    }
    on_submit.forget();
}

/// The first file of the input that fired `ev`, if any.
fn selected_image(ev: &Event) -> Option<(SelectedFile, BlobImage)> {
    let input = ev.target()?.dyn_into::<HtmlInputElement>().ok()?;
    let file = input.files()?.get(0)?;
    let selected = SelectedFile {
        name: file.name(),
        media_type: file.type_(),
        size: file.size() as u64,
    };
    Some((selected, BlobImage::from_blob(file.into())))
}
