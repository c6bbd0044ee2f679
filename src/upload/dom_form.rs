use std::cell::RefCell;

use platja_core::analysis::cookie_value;
use platja_core::payload::EncodedImage;
use platja_core::{FormView, RenderError, UploaderConfig};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, FormData, HtmlCanvasElement, HtmlDocument, HtmlElement, HtmlFormElement};

use super::http::Submission;
use crate::canvas::image_source::BlobImage;
use crate::canvas::surface::CanvasSurface;

/// One `form.image-uploader` element and the anchors found inside it.
pub struct DomForm {
    form: HtmlFormElement,
    document: Document,
    submit: Option<HtmlElement>,
    canvas: Option<CanvasSurface>,
    label_id: String,
    loading_text: String,
    endpoint: String,
    csrf_field: String,
    csrf_cookie: String,
    /// Children hidden behind the loader, with their previous inline display.
    hidden: RefCell<Vec<(HtmlElement, String)>>,
    loader: RefCell<Option<Element>>,
}

impl DomForm {
    pub fn new(form: HtmlFormElement, document: Document, config: &UploaderConfig) -> Self {
        let selectors = &config.selectors;
        let submit = query(&form, &selectors.submit).and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if submit.is_none() {
            log::warn!("Upload form has no element matching {:?}", selectors.submit);
        }
        let canvas = query(&form, &selectors.canvas)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .map(CanvasSurface::new);

        let endpoint = form
            .get_attribute("action")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| config.endpoint.clone());

        Self {
            form,
            document,
            submit,
            canvas,
            label_id: selectors.result_label_id.clone(),
            loading_text: config.messages.loading.clone(),
            endpoint,
            csrf_field: config.csrf_field.clone(),
            csrf_cookie: config.csrf_cookie.clone(),
            hidden: RefCell::new(Vec::new()),
            loader: RefCell::new(None),
        }
    }

    fn show_loader(&self) {
        let mut hidden = self.hidden.borrow_mut();
        let children = self.form.children();
        for i in 0..children.length() {
            let Some(child) = children.item(i).and_then(|el| el.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let style = child.style();
            let previous = style.get_property_value("display").unwrap_or_default();
            if previous == "none" {
                continue;
            }
            let _ = style.set_property("display", "none");
            hidden.push((child, previous));
        }

        match self.document.create_element("div") {
            Ok(loader) => {
                loader.set_class_name("upload-loader");
                let _ = loader.set_attribute("role", "status");
                loader.set_text_content(Some(&self.loading_text));
                if let Err(e) = self.form.append_child(&loader) {
                    log::error!("Failed to insert loader: {e:?}");
                }
                *self.loader.borrow_mut() = Some(loader);
            }
            Err(e) => log::error!("Failed to create loader: {e:?}"),
        }
    }

    fn hide_loader(&self) {
        if let Some(loader) = self.loader.borrow_mut().take() {
            loader.remove();
        }
        for (child, previous) in self.hidden.borrow_mut().drain(..) {
            set_display(&child, &previous);
        }
    }

    /// The anti-forgery token from the cookie, for forms rendered without one.
    fn csrf_from_cookie(&self) -> Option<String> {
        let cookies = self.document.dyn_ref::<HtmlDocument>()?.cookie().ok()?;
        cookie_value(&cookies, &self.csrf_cookie).map(str::to_string)
    }
}

/// Set an inline `display`, or clear it when `display` is empty.
fn set_display(el: &HtmlElement, display: &str) {
    let style = el.style();
    let _ = if display.is_empty() {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", display)
    };
}

fn query(form: &HtmlFormElement, selector: &str) -> Option<Element> {
    match form.query_selector(selector) {
        Ok(found) => found,
        Err(e) => {
            log::error!("Invalid selector {selector:?}: {e:?}");
            None
        }
    }
}

impl FormView for DomForm {
    type Surface = CanvasSurface;
    type Source = BlobImage;
    type Payload = Submission;

    fn surface(&self) -> Option<&CanvasSurface> {
        self.canvas.as_ref()
    }

    fn set_submit_visible(&self, visible: bool) {
        let Some(submit) = &self.submit else { return };
        let display = if visible { "" } else { "none" };
        // Behind the loader: record it for when the form is restored.
        if let Some(entry) = self.hidden.borrow_mut().iter_mut().find(|(el, _)| el == submit) {
            entry.1 = display.to_string();
            return;
        }
        set_display(submit, display);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        let Some(submit) = &self.submit else { return };
        if let Err(e) = submit.toggle_attribute_with_force("disabled", !enabled) {
            log::error!("Failed to toggle submit control: {e:?}");
        }
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            self.show_loader();
        } else {
            self.hide_loader();
        }
    }

    fn remove_result_label(&self) {
        // Compared by value so the id never has to be escaped into a selector.
        let with_id = match self.form.query_selector_all("[id]") {
            Ok(list) => list,
            Err(e) => {
                log::error!("Failed to look up result label: {e:?}");
                return;
            }
        };
        for i in 0..with_id.length() {
            let Some(el) = with_id.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if el.id() == self.label_id {
                el.remove();
            }
        }
    }

    fn insert_result_label(&self, text: &str) {
        let label = match self.document.create_element("p") {
            Ok(el) => el,
            Err(e) => {
                log::error!("Failed to create result label: {e:?}");
                return;
            }
        };
        label.set_id(&self.label_id);
        label.set_class_name("crowd-count");
        label.set_text_content(Some(text));

        let inserted = match &self.submit {
            Some(submit) => submit.after_with_node_1(&label),
            None => self.form.append_child(&label).map(|_| ()),
        };
        if let Err(e) = inserted {
            log::error!("Failed to insert result label: {e:?}");
        }
    }

    fn payload(&self) -> Submission {
        let form_data = FormData::new_with_form(&self.form);
        if let Ok(data) = &form_data {
            if !data.has(&self.csrf_field) {
                match self.csrf_from_cookie() {
                    Some(token) => {
                        let _ = data.append_with_str(&self.csrf_field, &token);
                    }
                    None => log::warn!("No {} field or cookie; sending without it", self.csrf_field),
                }
            }
        }
        Submission {
            url: self.endpoint.clone(),
            form_data,
        }
    }

    fn result_source(&self, image: &EncodedImage) -> Result<BlobImage, RenderError> {
        BlobImage::from_bytes(&image.bytes, image.media_type)
    }
}
