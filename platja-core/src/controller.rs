//! Per-form upload lifecycle: select, preview, submit, show result.

use std::cell::{Cell, RefCell};

use crate::analysis::{request_analysis, AnalysisClient, AnalysisResult, Notifier};
use crate::config::Messages;
use crate::payload::EncodedImage;
use crate::render::{self, render, DrawSurface, LoadImage, RenderError};
use crate::state::{Presentation, UiState};

/// The image currently chosen in a form's file input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
}

/// The DOM side of one upload form.
pub trait FormView {
    type Surface: DrawSurface;
    type Source: LoadImage<Image = <Self::Surface as DrawSurface>::Image>;
    type Payload;

    /// The canvas anchor, if the form has one.
    fn surface(&self) -> Option<&Self::Surface>;

    fn set_submit_visible(&self, visible: bool);
    fn set_submit_enabled(&self, enabled: bool);
    /// Swap the form's content for a loading indicator, or restore it.
    fn set_loading(&self, loading: bool);

    fn remove_result_label(&self);
    /// Insert the result label right after the submit control.
    fn insert_result_label(&self, text: &str);

    /// Snapshot of the form's fields for submission.
    fn payload(&self) -> Self::Payload;
    fn result_source(&self, image: &EncodedImage) -> Result<Self::Source, RenderError>;
}

pub struct UploadController<V: FormView> {
    view: V,
    messages: Messages,
    state: Cell<UiState>,
    shown: Cell<Presentation>,
    selected: RefCell<Option<SelectedFile>>,
    /// The input was emptied; keeps the submit control hidden whatever the state.
    cleared: Cell<bool>,
    /// Bumped on every change of the file input. A preview only draws if no
    /// newer change happened while it loaded.
    selection: Cell<u64>,
}

impl<V: FormView> UploadController<V> {
    /// Markup starts enabled and not loading; only visibility is forced.
    pub fn new(view: V, messages: Messages) -> Self {
        let shown = Presentation::for_state(UiState::Idle);
        view.set_submit_visible(shown.submit_visible);
        if let Some(surface) = view.surface() {
            surface.set_visible(false);
        }

        Self {
            view,
            messages,
            state: Cell::new(UiState::Idle),
            shown: Cell::new(shown),
            selected: RefCell::new(None),
            cleared: Cell::new(false),
            selection: Cell::new(0),
        }
    }

    pub fn state(&self) -> UiState {
        self.state.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.selected.borrow().clone()
    }

    /// Handle a change of the file input.
    ///
    /// With a file and a canvas: show the submit control, drop any old result
    /// label and draw a local preview. Otherwise hide the submit control and
    /// draw nothing. A selection made while a request is in flight redraws the
    /// preview and updates the control's visibility, but the request and the
    /// disabled guard are left alone. Of several overlapping selections only
    /// the last one ever reaches the canvas.
    pub async fn select_file(&self, selection: Option<(SelectedFile, V::Source)>) {
        let generation = self.selection.get() + 1;
        self.selection.set(generation);

        let Some(surface) = self.view.surface() else {
            if selection.is_some() {
                log::warn!("Upload form has no canvas; ignoring selected file");
            }
            self.clear_selection();
            return;
        };
        let Some((file, source)) = selection else {
            self.clear_selection();
            return;
        };

        log::info!("Selected {} ({}, {} bytes)", file.name, file.media_type, file.size);
        let name = file.name.clone();
        *self.selected.borrow_mut() = Some(file);
        self.cleared.set(false);
        self.transition(self.state.get().on_selection(true));
        self.view.remove_result_label();

        let image = match render::load(source).await {
            Ok(image) => image,
            Err(e) => {
                log::error!("Preview rendering failed: {e}");
                return;
            }
        };
        if self.selection.get() != generation {
            log::debug!("Preview of {name} superseded by a newer selection");
            return;
        }
        if let Err(e) = render::paint(surface, &image) {
            log::error!("Preview rendering failed: {e}");
        }
    }

    /// Start a submission. Disables the submit control before returning and
    /// yields the payload to send, or `None` if the control is not usable
    /// (hidden, or a request is already in flight).
    pub fn begin_submit(&self) -> Option<V::Payload> {
        let state = self.state.get();
        let next = match state.on_submit() {
            Some(next) if self.shown.get().accepts_submit() => next,
            _ => {
                log::debug!("Ignoring submit in state {state:?}");
                return None;
            }
        };
        self.transition(next);

        if let Some(file) = self.selected.borrow().as_ref() {
            log::info!("Submitting {}", file.name);
        }
        Some(self.view.payload())
    }

    /// Settle the in-flight submission: restore the form, re-enable the
    /// submit control and, on success, show the result.
    pub async fn finish_submit(&self, outcome: Option<AnalysisResult>) {
        let Some(next) = self.state.get().on_settled(outcome.is_some()) else {
            log::warn!("Submission settled with no request in flight; ignoring");
            return;
        };
        self.transition(next);

        if let Some(result) = outcome {
            self.show_result(result).await;
        }
    }

    /// One full submit cycle: exactly one request, no retry.
    pub async fn submit<C, N>(&self, client: &C, notifier: &N)
    where
        C: AnalysisClient<Payload = V::Payload>,
        N: Notifier,
    {
        let Some(payload) = self.begin_submit() else {
            return;
        };
        let outcome = request_analysis(client, notifier, &self.messages, payload).await;
        self.finish_submit(outcome).await;
    }

    async fn show_result(&self, result: AnalysisResult) {
        self.view.remove_result_label();
        self.view
            .insert_result_label(&self.messages.result_label(result.rounded_count()));

        let Some(surface) = self.view.surface() else {
            log::warn!("Upload form has no canvas; result image not drawn");
            return;
        };
        let source = match self.view.result_source(&result.image) {
            Ok(source) => source,
            Err(e) => {
                log::error!("Could not prepare result image: {e}");
                return;
            }
        };
        if let Err(e) = render(surface, source).await {
            log::error!("Result rendering failed: {e}");
        }
    }

    fn clear_selection(&self) {
        *self.selected.borrow_mut() = None;
        self.cleared.set(true);
        self.transition(self.state.get().on_selection(false));
    }

    /// Move to `next` and push only the control flags that changed. Disabling
    /// happens before the loader appears; re-enabling after it is gone.
    fn transition(&self, next: UiState) {
        let prev = self.state.replace(next);
        if prev != next {
            log::debug!("Upload form {prev:?} -> {next:?}");
        }

        let mut want = Presentation::for_state(next);
        want.submit_visible &= !self.cleared.get();
        let have = self.shown.replace(want);
        if have.submit_enabled && !want.submit_enabled {
            self.view.set_submit_enabled(false);
        }
        if have.loading != want.loading {
            self.view.set_loading(want.loading);
        }
        if have.submit_visible != want.submit_visible {
            self.view.set_submit_visible(want.submit_visible);
        }
        if !have.submit_enabled && want.submit_enabled {
            self.view.set_submit_enabled(true);
        }
    }
}
