use leptos::prelude::*;
use platja_core::Notifier;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Page-wide notification stack shared by every upload form.
#[derive(Clone, Copy)]
pub struct ToastState {
    pub toasts: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
    lifetime_ms: i32,
}

impl ToastState {
    pub fn new(lifetime_ms: u32) -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(0),
            lifetime_ms: lifetime_ms.min(i32::MAX as u32) as i32,
        }
    }

    /// Show a toast and schedule its removal. Never blocks the caller.
    pub fn push(&self, kind: ToastKind, message: &str) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id.wrapping_add(1));
        self.toasts.update(|t| {
            t.push(Toast {
                id,
                kind,
                message: message.to_string(),
            })
        });

        let Some(win) = web_sys::window() else { return };
        let state = *self;
        let cb = Closure::once_into_js(move || state.dismiss(id));
        if let Err(e) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.unchecked_ref(),
            self.lifetime_ms,
        ) {
            log::error!("Failed to schedule toast dismissal: {e:?}");
        }
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.retain(|toast| toast.id != id));
    }
}

impl Notifier for ToastState {
    fn success(&self, message: &str) {
        self.push(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(ToastKind::Error, message);
    }
}
