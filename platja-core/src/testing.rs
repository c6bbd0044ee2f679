//! In-memory fakes for the form, surface, image and transport seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::analysis::{AnalysisClient, AnalysisError, AnalysisResult, Notifier};
use crate::controller::{FormView, SelectedFile};
use crate::payload::EncodedImage;
use crate::render::{DrawSurface, Intrinsic, LoadImage, RenderError};

const PNG_BYTES: [u8; 16] = [
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R',
];

pub fn png_base64() -> String {
    STANDARD.encode(PNG_BYTES)
}

pub fn photo(name: &str) -> SelectedFile {
    SelectedFile {
        name: name.to_string(),
        media_type: "image/jpeg".to_string(),
        size: 2048,
    }
}

#[derive(Clone, Debug)]
pub struct FakeImage {
    width: u32,
    height: u32,
    label: String,
}

impl FakeImage {
    pub fn new(width: u32, height: u32, label: &str) -> Self {
        Self { width, height, label: label.to_string() }
    }
}

impl Intrinsic for FakeImage {
    fn intrinsic_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

pub enum FakeSource {
    Ready(FakeImage),
    /// Stays pending until the gate is set.
    Gated(Rc<Cell<bool>>, FakeImage),
    Broken,
}

impl FakeSource {
    pub fn ok(width: u32, height: u32, label: &str) -> Self {
        FakeSource::Ready(FakeImage::new(width, height, label))
    }

    pub fn broken() -> Self {
        FakeSource::Broken
    }

    pub fn gated(width: u32, height: u32, label: &str) -> (Self, Rc<Cell<bool>>) {
        let gate = Rc::new(Cell::new(false));
        let source = FakeSource::Gated(Rc::clone(&gate), FakeImage::new(width, height, label));
        (source, gate)
    }
}

impl LoadImage for FakeSource {
    type Image = FakeImage;

    async fn load(self) -> Result<FakeImage, RenderError> {
        match self {
            FakeSource::Ready(image) => Ok(image),
            FakeSource::Gated(gate, image) => {
                poll_fn(|cx| {
                    if gate.get() {
                        Poll::Ready(())
                    } else {
                        cx.waker().wake_by_ref();
                        Poll::Pending
                    }
                })
                .await;
                Ok(image)
            }
            FakeSource::Broken => Err(RenderError::Load("corrupt file".into())),
        }
    }
}

struct NoopWaker;

impl Wake for NoopWaker {
    fn wake(self: Arc<Self>) {}
}

/// Drive `future` up to its first suspension point.
pub fn poll_once<F: Future>(future: Pin<&mut F>) -> Poll<F::Output> {
    let waker = Waker::from(Arc::new(NoopWaker));
    future.poll(&mut Context::from_waker(&waker))
}

#[derive(Default)]
struct SurfaceRecord {
    size: (u32, u32),
    visible: bool,
    drawn: Vec<String>,
    fail_next: bool,
}

#[derive(Default)]
pub struct FakeSurface {
    inner: RefCell<SurfaceRecord>,
}

impl FakeSurface {
    pub fn size(&self) -> (u32, u32) {
        self.inner.borrow().size
    }

    pub fn visible(&self) -> bool {
        self.inner.borrow().visible
    }

    pub fn drawn(&self) -> Vec<String> {
        self.inner.borrow().drawn.clone()
    }

    pub fn current(&self) -> Option<String> {
        self.inner.borrow().drawn.last().cloned()
    }

    pub fn fail_next_draw(&self) {
        self.inner.borrow_mut().fail_next = true;
    }
}

impl DrawSurface for FakeSurface {
    type Image = FakeImage;

    fn resize(&self, width: u32, height: u32) {
        self.inner.borrow_mut().size = (width, height);
    }

    fn draw(&self, image: &FakeImage) -> Result<(), RenderError> {
        let mut inner = self.inner.borrow_mut();
        if std::mem::take(&mut inner.fail_next) {
            return Err(RenderError::Surface("context lost".into()));
        }
        inner.drawn.push(image.label.clone());
        Ok(())
    }

    fn set_visible(&self, visible: bool) {
        self.inner.borrow_mut().visible = visible;
    }
}

/// Observable state of a [`FakeForm`].
#[derive(Clone, Debug)]
pub struct FormRecord {
    pub submit_visible: bool,
    pub submit_enabled: bool,
    pub loading: bool,
    pub enable_calls: usize,
    pub disable_calls: usize,
    pub labels: Vec<String>,
    pub label_inserts: usize,
}

impl Default for FormRecord {
    fn default() -> Self {
        Self {
            submit_visible: true,
            submit_enabled: true,
            loading: false,
            enable_calls: 0,
            disable_calls: 0,
            labels: Vec::new(),
            label_inserts: 0,
        }
    }
}

pub struct FakeForm {
    record: RefCell<FormRecord>,
    canvas: Option<FakeSurface>,
    result_size: (u32, u32),
    results_made: Cell<u32>,
}

impl FakeForm {
    /// A form with a canvas; result images decode to `result_size`.
    pub fn with_canvas(result_size: (u32, u32)) -> Self {
        Self {
            record: RefCell::new(FormRecord::default()),
            canvas: Some(FakeSurface::default()),
            result_size,
            results_made: Cell::new(0),
        }
    }

    pub fn without_canvas() -> Self {
        Self {
            canvas: None,
            ..Self::with_canvas((1, 1))
        }
    }

    pub fn record(&self) -> FormRecord {
        self.record.borrow().clone()
    }

    pub fn canvas(&self) -> &FakeSurface {
        self.canvas.as_ref().expect("form was built without a canvas")
    }
}

impl FormView for FakeForm {
    type Surface = FakeSurface;
    type Source = FakeSource;
    type Payload = String;

    fn surface(&self) -> Option<&FakeSurface> {
        self.canvas.as_ref()
    }

    fn set_submit_visible(&self, visible: bool) {
        self.record.borrow_mut().submit_visible = visible;
    }

    fn set_submit_enabled(&self, enabled: bool) {
        let mut record = self.record.borrow_mut();
        record.submit_enabled = enabled;
        if enabled {
            record.enable_calls += 1;
        } else {
            record.disable_calls += 1;
        }
    }

    fn set_loading(&self, loading: bool) {
        self.record.borrow_mut().loading = loading;
    }

    fn remove_result_label(&self) {
        self.record.borrow_mut().labels.clear();
    }

    fn insert_result_label(&self, text: &str) {
        let mut record = self.record.borrow_mut();
        record.labels.push(text.to_string());
        record.label_inserts += 1;
    }

    fn payload(&self) -> String {
        "image=<bytes>&csrfmiddlewaretoken=t0k3n".to_string()
    }

    fn result_source(&self, _image: &EncodedImage) -> Result<FakeSource, RenderError> {
        let n = self.results_made.get() + 1;
        self.results_made.set(n);
        let (w, h) = self.result_size;
        Ok(FakeSource::ok(w, h, &format!("result-{n}")))
    }
}

pub struct FakeClient {
    outcomes: RefCell<VecDeque<Result<AnalysisResult, AnalysisError>>>,
    calls: Cell<usize>,
    during_request: Option<Box<dyn Fn()>>,
}

fn result_with(count: f64) -> AnalysisResult {
    AnalysisResult {
        crowd_count: count,
        image: EncodedImage {
            bytes: PNG_BYTES.to_vec(),
            media_type: "image/png",
        },
        time_stamp: None,
    }
}

impl FakeClient {
    pub fn succeeding(count: f64) -> Self {
        Self {
            outcomes: RefCell::new(VecDeque::from([Ok(result_with(count))])),
            calls: Cell::new(0),
            during_request: None,
        }
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self {
            outcomes: RefCell::new(VecDeque::from([Err(error)])),
            calls: Cell::new(0),
            during_request: None,
        }
    }

    pub fn then_succeeding(self, count: f64) -> Self {
        self.outcomes.borrow_mut().push_back(Ok(result_with(count)));
        self
    }

    pub fn then_failing(self, error: AnalysisError) -> Self {
        self.outcomes.borrow_mut().push_back(Err(error));
        self
    }

    /// Run `hook` inside every request, before it resolves.
    pub fn with_hook(mut self, hook: impl Fn() + 'static) -> Self {
        self.during_request = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Take the next queued success without going through a request.
    pub fn next_result(&self) -> Option<AnalysisResult> {
        self.outcomes.borrow_mut().pop_front().and_then(Result::ok)
    }
}

impl AnalysisClient for FakeClient {
    type Payload = String;

    async fn analyze(&self, _payload: String) -> Result<AnalysisResult, AnalysisError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(hook) = &self.during_request {
            hook();
        }
        let next = self.outcomes.borrow_mut().pop_front();
        next.unwrap_or_else(|| Err(AnalysisError::Transport("no response queued".into())))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    successes: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}
