/// Lifecycle of one upload form.
///
/// Every visible control flag is derived from this value through
/// [`Presentation::for_state`]; nothing toggles a control on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    PreviewReady,
    Submitting,
    ResultShown,
    Error,
}

impl UiState {
    /// State after the file input changes. `valid` means a file was chosen
    /// and the form has a canvas to preview it on.
    ///
    /// An in-flight submission is never superseded: the pending response
    /// decides what comes next.
    pub fn on_selection(self, valid: bool) -> UiState {
        match (self, valid) {
            (UiState::Submitting, _) => UiState::Submitting,
            (_, true) => UiState::PreviewReady,
            (_, false) => UiState::Idle,
        }
    }

    /// State after a submit click, or `None` when the click must be ignored.
    pub fn on_submit(self) -> Option<UiState> {
        Presentation::for_state(self)
            .accepts_submit()
            .then_some(UiState::Submitting)
    }

    /// State after the request settles. Only meaningful while submitting.
    pub fn on_settled(self, succeeded: bool) -> Option<UiState> {
        match self {
            UiState::Submitting if succeeded => Some(UiState::ResultShown),
            UiState::Submitting => Some(UiState::Error),
            _ => None,
        }
    }

    pub fn is_submitting(self) -> bool {
        self == UiState::Submitting
    }
}

/// Control flags for a form, as a pure function of [`UiState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Presentation {
    pub submit_visible: bool,
    pub submit_enabled: bool,
    pub loading: bool,
}

impl Presentation {
    pub fn for_state(state: UiState) -> Self {
        match state {
            UiState::Idle => Presentation {
                submit_visible: false,
                submit_enabled: true,
                loading: false,
            },
            UiState::PreviewReady | UiState::ResultShown | UiState::Error => Presentation {
                submit_visible: true,
                submit_enabled: true,
                loading: false,
            },
            UiState::Submitting => Presentation {
                submit_visible: true,
                submit_enabled: false,
                loading: true,
            },
        }
    }

    pub fn accepts_submit(self) -> bool {
        self.submit_visible && self.submit_enabled
    }
}
