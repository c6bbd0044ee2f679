use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid uploader config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("result label template must contain {{count}}")]
    MissingCountPlaceholder,
    #[error("result label id {0:?} is not a valid element id")]
    InvalidLabelId(String),
}

/// DOM anchors an uploader form is built from. Selectors are evaluated
/// inside the form, except `form` itself which is matched on the document.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormSelectors {
    pub form: String,
    pub file_input: String,
    pub canvas: String,
    pub submit: String,
    /// Reserved id of the single result label a form may hold.
    pub result_label_id: String,
}

impl Default for FormSelectors {
    fn default() -> Self {
        Self {
            form: "form.image-uploader".into(),
            file_input: "[name^=image]".into(),
            canvas: ".canvas-img".into(),
            submit: "[type=submit]".into(),
            result_label_id: "crowd-count-result".into(),
        }
    }
}

/// User-facing strings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Messages {
    /// Must contain `{count}`, replaced with the rounded estimate.
    pub result_label: String,
    pub success: String,
    pub failure: String,
    pub loading: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            result_label: "Persones estimades: {count}".into(),
            success: "Imatge analitzada".into(),
            failure: "No s'ha pogut analitzar la imatge".into(),
            loading: "Analitzant...".into(),
        }
    }
}

impl Messages {
    pub fn result_label(&self, count: i64) -> String {
        self.result_label.replace("{count}", &count.to_string())
    }

    /// Error notification text, with the server's explanation when it sent one.
    pub fn failure_with(&self, detail: Option<&str>) -> String {
        match detail {
            Some(d) if !d.trim().is_empty() => format!("{}: {}", self.failure, d.trim()),
            _ => self.failure.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploaderConfig {
    pub selectors: FormSelectors,
    /// Used when a form has no `action` attribute.
    pub endpoint: String,
    pub csrf_field: String,
    pub csrf_cookie: String,
    /// How long notifications stay on screen, in milliseconds.
    pub notification_ms: u32,
    pub messages: Messages,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            selectors: FormSelectors::default(),
            endpoint: "/analitza/".into(),
            csrf_field: "csrfmiddlewaretoken".into(),
            csrf_cookie: "csrftoken".into(),
            notification_ms: 4000,
            messages: Messages::default(),
        }
    }
}

impl UploaderConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: UploaderConfig = serde_json::from_str(json)?;
        if !config.messages.result_label.contains("{count}") {
            return Err(ConfigError::MissingCountPlaceholder);
        }
        let id = &config.selectors.result_label_id;
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidLabelId(id.clone()));
        }
        Ok(config)
    }
}
