//! The analysis request boundary.
//!
//! Transport is behind [`AnalysisClient`]; this module turns whatever the
//! transport produced into either a usable [`AnalysisResult`] or nothing,
//! firing exactly one notification either way.

use std::future::Future;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Messages;
use crate::payload::{decode_image, EncodedImage, PayloadError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl AnalysisError {
    /// Explanation sent by the server, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalysisError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Success body of the analysis endpoint.
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    crowd_count: f64,
    img_predict_content: String,
    #[serde(default)]
    time_stamp: Option<String>,
}

/// A decoded, ready-to-render analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub crowd_count: f64,
    pub image: EncodedImage,
    pub time_stamp: Option<String>,
}

impl AnalysisResult {
    pub fn rounded_count(&self) -> i64 {
        self.crowd_count.round() as i64
    }
}

/// Interpret a settled HTTP exchange.
pub fn parse_response(status: u16, body: &str) -> Result<AnalysisResult, AnalysisError> {
    if !(200..300).contains(&status) {
        return Err(AnalysisError::Status {
            status,
            detail: error_detail(body),
        });
    }

    let response: AnalysisResponse = serde_json::from_str(body)?;
    let image = decode_image(&response.img_predict_content)?;
    Ok(AnalysisResult {
        crowd_count: response.crowd_count,
        image,
        time_stamp: response.time_stamp,
    })
}

/// Pull a human readable message out of an `{"errors": ...}` body.
///
/// The endpoint sends either a plain string or a map of field name to a list
/// of messages. Non-field messages (`__all__`) are shown without a prefix.
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("errors")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .filter_map(|(field, messages)| {
                    let text = match messages {
                        Value::Array(items) => items
                            .iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(" "),
                        Value::String(s) => s.clone(),
                        _ => return None,
                    };
                    if text.is_empty() {
                        None
                    } else if field == "__all__" {
                        Some(text)
                    } else {
                        Some(format!("{field}: {text}"))
                    }
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

/// Sends one form submission to the analysis endpoint.
pub trait AnalysisClient {
    type Payload;

    fn analyze(&self, payload: Self::Payload) -> impl Future<Output = Result<AnalysisResult, AnalysisError>>;
}

/// Transient, self-dismissing user notifications.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Perform exactly one analysis attempt and collapse the outcome.
///
/// Never retries and never propagates an error: the caller sees a result or
/// `None`, and the user has been told which.
pub async fn request_analysis<C, N>(
    client: &C,
    notifier: &N,
    messages: &Messages,
    payload: C::Payload,
) -> Option<AnalysisResult>
where
    C: AnalysisClient,
    N: Notifier,
{
    match client.analyze(payload).await {
        Ok(result) => {
            log::info!(
                "Analysis succeeded: crowd_count={} ({} bytes {}{})",
                result.crowd_count,
                result.image.bytes.len(),
                result.image.media_type,
                result.time_stamp.as_deref().map(|t| format!(", at {t}")).unwrap_or_default(),
            );
            notifier.success(&messages.success);
            Some(result)
        }
        Err(e) => {
            log::error!("Analysis failed: {e}");
            notifier.error(&messages.failure_with(e.detail()));
            None
        }
    }
}

/// Find a cookie's value in a `document.cookie` style string.
pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
