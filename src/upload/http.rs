use gloo_net::http::Request;
use platja_core::analysis::parse_response;
use platja_core::{AnalysisClient, AnalysisError, AnalysisResult};
use wasm_bindgen::JsValue;
use web_sys::FormData;

/// A serialized upload form and where to send it.
pub struct Submission {
    pub url: String,
    pub form_data: Result<FormData, JsValue>,
}

/// Multipart POST to the analysis endpoint. No timeout, no retry.
pub struct HttpClient;

impl AnalysisClient for HttpClient {
    type Payload = Submission;

    async fn analyze(&self, submission: Submission) -> Result<AnalysisResult, AnalysisError> {
        let form_data = submission
            .form_data
            .map_err(|e| AnalysisError::Transport(format!("form could not be serialized: {e:?}")))?;

        // The browser fills in the multipart boundary; Content-Type stays unset.
        let request = Request::post(&submission.url)
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(form_data)
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        log::debug!("POST {} -> {} ({} bytes)", submission.url, status, body.len());
        parse_response(status, &body)
    }
}
