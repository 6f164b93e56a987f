use crate::calc::bindings::VariableBindings;
use crate::calc::wire::{CalculateRequest, CalculateResponse, ResultEntry};
use crate::error::{CanvasError, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

const MAX_ERROR_BODY: usize = 200;

/// Remote expression recognizer/evaluator.
///
/// `submit` blocks; the controller always calls it from a worker thread.
pub trait RecognitionService: Send + Sync {
    fn submit(&self, image: &str, bindings: &VariableBindings) -> Result<Vec<ResultEntry>>;
}

pub struct RecognitionClient {
    client: Client,
    endpoint: String,
}

impl RecognitionClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("math-canvas recognition client")
            .build()
            .map_err(|e| CanvasError::Request(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: calculate_endpoint(api_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RecognitionService for RecognitionClient {
    fn submit(&self, image: &str, bindings: &VariableBindings) -> Result<Vec<ResultEntry>> {
        let body = serde_json::to_string(&CalculateRequest {
            image,
            dict_of_vars: bindings,
        })
        .map_err(|e| CanvasError::Request(format!("serialize request: {e}")))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            vars = bindings.len(),
            bytes = body.len(),
            "posting canvas"
        );
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| CanvasError::Request(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| CanvasError::Request(format!("read body: {e}")))?;
        if !status.is_success() {
            return Err(CanvasError::Request(format!(
                "{status}: {}",
                truncate(&text, MAX_ERROR_BODY)
            )));
        }
        parse_response(&text)
    }
}

pub fn calculate_endpoint(api_url: &str) -> String {
    format!("{}/calculate", api_url.trim().trim_end_matches('/'))
}

pub fn parse_response(text: &str) -> Result<Vec<ResultEntry>> {
    let parsed: CalculateResponse = serde_json::from_str(text)
        .map_err(|e| CanvasError::Request(format!("malformed response: {e}")))?;
    tracing::debug!(
        server_message = parsed.message.as_deref().unwrap_or(""),
        kind = parsed.kind.as_deref().unwrap_or(""),
        entries = parsed.data.len(),
        "recognition response"
    );
    Ok(parsed.data)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
