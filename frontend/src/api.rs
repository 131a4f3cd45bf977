use std::cell::Cell;
use std::rc::Rc;

use futures::StreamExt;
use gloo_net::http::Request;
use shared::models::{GenerateContentResponse, NovelSettings};
use shared::prompt;
use thiserror::Error;
use web_sys::js_sys;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Failure kinds for one generation attempt. The viewer picks the
/// user-facing message per kind; the full cause is logged where the
/// stream is driven.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Network(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("generation blocked by the provider: {0}")]
    Blocked(String),
    #[error("malformed stream data: {0}")]
    Stream(String),
}

/// Shared flag that lets a superseding generation or teardown stop
/// fragment delivery. Checked once per received chunk.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Client for the Gemini streaming endpoint. Constructed once at startup
/// and passed down explicitly; there is no global instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GeminiClient {
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads the key baked in at build time. Missing or empty keys fail
    /// here, before any UI is rendered.
    pub fn from_env() -> Result<Self, GenerateError> {
        match option_env!("GEMINI_API_KEY") {
            Some(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(GenerateError::MissingApiKey),
        }
    }

    /// Issues one streaming generation request and forwards every non-empty
    /// text fragment to `on_fragment` in arrival order. Resolves when the
    /// upstream stream is exhausted or the token is cancelled; any failure
    /// propagates as a [`GenerateError`] with no retry.
    pub async fn stream_novel(
        &self,
        settings: &NovelSettings,
        cancel: CancelToken,
        mut on_fragment: impl FnMut(String),
    ) -> Result<(), GenerateError> {
        let body = prompt::build_request(settings);
        let url = format!(
            "{API_BASE}/models/{}:streamGenerateContent?alt=sse&key={}",
            prompt::MODEL,
            self.api_key
        );

        let response = Request::post(&url)
            .json(&body)
            .map_err(|e| GenerateError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if !response.ok() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api {
                status: response.status(),
                message: api_error_message(&message),
            });
        }

        let Some(raw_body) = response.body() else {
            return Err(GenerateError::Stream("response had no body".to_string()));
        };

        let mut stream = wasm_streams::ReadableStream::from_raw(raw_body).into_stream();
        let mut buffer = Vec::new();

        while let Some(result) = stream.next().await {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let chunk = result.map_err(|e| GenerateError::Network(format!("{e:?}")))?;
            let bytes = js_sys::Uint8Array::new(&chunk).to_vec();
            buffer.extend_from_slice(&bytes);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes = buffer.drain(..pos + 1).collect::<Vec<u8>>();
                let line = String::from_utf8_lossy(&line_bytes);
                let line = line.trim_end_matches(['\n', '\r']);

                if let Some(text) = handle_sse_line(line)? {
                    on_fragment(text);
                }
            }
        }

        // Trailing event without a final newline.
        if !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer).to_string();
            if let Some(text) = handle_sse_line(line.trim_end_matches(['\n', '\r']))? {
                on_fragment(text);
            }
        }

        Ok(())
    }
}

fn handle_sse_line(line: &str) -> Result<Option<String>, GenerateError> {
    match sse_data(line) {
        Some(data) => fragment_from_data(data),
        None => Ok(None),
    }
}

/// Extracts the payload of an SSE `data:` line; other lines (blank
/// separators, comments) carry no payload.
fn sse_data(line: &str) -> Option<&str> {
    line.strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
}

/// Decodes one streamed chunk. A prompt-feedback block reason or a safety
/// finish surfaces as [`GenerateError::Blocked`]; an empty chunk yields no
/// fragment.
fn fragment_from_data(data: &str) -> Result<Option<String>, GenerateError> {
    let chunk: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| GenerateError::Stream(e.to_string()))?;

    if let Some(feedback) = &chunk.prompt_feedback
        && let Some(reason) = &feedback.block_reason
    {
        return Err(GenerateError::Blocked(reason.clone()));
    }

    if let Some(candidate) = chunk.candidates.first()
        && let Some(reason) = &candidate.finish_reason
        && matches!(
            reason.as_str(),
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT"
        )
    {
        // Partial text in a blocked chunk is discarded with the stream.
        return Err(GenerateError::Blocked(reason.clone()));
    }

    Ok(chunk.text().filter(|text| !text.is_empty()))
}

/// Pulls the human-readable message out of an error response body, falling
/// back to the raw body when it is not the usual JSON shape.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_data_strips_prefix_only() {
        assert_eq!(sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_data("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_data(""), None);
        assert_eq!(sse_data(": keepalive"), None);
        assert_eq!(sse_data("event: done"), None);
    }

    #[test]
    fn fragment_extracted_in_part_order() {
        let data =
            r#"{"candidates":[{"content":{"parts":[{"text":"안녕"},{"text":"하세요"}],"role":"model"}}]}"#;
        assert_eq!(
            fragment_from_data(data).unwrap(),
            Some("안녕하세요".to_string())
        );
    }

    #[test]
    fn empty_chunk_yields_no_fragment() {
        let data = r#"{"candidates":[{"content":{"parts":[],"role":"model"}}]}"#;
        assert_eq!(fragment_from_data(data).unwrap(), None);
        let stop = r#"{"candidates":[{"content":{"parts":[{"text":""}]},"finishReason":"STOP"}]}"#;
        assert_eq!(fragment_from_data(stop).unwrap(), None);
    }

    #[test]
    fn prompt_block_reason_surfaces_as_blocked() {
        let data = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            fragment_from_data(data),
            Err(GenerateError::Blocked("SAFETY".to_string()))
        );
    }

    #[test]
    fn safety_finish_surfaces_as_blocked() {
        let data = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert_eq!(
            fragment_from_data(data),
            Err(GenerateError::Blocked("SAFETY".to_string()))
        );
    }

    #[test]
    fn malformed_json_surfaces_as_stream_error() {
        assert!(matches!(
            fragment_from_data("not json"),
            Err(GenerateError::Stream(_))
        ));
    }

    #[test]
    fn api_error_message_prefers_json_shape() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }
}
