// generate.rs - Prompt in, HTML document out
//
// Builds the upstream generation request and validates what comes back.
// The HTTP call itself lives with the route that owns the API key.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub const SYSTEM_PROMPT: &str = "You are a code generator. Generate a single, self-contained HTML file that includes:
- Inline CSS in a <style> tag
- Inline JavaScript in a <script> tag
- No external dependencies, CDN links, or imports
- No fetch(), XMLHttpRequest, or any network requests
- No localStorage, sessionStorage, or cookies access
- The code should be purely visual/interactive

The user will describe what they want. Create it.

Respond ONLY with the raw HTML code. No explanations, no markdown code blocks, just the HTML starting with <!DOCTYPE html>.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { model: "gemini-2.5-flash".to_string(), temperature: 0.7, max_output_tokens: 8192 }
    }
}

impl GenerationConfig {
    /// Upstream URL the payload is posted to.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", API_BASE, self.model)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateError {
    RateLimited { retry_after_secs: u64 },
    EmptyPrompt,
    MissingApiKey,
    /// Upstream answered with a non-success status; holds its body.
    Upstream(String),
    EmptyCandidate,
    InvalidDocument,
    Unexpected(String),
}

impl GenerateError {
    pub fn status(&self) -> u16 {
        match self {
            GenerateError::RateLimited { .. } => 429,
            GenerateError::EmptyPrompt => 400,
            _ => 500,
        }
    }

    /// What the user gets to see. Internal details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            GenerateError::RateLimited { retry_after_secs } => {
                format!("Rate limit exceeded. Try again in {} seconds.", retry_after_secs)
            }
            GenerateError::EmptyPrompt => "Prompt is required".to_string(),
            GenerateError::MissingApiKey => "Server configuration error".to_string(),
            GenerateError::Upstream(_) => "Failed to generate code. Please try again.".to_string(),
            GenerateError::EmptyCandidate => "The model isn't that good yet, lets relax...".to_string(),
            GenerateError::InvalidDocument => "Invalid code generated. Please try again.".to_string(),
            GenerateError::Unexpected(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Upstream(body) => write!(f, "upstream error: {}", body),
            GenerateError::Unexpected(msg) => write!(f, "unexpected: {}", msg),
            other => f.write_str(&other.message()),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<serde_json::Error> for GenerateError {
    fn from(e: serde_json::Error) -> Self {
        GenerateError::Unexpected(e.to_string())
    }
}

/// Body returned to the page. Exactly one of `code` / `error` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub code: Option<String>,
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn ok(code: String) -> Self {
        Self { success: true, code: Some(code), error: None }
    }

    pub fn failed(err: &GenerateError) -> Self {
        Self { success: false, code: None, error: Some(err.message()) }
    }

    /// Response body plus HTTP status.
    pub fn from_result(result: Result<String, GenerateError>) -> (u16, Self) {
        match result {
            Ok(code) => (200, Self::ok(code)),
            Err(e) => {
                match &e {
                    GenerateError::Upstream(_) | GenerateError::Unexpected(_) | GenerateError::MissingApiKey => {
                        log::error!("sandbox generate: {}", e)
                    }
                    _ => log::debug!("sandbox generate: {}", e),
                }
                (e.status(), Self::failed(&e))
            }
        }
    }
}

/// The server's API key as read from its environment. Unset or blank is
/// a deployment problem, reported to the page as a generic error.
pub fn api_key(value: Option<&str>) -> Result<&str, GenerateError> {
    value.map(str::trim).filter(|k| !k.is_empty()).ok_or(GenerateError::MissingApiKey)
}

/// Trimmed prompt, or `EmptyPrompt`.
pub fn validate_prompt(req: &GenerateRequest) -> Result<&str, GenerateError> {
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }
    Ok(prompt)
}

/// Upstream request body for a validated prompt.
pub fn build_payload(req: &GenerateRequest, cfg: &GenerationConfig) -> Result<Value, GenerateError> {
    let prompt = validate_prompt(req)?;
    let mut parts = vec![json!({ "text": SYSTEM_PROMPT }), json!({ "text": format!("User request: {}", prompt) })];
    if let (Some(w), Some(h)) = (req.screen_width, req.screen_height) {
        parts.push(json!({ "text": format!("The preview area is {}x{} pixels.", w, h) }));
    }
    Ok(json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "temperature": cfg.temperature,
            "maxOutputTokens": cfg.max_output_tokens,
        },
    }))
}

/// Pull the HTML document out of an upstream response.
pub fn extract_document(response: &Value) -> Result<String, GenerateError> {
    let text = response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or(GenerateError::EmptyCandidate)?;

    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("<!doctype") || lower.starts_with("<html") {
        return Ok(trimmed.to_string());
    }
    fenced_html(trimmed).map(str::to_string).ok_or(GenerateError::InvalidDocument)
}

// First ```html (or ```htm) block, contents trimmed
fn fenced_html(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let open = lower.find("```htm")? + 6;
    let body = if lower[open..].starts_with('l') { open + 1 } else { open };
    let len = text[body..].find("```")?;
    Some(text[body..body + len].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest { prompt: prompt.to_string(), ..Default::default() }
    }

    fn upstream(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn request_reads_camel_case() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{ "prompt": "bouncing balls", "screenWidth": 640, "screenHeight": 480 }"#).unwrap();
        assert_eq!(req.screen_width, Some(640));
        assert_eq!(req.screen_height, Some(480));

        let bare: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(validate_prompt(&bare), Err(GenerateError::EmptyPrompt));
    }

    #[test]
    fn whitespace_prompt_is_rejected() {
        assert_eq!(validate_prompt(&request("   \n")), Err(GenerateError::EmptyPrompt));
        assert_eq!(validate_prompt(&request("  snow  ")), Ok("snow"));
    }

    #[test]
    fn payload_carries_prompt_and_settings() {
        let payload = build_payload(&request(" a spinning cube "), &GenerationConfig::default()).unwrap();
        let parts = payload.pointer("/contents/0/parts").and_then(Value::as_array).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], SYSTEM_PROMPT);
        assert_eq!(parts[1]["text"], "User request: a spinning cube");
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 8192);

        let sized = GenerateRequest { screen_width: Some(800), screen_height: Some(600), ..request("x") };
        let payload = build_payload(&sized, &GenerationConfig::default()).unwrap();
        assert_eq!(payload.pointer("/contents/0/parts").and_then(Value::as_array).map(Vec::len), Some(3));
    }

    #[test]
    fn endpoint_names_the_model() {
        assert_eq!(
            GenerationConfig::default().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        let cfg = GenerationConfig { model: "gemini-2.5-pro".into(), ..GenerationConfig::default() };
        assert!(cfg.endpoint().ends_with("/models/gemini-2.5-pro:generateContent"));
    }

    #[test]
    fn missing_api_key_is_a_server_error() {
        assert_eq!(api_key(Some(" key-123 ")), Ok("key-123"));
        for unset in [None, Some(""), Some("  ")] {
            let err = api_key(unset).unwrap_err();
            assert_eq!(err, GenerateError::MissingApiKey);
            assert_eq!(err.status(), 500);
            assert_eq!(err.message(), "Server configuration error");
        }
    }

    #[test]
    fn raw_documents_pass_through_trimmed() {
        let doc = extract_document(&upstream("\n<!DOCTYPE html><html></html>\n")).unwrap();
        assert_eq!(doc, "<!DOCTYPE html><html></html>");
        assert!(extract_document(&upstream("<HTML><body></body></HTML>")).is_ok());
    }

    #[test]
    fn fenced_documents_are_unwrapped() {
        let text = "Here you go:\n```html\n<canvas></canvas>\n```\nEnjoy";
        assert_eq!(extract_document(&upstream(text)).unwrap(), "<canvas></canvas>");

        let short = "```HTM\n<p>hi</p>```";
        assert_eq!(extract_document(&upstream(short)).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn bad_responses_map_to_errors() {
        assert_eq!(extract_document(&json!({})), Err(GenerateError::EmptyCandidate));
        assert_eq!(extract_document(&upstream("")), Err(GenerateError::EmptyCandidate));
        assert_eq!(extract_document(&upstream("just words")), Err(GenerateError::InvalidDocument));
        assert_eq!(extract_document(&upstream("```html\n<p>unterminated")), Err(GenerateError::InvalidDocument));
    }

    #[test]
    fn response_shape_and_status() {
        let (status, body) = GenerateResponse::from_result(Err(GenerateError::RateLimited { retry_after_secs: 42 }));
        assert_eq!(status, 429);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, json!({ "success": false, "code": null, "error": "Rate limit exceeded. Try again in 42 seconds." }));

        let (status, body) = GenerateResponse::from_result(Ok("<html></html>".to_string()));
        assert_eq!(status, 200);
        assert_eq!(body.code.as_deref(), Some("<html></html>"));
        assert!(body.error.is_none());

        assert_eq!(GenerateError::EmptyPrompt.status(), 400);
        assert_eq!(GenerateError::Upstream("boom".into()).message(), "Failed to generate code. Please try again.");
    }
}
