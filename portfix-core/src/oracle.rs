//! HTTP oracle backed by the Generative Language `generateContent` API.

use crate::ports::{Oracle, OracleError};
use crate::settings::OracleSettings;
use anyhow::Context;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Safety categories relaxed so that source code is never blocked as "dangerous content".
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Longest HTTP error body kept in an [`OracleError::Http`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct GeminiOracle {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiOracle {
    pub fn new(settings: &OracleSettings) -> anyhow::Result<Self> {
        if settings.api_key.trim().is_empty() {
            anyhow::bail!("oracle API key is empty");
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            client,
            url: generate_url(&settings.endpoint, &settings.model),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Oracle for GeminiOracle {
    fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String, OracleError> {
        let body = request_body(prompt, system_instruction);
        debug!(model = %self.model, prompt_bytes = prompt.len(), "oracle request");

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(classify_transport)?;

        let status = response.status();
        let text = response.text().map_err(classify_transport)?;
        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let text = parse_response(&text)?;
        debug!(model = %self.model, response_bytes = text.len(), "oracle response");
        Ok(text)
    }
}

fn generate_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

fn request_body(prompt: &str, system_instruction: &str) -> serde_json::Value {
    let safety: Vec<_> = SAFETY_CATEGORIES
        .iter()
        .map(|c| json!({ "category": c, "threshold": "BLOCK_NONE" }))
        .collect();
    json!({
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "safetySettings": safety,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn parse_response(body: &str) -> Result<String, OracleError> {
    let resp: GenerateResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    Ok(text)
}

fn classify_status(status: StatusCode, body: &str) -> OracleError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return OracleError::Quota(truncate(body));
    }
    OracleError::Http {
        status: status.as_u16(),
        body: truncate(body),
    }
}

fn classify_transport(err: reqwest::Error) -> OracleError {
    if err.is_timeout() {
        OracleError::Timeout
    } else if err.is_decode() {
        OracleError::Malformed(err.to_string())
    } else {
        OracleError::Transport(err.to_string())
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_joins_endpoint_and_model() {
        assert_eq!(
            generate_url("https://generativelanguage.googleapis.com/", "gemini-2.5-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn request_carries_system_instruction_and_relaxed_safety() {
        let body = request_body("fix it", "You are an expert Java debugger.");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are an expert Java debugger."
        );
        assert_eq!(body["contents"][0]["parts"][0]["text"], "fix it");
        let safety = body["safetySettings"].as_array().expect("array");
        assert_eq!(safety.len(), SAFETY_CATEGORIES.len());
        assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
    }

    #[test]
    fn response_text_parts_are_concatenated() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"class A "},{"text":"{}"}]}}]}"#;
        assert_eq!(parse_response(body).expect("text"), "class A {}");
    }

    #[test]
    fn blocked_or_blank_response_is_empty() {
        assert_eq!(
            parse_response(r#"{"candidates":[]}"#),
            Err(OracleError::EmptyResponse)
        );
        assert_eq!(
            parse_response(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#),
            Err(OracleError::EmptyResponse)
        );
        assert_eq!(
            parse_response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(OracleError::EmptyResponse)
        );
    }

    #[test]
    fn non_json_response_is_malformed() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(OracleError::Malformed(_))
        ));
    }

    #[test]
    fn rate_limit_maps_to_quota() {
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "RESOURCE_EXHAUSTED"),
            OracleError::Quota(msg) if msg == "RESOURCE_EXHAUSTED"
        ));
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST, "bad"),
            OracleError::Http {
                status: 400,
                body: "bad".to_string()
            }
        );
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY + 10);
        let out = truncate(&body);
        assert_eq!(out.len(), MAX_ERROR_BODY + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(GeminiOracle::new(&OracleSettings::default()).is_err());
    }
}
