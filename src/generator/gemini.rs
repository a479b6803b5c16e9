//! Gemini API client
//!
//! One generateContent call per request, JSON-mode output.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::CommitteeError;
use crate::generator::{GenerationRequest, Generator};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Hard ceiling on a single generation call. Cancellation during a
/// quality-gated retry aborts the whole stage, so there is no per-attempt
/// deadline beyond this one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: String, model: &str) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model
            ),
        }
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(CommitteeError::GenerationFailure(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);

        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: "application/json".to_string(),
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            },
        };

        info!(temperature = request.temperature, "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                CommitteeError::GenerationFailure(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(CommitteeError::GenerationFailure(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            CommitteeError::GenerationFailure(format!("Gemini parse error: {}", e))
        })?;

        if gemini_response.candidates.is_empty() {
            return Err(CommitteeError::GenerationFailure(
                "No response from Gemini API".to_string(),
            ));
        }

        let text = gemini_response.candidates[0]
            .content
            .parts
            .first()
            .ok_or_else(|| {
                CommitteeError::GenerationFailure("Empty response from Gemini".to_string())
            })?
            .text
            .clone();

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "Analyze these transactions".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                response_mime_type: "application/json".to_string(),
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: "You are the Forensic Investigator".to_string(),
                }],
            },
        };

        let json = serde_json::to_string(&body);
        assert!(json.is_ok());
        let json = json.unwrap();
        assert!(json.contains("Analyze these transactions"));
        assert!(json.contains("application/json"));
    }

    #[test]
    fn test_base_url_uses_requested_model() {
        let client = GeminiClient::with_model("key".to_string(), "gemini-2.5-flash");
        assert!(client.base_url.contains("gemini-2.5-flash:generateContent"));
    }
}
