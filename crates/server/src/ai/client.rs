//! Gemini client for the `generateContent` endpoint

use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Gemini generative-language API
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

/// A text fragment of a content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A single turn of content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Request body for `generateContent`
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

/// One generated candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[allow(dead_code)]
    pub finish_reason: Option<String>,
}

/// Response from `generateContent`
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Result<String, String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .ok_or_else(|| "No text content in response".to_string())
    }
}

/// Error detail from the API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a client for `model` under the API base URL
    pub fn new(api_key: String, base_url: &str, model: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a single-turn prompt and return the generated text
    pub async fn generate(&self, prompt: &str) -> Result<String, String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if let Ok(api_err) = serde_json::from_str::<ApiError>(&body) {
                return Err(format!(
                    "Gemini API error ({}): {}",
                    status, api_err.error.message
                ));
            }
            return Err(format!("Gemini API error ({}): {}", status, body));
        }

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        parsed.first_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new(
            "key".into(),
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-2.0-flash",
        );
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn first_text_reads_first_candidate_part() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Bol su için."}, {"text": "ikinci"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 12}
        });
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.first_text().unwrap(), "Bol su için.");
    }

    #[test]
    fn blocked_response_without_candidates_is_an_error() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        assert!(response.first_text().is_err());
    }

    #[test]
    fn request_serializes_without_role() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: Some("merhaba".into()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"contents": [{"parts": [{"text": "merhaba"}]}]})
        );
    }
}
