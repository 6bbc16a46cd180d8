//! Assistant facade: prompts in, reply text out, never an error

use super::client::GeminiClient;

/// Reply used when the chat model cannot be reached
pub const CHAT_FALLBACK: &str = "⚠️ Bot cevabı alınamadı.";

/// Reply used when a lab report cannot be reviewed by the model
pub const REPORT_FALLBACK: &str = " AI analizi yapılamadı.";

/// Wraps the optional API client. When no API key is configured every
/// request resolves to its fallback text.
#[derive(Clone)]
pub struct Assistant {
    client: Option<GeminiClient>,
}

impl Assistant {
    pub fn new(client: Option<GeminiClient>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Ask the model, returning `fallback` on any failure
    pub async fn ask(&self, kind: &'static str, prompt: &str, fallback: &str) -> String {
        let Some(client) = &self.client else {
            metrics::counter!("ai_requests_total", "kind" => kind, "outcome" => "disabled")
                .increment(1);
            tracing::warn!(kind, "AI request skipped, GEMINI_API_KEY not configured");
            return fallback.to_string();
        };

        match client.generate(prompt).await {
            Ok(text) => {
                metrics::counter!("ai_requests_total", "kind" => kind, "outcome" => "ok")
                    .increment(1);
                text
            }
            Err(e) => {
                metrics::counter!("ai_requests_total", "kind" => kind, "outcome" => "error")
                    .increment(1);
                tracing::error!(kind, error = %e, "AI request failed");
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_assistant_returns_fallback() {
        let assistant = Assistant::disabled();
        assert!(!assistant.is_enabled());
        let reply = assistant.ask("chat", "merhaba", CHAT_FALLBACK).await;
        assert_eq!(reply, CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn unreachable_api_returns_fallback() {
        let client = GeminiClient::new("key".into(), "http://127.0.0.1:1", "test-model");
        let assistant = Assistant::new(Some(client));
        let reply = assistant.ask("report", "rapor", REPORT_FALLBACK).await;
        assert_eq!(reply, REPORT_FALLBACK);
    }
}
