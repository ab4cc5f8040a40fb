//! Generative-language backend
//!
//! The itinerary generator only needs one operation from the model: turn a
//! prompt into free-form text. [`TextGenerator`] is that seam; [`GeminiClient`]
//! implements it against the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{GEMINI_API_KEY_VAR, GeneratorConfig};
use crate::{Result, TripPlannerError};

/// Anything that can answer a text prompt with text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Subset of the `generateContent` response we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("TripPlanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripPlannerError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                TripPlannerError::config(format!(
                    "Generative API key is missing. Set {GEMINI_API_KEY_VAR} or generator.api_key"
                ))
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(name = "gemini_generate", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!("Sending prompt to {}", url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| TripPlannerError::api(format!("Generative API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Generative API returned {}", status);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TripPlannerError::config(
                    format!("Generative API rejected the configured key ({status})"),
                ),
                StatusCode::TOO_MANY_REQUESTS => {
                    TripPlannerError::api("Generative API rate limit exceeded")
                }
                _ => TripPlannerError::api(format!("Generative API error {status}: {error_text}")),
            });
        }

        let payload: GenerateContentResponse = response.json().await.map_err(|e| {
            TripPlannerError::api(format!("Failed to parse generative API response: {e}"))
        })?;

        let text = payload
            .into_text()
            .ok_or_else(|| TripPlannerError::api("Generative API returned an empty response"))?;

        info!("Received {} characters from the model", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(server: &mockito::Server, api_key: Option<&str>) -> GeneratorConfig {
        GeneratorConfig {
            api_key: api_key.map(str::to_string),
            base_url: server.url(),
            model: "test-model".to_string(),
            ..GeneratorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_text_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "secret".into()))
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "plan Kyoto"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[{\"title\":"},{"text":"\"Day 1\"}]"}]}}]}"#,
            )
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server, Some("secret"))).unwrap();
        let text = client.generate_text("plan Kyoto").await.unwrap();

        assert_eq!(text, r#"[{"title":"Day 1"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_backend() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server, None)).unwrap();
        let err = client.generate_text("plan Kyoto").await.unwrap_err();

        assert!(matches!(err, TripPlannerError::Config { .. }));
        assert!(err.to_string().contains(GEMINI_API_KEY_VAR));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_key_is_config_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server, Some("wrong"))).unwrap();
        let err = client.generate_text("plan").await.unwrap_err();
        assert!(matches!(err, TripPlannerError::Config { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server, Some("secret"))).unwrap();
        let err = client.generate_text("plan").await.unwrap_err();
        assert!(matches!(err, TripPlannerError::Api { .. }));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server, Some("secret"))).unwrap();
        let err = client.generate_text("plan").await.unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }
}
