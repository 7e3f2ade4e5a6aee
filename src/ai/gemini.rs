use crate::config::AiConfig;
use crate::core::traits::TextGenerator;
use crate::store::{check_response, http_client, send_error};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate; empty when there is none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> AppResult<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty()).ok_or_else(|| {
            AppError::Config(
                "AI API key not found. Set [ai].api_key or the PROMPTVAULT_AI_API_KEY environment variable"
                    .to_string(),
            )
        })?;

        Ok(Self {
            client: http_client()?,
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    async fn generate(&self, model: &str, prompt: &str, schema: Option<&Value>) -> AppResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        };

        tracing::debug!(model, structured = schema.is_some(), "generating content");
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| match send_error("Failed to reach AI service", e) {
                AppError::Remote(msg) => AppError::Ai(msg),
                other => other,
            })?;

        let body: GenerateResponse = check_response(response)
            .await
            .map_err(|e| AppError::Ai(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::Ai(format!("Failed to parse AI response: {}", e)))?;

        Ok(body.text())
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, model: &str, prompt: &str) -> AppResult<String> {
        self.generate(model, prompt, None).await
    }

    async fn generate_json(&self, model: &str, prompt: &str, schema: &Value) -> AppResult<String> {
        self.generate(model, prompt, Some(schema)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let schema = json!({"type": "OBJECT"});
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &schema,
            }),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"score\":"}, {"text": " 8}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.text(), "{\"score\": 8}");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = GeminiClient::new(&AiConfig::default()).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }
}
