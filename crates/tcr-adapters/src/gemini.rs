//! Generative-model HTTP adapter
//!
//! One client implements extraction, clarification, diagram and sketch
//! synthesis against the `generateContent` and `predict` endpoints.

use crate::error::{AdapterError, ConfigError};
use crate::prompt;
use crate::response;
use crate::service::{
    ClarificationRequest, DiagramService, ExtractionRequest, ExtractionResponse,
    ExtractionService, SketchService, SynthesisRequest,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tcr_model::{PartialReport, UploadedEvidence};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model for extraction, clarification and diagrams
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Default model for sketches
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// HTTP adapter configuration
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Config with defaults for everything but the key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_secs: 120,
        }
    }

    /// Load from environment variables
    ///
    /// # Errors
    /// `ConfigError::MissingApiKey` if neither `GEMINI_API_KEY` nor `API_KEY` is set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    ///
    /// # Errors
    /// `ConfigError::MissingApiKey` if no non-blank key is found
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(url) = non_blank("GEMINI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_blank("GEMINI_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = non_blank("GEMINI_IMAGE_MODEL") {
            config.image_model = model;
        }
        Ok(config)
    }

    /// Override the API root
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the HTTP timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for all four service contracts
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create client
    ///
    /// # Errors
    /// `ConfigError::Invalid` if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn post(&self, model: &str, method: &str, body: &Value) -> Result<Value, AdapterError> {
        let url = format!("{}/models/{}:{}", self.config.base_url, model, method);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(AdapterError::from)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("{} {} failed with status {}", model, method, status);
            return Err(AdapterError::from_status(status.as_u16(), message));
        }
        response.json::<Value>().await.map_err(AdapterError::from)
    }

    async fn generate_text(
        &self,
        parts: Vec<Value>,
        generation_config: Option<Value>,
    ) -> Result<String, AdapterError> {
        let mut body = json!({ "contents": [{ "parts": parts }] });
        if let Some(generation_config) = generation_config {
            body["generationConfig"] = generation_config;
        }
        let data = self
            .post(&self.config.text_model, "generateContent", &body)
            .await?;
        Ok(candidate_text(&data))
    }
}

/// Inline-data part for one evidence file
fn inline_part(evidence: &UploadedEvidence) -> Value {
    json!({
        "inline_data": {
            "mime_type": evidence.mime_type,
            "data": STANDARD.encode(&evidence.bytes),
        }
    })
}

/// Concatenated text of the first candidate
fn candidate_text(data: &Value) -> String {
    data["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ExtractionService for GeminiClient {
    async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResponse, AdapterError> {
        let mut parts = vec![json!({ "text": prompt::extraction_prompt(&request) })];
        parts.extend(request.evidence_groups.iter().map(inline_part));

        tracing::info!(
            "requesting extraction for {} evidence items ({} / {})",
            request.evidence_groups.len(),
            request.locale,
            request.language
        );
        let text = self
            .generate_text(
                parts,
                Some(json!({
                    "responseMimeType": "application/json",
                    "responseSchema": prompt::response_schema(),
                })),
            )
            .await?;
        response::parse_extraction(&text)
    }

    async fn clarify(&self, request: ClarificationRequest) -> Result<PartialReport, AdapterError> {
        let prompt = prompt::clarification_prompt(&request)?;
        tracing::info!(
            "requesting clarification for {} open questions",
            request.questions.len()
        );
        let text = self
            .generate_text(
                vec![json!({ "text": prompt })],
                Some(json!({ "responseMimeType": "application/json" })),
            )
            .await?;
        response::parse_clarification(&text)
    }
}

#[async_trait]
impl DiagramService for GeminiClient {
    async fn generate_diagram(&self, request: SynthesisRequest) -> Result<String, AdapterError> {
        let mut parts = vec![json!({ "text": prompt::diagram_prompt(&request) })];
        parts.extend(request.scene_photos.iter().map(inline_part));

        let text = self.generate_text(parts, None).await?;
        response::validate_svg(&text)
    }
}

#[async_trait]
impl SketchService for GeminiClient {
    async fn generate_sketch(&self, request: SynthesisRequest) -> Result<String, AdapterError> {
        let body = json!({
            "instances": [{ "prompt": prompt::sketch_prompt(&request) }],
            "parameters": {
                "sampleCount": 1,
                "outputMimeType": "image/png",
                "aspectRatio": "1:1",
            }
        });
        let data = self
            .post(&self.config.image_model, "predict", &body)
            .await?;
        let encoded = data["predictions"][0]["bytesBase64Encoded"]
            .as_str()
            .unwrap_or_default();
        response::validate_sketch(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn config_prefers_gemini_key_and_applies_overrides() {
        let config = GeminiConfig::from_lookup(env(&[
            ("GEMINI_API_KEY", "primary"),
            ("API_KEY", "fallback"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta/"),
            ("GEMINI_IMAGE_MODEL", "imagen-test"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "primary");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.image_model, "imagen-test");
    }

    #[test]
    fn config_falls_back_to_api_key_and_requires_one() {
        let config = GeminiConfig::from_lookup(env(&[("GEMINI_API_KEY", " "), ("API_KEY", "k")]))
            .unwrap();
        assert_eq!(config.api_key, "k");

        assert!(matches!(
            GeminiConfig::from_lookup(env(&[])),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let rendered = format!("{:?}", GeminiConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn candidate_text_joins_parts() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(candidate_text(&data), "{\"a\":1}");
        assert_eq!(candidate_text(&json!({})), "");
    }
}
