//! Gemini `generateContent` client.
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`] and only exposed when the
//! `x-goog-api-key` header is set.

use super::{
    factory::ProviderFactory,
    secrets::{ApiCredential, CredentialSource},
    GroundingSource, ModelClient, ModelError, ModelRequest, ModelResponse, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

pub struct GeminiClient {
    credential: ApiCredential,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Gemini API key",
        ))
    }

    /// Reads `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, ModelError> {
        ApiCredential::from_env(GEMINI_API_KEY_ENV, "Gemini API key").map(Self::with_credential)
    }

    /// Settings keys: `api_key` (falls back to `GEMINI_API_KEY`),
    /// `base_url`, `timeout` (humantime, e.g. `"90s"`).
    pub fn from_config(settings: &JsonValue) -> Result<Self, ModelError> {
        let credential = ApiCredential::from_config_or_env(
            settings,
            "api_key",
            GEMINI_API_KEY_ENV,
            "Gemini API key",
        )?;

        let mut client = Self::with_credential(credential);
        if let Some(url) = settings["base_url"].as_str() {
            client = client.with_base_url(url);
        }
        if let Some(timeout) = parse_timeout(settings)? {
            client = client.with_timeout(timeout);
        }
        Ok(client)
    }

    fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

fn parse_timeout(settings: &JsonValue) -> Result<Option<Duration>, ModelError> {
    settings["timeout"]
        .as_str()
        .map(|raw| {
            humantime::parse_duration(raw)
                .map_err(|e| ModelError::NotConfigured(format!("invalid timeout '{}': {}", raw, e)))
        })
        .transpose()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<&'a JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    thoughts_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn build_request(request: &ModelRequest) -> GeminiRequest<'_> {
    let config = &request.config;
    // Search grounding cannot be combined with a JSON response format.
    let structured = !config.search_grounding;

    GeminiRequest {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.content,
            }],
        }],
        system_instruction: request
            .system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
        generation_config: GeminiGenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            response_mime_type: (structured && config.json_response).then_some("application/json"),
            response_json_schema: config.response_schema.as_ref().filter(|_| structured),
            thinking_config: config.thinking_budget.map(|thinking_budget| ThinkingConfig {
                thinking_budget,
            }),
        },
        tools: config.search_grounding.then(|| {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        }),
    }
}

fn parse_response(body: GeminiResponse, requested_model: &str) -> Result<ModelResponse, ModelError> {
    let candidate = body.candidates.into_iter().next();

    let text = candidate
        .as_ref()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    let mut grounding_sources: Vec<GroundingSource> = Vec::new();
    let chunks = candidate
        .and_then(|c| c.grounding_metadata)
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();
    for web in chunks.into_iter().filter_map(|chunk| chunk.web) {
        let Some(uri) = web.uri.filter(|u| !u.is_empty()) else {
            continue;
        };
        if grounding_sources.iter().all(|s| s.uri != uri) {
            grounding_sources.push(GroundingSource {
                title: web.title.unwrap_or_default(),
                uri,
            });
        }
    }

    let usage = body
        .usage_metadata
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            thinking_tokens: u.thoughts_token_count,
        })
        .unwrap_or_default();

    Ok(ModelResponse {
        text,
        grounding_sources,
        model: body
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        usage,
    })
}

/// Map a non-2xx response onto the error taxonomy.
fn classify_error(status: u16, retry_after: Option<Duration>, body: &str) -> ModelError {
    let (message, api_status) = match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.chars().take(200).collect(), String::new()),
    };

    if matches!(status, 429 | 503) || matches!(api_status.as_str(), "RESOURCE_EXHAUSTED" | "UNAVAILABLE")
    {
        return ModelError::RateLimited {
            message: if message.is_empty() {
                format!("status {}", status)
            } else {
                message
            },
            retry_after,
        };
    }

    if matches!(status, 401 | 403) {
        return ModelError::AuthError;
    }

    ModelError::ApiError { status, message }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let body = build_request(request);
        debug!(
            model = %request.model,
            content_chars = request.content.len(),
            thinking_budget = ?request.config.thinking_budget,
            search_grounding = request.config.search_grounding,
            "Calling Gemini"
        );

        let timeout = self.timeout;
        let map_send_error = |e: reqwest::Error| {
            if e.is_timeout() {
                ModelError::Timeout(timeout)
            } else {
                ModelError::HttpError(e.to_string())
            }
        };

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", self.credential.expose())
            .header("content-type", "application/json")
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), retry_after, &text));
        }

        let bytes = response.bytes().await.map_err(map_send_error)?;
        let parsed: GeminiResponse =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::ParseError(e.to_string()))?;

        let result = parse_response(parsed, &request.model)?;
        debug!(
            model = %result.model,
            prompt_tokens = result.usage.prompt_tokens,
            completion_tokens = result.usage.completion_tokens,
            thinking_tokens = result.usage.thinking_tokens,
            "Gemini call complete"
        );
        Ok(result)
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Factory for [`GeminiClient`].
///
/// ```json
/// {
///   "api_key": "...",              // optional, falls back to GEMINI_API_KEY
///   "base_url": "https://...",     // optional
///   "timeout": "90s"               // optional
/// }
/// ```
pub struct GeminiClientFactory;

impl ProviderFactory for GeminiClientFactory {
    fn provider_type(&self) -> &'static str {
        "gemini"
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ModelClient>, ModelError> {
        Ok(Arc::new(GeminiClient::from_config(settings)?))
    }

    fn validate_config(&self, settings: &JsonValue) -> Result<(), ModelError> {
        if !ApiCredential::is_available(settings, "api_key", GEMINI_API_KEY_ENV) {
            return Err(ModelError::NotConfigured(format!(
                "Gemini API key required: set 'api_key' in config or {} env",
                GEMINI_API_KEY_ENV
            )));
        }

        if let Some(url) = settings["base_url"].as_str() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ModelError::NotConfigured(
                    "base_url must start with http:// or https://".to_string(),
                ));
            }
        }

        parse_timeout(settings).map(|_| ())
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "base_url": DEFAULT_BASE_URL,
            "timeout": "90s"
        })
    }

    fn description(&self) -> &'static str {
        "Google Gemini generateContent client with search grounding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::GenerationConfig;

    fn request(config: GenerationConfig) -> ModelRequest {
        ModelRequest {
            model: "gemini-3-flash-preview".to_string(),
            system_instruction: Some("Be concise.".to_string()),
            content: "USER PROFILE:\nFull Name: A".to_string(),
            config,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let schema = serde_json::json!({"type": "object"});
        let req = request(GenerationConfig {
            temperature: Some(0.7),
            response_schema: Some(schema.clone()),
            json_response: true,
            thinking_budget: Some(16_384),
            ..Default::default()
        });

        let body = serde_json::to_value(build_request(&req)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "USER PROFILE:\nFull Name: A");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be concise.");
        assert!(body["systemInstruction"].get("role").is_none());

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseJsonSchema"], schema);
        assert_eq!(config["thinkingConfig"]["thinkingBudget"], 16_384);
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_grounding_drops_json_mode() {
        let req = request(GenerationConfig {
            response_schema: Some(serde_json::json!({"type": "object"})),
            json_response: true,
            search_grounding: true,
            ..Default::default()
        });

        let body = serde_json::to_value(build_request(&req)).unwrap();
        assert_eq!(body["tools"], serde_json::json!([{"googleSearch": {}}]));
        assert!(body["generationConfig"].get("responseMimeType").is_none());
        assert!(body["generationConfig"].get("responseJsonSchema").is_none());
        assert!(body["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn test_parse_response_joins_text_and_skips_thoughts() {
        let body: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"resume\":"},
                    {"text": "\"R\"}"}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://acme.com", "title": "Acme"}},
                    {"web": {"uri": "https://acme.com", "title": "Acme again"}},
                    {"web": {"uri": "https://news.example", "title": "News"}}
                ]}
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5},
            "modelVersion": "gemini-3-flash-preview-001"
        }))
        .unwrap();

        let response = parse_response(body, "gemini-3-flash-preview").unwrap();
        assert_eq!(response.text, "{\"resume\":\"R\"}");
        assert_eq!(response.model, "gemini-3-flash-preview-001");
        assert_eq!(response.usage.total(), 15);
        assert_eq!(
            response
                .grounding_sources
                .iter()
                .map(|s| s.uri.as_str())
                .collect::<Vec<_>>(),
            vec!["https://acme.com", "https://news.example"]
        );
    }

    #[test]
    fn test_parse_response_empty() {
        let no_candidates: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            parse_response(no_candidates, "m"),
            Err(ModelError::EmptyResponse)
        ));

        let blank: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "  "}]}}]
        }))
        .unwrap();
        assert!(matches!(parse_response(blank, "m"), Err(ModelError::EmptyResponse)));
    }

    #[test]
    fn test_classify_errors() {
        let quota = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match classify_error(429, Some(Duration::from_secs(3)), quota) {
            ModelError::RateLimited { message, retry_after } => {
                assert_eq!(message, "Quota exceeded");
                assert_eq!(retry_after, Some(Duration::from_secs(3)));
            }
            other => panic!("Expected RateLimited, got {:?}", other),
        }

        assert!(classify_error(503, None, "overloaded").is_retryable());

        let unavailable = r#"{"error": {"code": 500, "message": "busy", "status": "UNAVAILABLE"}}"#;
        assert!(classify_error(500, None, unavailable).is_retryable());

        assert!(matches!(classify_error(403, None, "{}"), ModelError::AuthError));

        match classify_error(400, None, r#"{"error": {"message": "bad schema", "status": "INVALID_ARGUMENT"}}"#) {
            ModelError::ApiError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad schema");
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config() {
        let client = GeminiClient::from_config(&serde_json::json!({
            "api_key": "config-key",
            "base_url": "https://proxy.example/v1beta/",
            "timeout": "30s"
        }))
        .unwrap();

        assert_eq!(client.credential.source(), CredentialSource::Config);
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(
            client.endpoint("gemini-2.5-flash-lite"),
            "https://proxy.example/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }

    #[test]
    fn test_factory_validation() {
        let factory = GeminiClientFactory;
        assert_eq!(factory.provider_type(), "gemini");

        let bad_url = serde_json::json!({"api_key": "k", "base_url": "ftp://x"});
        assert!(factory.validate_config(&bad_url).is_err());

        let bad_timeout = serde_json::json!({"api_key": "k", "timeout": "soon"});
        assert!(factory.validate_config(&bad_timeout).is_err());

        let ok = serde_json::json!({"api_key": "k"});
        assert!(factory.validate_config(&ok).is_ok());
        assert_eq!(factory.create(&ok).unwrap().name(), "gemini");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "AIza-super-secret-key-12345";
        let client = GeminiClient::new(secret);

        let debug = format!("{:?}", client);
        assert!(!debug.contains(secret), "API key was exposed in Debug output!");
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_health_check_requires_key() {
        assert!(GeminiClient::new("key").health_check().await);
        assert!(!GeminiClient::new("").health_check().await);
    }
}
