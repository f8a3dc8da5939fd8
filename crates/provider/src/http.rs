//! Blocking HTTP clients for the supported providers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabtab_config::ai::ResolvedProviderConfig;
use tabtab_config::settings::AIProvider;

use crate::error::GenerateError;
use crate::{CompletionProvider, PromptRequest};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const CLAUDE_MAX_TOKENS: u32 = 400;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Request / response shapes
// ============================================================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
    options: OllamaOptions,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OllamaMessage {
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OpenAIChoice {
    message: OllamaMessage,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ClaudeContent {
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiCandidateContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GeminiModelList {
    models: Vec<GeminiModel>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    supported_generation_methods: Vec<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Provider client (blocking).
#[derive(Clone)]
pub struct HttpProvider {
    http: reqwest::blocking::Client,
    provider: AIProvider,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpProvider {
    pub fn new(provider: AIProvider, model: &str, api_key: Option<String>) -> Result<Self, GenerateError> {
        Self::with_base_url(provider, model, api_key, provider.default_base_url().to_string())
    }

    pub fn with_base_url(
        provider: AIProvider,
        model: &str,
        api_key: Option<String>,
        base_url: String,
    ) -> Result<Self, GenerateError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("tabtab/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        Ok(Self {
            http,
            provider,
            model: model.trim().to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from resolved settings. Refuses (before any network
    /// call) when the key or model is missing.
    pub fn from_resolved(config: &ResolvedProviderConfig) -> Result<Self, GenerateError> {
        if !config.status.is_ready() {
            let reason = config
                .blocking_reason
                .clone()
                .unwrap_or_else(|| format!("{} is not configured", config.provider.display_name()));
            return Err(GenerateError::NotConfigured(reason));
        }
        Self::with_base_url(config.provider, &config.model, config.api_key.clone(), config.base_url.clone())
    }

    pub fn provider(&self) -> AIProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn require_key(&self) -> Result<&str, GenerateError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GenerateError::NotConfigured(self.provider.missing_key_message()))
    }

    fn require_model(&self) -> Result<&str, GenerateError> {
        if self.model.is_empty() {
            return Err(GenerateError::NotConfigured(self.provider.missing_model_message()));
        }
        Ok(&self.model)
    }

    /// Send a request and decode a 2xx body, mapping failures the same way
    /// for every provider.
    fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<T, GenerateError> {
        let response = request
            .send()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            log::warn!("{} returned HTTP {}: {}", self.provider.display_name(), status.as_u16(), message);
            return Err(GenerateError::Api { status: status.as_u16(), message });
        }

        serde_json::from_str(&body).map_err(|e| GenerateError::Parse(e.to_string()))
    }

    fn complete_ollama(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        let model = self.require_model()?;
        let body = OllamaRequest {
            model,
            stream: false,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            options: OllamaOptions { temperature: request.temperature },
        };
        let url = format!("{}/api/chat", self.base_url);
        let response: OllamaResponse = self.send(self.http.post(&url).json(&body))?;
        Ok(response.message.map(|m| m.content).unwrap_or_default())
    }

    fn complete_openai(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        let key = self.require_key()?;
        let model = self.require_model()?;
        let body = OpenAIRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
        };
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response: OpenAIResponse = self.send(self.http.post(&url).bearer_auth(key).json(&body))?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }

    fn complete_claude(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        let key = self.require_key()?;
        let model = self.require_model()?;
        let body = ClaudeRequest {
            model,
            max_tokens: CLAUDE_MAX_TOKENS,
            system: &request.system,
            messages: vec![ChatMessage { role: "user", content: &request.user }],
        };
        let url = format!("{}/v1/messages", self.base_url);
        let response: ClaudeResponse = self.send(
            self.http
                .post(&url)
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body),
        )?;
        Ok(response
            .content
            .into_iter()
            .filter(|c| c.kind == "text")
            .map(|c| c.text)
            .collect())
    }

    fn complete_gemini(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        let key = self.require_key()?;
        let model = self.require_model()?;
        // Gemini gets the system prompt folded into the user turn
        let combined = format!("{}\n\n{}", request.system, request.user);
        let body = GeminiRequest {
            contents: vec![GeminiContent { parts: vec![GeminiPart { text: &combined }] }],
            generation_config: GeminiGenerationConfig { temperature: request.temperature },
        };
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response: GeminiResponse = self.send(self.http.post(&url).query(&[("key", key)]).json(&body))?;
        Ok(response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }

    /// Gemini models that support `generateContent`, without the `models/`
    /// prefix, sorted.
    pub fn list_gemini_models(&self) -> Result<Vec<String>, GenerateError> {
        let key = self.require_key()?;
        let url = format!("{}/v1beta/models", self.base_url);
        let list: GeminiModelList = self.send(self.http.get(&url).query(&[("key", key)]))?;

        let mut names: Vec<String> = list
            .models
            .into_iter()
            .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
            .map(|m| m.name.strip_prefix("models/").unwrap_or(&m.name).to_string())
            .collect();
        names.sort();
        Ok(names)
    }
}

impl CompletionProvider for HttpProvider {
    fn display_name(&self) -> &str {
        self.provider.display_name()
    }

    fn ensure_ready(&self) -> Result<(), GenerateError> {
        if self.provider.needs_api_key() {
            self.require_key()?;
        }
        self.require_model().map(|_| ())
    }

    fn complete(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        log::debug!("{} request (model {})", self.provider.name(), self.model);
        match self.provider {
            AIProvider::Ollama => self.complete_ollama(request),
            AIProvider::OpenAI => self.complete_openai(request),
            AIProvider::Claude => self.complete_claude(request),
            AIProvider::Gemini => self.complete_gemini(request),
        }
    }
}

/// Pull a human-readable message out of an error body:
/// `{"error": {"message": ...}}` or `{"error": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
