//! Completion-service abstraction.
//!
//! The generation loop treats the model as a pure function of (system text, user text)
//! to completion text. Supports Anthropic and OpenAI-compatible APIs (OpenAI, Groq, local
//! proxies). Uses blocking HTTP via `ureq`; the loop is synchronous.

use gca_core::ProviderConfig;
use gca_guard::Prompt;
use serde_json::Value;

/// Errors from completion calls. All of them are fatal to the generation loop.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("empty response from LLM")]
    EmptyResponse,
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("unknown provider: '{name}'. Available: {available}")]
    UnknownProvider { name: String, available: String },
}

/// A completed LLM response.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The text content of the response.
    pub text: String,
    /// Input tokens used (from API response, if reported).
    pub input_tokens: Option<u64>,
    /// Output tokens used (from API response, if reported).
    pub output_tokens: Option<u64>,
}

impl LlmResponse {
    /// A response without usage figures.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
        }
    }
}

/// Abstraction over completion services.
pub trait LlmProvider: Send {
    /// Send one stateless completion request.
    fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<LlmResponse, ProviderError>;

    /// The model name (for display/logging).
    fn model_name(&self) -> &str;
}

fn http_agent() -> ureq::Agent {
    ureq::Agent::new_with_config(
        ureq::config::Config::builder()
            .timeout_global(Some(std::time::Duration::from_secs(120)))
            .http_status_as_error(false)
            .build(),
    )
}

/// Read the JSON body and turn non-2xx statuses into [`ProviderError::Api`].
fn read_json_body(
    response: &mut ureq::http::Response<ureq::Body>,
) -> Result<Value, ProviderError> {
    let status = response.status();
    let json: Value = response
        .body_mut()
        .read_json()
        .map_err(|e| ProviderError::Parse(e.to_string()))?;

    if let Some(err) = json.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| err.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }
    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: json.to_string(),
        });
    }
    Ok(json)
}

fn usage_field(json: &Value, field: &str) -> Option<u64> {
    json.get("usage")
        .and_then(|u| u.get(field))
        .and_then(|t| t.as_u64())
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

/// Anthropic provider using the Messages API.
#[cfg(feature = "anthropic")]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

#[cfg(feature = "anthropic")]
impl AnthropicProvider {
    pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
    pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
    const API_URL: &str = "https://api.anthropic.com/v1/messages";

    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            agent: http_agent(),
        }
    }
}

#[cfg(feature = "anthropic")]
impl LlmProvider for AnthropicProvider {
    fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<LlmResponse, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 4096,
            "temperature": temperature,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let mut response = self
            .agent
            .post(Self::API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .send_json(&body)
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let json = read_json_body(&mut response)?;

        // Extract text from content blocks
        let text = json
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| {
                arr.iter()
                    .find_map(|block| block.get("text").and_then(|t| t.as_str()))
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?
            .to_string();

        Ok(LlmResponse {
            text,
            input_tokens: usage_field(&json, "input_tokens"),
            output_tokens: usage_field(&json, "output_tokens"),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// OpenAI Chat Completions API
// ---------------------------------------------------------------------------

/// OpenAI-compatible provider (works with OpenAI, Groq, Azure, local proxies).
#[cfg(feature = "openai")]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    agent: ureq::Agent,
}

#[cfg(feature = "openai")]
impl OpenAiProvider {
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
    const DEFAULT_BASE_URL: &str = "https://api.openai.com";

    pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
    pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
    const GROQ_BASE_URL: &str = "https://api.groq.com/openai";

    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            agent: http_agent(),
        }
    }

    /// Groq's OpenAI-compatible endpoint.
    pub fn groq(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self::new(
            api_key,
            Some(model.unwrap_or_else(|| Self::GROQ_MODEL.to_string())),
            Some(base_url.unwrap_or_else(|| Self::GROQ_BASE_URL.to_string())),
        )
    }
}

#[cfg(feature = "openai")]
impl LlmProvider for OpenAiProvider {
    fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<LlmResponse, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 4096,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ]
        });

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .send_json(&body)
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let json = read_json_body(&mut response)?;

        // Extract text from choices
        let text = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .filter(|t| !t.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?
            .to_string();

        Ok(LlmResponse {
            text,
            input_tokens: usage_field(&json, "prompt_tokens"),
            output_tokens: usage_field(&json, "completion_tokens"),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn api_key(config: &ProviderConfig, default_env: &str) -> Result<String, ProviderError> {
    let var = config.api_key_env.as_deref().unwrap_or(default_env);
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ProviderError::MissingApiKey(var.to_string())),
    }
}

/// Create a provider from configuration, reading its API key from the environment.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>, ProviderError> {
    match config.name.as_str() {
        #[cfg(feature = "anthropic")]
        "anthropic" => Ok(Box::new(AnthropicProvider::new(
            api_key(config, AnthropicProvider::API_KEY_ENV)?,
            config.model.clone(),
        ))),
        #[cfg(feature = "openai")]
        "openai" => Ok(Box::new(OpenAiProvider::new(
            api_key(config, OpenAiProvider::API_KEY_ENV)?,
            config.model.clone(),
            config.base_url.clone(),
        ))),
        #[cfg(feature = "openai")]
        "groq" => Ok(Box::new(OpenAiProvider::groq(
            api_key(config, OpenAiProvider::GROQ_API_KEY_ENV)?,
            config.model.clone(),
            config.base_url.clone(),
        ))),
        other => Err(ProviderError::UnknownProvider {
            name: other.to_string(),
            available: available_providers().join(", "),
        }),
    }
}

/// List compiled-in provider names.
pub fn available_providers() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "anthropic")]
        "anthropic",
        #[cfg(feature = "openai")]
        "openai",
        #[cfg(feature = "openai")]
        "groq",
    ]
}

/// Remove markdown code fences around a completion.
///
/// A completion that starts with a fence loses its first line (and the language tag);
/// a trailing fence is dropped. Anything else is only trimmed, so backticks inside the
/// code itself survive.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = rest.split_once('\n').map_or("", |(_, body)| body);
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body);
        return body.trim().to_string();
    }

    trimmed.to_string()
}
