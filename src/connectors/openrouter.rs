use super::config::OpenRouterConfig;
use super::errors::ConnectorError;
use super::http;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A chat-completion backend returning the assistant's text.
#[async_trait]
pub trait CompletionConnector: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, ConnectorError>;
}

pub struct OpenRouterClient {
    base_url: String,
    model: String,
    referer: String,
    title: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: &OpenRouterConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
            api_key: config.api_key.clone(),
            http_client: http::build_client(config.timeout_secs)?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionConnector for OpenRouterClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ConnectorError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ConnectorError::NotConfigured("OpenRouter API key not configured".to_string())
        })?;

        let mut body = serde_json::to_value(&request)
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;
        body["model"] = serde_json::Value::String(self.model.clone());

        let span = tracing::info_span!(
            "openrouter_completion",
            model = %self.model,
            messages = request.messages.len()
        );
        let builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body);

        let payload = http::send_json("OpenRouter", builder, span).await?;

        Ok(payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}
