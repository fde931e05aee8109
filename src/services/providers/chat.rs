/// OpenAI-compatible chat completions provider for the styling assistant
use reqwest::Client as HttpClient;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::chat::{ChatMessage, CompletionRequest, CompletionResponse},
};

pub const MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const STYLIST_PROMPT: &str = "You are a fashion stylist and outfit advisor. Help users with:
- Outfit suggestions and combinations
- Fashion advice and trends
- Clothing recommendations based on occasions
- Color coordination and style tips
- Wardrobe organization and planning

Be helpful, creative, and provide practical fashion advice.
Keep responses conversational but informative.";

#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Returns the assistant's reply to a conversation
    async fn complete(&self, messages: &[ChatMessage], temperature: f64) -> AppResult<String>;

    fn name(&self) -> &'static str;
}

/// Builds the stylist conversation: system prompt, optional context, user message
pub fn stylist_messages(message: &str, context: Option<&Map<String, Value>>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(STYLIST_PROMPT)];

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        messages.push(ChatMessage::system(format!(
            "Additional context: {}",
            Value::Object(context.clone())
        )));
    }

    messages.push(ChatMessage::user(message));
    messages
}

#[derive(Clone)]
pub struct OpenAiChatProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiChatProvider {
    pub fn new(api_key: String, api_url: String, model: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiChatProvider {
    async fn complete(&self, messages: &[ChatMessage], temperature: f64) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url);
        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Chat API returned status {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        let reply = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("Chat API returned no choices".to_string()))?;

        tracing::info!(
            model = %self.model,
            reply_len = reply.len(),
            provider = "openai",
            "Chat completion received"
        );

        Ok(reply)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
