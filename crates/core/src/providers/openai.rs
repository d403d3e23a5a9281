use super::error_from_response;
use crate::config::{has_key, OpenAiSettings};
use crate::prompt::SHOPPING_SYSTEM_PROMPT;
use crate::ProviderError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Chat-completions API. Single request with a system and a user message.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(settings: &OpenAiSettings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            timeout: settings.timeout(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        has_key(&self.api_key)
    }

    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::Unavailable("openai api key is not set".to_string()))?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&chat_request(&self.model, self.max_tokens, prompt, system_prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("openai", response).await);
        }

        let body: Value = response.json().await?;
        Ok(completion_text(&body))
    }
}

pub(crate) fn chat_request(
    model: &str,
    max_tokens: u32,
    prompt: &str,
    system_prompt: Option<&str>,
) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_prompt.unwrap_or(SHOPPING_SYSTEM_PROMPT)},
            {"role": "user", "content": prompt},
        ],
        "temperature": 0.3,
        "max_tokens": max_tokens,
    })
}

pub(crate) fn completion_text(body: &Value) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}
