use super::error_from_response;
use crate::config::{has_key, GeminiSettings};
use crate::prompt::SHOPPING_SYSTEM_PROMPT;
use crate::ProviderError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Generative Language API with model fallback.
///
/// Each candidate model gets up to `max_attempts` tries while the API answers
/// with a rate-limit status, sleeping `backoff * attempt` between tries. Any
/// other failure moves straight on to the next model.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    fallback_models: Vec<String>,
    max_attempts: u32,
    backoff: Duration,
    max_output_tokens: u32,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            fallback_models: settings.fallback_models.clone(),
            max_attempts: settings.max_attempts.max(1),
            backoff: settings.backoff(1),
            max_output_tokens: settings.max_output_tokens,
            timeout: settings.timeout(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        has_key(&self.api_key)
    }

    /// Configured model first, then the fallbacks, without duplicates.
    pub fn candidate_models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = Vec::with_capacity(1 + self.fallback_models.len());
        for model in std::iter::once(&self.model).chain(self.fallback_models.iter()) {
            let model = model.trim();
            if !model.is_empty() && !models.contains(&model) {
                models.push(model);
            }
        }
        models
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
            .ok_or_else(|| ProviderError::Unavailable("gemini api key is not set".to_string()))?;
        let body = generate_request(prompt, system_prompt, self.max_output_tokens);

        let mut last_error: Option<ProviderError> = None;
        for model in self.candidate_models() {
            let url = generate_url(&self.endpoint, model, api_key)?;

            for attempt in 1..=self.max_attempts {
                match self.send_once(url.clone(), &body).await {
                    Ok(text) => return Ok(text),
                    Err(error) if error.is_rate_limited() => {
                        debug!(model, attempt, %error, "gemini rate limited");
                        last_error = Some(error);
                        if attempt < self.max_attempts {
                            tokio::time::sleep(self.backoff * attempt).await;
                        }
                    }
                    Err(error) => {
                        debug!(model, %error, "gemini model failed, trying next");
                        last_error = Some(error);
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::Exhausted("gemini produced no response".to_string())
        }))
    }

    async fn send_once(&self, url: Url, body: &Value) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("gemini", response).await);
        }

        let parsed: Value = response.json().await?;
        Ok(completion_text(&parsed))
    }
}

pub(crate) fn generate_url(endpoint: &str, model: &str, api_key: &str) -> Result<Url, ProviderError> {
    let mut url = Url::parse(&format!("{endpoint}/v1beta/models/{model}:generateContent"))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

pub(crate) fn generate_request(prompt: &str, system_prompt: Option<&str>, max_output_tokens: u32) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{"text": system_prompt.unwrap_or(SHOPPING_SYSTEM_PROMPT)}]
        },
        "contents": [
            {"role": "user", "parts": [{"text": prompt}]}
        ],
        "generationConfig": {
            "temperature": 0.3,
            "maxOutputTokens": max_output_tokens,
        }
    })
}

pub(crate) fn completion_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.pointer("/text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}
