use super::{error_from_response, DEFAULT_SYSTEM_PROMPT};
use crate::config::OllamaSettings;
use crate::ProviderError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Local model server. One request per call, no retry.
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
    probe_timeout: Duration,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(settings: &OllamaSettings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            probe_timeout: settings.probe_timeout(),
            timeout: settings.timeout(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists installed models with a short timeout and checks ours is among them.
    pub async fn probe(&self) -> bool {
        let response = match self
            .client
            .get(format!("{}/api/tags", self.endpoint))
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = %response.status(), "ollama probe rejected");
                return false;
            }
            Err(error) => {
                debug!(%error, "ollama probe failed");
                return false;
            }
        };

        match response.json::<Value>().await {
            Ok(body) => model_listed(&body, &self.model),
            Err(_) => false,
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .timeout(self.timeout)
            .json(&generate_request(&self.model, prompt, system_prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("ollama", response).await);
        }

        let body: Value = response.json().await?;
        Ok(completion_text(&body))
    }
}

pub(crate) fn generate_request(model: &str, prompt: &str, system_prompt: Option<&str>) -> Value {
    json!({
        "model": model,
        "system": system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT),
        "prompt": prompt,
        "stream": false,
        "options": {
            "temperature": 0.2,
            "num_ctx": 512,
            "num_predict": 128,
            "num_batch": 8,
        },
        "keep_alive": "0s",
    })
}

pub(crate) fn model_listed(tags: &Value, model: &str) -> bool {
    tags.pointer("/models")
        .and_then(Value::as_array)
        .map(|models| {
            models
                .iter()
                .filter_map(|entry| entry.pointer("/name").and_then(Value::as_str))
                .any(|name| name == model)
        })
        .unwrap_or(false)
}

pub(crate) fn completion_text(body: &Value) -> String {
    body.pointer("/response")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}
