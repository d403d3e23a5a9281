//! Language-model backends behind one `generate` contract.
//!
//! Exactly one backend is configured as active, but selection always walks a
//! fixed precedence (OpenAI, Gemini, Ollama) and takes the first backend whose
//! availability check passes. A chat turn makes a single generation call on
//! that backend; failures are not retried on the next one.

pub mod gemini;
pub mod ollama;
pub mod openai;

use crate::config::ProviderSettings;
use crate::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful ecommerce shopping assistant. \
Answer only using the provided product list. \
If there is no good match, say so and suggest closest items.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Local-model output must pass the generic-text and grounding checks;
    /// commercial APIs only the refusal and empty checks.
    pub fn requires_grounding_checks(&self) -> bool {
        matches!(self, ProviderKind::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(format!(
                "unknown provider `{other}` (expected ollama, openai or gemini)"
            )),
        }
    }
}

/// Text produced by one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub provider: ProviderKind,
    pub model: String,
    pub text: String,
}

#[async_trait]
pub trait TextGenerator {
    fn active_provider(&self) -> ProviderKind;

    fn active_model(&self) -> String;

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<Generation, ProviderError>;
}

pub enum LanguageModel {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
    Ollama(OllamaClient),
}

impl LanguageModel {
    pub fn kind(&self) -> ProviderKind {
        match self {
            LanguageModel::OpenAi(_) => ProviderKind::OpenAi,
            LanguageModel::Gemini(_) => ProviderKind::Gemini,
            LanguageModel::Ollama(_) => ProviderKind::Ollama,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LanguageModel::OpenAi(client) => client.model(),
            LanguageModel::Gemini(client) => client.model(),
            LanguageModel::Ollama(client) => client.model(),
        }
    }

    pub async fn is_available(&self, active: ProviderKind) -> bool {
        if self.kind() != active {
            return false;
        }
        match self {
            LanguageModel::OpenAi(client) => client.has_credential(),
            LanguageModel::Gemini(client) => client.has_credential(),
            LanguageModel::Ollama(client) => client.probe().await,
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ProviderError> {
        match self {
            LanguageModel::OpenAi(client) => client.generate(prompt, system_prompt).await,
            LanguageModel::Gemini(client) => client.generate(prompt, system_prompt).await,
            LanguageModel::Ollama(client) => client.generate(prompt, system_prompt).await,
        }
    }
}

pub struct ProviderChain {
    active: ProviderKind,
    models: Vec<LanguageModel>,
}

impl ProviderChain {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            active: settings.active,
            models: vec![
                LanguageModel::OpenAi(OpenAiClient::new(&settings.openai)),
                LanguageModel::Gemini(GeminiClient::new(&settings.gemini)),
                LanguageModel::Ollama(OllamaClient::new(&settings.ollama)),
            ],
        }
    }

    /// First backend in precedence order whose availability check passes.
    pub async fn select(&self) -> Option<&LanguageModel> {
        for model in &self.models {
            if model.is_available(self.active).await {
                debug!(provider = %model.kind(), model = model.model(), "provider selected");
                return Some(model);
            }
        }
        debug!(active = %self.active, "no provider available");
        None
    }
}

#[async_trait]
impl TextGenerator for ProviderChain {
    fn active_provider(&self) -> ProviderKind {
        self.active
    }

    fn active_model(&self) -> String {
        self.models
            .iter()
            .find(|model| model.kind() == self.active)
            .map(|model| model.model().to_string())
            .unwrap_or_default()
    }

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<Generation, ProviderError> {
        let model = self.select().await.ok_or_else(|| {
            ProviderError::Unavailable(format!("{} is not configured or reachable", self.active))
        })?;

        let text = model.generate(prompt, system_prompt).await?;
        Ok(Generation {
            provider: model.kind(),
            model: model.model().to_string(),
            text,
        })
    }
}

pub(crate) async fn error_from_response(
    provider: &str,
    response: reqwest::Response,
) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Api {
        provider: provider.to_string(),
        status,
        details: body.chars().take(300).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_names() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("gemini".parse::<ProviderKind>(), Ok(ProviderKind::Gemini));
        assert!("claude".parse::<ProviderKind>().is_err());
        assert_eq!(
            serde_json::to_string(&ProviderKind::OpenAi).expect("serialize"),
            "\"openai\""
        );
    }

    #[test]
    fn only_local_model_requires_grounding() {
        assert!(ProviderKind::Ollama.requires_grounding_checks());
        assert!(!ProviderKind::OpenAi.requires_grounding_checks());
        assert!(!ProviderKind::Gemini.requires_grounding_checks());
    }

    #[tokio::test]
    async fn commercial_provider_with_key_is_selected_without_probing() {
        let mut settings = ProviderSettings {
            active: ProviderKind::OpenAi,
            ..ProviderSettings::default()
        };
        settings.openai.api_key = Some("sk-test".to_string());

        let chain = ProviderChain::from_settings(&settings);
        let selected = chain.select().await.map(LanguageModel::kind);

        assert_eq!(selected, Some(ProviderKind::OpenAi));
        assert_eq!(chain.active_model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn inactive_or_keyless_providers_are_skipped() {
        let mut settings = ProviderSettings {
            active: ProviderKind::Gemini,
            ..ProviderSettings::default()
        };
        settings.openai.api_key = Some("sk-test".to_string());

        let chain = ProviderChain::from_settings(&settings);
        assert!(chain.select().await.is_none());

        let error = chain
            .generate("prompt", None)
            .await
            .expect_err("nothing is available");
        assert!(matches!(error, ProviderError::Unavailable(_)));
    }
}
