use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Retrieval plus generation, gated by answer quality checks.
    #[default]
    Llm,
    /// Retrieval only; answers always come from the template builder.
    Catalog,
    /// Generation only, no catalog grounding.
    General,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Llm => "llm",
            ChatMode::Catalog => "catalog",
            ChatMode::General => "general",
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "llm" => Ok(ChatMode::Llm),
            "catalog" => Ok(ChatMode::Catalog),
            "general" => Ok(ChatMode::General),
            other => Err(format!("unknown chat mode `{other}` (expected llm, catalog or general)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub chat_mode: ChatMode,
    pub debug: bool,
    /// Neighbours retrieved per chat turn.
    pub default_top_k: usize,
    /// Hits returned by a bare semantic search.
    pub search_top_k: usize,
    pub providers: ProviderSettings,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chat_mode: ChatMode::default(),
            debug: false,
            default_top_k: 6,
            search_top_k: 12,
            providers: ProviderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub active: ProviderKind,
    pub ollama: OllamaSettings,
    pub openai: OpenAiSettings,
    pub gemini: GeminiSettings,
}

impl ProviderSettings {
    pub fn active_model(&self) -> &str {
        match self.active {
            ProviderKind::Ollama => &self.ollama.model,
            ProviderKind::OpenAi => &self.openai.model,
            ProviderKind::Gemini => &self.gemini.model,
        }
    }

    pub fn credential_loaded(&self) -> bool {
        match self.active {
            ProviderKind::Ollama => false,
            ProviderKind::OpenAi => has_key(&self.openai.api_key),
            ProviderKind::Gemini => has_key(&self.gemini.api_key),
        }
    }
}

pub(crate) fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub base_url: String,
    pub model: String,
    pub probe_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "phi3:mini".to_string(),
            probe_timeout_secs: 2,
            timeout_secs: 30,
        }
    }
}

impl OllamaSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 180,
            timeout_secs: 30,
        }
    }
}

impl OpenAiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub fallback_models: Vec<String>,
    pub max_attempts: u32,
    pub backoff_millis: u64,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            fallback_models: vec![
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-flash-8b".to_string(),
            ],
            max_attempts: 3,
            backoff_millis: 1_200,
            max_output_tokens: 256,
            timeout_secs: 30,
        }
    }
}

impl GeminiSettings {
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_millis.saturating_mul(u64::from(attempt)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_mode_parses_case_insensitively() {
        assert_eq!("Catalog".parse::<ChatMode>(), Ok(ChatMode::Catalog));
        assert_eq!(" llm ".parse::<ChatMode>(), Ok(ChatMode::Llm));
        assert!("chatty".parse::<ChatMode>().is_err());
    }

    #[test]
    fn gemini_backoff_is_linear() {
        let settings = GeminiSettings::default();
        assert_eq!(settings.backoff(1), Duration::from_millis(1_200));
        assert_eq!(settings.backoff(3), Duration::from_millis(3_600));
    }

    #[test]
    fn blank_credentials_are_not_loaded() {
        let mut settings = ProviderSettings {
            active: ProviderKind::OpenAi,
            ..ProviderSettings::default()
        };
        settings.openai.api_key = Some("   ".to_string());
        assert!(!settings.credential_loaded());

        settings.openai.api_key = Some("sk-test".to_string());
        assert!(settings.credential_loaded());
        assert_eq!(settings.active_model(), "gpt-4o-mini");
    }

    #[test]
    fn config_round_trips_through_json() {
        let config: AssistantConfig = serde_json::from_str(
            r#"{
                "chat_mode": "catalog",
                "debug": true,
                "default_top_k": 4,
                "providers": {
                    "active": "gemini",
                    "ollama": {"base_url": "http://ollama:11434", "model": "llama3", "probe_timeout_secs": 1, "timeout_secs": 10},
                    "openai": {"base_url": "https://api.openai.com/v1", "api_key": null, "model": "gpt-4o-mini", "max_tokens": 180, "timeout_secs": 30},
                    "gemini": {"base_url": "https://generativelanguage.googleapis.com", "api_key": "g-key", "model": "gemini-1.5-pro", "fallback_models": [], "max_attempts": 2, "backoff_millis": 0, "max_output_tokens": 128, "timeout_secs": 5}
                }
            }"#,
        )
        .expect("config should deserialize");

        assert_eq!(config.chat_mode, ChatMode::Catalog);
        assert_eq!(config.providers.active, ProviderKind::Gemini);
        assert_eq!(config.providers.active_model(), "gemini-1.5-pro");
        assert!(config.providers.credential_loaded());
        assert_eq!(config.search_top_k, 12);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AssistantConfig = serde_json::from_str(
            r#"{"chat_mode": "catalog", "providers": {"active": "gemini", "gemini": {"api_key": "g-key"}}}"#,
        )
        .expect("partial config should deserialize");

        assert_eq!(config.chat_mode, ChatMode::Catalog);
        assert!(!config.debug);
        assert_eq!(config.default_top_k, 6);
        assert_eq!(config.search_top_k, 12);
        assert_eq!(config.providers.active_model(), "gemini-1.5-flash");
        assert_eq!(config.providers.gemini.fallback_models.len(), 2);
        assert_eq!(config.providers.gemini.max_attempts, 3);
        assert_eq!(config.providers.ollama.model, "phi3:mini");
        assert!(config.providers.credential_loaded());

        let empty: AssistantConfig = serde_json::from_str("{}").expect("empty config should deserialize");
        assert_eq!(empty.chat_mode, ChatMode::Llm);
        assert_eq!(empty.providers.active, ProviderKind::Ollama);
    }
}
