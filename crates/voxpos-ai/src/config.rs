//! Assistant configuration.

use std::time::Duration;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default speech-to-text model.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default chat model for intent inference.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the transcription and inference collaborators.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Bearer token for the API
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API (no trailing `/v1`)
    pub base_url: String,
    /// Speech-to-text model
    pub transcription_model: String,
    /// Chat model producing the intent JSON
    pub chat_model: String,
    /// Spoken language hint (ISO-639-1)
    pub language: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            language: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AssistantConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = std::env::var("VOXPOS_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();

        let base_url = std::env::var("VOXPOS_AI_URL").unwrap_or(defaults.base_url);

        let transcription_model =
            std::env::var("VOXPOS_STT_MODEL").unwrap_or(defaults.transcription_model);

        let chat_model = std::env::var("VOXPOS_CHAT_MODEL").unwrap_or(defaults.chat_model);

        let language = std::env::var("VOXPOS_LANGUAGE").unwrap_or(defaults.language);

        let timeout_secs = std::env::var("VOXPOS_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            api_key,
            base_url,
            transcription_model,
            chat_model,
            language,
            timeout_secs,
        }
    }

    /// Check if the config is usable (has an API key).
    pub fn is_valid(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Create a builder for configuration.
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }
}

/// Builder for assistant configuration.
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn transcription_model(mut self, model: impl Into<String>) -> Self {
        self.config.transcription_model = model.into();
        self
    }

    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn build(self) -> AssistantConfig {
        self.config
    }
}
