//! Configuration management for Audio Dojo

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

use file::DojoConfigFile;

/// Default Deepgram API base URL
pub const DEFAULT_DEEPGRAM_URL: &str = "https://api.deepgram.com";

/// Default STT model
pub const DEFAULT_STT_MODEL: &str = "nova-3";

/// Default STT language hint
pub const DEFAULT_STT_LANGUAGE: &str = "en";

/// Default TTS voice model
pub const DEFAULT_TTS_MODEL: &str = "aura-2-asteria-en";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8501;

/// Default instruction text for the recording page
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Keep responses brief.";

/// Audio Dojo configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API keys
    pub api_keys: ApiKeys,

    /// Deepgram API base URL
    pub deepgram_url: String,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Default instruction text
    pub system_prompt: String,
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `Deepgram` API key (STT and TTS)
    pub deepgram: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("deepgram", &self.deepgram.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model (e.g. "nova-3")
    pub stt_model: String,

    /// Language hint passed to STT
    pub stt_language: String,

    /// Request punctuation/casing normalization from STT
    pub smart_format: bool,

    /// TTS voice model (e.g. "aura-2-asteria-en")
    pub tts_model: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: DEFAULT_STT_MODEL.to_string(),
            stt_language: DEFAULT_STT_LANGUAGE.to_string(),
            smart_format: true,
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory, served as fallback
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            deepgram_url: DEFAULT_DEEPGRAM_URL.to_string(),
            voice: VoiceConfig::default(),
            api_server: ApiServerConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the config file and the process environment
    ///
    /// A missing Deepgram key is not an error here; it surfaces when the
    /// client handle is created.
    ///
    /// # Errors
    ///
    /// Returns error if an override holds an invalid value
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to load .env"),
        }

        let file = file::load_config_file();
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed config file and an environment lookup
    ///
    /// Priority: environment → config file → defaults. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the port or base URL is malformed
    pub fn from_sources<F>(file: DojoConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let deepgram_key = env("DEEPGRAM_API_KEY").or(file.api_keys.deepgram);

        let deepgram_url = env("DEEPGRAM_BASE_URL")
            .or(file.deepgram.base_url)
            .unwrap_or(defaults.deepgram_url);
        url::Url::parse(&deepgram_url)?;

        let voice = VoiceConfig {
            stt_model: env("DOJO_STT_MODEL")
                .or(file.voice.stt_model)
                .unwrap_or(defaults.voice.stt_model),
            stt_language: env("DOJO_STT_LANGUAGE")
                .or(file.voice.stt_language)
                .unwrap_or(defaults.voice.stt_language),
            smart_format: file.voice.smart_format.unwrap_or(defaults.voice.smart_format),
            tts_model: env("DOJO_TTS_MODEL")
                .or(file.voice.tts_model)
                .unwrap_or(defaults.voice.tts_model),
        };

        let port = match env("DOJO_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid DOJO_PORT: {raw}")))?,
            None => file.server.port.unwrap_or(defaults.api_server.port),
        };

        let static_dir = env("DOJO_STATIC_DIR")
            .or(file.server.static_dir)
            .map(PathBuf::from);

        let system_prompt = env("DOJO_SYSTEM_PROMPT")
            .or(file.system_prompt)
            .unwrap_or(defaults.system_prompt);

        Ok(Self {
            api_keys: ApiKeys {
                deepgram: deepgram_key,
            },
            deepgram_url,
            voice,
            api_server: ApiServerConfig { port, static_dir },
            system_prompt,
        })
    }
}
