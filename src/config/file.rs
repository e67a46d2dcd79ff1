//! TOML configuration file loading
//!
//! Supports `~/.config/audio-dojo/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct DojoConfigFile {
    /// Default instruction text shown on the recording page
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Deepgram endpoint configuration
    #[serde(default)]
    pub deepgram: DeepgramFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT model (e.g. "nova-3")
    pub stt_model: Option<String>,

    /// Language hint passed to STT (e.g. "en")
    pub stt_language: Option<String>,

    /// Ask STT for punctuation and casing
    pub smart_format: Option<bool>,

    /// TTS voice model (e.g. "aura-2-asteria-en")
    pub tts_model: Option<String>,
}

/// API keys configuration
#[derive(Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub deepgram: Option<String>,
}

impl std::fmt::Debug for ApiKeysFileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeysFileConfig")
            .field("deepgram", &self.deepgram.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Deepgram endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct DeepgramFileConfig {
    /// Base URL override (self-hosted or proxy deployments)
    pub base_url: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory of static files served as fallback
    pub static_dir: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `DojoConfigFile::default()` if the file doesn't exist or can't be
/// read or parsed; failures are logged.
pub fn load_config_file() -> DojoConfigFile {
    let Some(path) = config_file_path() else {
        return DojoConfigFile::default();
    };

    match load_config_file_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            DojoConfigFile::default()
        }
    }
}

/// Load the TOML config file from an explicit path
///
/// A missing file yields defaults.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn load_config_file_from(path: &Path) -> Result<DojoConfigFile> {
    if !path.exists() {
        return Ok(DojoConfigFile::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/audio-dojo/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("audio-dojo").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.voice.stt_model.is_none());
        assert!(config.api_keys.deepgram.is_none());
    }

    #[test]
    fn partial_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
system_prompt = "Be terse."

[voice]
stt_model = "nova-2"
smart_format = false

[server]
port = 9000
"#
        )
        .unwrap();

        let config = load_config_file_from(file.path()).unwrap();
        assert_eq!(config.system_prompt.as_deref(), Some("Be terse."));
        assert_eq!(config.voice.stt_model.as_deref(), Some("nova-2"));
        assert_eq!(config.voice.smart_format, Some(false));
        assert!(config.voice.tts_model.is_none());
        assert_eq!(config.server.port, Some(9000));
    }

    #[test]
    fn malformed_file_is_toml_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[voice\nstt_model = ").unwrap();

        let err = load_config_file_from(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Toml(_)));
    }

    #[test]
    fn unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file_from(dir.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let keys = ApiKeysFileConfig {
            deepgram: Some("dg-secret".to_string()),
        };
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("dg-secret"));
        assert!(rendered.contains("redacted"));
    }
}
