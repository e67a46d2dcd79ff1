//! Deepgram client handle
//!
//! Created once per process and shared read-only behind an `Arc`.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::Config;
use crate::{Error, Result};

/// Authenticated handle to the Deepgram REST API
pub struct DeepgramClient {
    pub(super) http: reqwest::Client,
    api_key: SecretString,
    base_url: Url,
}

impl DeepgramClient {
    /// Create a client for the given key and base URL
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the base URL is malformed
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("DEEPGRAM_API_KEY not set".to_string()));
        }

        // Endpoint paths are joined relative to the base, which needs a trailing slash
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key: SecretString::from(api_key),
            base_url,
        })
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if no Deepgram key is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config
            .api_keys
            .deepgram
            .clone()
            .ok_or_else(|| Error::Config("DEEPGRAM_API_KEY not set".to_string()))?;
        Self::new(key, &config.deepgram_url)
    }

    /// Build an endpoint URL below the base URL
    ///
    /// # Errors
    ///
    /// Returns error if the path cannot be joined
    pub(super) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// `Authorization` header value
    pub(super) fn auth_header(&self) -> String {
        format!("Token {}", self.api_key.expose_secret())
    }
}

impl std::fmt::Debug for DeepgramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepgramClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_config_error() {
        let err = DeepgramClient::new("", "https://api.deepgram.com").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_key_in_config_is_config_error() {
        let err = DeepgramClient::from_config(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("DEEPGRAM_API_KEY"));
    }

    #[test]
    fn endpoint_joins_base() {
        let client = DeepgramClient::new("key", "http://127.0.0.1:1234").unwrap();
        assert_eq!(
            client.endpoint("v1/listen").unwrap().as_str(),
            "http://127.0.0.1:1234/v1/listen"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = DeepgramClient::new("key", "http://proxy.local/deepgram").unwrap();
        assert_eq!(
            client.endpoint("v1/listen").unwrap().as_str(),
            "http://proxy.local/deepgram/v1/listen"
        );

        let client = DeepgramClient::new("key", "http://proxy.local/deepgram/").unwrap();
        assert_eq!(
            client.endpoint("v1/speak").unwrap().as_str(),
            "http://proxy.local/deepgram/v1/speak"
        );
    }

    #[test]
    fn debug_hides_key() {
        let client = DeepgramClient::new("dg-secret", "https://api.deepgram.com").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("dg-secret"));
        assert_eq!(client.auth_header(), "Token dg-secret");
    }
}
