//! Voice collaborators
//!
//! Speech-to-text and text-to-speech are remote capabilities. The
//! [`Transcriber`] and [`Synthesizer`] traits describe them; [`DeepgramClient`]
//! implements both against the Deepgram REST API.

mod client;
pub mod models;
mod stt;
mod tts;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use client::DeepgramClient;

use crate::Result;

/// Lazy, finite, one-pass sequence of synthesized audio chunks
pub type AudioStream = BoxStream<'static, Result<Bytes>>;

/// Options sent with every transcription request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeOptions {
    /// Transcription model (e.g. "nova-3")
    pub model: String,
    /// Language hint (e.g. "en")
    pub language: String,
    /// Ask for punctuation and casing normalization
    pub smart_format: bool,
}

/// Transcription result: channels, each holding ranked alternatives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub channels: Vec<TranscriptChannel>,
}

/// One audio input channel of a transcription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChannel {
    #[serde(default)]
    pub alternatives: Vec<TranscriptAlternative>,
}

/// One candidate transcription for a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAlternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f64,
}

impl Transcription {
    /// Build a single-channel, single-alternative transcription
    #[must_use]
    pub fn single(transcript: impl Into<String>) -> Self {
        Self {
            channels: vec![TranscriptChannel {
                alternatives: vec![TranscriptAlternative {
                    transcript: transcript.into(),
                    confidence: 1.0,
                }],
            }],
        }
    }

    /// Transcript of the first alternative of the first channel
    ///
    /// No ranking is applied; `None` when either list is empty.
    #[must_use]
    pub fn first_transcript(&self) -> Option<&str> {
        self.channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.as_str())
    }
}

/// Speech-to-text capability
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio clip
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the audio or the request fails
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
        options: &TranscribeOptions,
    ) -> Result<Transcription>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Text-to-speech capability
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize text with the given voice model
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the request
    async fn synthesize(&self, text: &str, voice_model: &str) -> Result<AudioStream>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Guess an audio MIME type from a file extension
///
/// Falls back to `audio/wav`, the format of browser WAV captures.
#[must_use]
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "webm" => "audio/webm",
        "ogg" | "opus" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "audio/wav",
    }
}
