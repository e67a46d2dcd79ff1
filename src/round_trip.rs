//! Voice round trip: audio → transcript → echo reply → synthesized audio
//!
//! One [`RoundTrip`] is built per process around the shared client handle.
//! Each call to [`RoundTrip::handle_utterance`] is an independent, strictly
//! sequential interaction: at most one STT call, at most one TTS call, no
//! retries and nothing carried over to the next interaction.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use uuid::Uuid;

use crate::config::VoiceConfig;
use crate::voice::{AudioStream, DeepgramClient, Synthesizer, TranscribeOptions, Transcriber};
use crate::{Error, Result};

/// Fixed prefix of every reply
pub const RESPONSE_PREFIX: &str = "I heard you say: ";

/// Build the reply for a transcript
///
/// The transcript is appended verbatim: no trimming, no case changes.
#[must_use]
pub fn echo_response(transcript: &str) -> String {
    format!("{RESPONSE_PREFIX}{transcript}")
}

/// Concatenate synthesized chunks in delivery order
///
/// Drains the stream fully. An empty stream yields an empty buffer; the
/// first failing chunk aborts with its error.
///
/// # Errors
///
/// Returns the first error yielded by the stream
pub async fn collect_chunks<S>(stream: S) -> Result<Vec<u8>>
where
    S: Stream<Item = Result<Bytes>>,
{
    stream
        .try_fold(Vec::new(), |mut audio, chunk| async move {
            audio.extend_from_slice(&chunk);
            Ok::<_, Error>(audio)
        })
        .await
}

/// Produces reply text from a transcript
///
/// The instruction text (system prompt) supplied with the utterance is
/// handed through so a generating responder can use it.
pub trait Responder: Send + Sync {
    /// Build the reply for `transcript`
    fn respond(&self, transcript: &str, instruction: &str) -> String;
}

/// Replies with [`echo_response`] and ignores the instruction text
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

impl Responder for EchoResponder {
    fn respond(&self, transcript: &str, _instruction: &str) -> String {
        echo_response(transcript)
    }
}

/// Lifecycle of a single interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Transcribing,
    Transcribed,
    Synthesizing,
    Done,
    Failed,
}

impl Stage {
    /// Whether the linear lifecycle allows moving from `self` to `next`
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Transcribing | Self::Failed)
                | (Self::Transcribing, Self::Transcribed | Self::Failed)
                | (Self::Transcribed, Self::Synthesizing)
                | (Self::Synthesizing, Self::Done | Self::Failed)
        )
    }

    /// Terminal stages end the interaction
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Transcribing => "transcribing",
            Self::Transcribed => "transcribed",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Stage tracker for one interaction
struct Interaction {
    id: Uuid,
    stage: Stage,
}

impl Interaction {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Idle,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid stage transition {} -> {next}",
            self.stage
        );
        tracing::debug!(
            interaction = %self.id,
            from = %self.stage,
            to = %next,
            "stage transition"
        );
        self.stage = next;
    }
}

/// One recorded utterance
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Raw container bytes (WAV, WebM, Ogg, ...)
    pub data: Bytes,
    /// MIME type forwarded to the transcription provider
    pub content_type: String,
}

impl AudioClip {
    /// Wrap bytes with their MIME type
    #[must_use]
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }
}

/// Models used for one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripOptions {
    /// Transcription request options
    pub transcribe: TranscribeOptions,
    /// TTS voice model
    pub voice_model: String,
}

impl From<&VoiceConfig> for RoundTripOptions {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            transcribe: TranscribeOptions {
                model: config.stt_model.clone(),
                language: config.stt_language.clone(),
                smart_format: config.smart_format,
            },
            voice_model: config.tts_model.clone(),
        }
    }
}

/// Result of a completed round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub transcript: String,
    pub response_text: String,
    pub audio: Vec<u8>,
}

/// Round trip failure, tagged with the stage that failed
#[derive(Debug, thiserror::Error)]
pub enum RoundTripError {
    /// Nothing to transcribe
    #[error("audio clip is empty")]
    EmptyAudio,

    /// STT failed; no transcript exists
    #[error("transcription failed: {0}")]
    Transcription(#[source] Error),

    /// TTS failed after a transcript was produced
    #[error("synthesis failed: {source}")]
    Synthesis {
        transcript: String,
        response_text: String,
        #[source]
        source: Error,
    },
}

impl RoundTripError {
    /// Stage the interaction was in when it failed
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::EmptyAudio => Stage::Idle,
            Self::Transcription(_) => Stage::Transcribing,
            Self::Synthesis { .. } => Stage::Synthesizing,
        }
    }

    /// Transcript produced before the failure, if any
    #[must_use]
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::Synthesis { transcript, .. } => Some(transcript),
            _ => None,
        }
    }

    /// Reply text produced before the failure, if any
    #[must_use]
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Synthesis { response_text, .. } => Some(response_text),
            _ => None,
        }
    }
}

/// Voice round-trip orchestrator
#[derive(Clone)]
pub struct RoundTrip {
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn Synthesizer>,
    responder: Arc<dyn Responder>,
    options: RoundTripOptions,
}

impl RoundTrip {
    /// Create an orchestrator over the given collaborators with echo replies
    #[must_use]
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn Synthesizer>,
        options: RoundTripOptions,
    ) -> Self {
        Self {
            transcriber,
            synthesizer,
            responder: Arc::new(EchoResponder),
            options,
        }
    }

    /// Create an orchestrator using one Deepgram handle for both directions
    #[must_use]
    pub fn deepgram(client: Arc<DeepgramClient>, voice: &VoiceConfig) -> Self {
        Self::new(client.clone(), client, RoundTripOptions::from(voice))
    }

    /// Replace the reply builder
    #[must_use]
    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = responder;
        self
    }

    /// Default options used by [`Self::handle_utterance`]
    #[must_use]
    pub const fn options(&self) -> &RoundTripOptions {
        &self.options
    }

    /// Run one round trip with the default options
    ///
    /// # Errors
    ///
    /// Returns error if the clip is empty, transcription fails, or synthesis fails
    pub async fn handle_utterance(
        &self,
        clip: AudioClip,
        instruction: &str,
    ) -> std::result::Result<Utterance, RoundTripError> {
        self.handle_utterance_with(clip, instruction, &self.options)
            .await
    }

    /// Run one round trip with explicit model options
    ///
    /// # Errors
    ///
    /// Returns error if the clip is empty, transcription fails, or synthesis fails
    pub async fn handle_utterance_with(
        &self,
        clip: AudioClip,
        instruction: &str,
        options: &RoundTripOptions,
    ) -> std::result::Result<Utterance, RoundTripError> {
        let mut interaction = Interaction::new();
        tracing::info!(
            interaction = %interaction.id,
            audio_bytes = clip.data.len(),
            content_type = %clip.content_type,
            "round trip started"
        );

        if clip.data.is_empty() {
            interaction.advance(Stage::Failed);
            return Err(RoundTripError::EmptyAudio);
        }

        interaction.advance(Stage::Transcribing);
        let transcript = match self.transcribe(clip, &options.transcribe).await {
            Ok(transcript) => transcript,
            Err(e) => {
                interaction.advance(Stage::Failed);
                tracing::warn!(
                    interaction = %interaction.id,
                    error = %e,
                    "round trip halted at transcription"
                );
                return Err(RoundTripError::Transcription(e));
            }
        };
        interaction.advance(Stage::Transcribed);

        let response_text = self.responder.respond(&transcript, instruction);

        interaction.advance(Stage::Synthesizing);
        let audio = match self.speak(&response_text, &options.voice_model).await {
            Ok(audio) => audio,
            Err(e) => {
                interaction.advance(Stage::Failed);
                tracing::warn!(
                    interaction = %interaction.id,
                    error = %e,
                    "round trip halted at synthesis"
                );
                return Err(RoundTripError::Synthesis {
                    transcript,
                    response_text,
                    source: e,
                });
            }
        };
        interaction.advance(Stage::Done);

        tracing::info!(
            interaction = %interaction.id,
            transcript_len = transcript.len(),
            audio_bytes = audio.len(),
            "round trip complete"
        );

        Ok(Utterance {
            transcript,
            response_text,
            audio,
        })
    }

    /// Transcribe a clip and select the first alternative of the first channel
    ///
    /// # Errors
    ///
    /// Returns error if the provider fails or returns no alternatives
    pub async fn transcribe(&self, clip: AudioClip, options: &TranscribeOptions) -> Result<String> {
        let transcription = self
            .transcriber
            .transcribe(clip.data, &clip.content_type, options)
            .await?;

        transcription
            .first_transcript()
            .map(ToString::to_string)
            .ok_or_else(|| {
                Error::Stt(format!(
                    "{} returned no transcript alternatives",
                    self.transcriber.name()
                ))
            })
    }

    /// Synthesize text and collect the audio into one buffer
    ///
    /// # Errors
    ///
    /// Returns error if the provider fails or the chunk stream breaks
    pub async fn speak(&self, text: &str, voice_model: &str) -> Result<Vec<u8>> {
        let stream: AudioStream = self.synthesizer.synthesize(text, voice_model).await?;
        collect_chunks(stream).await
    }
}

impl fmt::Debug for RoundTrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundTrip")
            .field("transcriber", &self.transcriber.name())
            .field("synthesizer", &self.synthesizer.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    #[test]
    fn echo_keeps_transcript_verbatim() {
        assert_eq!(echo_response("hello world"), "I heard you say: hello world");
        assert_eq!(echo_response("  MiXeD case  "), "I heard you say:   MiXeD case  ");
        assert_eq!(echo_response(""), "I heard you say: ");
    }

    #[test]
    fn echo_responder_ignores_instruction() {
        let reply = EchoResponder.respond("hi", "Answer in French.");
        assert_eq!(reply, "I heard you say: hi");
    }

    #[tokio::test]
    async fn collect_preserves_order() {
        let chunks = vec![
            Ok(Bytes::from_static(b"\x00\x01")),
            Ok(Bytes::from_static(b"")),
            Ok(Bytes::from_static(b"\xff")),
            Ok(Bytes::from_static(b"tail")),
        ];
        let audio = collect_chunks(stream::iter(chunks)).await.unwrap();
        assert_eq!(audio, b"\x00\x01\xfftail");
    }

    #[tokio::test]
    async fn collect_empty_stream() {
        let audio = collect_chunks(stream::iter(Vec::<Result<Bytes>>::new()))
            .await
            .unwrap();
        assert!(audio.is_empty());
    }

    #[tokio::test]
    async fn collect_stops_on_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"AB")),
            Err(Error::Tts("connection reset".to_string())),
            Ok(Bytes::from_static(b"CD")),
        ];
        let err = collect_chunks(stream::iter(chunks)).await.unwrap_err();
        assert!(matches!(err, Error::Tts(_)));
    }

    #[test]
    fn stage_transitions() {
        assert!(Stage::Idle.can_advance_to(Stage::Transcribing));
        assert!(Stage::Idle.can_advance_to(Stage::Failed));
        assert!(Stage::Transcribing.can_advance_to(Stage::Failed));
        assert!(Stage::Transcribed.can_advance_to(Stage::Synthesizing));
        assert!(Stage::Synthesizing.can_advance_to(Stage::Done));

        assert!(!Stage::Idle.can_advance_to(Stage::Synthesizing));
        assert!(!Stage::Transcribed.can_advance_to(Stage::Failed));
        assert!(!Stage::Done.can_advance_to(Stage::Idle));
        assert!(!Stage::Failed.can_advance_to(Stage::Transcribing));

        assert!(Stage::Done.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::Synthesizing.is_terminal());
    }

    #[test]
    fn options_from_voice_config() {
        let options = RoundTripOptions::from(&VoiceConfig::default());
        assert_eq!(options.transcribe.model, "nova-3");
        assert_eq!(options.transcribe.language, "en");
        assert!(options.transcribe.smart_format);
        assert_eq!(options.voice_model, "aura-2-asteria-en");
    }

    #[test]
    fn error_stage_and_partials() {
        let err = RoundTripError::Synthesis {
            transcript: "hi".to_string(),
            response_text: "I heard you say: hi".to_string(),
            source: Error::Tts("boom".to_string()),
        };
        assert_eq!(err.stage(), Stage::Synthesizing);
        assert_eq!(err.transcript(), Some("hi"));
        assert_eq!(err.response_text(), Some("I heard you say: hi"));

        let err = RoundTripError::Transcription(Error::Stt("bad audio".to_string()));
        assert_eq!(err.stage(), Stage::Transcribing);
        assert!(err.transcript().is_none());

        assert_eq!(RoundTripError::EmptyAudio.stage(), Stage::Idle);
    }
}
