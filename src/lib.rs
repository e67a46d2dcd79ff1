//! Audio Dojo - voice round-trip playground
//!
//! Records a clip in the browser, transcribes it with Deepgram, echoes the
//! transcript back through a fixed template and speaks the reply.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Presentation (page / CLI)               │
//! └────────────────────┬────────────────────────────────┘
//!                      │ audio clip + instruction
//! ┌────────────────────▼────────────────────────────────┐
//! │                    RoundTrip                         │
//! │   Transcribing → Transcribed → Synthesizing → Done  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │          DeepgramClient (shared handle)              │
//! │        /v1/listen (STT)  │  /v1/speak (TTS)          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod round_trip;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use round_trip::{
    AudioClip, EchoResponder, Responder, RoundTrip, RoundTripError, RoundTripOptions, Stage,
    Utterance, echo_response,
};
pub use voice::{
    AudioStream, DeepgramClient, Synthesizer, TranscribeOptions, Transcriber, Transcription,
};
