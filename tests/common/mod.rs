//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use audio_dojo::config::VoiceConfig;
use audio_dojo::voice::{AudioStream, Synthesizer, TranscribeOptions, Transcriber, Transcription};
use audio_dojo::{Error, Result, RoundTrip, RoundTripOptions};

/// Transcriber returning a canned result and counting calls
pub struct FakeTranscriber {
    result: Mutex<Option<Result<Transcription>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(Bytes, String, TranscribeOptions)>>,
}

impl FakeTranscriber {
    pub fn returning(transcription: Transcription) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Ok(transcription))),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Err(Error::Stt(message.to_string())))),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(Bytes, String, TranscribeOptions)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
        options: &TranscribeOptions,
    ) -> Result<Transcription> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() =
            Some((audio, content_type.to_string(), options.clone()));
        self.result
            .lock()
            .unwrap()
            .take()
            .expect("fake transcriber called more than once")
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Synthesizer streaming canned chunks and counting calls
pub struct FakeSynthesizer {
    chunks: Vec<Result<Bytes>>,
    fail_request: Option<String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String)>>,
}

impl FakeSynthesizer {
    pub fn streaming(chunks: &[&'static [u8]]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| Ok(Bytes::from_static(c))).collect(),
            fail_request: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    /// Request accepted, then the stream breaks after `good` chunks
    pub fn breaking_after(good: &[&'static [u8]], message: &str) -> Arc<Self> {
        let mut chunks: Vec<Result<Bytes>> =
            good.iter().map(|c| Ok(Bytes::from_static(c))).collect();
        chunks.push(Err(Error::Tts(message.to_string())));
        Arc::new(Self {
            chunks,
            fail_request: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            chunks: Vec::new(),
            fail_request: Some(message.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str, voice_model: &str) -> Result<AudioStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((text.to_string(), voice_model.to_string()));

        if let Some(message) = &self.fail_request {
            return Err(Error::Tts(message.clone()));
        }

        let chunks: Vec<Result<Bytes>> = self
            .chunks
            .iter()
            .map(|c| match c {
                Ok(bytes) => Ok(bytes.clone()),
                Err(e) => Err(Error::Tts(e.to_string())),
            })
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Orchestrator over fakes with default voice options
pub fn round_trip_with(
    transcriber: Arc<FakeTranscriber>,
    synthesizer: Arc<FakeSynthesizer>,
) -> RoundTrip {
    RoundTrip::new(
        transcriber,
        synthesizer,
        RoundTripOptions::from(&VoiceConfig::default()),
    )
}
