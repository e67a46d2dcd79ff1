//! Text-to-speech (TTS) via Deepgram `/v1/speak`

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};

use super::{AudioStream, DeepgramClient, Synthesizer};
use crate::{Error, Result};

#[async_trait]
impl Synthesizer for DeepgramClient {
    /// Synthesize text to speech
    ///
    /// The response body is returned unbuffered as a chunk stream (MP3 by
    /// default). Transport errors part-way through surface as stream items.
    async fn synthesize(&self, text: &str, voice_model: &str) -> Result<AudioStream> {
        #[derive(serde::Serialize)]
        struct SpeakRequest<'a> {
            text: &'a str,
        }

        tracing::debug!(text_len = text.len(), model = voice_model, "starting Deepgram synthesis");

        let response = self
            .http
            .post(self.endpoint("v1/speak")?)
            .query(&[("model", voice_model)])
            .header("Authorization", self.auth_header())
            .json(&SpeakRequest { text })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram TTS request failed");
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram TTS error");
            return Err(Error::Tts(format!("Deepgram TTS error {status}: {body}")));
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| Error::Tts(format!("audio stream interrupted: {e}")))
            .boxed())
    }

    fn name(&self) -> &'static str {
        "deepgram"
    }
}
