//! Speech-to-text (STT) via Deepgram `/v1/listen`

use async_trait::async_trait;
use bytes::Bytes;

use super::{DeepgramClient, TranscribeOptions, Transcriber, Transcription};
use crate::{Error, Result};

/// Response envelope from the Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: Transcription,
}

#[async_trait]
impl Transcriber for DeepgramClient {
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
        options: &TranscribeOptions,
    ) -> Result<Transcription> {
        tracing::debug!(
            audio_bytes = audio.len(),
            content_type,
            model = %options.model,
            language = %options.language,
            "starting Deepgram transcription"
        );

        let smart_format = if options.smart_format { "true" } else { "false" };

        let response = self
            .http
            .post(self.endpoint("v1/listen")?)
            .query(&[
                ("model", options.model.as_str()),
                ("language", options.language.as_str()),
                ("smart_format", smart_format),
            ])
            .header("Authorization", self.auth_header())
            .header("Content-Type", content_type)
            .body(audio)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            Error::Stt(format!("malformed Deepgram response: {e}"))
        })?;

        tracing::info!(
            channels = result.results.channels.len(),
            transcript = result.results.first_transcript().unwrap_or_default(),
            "transcription complete"
        );
        Ok(result.results)
    }

    fn name(&self) -> &'static str {
        "deepgram"
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn options() -> TranscribeOptions {
        TranscribeOptions {
            model: "nova-3".to_string(),
            language: "en".to_string(),
            smart_format: true,
        }
    }

    #[tokio::test]
    async fn test_transcribe_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/listen")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("model".into(), "nova-3".into()),
                Matcher::UrlEncoded("language".into(), "en".into()),
                Matcher::UrlEncoded("smart_format".into(), "true".into()),
            ]))
            .match_header("Authorization", "Token test-key")
            .match_header("Content-Type", "audio/webm")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"metadata": {}, "results": {"channels": [{"alternatives": [{"transcript": "Hello world.", "confidence": 0.97}]}]}}"#,
            )
            .create_async()
            .await;

        let client = DeepgramClient::new("test-key", &server.url()).unwrap();
        let result = client
            .transcribe(Bytes::from_static(&[1, 2, 3]), "audio/webm", &options())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.first_transcript(), Some("Hello world."));
    }

    #[tokio::test]
    async fn test_transcribe_smart_format_off() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/listen")
            .match_query(Matcher::UrlEncoded("smart_format".into(), "false".into()))
            .with_status(200)
            .with_body(r#"{"results": {"channels": []}}"#)
            .create_async()
            .await;

        let client = DeepgramClient::new("test-key", &server.url()).unwrap();
        let mut opts = options();
        opts.smart_format = false;
        let result = client
            .transcribe(Bytes::from_static(b"x"), "audio/wav", &opts)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.first_transcript(), None);
    }

    #[tokio::test]
    async fn test_transcribe_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/listen")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"err_code": "INVALID_AUTH"}"#)
            .create_async()
            .await;

        let client = DeepgramClient::new("bad-key", &server.url()).unwrap();
        let err = client
            .transcribe(Bytes::from_static(b"x"), "audio/wav", &options())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, Error::Stt(_)));
        assert!(err.to_string().contains("401"), "error should mention status: {err}");
    }

    #[tokio::test]
    async fn test_transcribe_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/listen")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = DeepgramClient::new("test-key", &server.url()).unwrap();
        let err = client
            .transcribe(Bytes::from_static(b"x"), "audio/wav", &options())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Stt(_)));
    }
}
