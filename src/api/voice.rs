//! Voice API endpoints: round trip, speech-to-text and text-to-speech

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::round_trip::{AudioClip, RoundTrip, RoundTripError, RoundTripOptions};
use crate::voice::models::{self, ModelInfo};

/// Largest accepted upload (recorded clips are small; this leaves headroom)
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// MIME type of Deepgram's default synthesis output
const SYNTHESIZED_CONTENT_TYPE: &str = "audio/mpeg";

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/round-trip", post(round_trip))
        .route("/transcribe", post(transcribe))
        .route("/synthesize", post(synthesize))
        .route("/capabilities", get(capabilities))
        .route("/models", get(list_models))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES))
        .with_state(state)
}

fn orchestrator(state: &ApiState) -> Result<&RoundTrip, VoiceError> {
    state
        .round_trip
        .as_deref()
        .ok_or_else(|| VoiceError::NotConfigured(state.not_configured_message()))
}

/// Voice capabilities response
#[derive(Debug, Serialize)]
pub struct VoiceCapabilities {
    pub stt_available: bool,
    pub tts_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_error: Option<String>,
    pub default_instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_model: Option<String>,
}

/// Get voice capabilities
async fn capabilities(State(state): State<Arc<ApiState>>) -> Json<VoiceCapabilities> {
    let available = state.round_trip.is_some();
    let options = state.round_trip.as_ref().map(|rt| rt.options());
    Json(VoiceCapabilities {
        stt_available: available,
        tts_available: available,
        configuration_error: (!available).then(|| state.not_configured_message()),
        default_instruction: state.system_prompt.clone(),
        stt_model: options.map(|o| o.transcribe.model.clone()),
        tts_model: options.map(|o| o.voice_model.clone()),
    })
}

/// Model catalog response
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub stt: &'static [ModelInfo],
    pub tts: &'static [ModelInfo],
}

/// List selectable STT models and TTS voices
async fn list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        stt: models::STT_MODELS,
        tts: models::TTS_MODELS,
    })
}

/// Round-trip response
#[derive(Debug, Serialize)]
pub struct RoundTripResponse {
    pub transcript: String,
    pub response_text: String,
    pub audio_base64: String,
    pub content_type: &'static str,
}

/// Record → transcribe → echo → synthesize
///
/// Multipart fields: `audio` (required file), `instruction`, `stt_model`, `tts_model`.
async fn round_trip(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<RoundTripResponse>, VoiceError> {
    let round_trip = orchestrator(&state)?;

    let mut clip = None;
    let mut instruction = None;
    let mut options = round_trip.options().clone();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VoiceError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let content_type = field
                    .content_type()
                    .map_or_else(|| "audio/wav".to_string(), ToString::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| VoiceError::BadRequest(e.to_string()))?;
                clip = Some(AudioClip::new(data, content_type));
            }
            "instruction" => instruction = Some(read_text(field).await?),
            "stt_model" => options.transcribe.model = checked_stt_model(read_text(field).await?)?,
            "tts_model" => options.voice_model = checked_tts_model(read_text(field).await?)?,
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let clip = clip.ok_or_else(|| VoiceError::BadRequest("Missing audio field".to_string()))?;
    let instruction = instruction.unwrap_or_else(|| state.system_prompt.clone());

    let utterance = round_trip
        .handle_utterance_with(clip, &instruction, &options)
        .await
        .map_err(VoiceError::from)?;

    Ok(Json(RoundTripResponse {
        transcript: utterance.transcript,
        response_text: utterance.response_text,
        audio_base64: base64::engine::general_purpose::STANDARD.encode(&utterance.audio),
        content_type: SYNTHESIZED_CONTENT_TYPE,
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, VoiceError> {
    field
        .text()
        .await
        .map_err(|e| VoiceError::BadRequest(e.to_string()))
}

fn checked_stt_model(model: String) -> Result<String, VoiceError> {
    if models::is_stt_model(&model) {
        Ok(model)
    } else {
        Err(VoiceError::BadRequest(format!("Unknown STT model: {model}")))
    }
}

fn checked_tts_model(model: String) -> Result<String, VoiceError> {
    if models::is_tts_model(&model) {
        Ok(model)
    } else {
        Err(VoiceError::BadRequest(format!("Unknown TTS model: {model}")))
    }
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Transcribe audio to text
///
/// Accepts any container Deepgram understands; the request `Content-Type` is forwarded
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, VoiceError> {
    let round_trip = orchestrator(&state)?;

    if body.is_empty() {
        return Err(VoiceError::BadRequest("Empty audio data".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/wav");

    let text = round_trip
        .transcribe(
            AudioClip::new(body, content_type),
            &round_trip.options().transcribe,
        )
        .await
        .map_err(|e| VoiceError::TranscriptionFailed(e.to_string()))?;

    Ok(Json(TranscribeResponse { text }))
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Synthesize text to speech
///
/// Returns audio in MP3 format
async fn synthesize(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Response, VoiceError> {
    let round_trip = orchestrator(&state)?;

    if request.text.is_empty() {
        return Err(VoiceError::BadRequest("Empty text".to_string()));
    }

    let RoundTripOptions { voice_model, .. } = round_trip.options().clone();
    let voice_model = match request.model {
        Some(model) => checked_tts_model(model)?,
        None => voice_model,
    };

    let audio = round_trip
        .speak(&request.text, &voice_model)
        .await
        .map_err(|e| VoiceError::SynthesisFailed {
            message: e.to_string(),
            transcript: None,
            response_text: None,
        })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, SYNTHESIZED_CONTENT_TYPE)],
        audio,
    )
        .into_response())
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceError {
    NotConfigured(String),
    BadRequest(String),
    TranscriptionFailed(String),
    SynthesisFailed {
        message: String,
        transcript: Option<String>,
        response_text: Option<String>,
    },
}

impl From<RoundTripError> for VoiceError {
    fn from(err: RoundTripError) -> Self {
        match err {
            RoundTripError::EmptyAudio => Self::BadRequest("Empty audio data".to_string()),
            RoundTripError::Transcription(e) => Self::TranscriptionFailed(e.to_string()),
            RoundTripError::Synthesis {
                transcript,
                response_text,
                source,
            } => Self::SynthesisFailed {
                message: source.to_string(),
                transcript: Some(transcript),
                response_text: Some(response_text),
            },
        }
    }
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            transcript: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_text: Option<String>,
        }

        let (status, code, message, transcript, response_text) = match self {
            Self::NotConfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg, None, None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None, None),
            Self::TranscriptionFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "transcription_failed", msg, None, None)
            }
            Self::SynthesisFailed {
                message,
                transcript,
                response_text,
            } => (StatusCode::BAD_GATEWAY, "synthesis_failed", message, transcript, response_text),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                transcript,
                response_text,
            },
        };
        (status, Json(body)).into_response()
    }
}
