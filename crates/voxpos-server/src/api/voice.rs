//! Voice ordering turn: audio upload -> transcript -> intent -> cart.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use voxpos_driver::{run_text_turn, TurnOutcome};

use crate::error::ApiError;
use crate::state::{AppState, DEFAULT_SESSION};

pub fn router() -> Router<AppState> {
    // Recorded utterances are small, but browsers may send uncompressed audio.
    const AUDIO_UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;

    Router::new().route(
        "/process_audio",
        post(process_audio).layer(DefaultBodyLimit::max(AUDIO_UPLOAD_LIMIT_BYTES)),
    )
}

#[derive(Debug, Default)]
struct AudioRequest {
    audio: Option<Vec<u8>>,
    file_name: Option<String>,
    session: Option<String>,
}

/// Response body for a voice turn.
#[derive(Debug, Serialize)]
pub struct VoiceTurnResponse {
    pub transcript: String,
    #[serde(flatten)]
    pub outcome: TurnOutcome,
}

async fn process_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<VoiceTurnResponse>, ApiError> {
    let req = parse_audio_request(multipart).await?;
    let audio = req
        .audio
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let assistant = state
        .assistant
        .clone()
        .ok_or_else(|| ApiError::unavailable("Voice assistant is not configured"))?;
    let session_id = req.session.as_deref().unwrap_or(DEFAULT_SESSION);

    info!(
        "Voice turn for session '{}': {} bytes",
        session_id,
        audio.len()
    );

    // Turns on one session run one at a time.
    let session = state.session(session_id).await;
    let mut cart = session.lock().await;

    let prompts = state.prompts().await;
    let interpretation = assistant
        .listen(&audio, req.file_name.as_deref(), &prompts)
        .await?;

    let catalog = state.catalog.read().await;
    let outcome = run_text_turn(
        &interpretation.raw_response,
        &catalog,
        &mut cart,
        state.turn_config,
    )
    .map_err(|err| {
        warn!("Model returned a malformed payload: {}", err);
        ApiError::from(err)
    })?;

    Ok(Json(VoiceTurnResponse {
        transcript: interpretation.transcript,
        outcome,
    }))
}

async fn parse_audio_request(mut multipart: Multipart) -> Result<AudioRequest, ApiError> {
    let mut out = AudioRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed reading multipart field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed reading multipart 'file' field: {e}"))
                })?;
                if !bytes.is_empty() {
                    out.audio = Some(bytes.to_vec());
                    out.file_name = file_name;
                }
            }
            "session" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed reading multipart 'session' field: {e}"))
                })?;
                if !text.trim().is_empty() {
                    out.session = Some(text.trim().to_string());
                }
            }
            _ => {}
        }
    }

    Ok(out)
}
