//! HTTP request handlers

use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, HealthResponse, HistoryResponse, PingResponse,
    SpeakRequest, APOLOGY_MESSAGE,
};
use super::AppState;
use crate::llm::transcription::MAX_AUDIO_BYTES;
use crate::llm::{AudioUpload, SpeechOptions};
use crate::orchestrator::{GenerationError, VoiceReply};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

const EMPTY_MESSAGE: &str = "الرسالة فاضية، اكتب شي وأرد عليك";
const INVALID_UPLOAD: &str = "ما قدرت أقرا الملف الصوتي";
const MISSING_AUDIO: &str = "لازم ترسل ملف صوتي في حقل audio";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route(
            "/voice",
            post(voice).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES + 1024 * 1024)),
        )
        .route("/speak", post(speak))
        .route("/history", get(history))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest(EMPTY_MESSAGE));
    }

    let response = state.orchestrator.handle_turn(&req.message).await?;
    Ok(Json(ChatResponse { response }))
}

// ============================================================
// Voice
// ============================================================

async fn voice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VoiceReply>, AppError> {
    let mut audio: Option<AudioUpload> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest(INVALID_UPLOAD))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio" | "file") => {
                let filename = field.file_name().unwrap_or("audio.webm").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::BadRequest(INVALID_UPLOAD))?;
                audio = Some(AudioUpload {
                    bytes: bytes.to_vec(),
                    filename,
                    content_type,
                    language: None,
                });
            }
            Some("language") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest(INVALID_UPLOAD))?;
                language = Some(text.trim().to_string()).filter(|l| !l.is_empty());
            }
            _ => {}
        }
    }

    let mut audio = audio
        .filter(|a| !a.bytes.is_empty())
        .ok_or(AppError::BadRequest(MISSING_AUDIO))?;
    audio.language = language;

    let reply = state.orchestrator.handle_voice_turn(&audio).await?;
    Ok(Json(reply))
}

// ============================================================
// Speech
// ============================================================

async fn speak(
    State(state): State<AppState>,
    Json(req): Json<SpeakRequest>,
) -> Result<Response, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest(EMPTY_MESSAGE));
    }

    let options = SpeechOptions {
        voice: req.voice,
        rate: req.rate,
        pitch: req.pitch,
    };
    let audio = state.orchestrator.synthesize(text, &options).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

// ============================================================
// History and status
// ============================================================

async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        messages: state.orchestrator.conversation().await,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "نكستا الخليجي جاهز لخدمتك 💚",
    })
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(&'static str),
    Generation(GenerationError),
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Generation(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Generation(e) => {
                // Details stay in the log; clients only get the fixed apology
                tracing::error!(error = %e, "Request generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, APOLOGY_MESSAGE)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
