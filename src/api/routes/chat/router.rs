//! Router for the chat API

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, sse::Event, sse::KeepAlive, sse::Sse},
    routing::{get, post},
};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use super::public;
use crate::ai::chat::Notice;
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

/// Start a new chat session and return the welcome notice
async fn start_session(
    State(state): State<SharedState>,
    payload: Option<axum::Json<public::StartSessionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let axum::Json(payload) = payload.unwrap_or_default();
    let session_id = payload
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let notice = state.host.on_session_start(&session_id);

    Ok(axum::Json(public::StartSessionResponse {
        session_id,
        notice: public::NoticeEvent::from(&notice),
    }))
}

/// Get the transcript of an active chat session
async fn chat_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(transcript) = state.host.transcript(&id).await else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response());
    };

    Ok(axum::Json(public::ChatTranscriptResponse { transcript }).into_response())
}

/// End a chat session, discarding its transcript
async fn end_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if state.host.on_session_end(&id) {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response())
    }
}

/// Run a turn in a chat session. Notices are streamed as server-sent
/// events unless the request opts out, in which case they're
/// collected and returned once the turn is over.
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (tx, rx) = mpsc::unbounded_channel::<Notice>();
    let host = Arc::clone(&state.host);
    let public::ChatRequest {
        session_id,
        message,
        stream,
    } = payload;

    // Run the turn in its own task so a client hanging up doesn't
    // abandon a transcript halfway through a turn. The sender is
    // dropped when the turn ends which closes the stream.
    let handle =
        tokio::spawn(async move { host.on_user_message(&session_id, &message, &tx).await });

    if !stream {
        let outcome = handle.await?;
        let notices = UnboundedReceiverStream::new(rx)
            .map(|notice| public::NoticeEvent::from(&notice))
            .collect::<Vec<_>>()
            .await;
        return Ok(axum::Json(public::ChatResponse { outcome, notices }).into_response());
    }

    let sse_stream = UnboundedReceiverStream::new(rx).map(|notice| {
        let event = public::NoticeEvent::from(&notice);
        Ok::<Event, Infallible>(
            Event::default()
                .event(event.r#type.clone())
                .data(serde_json::json!(event).to_string()),
        )
    });

    let resp = Sse::new(sse_stream)
        .keep_alive(KeepAlive::default().text("keep-alive"))
        .into_response();

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/sessions", post(start_session))
        .route("/{id}", get(chat_session).delete(end_session))
}
