use crate::state::AppState;
use crate::websocket_listener::listen;
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use pairmatch_core::{CoordinatorError, SessionId};
use serde::Deserialize;
use tracing::{info, warn};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(handle_signaling_connection))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ConnectParams {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn handle_signaling_connection(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        match params.session_id {
            Some(id) if !id.is_empty() => {
                let session_id = SessionId::new(id);
                info!(%session_id, "new signaling connection");
                listen(socket, state, session_id).await;
            }
            _ => reject(socket).await,
        }
    })
}

/// The handshake carried no session identifier: policy violation,
/// refused before any session record exists.
async fn reject(mut socket: WebSocket) {
    let error = CoordinatorError::MissingSessionId;
    warn!(%error, "connection refused");
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: error.to_string().into(),
        })))
        .await;
}
