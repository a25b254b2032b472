use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use pairmatch_core::{CoordinatorError, SessionId, SignalMessage};
use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, error, info, instrument, warn};

/// Per-connection loop: one sender task drains the outbound channel,
/// the receive loop feeds inbound envelopes to the coordinator one at a
/// time, and socket closure of either half triggers disconnect cleanup.
#[instrument(skip(socket, state))]
pub(crate) async fn listen(socket: WebSocket, state: AppState, session_id: SessionId) {
    let (ws_sender, ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel(32);

    state.on_connect(session_id.clone(), tx.clone()).await;

    let send_task = tokio::spawn(handle_outgoing_messages(rx, ws_sender));
    handle_incoming_messages(ws_receiver, &state, &session_id).await;

    state.on_disconnect(&session_id, &tx).await;
    send_task.abort();
    info!(%session_id, "connection closed");
}

async fn handle_outgoing_messages(
    mut rx: Receiver<Message>,
    mut ws_sender: SplitSink<WebSocket, Message>,
) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = ws_sender.send(message).await {
            debug!(error = %e, "outbound socket closed");
            break;
        }
    }
}

async fn handle_incoming_messages(
    mut receiver: SplitStream<WebSocket>,
    state: &AppState,
    session_id: &SessionId,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<SignalMessage>(&text) {
                Ok(message) => {
                    debug!(%session_id, ?message, "inbound envelope");
                    state.dispatch(session_id, message).await;
                }
                // Malformed envelopes are logged and ignored; the
                // connection stays open.
                Err(e) => {
                    let error = CoordinatorError::MalformedMessage(e.to_string());
                    warn!(%session_id, %error, "ignoring inbound envelope");
                }
            },
            Ok(Message::Close(_)) => {
                info!(%session_id, "client closed the connection");
                break;
            }
            Ok(_) => {
                debug!(%session_id, "ignoring non-text frame");
            }
            Err(e) => {
                error!(%session_id, error = %e, "socket error");
                break;
            }
        }
    }
}
