use crate::connection_registry::ConnectionRegistry;
use axum::extract::ws::Message;
use pairmatch_core::{Coordinator, SessionId, SignalMessage};
use std::sync::Arc;
use tokio::sync::{mpsc::Sender, Mutex};
use tracing::{debug, warn};

/// Shared server state: the coordinator store behind its single
/// exclusion boundary, plus the per-connection send handles.
///
/// Every read-then-write operation on registry/queue/pairing state runs
/// under the one `Mutex`, and the resulting outbox is enqueued into the
/// per-connection channels before the lock drops. Each recipient
/// therefore sees envelopes in coordinator-operation order; the socket
/// writes themselves happen in the sender tasks, outside the lock.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    coordinator: Arc<Mutex<Coordinator>>,
    connections: ConnectionRegistry,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection established: register the send handle, then the
    /// session record. A stale record under the same id is torn down
    /// and its former peer notified.
    pub async fn on_connect(&self, id: SessionId, sender: Sender<Message>) {
        self.connections.add(id.clone(), sender).await;
        let mut coordinator = self.coordinator.lock().await;
        let outbox = coordinator.connect(id);
        self.connections.deliver(outbox).await;
    }

    /// Transport closed: full lifecycle cleanup, exactly once.
    ///
    /// `sender` identifies the closing connection; a stale connection
    /// whose id was reused by a reconnect finds its handle already
    /// replaced and leaves the fresh session alone.
    pub async fn on_disconnect(&self, id: &SessionId, sender: &Sender<Message>) {
        if !self.connections.remove_if_current(id, sender).await {
            debug!(%id, "stale connection closed after takeover, nothing to clean up");
            return;
        }
        let mut coordinator = self.coordinator.lock().await;
        let outbox = coordinator.disconnect(id);
        self.connections.deliver(outbox).await;
    }

    /// One inbound envelope from `id`, processed and enqueued to
    /// completion under the store lock.
    pub async fn dispatch(&self, id: &SessionId, message: SignalMessage) {
        let mut coordinator = self.coordinator.lock().await;
        let outbox = match coordinator.handle_message(id, message) {
            Ok(outbox) => outbox,
            Err(e) => {
                warn!(%id, error = %e, "dropped inbound message");
                Vec::new()
            }
        };
        self.connections.deliver(outbox).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmatch_core::{Gender, Preference};
    use serde_json::Value;
    use tokio::sync::mpsc::{channel, Receiver};

    async fn attach(state: &AppState, id: &str) -> Receiver<Message> {
        let (tx, rx) = channel(32);
        state.on_connect(SessionId::from(id), tx).await;
        rx
    }

    fn drain_kinds(rx: &mut Receiver<Message>) -> Vec<String> {
        let mut kinds = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            let value: Value = serde_json::from_str(&text).unwrap();
            kinds.push(value["type"].as_str().unwrap_or("?").to_string());
        }
        kinds
    }

    fn open_join() -> SignalMessage {
        SignalMessage::Join {
            gender: Some(Gender::Other),
            gender_preference: Some(Preference::Both),
        }
    }

    // A matched and a peer-left racing toward the same recipient must
    // arrive in the order the coordinator produced them, whichever task
    // computed which.
    #[tokio::test(flavor = "multi_thread")]
    async fn per_recipient_order_follows_operation_order() {
        for _ in 0..50 {
            let state = AppState::new();
            let mut alice_rx = attach(&state, "alice").await;
            let _bob_rx = attach(&state, "bob").await;
            let alice = SessionId::from("alice");
            let bob = SessionId::from("bob");

            state.dispatch(&alice, open_join()).await;

            let pair_state = state.clone();
            let pair_bob = bob.clone();
            let pairing = tokio::spawn(async move {
                pair_state.dispatch(&pair_bob, open_join()).await;
            });
            let skip_state = state.clone();
            let skipping = tokio::spawn(async move {
                skip_state.dispatch(&bob, SignalMessage::Skip).await;
            });
            pairing.await.unwrap();
            skipping.await.unwrap();

            let kinds = drain_kinds(&mut alice_rx);
            if let (Some(matched), Some(left)) = (
                kinds.iter().position(|kind| kind == "matched"),
                kinds.iter().position(|kind| kind == "peer-left"),
            ) {
                assert!(matched < left, "peer-left overtook matched: {kinds:?}");
            }
        }
    }
}
