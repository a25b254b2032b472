use axum::extract::ws::Message;
use pairmatch_core::{Outbound, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc::Sender, RwLock};
use tracing::{debug, error, warn};

/// Session-keyed send handles for every live connection.
///
/// Delivery goes through a per-connection mpsc channel, so coordinator
/// operations queue messages instead of writing to sockets; the
/// connection's own sender task drains the channel.
#[derive(Clone, Debug, Default)]
pub struct ConnectionRegistry {
    senders: Arc<RwLock<HashMap<SessionId, Sender<Message>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reconnect under the same id replaces the stale handle
    /// (last writer wins).
    pub async fn add(&self, id: SessionId, sender: Sender<Message>) {
        let mut senders = self.senders.write().await;
        if senders.insert(id.clone(), sender).is_some() {
            warn!(%id, "replaced an existing send handle");
        }
    }

    /// Remove `id`'s handle, but only while it still belongs to
    /// `sender`'s channel. A stale connection closing after its id was
    /// taken over must not evict the replacement.
    pub async fn remove_if_current(&self, id: &SessionId, sender: &Sender<Message>) -> bool {
        let mut senders = self.senders.write().await;
        match senders.get(id) {
            Some(current) if current.same_channel(sender) => {
                senders.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Enqueue a coordinator outbox into the per-connection channels,
    /// one envelope at a time.
    ///
    /// `try_send` never waits, so the caller may still hold the store
    /// lock while envelopes land in each channel in
    /// coordinator-operation order. Failures are per-recipient: a
    /// vanished connection or a full channel loses its envelope without
    /// affecting delivery to anyone else.
    pub async fn deliver(&self, outbox: Vec<Outbound>) {
        let senders = self.senders.read().await;
        for Outbound { to, message } in outbox {
            let Some(sender) = senders.get(&to) else {
                debug!(%to, "no live connection for outbound message, dropping");
                continue;
            };
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if let Err(e) = sender.try_send(Message::Text(text)) {
                        warn!(%to, error = %e, "could not enqueue outbound message");
                    }
                }
                Err(e) => {
                    error!(%to, error = %e, "failed to serialize outbound message");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmatch_core::SignalMessage;
    use tokio::sync::mpsc::channel;

    #[tokio::test]
    async fn delivers_to_the_addressed_session_only() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = channel(4);
        let (tx_b, mut rx_b) = channel(4);
        registry.add(SessionId::from("a"), tx_a).await;
        registry.add(SessionId::from("b"), tx_b).await;

        registry
            .deliver(vec![Outbound {
                to: SessionId::from("b"),
                message: SignalMessage::PeerLeft,
            }])
            .await;

        let Message::Text(text) = rx_b.recv().await.unwrap() else {
            panic!("expected text frame");
        };
        assert_eq!(text, r#"{"type":"peer-left"}"#);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_handle_cannot_evict_its_replacement() {
        let registry = ConnectionRegistry::new();
        let id = SessionId::from("a");
        let (old_tx, _old_rx) = channel::<Message>(1);
        let (new_tx, _new_rx) = channel::<Message>(1);

        registry.add(id.clone(), old_tx.clone()).await;
        registry.add(id.clone(), new_tx.clone()).await;

        assert!(!registry.remove_if_current(&id, &old_tx).await);
        assert!(registry.remove_if_current(&id, &new_tx).await);
    }

    #[tokio::test]
    async fn a_full_channel_loses_the_envelope_without_waiting() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel(1);
        registry.add(SessionId::from("a"), tx).await;

        let to_a = |message| Outbound {
            to: SessionId::from("a"),
            message,
        };
        registry
            .deliver(vec![to_a(SignalMessage::PeerLeft), to_a(SignalMessage::PeerLeft)])
            .await;

        // The first envelope fills the channel; the second is dropped
        // instead of blocking the caller.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn delivery_to_a_vanished_connection_is_dropped() {
        let registry = ConnectionRegistry::new();
        registry
            .deliver(vec![Outbound {
                to: SessionId::from("ghost"),
                message: SignalMessage::PeerLeft,
            }])
            .await;
    }
}
