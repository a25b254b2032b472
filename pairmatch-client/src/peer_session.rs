use crate::error::{ClientError, Result};
use crate::media::MediaSession;
use crate::retry::RetryPolicy;
use pairmatch_core::{Gender, Preference, SessionId, SignalMessage};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Call progress as seen by the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Searching,
    Connecting,
    Connected,
    Ended,
}

/// Local negotiation progress; gates when a remote answer may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NegotiationState {
    Stable,
    HaveLocalOffer,
}

/// Client-side wrapper around one pairing: reacts to coordinator
/// messages, drives the media transport's negotiation state machine and
/// buffers connectivity candidates that arrive ahead of the remote
/// description.
///
/// Returned messages are the envelopes the caller must send back to the
/// coordinator; the session itself never touches the signaling socket.
pub struct PeerSession<M: MediaSession> {
    local_id: SessionId,
    media: Option<M>,
    retry: RetryPolicy,
    state: CallState,
    negotiation: NegotiationState,
    remote_description_set: bool,
    pending_candidates: VecDeque<Value>,
    peer_id: Option<SessionId>,
    channel_name: Option<String>,
}

impl<M: MediaSession> PeerSession<M> {
    pub fn new(local_id: SessionId, media: M, retry: RetryPolicy) -> Self {
        Self {
            local_id,
            media: Some(media),
            retry,
            state: CallState::Idle,
            negotiation: NegotiationState::Stable,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            peer_id: None,
            channel_name: None,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn peer_id(&self) -> Option<&SessionId> {
        self.peer_id.as_ref()
    }

    pub fn channel_name(&self) -> Option<&str> {
        self.channel_name.as_deref()
    }

    /// Attach a fresh media session after a teardown released the old
    /// one.
    pub fn attach_media(&mut self, media: M) {
        self.media = Some(media);
    }

    /// Enter matchmaking. The returned join envelope goes to the
    /// coordinator.
    pub fn start_search(
        &mut self,
        gender: Option<Gender>,
        preference: Option<Preference>,
    ) -> SignalMessage {
        self.state = CallState::Searching;
        SignalMessage::Join {
            gender,
            gender_preference: preference,
        }
    }

    /// Give up on the current peer and ask for the next one.
    pub fn skip(&mut self) -> SignalMessage {
        self.end_call();
        self.state = CallState::Searching;
        SignalMessage::Skip
    }

    /// Stop matchmaking entirely.
    pub fn leave(&mut self) -> SignalMessage {
        self.end_call();
        SignalMessage::LeaveQueue
    }

    /// React to one coordinator message. The returned envelopes must be
    /// sent back to the coordinator.
    pub async fn handle_message(&mut self, message: SignalMessage) -> Result<Vec<SignalMessage>> {
        match message {
            SignalMessage::Matched {
                peer_id,
                channel_name,
            } => self.handle_matched(peer_id, channel_name).await,
            SignalMessage::Offer { offer } => self.handle_offer(&offer).await,
            SignalMessage::Answer { answer } => self.handle_answer(&answer).await,
            SignalMessage::IceCandidate { candidate } => self.handle_candidate(candidate).await,
            SignalMessage::PeerLeft => {
                debug!("peer left, tearing the call down");
                self.end_call();
                Ok(Vec::new())
            }
            SignalMessage::Error { message } => {
                warn!(%message, "coordinator reported an error");
                Ok(Vec::new())
            }
            SignalMessage::Join { .. } | SignalMessage::Skip | SignalMessage::LeaveQueue => {
                warn!(?message, "ignoring client-bound envelope of an inbound kind");
                Ok(Vec::new())
            }
        }
    }

    /// Transport reports the channel is up: subscribe to the remote
    /// media under the bounded retry policy.
    pub async fn on_transport_connected(&mut self) -> Result<()> {
        self.state = CallState::Connected;
        self.subscribe_with_retry().await
    }

    /// Transport reports failure or remote disconnection.
    pub fn on_transport_failed(&mut self) {
        self.state = CallState::Ended;
    }

    /// Teardown: detach handlers and release the media transport, then
    /// clear every piece of tracked state. `close` runs before the
    /// object is dropped, so no callback fires once teardown begins.
    pub fn end_call(&mut self) {
        self.state = CallState::Ended;
        if let Some(mut media) = self.media.take() {
            media.close();
        }
        self.pending_candidates.clear();
        self.peer_id = None;
        self.channel_name = None;
        self.negotiation = NegotiationState::Stable;
        self.remote_description_set = false;
        self.state = CallState::Idle;
    }

    async fn handle_matched(
        &mut self,
        peer_id: SessionId,
        channel_name: String,
    ) -> Result<Vec<SignalMessage>> {
        if self.peer_id.is_some() {
            warn!(%peer_id, "matched while already in a call, ignoring");
            return Ok(Vec::new());
        }
        // Checked before any state moves, so a failed match attempt
        // leaves the session exactly as it was.
        if self.media.is_none() {
            return Err(ClientError::MediaUnavailable);
        }
        self.state = CallState::Connecting;
        self.channel_name = Some(channel_name);

        // Exactly one side may open the negotiation; the lexically
        // smaller session id is the offerer on both ends.
        let offerer = self.local_id < peer_id;
        self.peer_id = Some(peer_id);
        if !offerer {
            return Ok(Vec::new());
        }

        let media = self.media.as_mut().ok_or(ClientError::MediaUnavailable)?;
        let offer = media.create_offer().await?;
        self.negotiation = NegotiationState::HaveLocalOffer;
        Ok(vec![SignalMessage::Offer { offer }])
    }

    async fn handle_offer(&mut self, offer: &Value) -> Result<Vec<SignalMessage>> {
        let Some(media) = self.media.as_mut() else {
            debug!("offer after teardown, dropping");
            return Ok(Vec::new());
        };
        let answer = media.create_answer(offer).await?;
        self.remote_description_set = true;
        self.flush_pending().await?;
        Ok(vec![SignalMessage::Answer { answer }])
    }

    async fn handle_answer(&mut self, answer: &Value) -> Result<Vec<SignalMessage>> {
        // Only valid while our own offer is outstanding; anything else
        // would corrupt the transport's negotiation state machine.
        if self.negotiation != NegotiationState::HaveLocalOffer {
            debug!("remote answer outside the local-offer state, ignoring");
            return Ok(Vec::new());
        }
        let Some(media) = self.media.as_mut() else {
            debug!("answer after teardown, dropping");
            return Ok(Vec::new());
        };
        media.set_remote_answer(answer).await?;
        self.negotiation = NegotiationState::Stable;
        self.remote_description_set = true;
        self.flush_pending().await?;
        Ok(Vec::new())
    }

    async fn handle_candidate(&mut self, candidate: Value) -> Result<Vec<SignalMessage>> {
        if self.media.is_none() {
            debug!("candidate after teardown, dropping");
            return Ok(Vec::new());
        }
        // Candidates ahead of the remote description wait in arrival
        // order.
        if !self.remote_description_set {
            self.pending_candidates.push_back(candidate);
            return Ok(Vec::new());
        }
        if let Some(media) = self.media.as_mut() {
            media.add_remote_candidate(&candidate).await?;
        }
        Ok(Vec::new())
    }

    /// Drain the pending buffer in arrival order, right after the remote
    /// description was applied.
    async fn flush_pending(&mut self) -> Result<()> {
        let Some(media) = self.media.as_mut() else {
            return Ok(());
        };
        while let Some(candidate) = self.pending_candidates.pop_front() {
            media.add_remote_candidate(&candidate).await?;
        }
        Ok(())
    }

    async fn subscribe_with_retry(&mut self) -> Result<()> {
        let policy = self.retry.clone();
        let media = self.media.as_mut().ok_or(ClientError::MediaUnavailable)?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match media.subscribe_remote().await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < policy.max_attempts => {
                    debug!(attempt, error = %e, "remote subscription failed, backing off");
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                }
                Err(_) => return Err(ClientError::SubscribeExhausted { attempts: attempt }),
            }
        }
    }
}
