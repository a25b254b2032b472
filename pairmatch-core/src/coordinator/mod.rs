use crate::domain::matching::compatible;
use crate::domain::{channel_name, Gender, MatchQueue, Preference, SessionId, SessionRegistry};
use crate::error::{CoordinatorError, Result};
use crate::message::SignalMessage;
use tracing::{debug, info, instrument, warn};


/// A message the transport layer must deliver after the store lock is
/// released. Coordinator operations never perform I/O themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: SessionId,
    pub message: SignalMessage,
}

impl Outbound {
    fn new(to: SessionId, message: SignalMessage) -> Self {
        Self { to, message }
    }
}

/// The coordinator's single logical store: session registry, matchmaking
/// queue and pairing references mutate together as one unit.
///
/// The caller serializes access (one exclusion boundary around every
/// read-then-write operation), so no partial transition is ever
/// observable by a concurrent match attempt.
#[derive(Debug, Default)]
pub struct Coordinator {
    registry: SessionRegistry,
    queue: MatchQueue,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection established under `id`.
    ///
    /// A reconnect reusing an id still registered tears the stale record
    /// down first, so no peer is left referencing a ghost.
    #[instrument(skip(self))]
    pub fn connect(&mut self, id: SessionId) -> Vec<Outbound> {
        let mut outbox = Vec::new();
        if self.registry.contains(&id) {
            warn!(%id, "session id reconnected, replacing stale record");
            outbox = self.disconnect(&id);
        }
        self.registry.register(id.clone());
        info!(%id, sessions = self.registry.len(), "session connected");
        outbox
    }

    /// Dispatch one inbound envelope from `id`.
    pub fn handle_message(&mut self, id: &SessionId, message: SignalMessage) -> Result<Vec<Outbound>> {
        match message {
            SignalMessage::Join {
                gender,
                gender_preference,
            } => self.join(id, gender, gender_preference),
            SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::IceCandidate { .. } => Ok(self.relay(id, message)),
            SignalMessage::Skip => Ok(self.skip(id)),
            SignalMessage::LeaveQueue => Ok(self.leave_queue(id)),
            SignalMessage::Matched { .. } | SignalMessage::PeerLeft | SignalMessage::Error { .. } => {
                warn!(%id, ?message, "ignoring server-bound envelope of an outbound kind");
                Ok(Vec::new())
            }
        }
    }

    /// Inbound `join`: store the stated preferences and run one match
    /// attempt.
    #[instrument(skip(self))]
    pub fn join(
        &mut self,
        id: &SessionId,
        gender: Option<Gender>,
        preference: Option<Preference>,
    ) -> Result<Vec<Outbound>> {
        if !self.registry.contains(id) {
            return Err(CoordinatorError::UnknownSession(id.clone()));
        }
        Ok(self.try_match(id, gender, preference, None))
    }

    /// Inbound `skip`: release the current peer back into the queue,
    /// then run exactly one rematch attempt for the skipper with its
    /// last-known preferences.
    ///
    /// The immediately-prior peer is excluded from that one attempt, so
    /// a room with two sessions cannot ping-pong the same pairing.
    #[instrument(skip(self))]
    pub fn skip(&mut self, id: &SessionId) -> Vec<Outbound> {
        let Some(session) = self.registry.get(id) else {
            warn!(%id, "skip from unknown session");
            return Vec::new();
        };
        let prior_peer = session.peer_id.clone();
        let gender = session.gender;
        let preference = session.preference;

        let mut outbox = Vec::new();
        if let Some(peer_id) = &prior_peer {
            self.unpair(id, peer_id);
            outbox.push(Outbound::new(peer_id.clone(), SignalMessage::PeerLeft));
            self.enqueue(peer_id);
            info!(%id, peer = %peer_id, "session skipped its peer");
        }

        // No-op when the session never joined.
        if gender.is_some() && preference.is_some() {
            outbox.extend(self.try_match(id, gender, preference, prior_peer.as_ref()));
        }
        outbox
    }

    /// Inbound `leave-queue`: drop out of matchmaking entirely.
    ///
    /// Preferences are cleared before anything else, so a join processed
    /// right after this cannot select the leaver as a candidate.
    #[instrument(skip(self))]
    pub fn leave_queue(&mut self, id: &SessionId) -> Vec<Outbound> {
        self.dequeue(id);
        let Some(session) = self.registry.get_mut(id) else {
            warn!(%id, "leave-queue from unknown session");
            return Vec::new();
        };
        session.gender = None;
        session.preference = None;

        match session.peer_id.take() {
            Some(peer_id) => {
                self.clear_reciprocal(&peer_id, id);
                info!(%id, peer = %peer_id, "session left while paired");
                vec![Outbound::new(peer_id, SignalMessage::PeerLeft)]
            }
            None => {
                debug!(%id, "session left the queue");
                Vec::new()
            }
        }
    }

    /// Transport closed for `id`. Safe to invoke more than once: the
    /// second call finds no record and does nothing, which keeps cleanup
    /// exactly-once even when lifecycle messages are still in flight.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, id: &SessionId) -> Vec<Outbound> {
        self.queue.remove(id);
        let Some(session) = self.registry.remove(id) else {
            return Vec::new();
        };
        match session.peer_id {
            Some(peer_id) => {
                self.clear_reciprocal(&peer_id, id);
                info!(%id, peer = %peer_id, "session disconnected while paired");
                vec![Outbound::new(peer_id, SignalMessage::PeerLeft)]
            }
            None => {
                info!(%id, "session disconnected");
                Vec::new()
            }
        }
    }

    /// Forward a negotiation envelope to the sender's current peer.
    ///
    /// Fire-and-forget: with no routable peer the message is dropped and
    /// the sender hears nothing about it.
    pub fn relay(&self, id: &SessionId, message: SignalMessage) -> Vec<Outbound> {
        let peer_id = self.registry.get(id).and_then(|s| s.peer_id.clone());
        match peer_id {
            Some(to) if self.registry.contains(&to) => vec![Outbound::new(to, message)],
            _ => {
                debug!(%id, "relay without a routable peer, dropping");
                Vec::new()
            }
        }
    }

    // ===== Pairing engine =====

    /// One pairing attempt for `id`, scanning the queue front to back.
    ///
    /// `exclude` removes a single candidate from consideration; `skip`
    /// passes the immediately-prior peer here.
    fn try_match(
        &mut self,
        id: &SessionId,
        gender: Option<Gender>,
        preference: Option<Preference>,
        exclude: Option<&SessionId>,
    ) -> Vec<Outbound> {
        let Some(session) = self.registry.get_mut(id) else {
            return Vec::new();
        };
        session.gender = gender;
        session.preference = preference;

        // A join while still paired releases the current peer first;
        // otherwise pairing anew would leave that peer dangling.
        let mut outbox = Vec::new();
        if let Some(prior) = session.peer_id.take() {
            self.clear_reciprocal(&prior, id);
            outbox.push(Outbound::new(prior, SignalMessage::PeerLeft));
        }
        // A re-join while waiting restarts the scan from a clean slate.
        self.dequeue(id);

        match self.find_candidate(id, exclude) {
            Some(candidate) => outbox.extend(self.pair(id, &candidate)),
            None => {
                self.enqueue(id);
                debug!(%id, waiting = self.queue.len(), "no compatible candidate, queued");
            }
        }
        outbox
    }

    /// First queued candidate, in arrival order, satisfying the symmetric
    /// predicate against the joiner. Oldest-waiting wins; there is no
    /// priority beyond arrival order.
    fn find_candidate(&self, id: &SessionId, exclude: Option<&SessionId>) -> Option<SessionId> {
        let joiner = self.registry.get(id)?;
        self.queue
            .iter()
            .find(|candidate_id| {
                if *candidate_id == id || Some(*candidate_id) == exclude {
                    return false;
                }
                self.registry
                    .get(candidate_id)
                    .is_some_and(|candidate| compatible(joiner, candidate))
            })
            .cloned()
    }

    /// Atomically transition both sessions from queued to paired and
    /// announce the fresh channel to each side.
    fn pair(&mut self, a: &SessionId, b: &SessionId) -> Vec<Outbound> {
        self.dequeue(b);
        let channel = channel_name(a, b);
        if let Some(session) = self.registry.get_mut(a) {
            session.peer_id = Some(b.clone());
        }
        if let Some(session) = self.registry.get_mut(b) {
            session.peer_id = Some(a.clone());
        }
        info!(%a, %b, channel = %channel, "sessions paired");
        vec![
            Outbound::new(
                a.clone(),
                SignalMessage::Matched {
                    peer_id: b.clone(),
                    channel_name: channel.clone(),
                },
            ),
            Outbound::new(
                b.clone(),
                SignalMessage::Matched {
                    peer_id: a.clone(),
                    channel_name: channel,
                },
            ),
        ]
    }

    // ===== Store helpers =====

    /// Queue membership and pairing are mutually exclusive; a paired
    /// session never waits.
    fn enqueue(&mut self, id: &SessionId) {
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };
        if session.peer_id.is_some() {
            return;
        }
        session.queued = true;
        self.queue.enqueue(id.clone());
    }

    fn dequeue(&mut self, id: &SessionId) {
        self.queue.remove(id);
        if let Some(session) = self.registry.get_mut(id) {
            session.queued = false;
        }
    }

    /// Clear both references so neither side names the other.
    fn unpair(&mut self, a: &SessionId, b: &SessionId) {
        if let Some(session) = self.registry.get_mut(a) {
            if session.peer_id.as_ref() == Some(b) {
                session.peer_id = None;
            }
        }
        self.clear_reciprocal(b, a);
    }

    /// Drop `holder`'s reference to `gone` if it still holds one.
    fn clear_reciprocal(&mut self, holder: &SessionId, gone: &SessionId) {
        if let Some(session) = self.registry.get_mut(holder) {
            if session.peer_id.as_ref() == Some(gone) {
                session.peer_id = None;
            }
        }
    }

    // ===== Read-only views (used by the transport layer and tests) =====

    pub fn session(&self, id: &SessionId) -> Option<&crate::domain::Session> {
        self.registry.get(id)
    }

    pub fn is_queued(&self, id: &SessionId) -> bool {
        self.queue.contains(id)
    }

    pub fn waiting(&self) -> usize {
        self.queue.len()
    }

    pub fn connected(&self) -> usize {
        self.registry.len()
    }
}
