use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for one connected participant.
///
/// Supplied by the transport handshake (an account service mints it
/// upstream); the coordinator never inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Self-reported gender of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Who a participant wants to be paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Guys,
    Girls,
    Both,
}

/// One connected participant's server-side state record.
///
/// A session is in exactly one of three states at any instant: queued
/// (`queued`, no peer), paired (`peer_id` set, not queued) or idle.
/// `gender`/`preference` are `None` until the first join and are cleared
/// again by leave-queue and disconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub gender: Option<Gender>,
    pub preference: Option<Preference>,
    pub peer_id: Option<SessionId>,
    pub queued: bool,
}

impl Session {
    /// Fresh record: unpaired, unqueued, preferences unset.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            gender: None,
            preference: None,
            peer_id: None,
            queued: false,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.peer_id.is_some()
    }
}
