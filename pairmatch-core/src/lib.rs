// Domain layer (sessions, queue, matching)
pub mod domain;

// Coordinator (pairing engine + lifecycle controller + relay)
pub mod coordinator;

pub mod error;
pub mod message;

// Re-exports for convenience
pub use coordinator::{Coordinator, Outbound};
pub use domain::{
    channel_name, compatible, pref_matches, Gender, MatchQueue, Preference, Session, SessionId,
    SessionRegistry,
};
pub use error::CoordinatorError;
pub use message::SignalMessage;
