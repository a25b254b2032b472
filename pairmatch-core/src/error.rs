use crate::domain::SessionId;

/// Failures surfaced by the pairing coordinator.
///
/// None of these is fatal to the process; per-connection failures stay
/// isolated to that connection.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoordinatorError {
    /// The transport handshake carried no session identifier; the
    /// connection is refused before any record exists.
    #[error("session identifier required")]
    MissingSessionId,

    /// An inbound envelope could not be decoded. Logged and ignored;
    /// the connection stays open.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// An operation referenced a session that is not registered.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    // The refusal text travels in the close frame, so it is part of the
    // wire contract.
    #[test]
    fn error_texts_are_stable() {
        assert_eq!(
            CoordinatorError::MissingSessionId.to_string(),
            "session identifier required"
        );
        assert_eq!(
            CoordinatorError::MalformedMessage("bad tag".to_string()).to_string(),
            "malformed message: bad tag"
        );
        assert_eq!(
            CoordinatorError::UnknownSession(SessionId::from("ghost")).to_string(),
            "unknown session: ghost"
        );
    }
}
