// Media transport seam
pub mod media;

// Peer session state machine
pub mod peer_session;

pub mod error;
pub mod retry;

// Re-exports for convenience
pub use error::{ClientError, Result};
pub use media::MediaSession;
pub use peer_session::{CallState, PeerSession};
pub use retry::RetryPolicy;
