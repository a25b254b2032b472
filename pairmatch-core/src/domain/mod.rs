pub mod channel;
pub mod matching;
pub mod queue;
pub mod registry;
pub mod session;

pub use channel::channel_name;
pub use matching::{compatible, pref_matches};
pub use queue::MatchQueue;
pub use registry::SessionRegistry;
pub use session::{Gender, Preference, Session, SessionId};
