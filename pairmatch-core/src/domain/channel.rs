use crate::domain::session::SessionId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Mint the media-channel name for a fresh pairing.
///
/// Derived from the two session ids and the creation time. Two
/// temporally overlapping pairings always differ in at least one
/// participant id, which is all the uniqueness the media transport
/// needs; nothing is persisted.
pub fn channel_name(a: &SessionId, b: &SessionId) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("call_{millis}_{a}_{b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_both_participant_ids() {
        let name = channel_name(&SessionId::from("alice"), &SessionId::from("bob"));
        assert!(name.starts_with("call_"));
        assert!(name.contains("_alice_"));
        assert!(name.ends_with("_bob"));
    }

    #[test]
    fn distinct_pairs_get_distinct_channels() {
        let a = channel_name(&SessionId::from("a"), &SessionId::from("b"));
        let b = channel_name(&SessionId::from("c"), &SessionId::from("d"));
        assert_ne!(a, b);
    }
}
