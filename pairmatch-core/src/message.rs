use crate::domain::{Gender, Preference, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire envelope exchanged over the signaling transport.
///
/// A closed union tagged on `type`. Negotiation payloads (`offer`,
/// `answer`, `ice-candidate`) stay opaque `Value` blobs: the coordinator
/// relays them verbatim and never interprets their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    /// Client asks to be matched, stating (possibly partial) preferences.
    Join {
        #[serde(default)]
        gender: Option<Gender>,
        #[serde(default, rename = "genderPreference")]
        gender_preference: Option<Preference>,
    },
    /// Coordinator announces a pairing to each side.
    Matched {
        #[serde(rename = "peerId")]
        peer_id: SessionId,
        #[serde(rename = "channelName")]
        channel_name: String,
    },
    /// Relayed session description, offering side.
    Offer { offer: Value },
    /// Relayed session description, answering side.
    Answer { answer: Value },
    /// Relayed connectivity-establishment blob.
    IceCandidate { candidate: Value },
    /// The current peer skipped, left or disconnected.
    PeerLeft,
    /// Client tears the current pairing down and asks for the next one.
    Skip,
    /// Client stops matchmaking entirely.
    LeaveQueue,
    /// Coordinator-side error report.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_uses_camel_case_fields() {
        let text = r#"{"type":"join","gender":"female","genderPreference":"guys"}"#;
        let message: SignalMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            message,
            SignalMessage::Join {
                gender: Some(Gender::Female),
                gender_preference: Some(Preference::Guys),
            }
        );
    }

    #[test]
    fn join_fields_may_be_absent() {
        let message: SignalMessage = serde_json::from_str(r#"{"type":"join"}"#).unwrap();
        assert_eq!(
            message,
            SignalMessage::Join {
                gender: None,
                gender_preference: None,
            }
        );
    }

    #[test]
    fn tags_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SignalMessage::PeerLeft).unwrap(),
            r#"{"type":"peer-left"}"#
        );
        assert_eq!(
            serde_json::to_string(&SignalMessage::LeaveQueue).unwrap(),
            r#"{"type":"leave-queue"}"#
        );

        let candidate = SignalMessage::IceCandidate {
            candidate: json!({"sdpMid": "0"}),
        };
        let text = serde_json::to_string(&candidate).unwrap();
        assert!(text.contains(r#""type":"ice-candidate""#));
    }

    #[test]
    fn matched_round_trips() {
        let message = SignalMessage::Matched {
            peer_id: SessionId::from("bob"),
            channel_name: "call_1_alice_bob".to_string(),
        };
        let text = serde_json::to_string(&message).unwrap();
        assert!(text.contains(r#""peerId":"bob""#));
        assert!(text.contains(r#""channelName":"call_1_alice_bob""#));
        assert_eq!(serde_json::from_str::<SignalMessage>(&text).unwrap(), message);
    }

    #[test]
    fn negotiation_payloads_stay_opaque() {
        let text = r#"{"type":"offer","offer":{"sdp":"v=0...","type":"offer"}}"#;
        let message: SignalMessage = serde_json::from_str(text).unwrap();
        let SignalMessage::Offer { offer } = message else {
            panic!("expected offer");
        };
        assert_eq!(offer["sdp"], "v=0...");
    }

    #[test]
    fn unknown_tag_fails_to_decode() {
        assert!(serde_json::from_str::<SignalMessage>(r#"{"type":"dance"}"#).is_err());
    }
}
