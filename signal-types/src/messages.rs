//! Protocol messages for FileDrop signaling.
//!
//! Every frame is a flat JSON object with a `type` discriminator. Relay
//! commands (`offer`, `answer`, `candidate`) carry negotiation payloads the
//! relay never inspects; [`SignalPayload`] keeps those fields opaque.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ClientId, ShareCode, WireError};

/// Commands a client sends over its connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new room and become its initiator.
    CreateRoom,
    /// Join an existing room by share code.
    JoinRoom {
        /// The code displayed to the initiator. Optional so a missing field
        /// surfaces as a command error, not a parse failure.
        #[serde(rename = "shareCode", default, skip_serializing_if = "Option::is_none")]
        share_code: Option<String>,
    },
    /// Session description offer, relayed to the other occupant.
    Offer(SignalPayload),
    /// Session description answer, relayed to the other occupant.
    Answer(SignalPayload),
    /// Network path candidate, relayed to the other occupant.
    Candidate(SignalPayload),
}

impl ClientMessage {
    /// Parse a client command from a raw text frame.
    ///
    /// Distinguishes an unrecognized discriminator (reported back naming the
    /// type) from a payload that is not a structured message at all.
    pub fn parse(text: &str) -> Result<Self, WireError> {
        let value: Value = serde_json::from_str(text).map_err(|_| WireError::InvalidFormat)?;
        let message_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(WireError::InvalidFormat)?;

        match message_type {
            "create_room" | "join_room" | "offer" | "answer" | "candidate" => {
                serde_json::from_value(value).map_err(|_| WireError::InvalidFormat)
            }
            other => Err(WireError::UnknownType(other.to_string())),
        }
    }
}

/// Body of a relay command.
///
/// Only `shareCode` is meaningful to the relay; everything else rides along
/// untouched in `rest`, including any stale `peerId` the sender supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPayload {
    /// The room this signal is addressed to.
    #[serde(rename = "shareCode", default, skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,
    /// Opaque negotiation fields, forwarded field-for-field.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

impl SignalPayload {
    /// Re-encode as a wire frame with the given `type` discriminator and the
    /// sender's connection ID as `peerId`.
    ///
    /// `peerId` is written last so it overwrites anything the sender put in
    /// the payload.
    pub fn to_frame(&self, message_type: &str, peer_id: ClientId) -> String {
        let mut object = serde_json::Map::new();
        object.insert(
            "type".to_string(),
            Value::String(message_type.to_string()),
        );
        if let Some(code) = &self.share_code {
            object.insert("shareCode".to_string(), Value::String(code.clone()));
        }
        for (key, value) in &self.rest {
            object.insert(key.clone(), value.clone());
        }
        object.insert("peerId".to_string(), Value::String(peer_id.to_string()));
        Value::Object(object).to_string()
    }
}

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room opened; sent to the initiator.
    RoomCreated {
        /// The freshly generated room code.
        #[serde(rename = "shareCode")]
        share_code: ShareCode,
        /// The initiator's own connection ID.
        #[serde(rename = "clientId")]
        client_id: ClientId,
    },
    /// Join succeeded; sent to the joiner.
    RoomJoined {
        /// The initiator's connection ID.
        #[serde(rename = "peerId")]
        peer_id: ClientId,
        /// The joiner's own connection ID.
        #[serde(rename = "clientId")]
        client_id: ClientId,
        /// The room that was joined.
        #[serde(rename = "shareCode")]
        share_code: ShareCode,
    },
    /// A responder arrived; sent to the initiator.
    PeerJoined {
        /// The joiner's connection ID.
        #[serde(rename = "peerId")]
        peer_id: ClientId,
        /// The room that was joined.
        #[serde(rename = "shareCode")]
        share_code: ShareCode,
    },
    /// The other occupant disconnected.
    PeerLeft {
        /// The connection ID that left.
        #[serde(rename = "peerId")]
        peer_id: ClientId,
        /// The room the peer left.
        #[serde(rename = "shareCode")]
        share_code: ShareCode,
    },
    /// A command failed; reported only to the sender.
    Error {
        /// Human-readable description of the failure.
        message: String,
    },
}

impl ServerMessage {
    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_create_room() {
        let msg = ClientMessage::parse(r#"{"type":"create_room"}"#).unwrap();
        assert_eq!(msg, ClientMessage::CreateRoom);
    }

    #[test]
    fn parse_join_room_with_code() {
        let msg = ClientMessage::parse(r#"{"type":"join_room","shareCode":"AB12CD"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                share_code: Some("AB12CD".to_string())
            }
        );
    }

    #[test]
    fn parse_join_room_without_code() {
        let msg = ClientMessage::parse(r#"{"type":"join_room"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinRoom { share_code: None });
    }

    #[test]
    fn parse_offer_keeps_opaque_fields() {
        let msg = ClientMessage::parse(
            r#"{"type":"offer","shareCode":"AB12CD","sdp":"v=0...","bundle":{"mid":0}}"#,
        )
        .unwrap();
        let ClientMessage::Offer(payload) = msg else {
            panic!("expected offer");
        };
        assert_eq!(payload.share_code.as_deref(), Some("AB12CD"));
        assert_eq!(payload.rest["sdp"], json!("v=0..."));
        assert_eq!(payload.rest["bundle"], json!({"mid": 0}));
    }

    #[test]
    fn parse_unknown_type_names_it() {
        let err = ClientMessage::parse(r#"{"type":"dance"}"#).unwrap_err();
        assert!(matches!(err, WireError::UnknownType(t) if t == "dance"));
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(matches!(
            ClientMessage::parse("not json at all"),
            Err(WireError::InvalidFormat)
        ));
    }

    #[test]
    fn parse_rejects_missing_or_non_string_type() {
        assert!(matches!(
            ClientMessage::parse(r#"{"shareCode":"AB12CD"}"#),
            Err(WireError::InvalidFormat)
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":42}"#),
            Err(WireError::InvalidFormat)
        ));
        assert!(matches!(
            ClientMessage::parse("[1,2,3]"),
            Err(WireError::InvalidFormat)
        ));
    }

    #[test]
    fn to_frame_injects_peer_id() {
        let sender = ClientId::from_bytes(&[0xa1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let ClientMessage::Offer(payload) =
            ClientMessage::parse(r#"{"type":"offer","shareCode":"AB12CD","sdp":"v=0..."}"#)
                .unwrap()
        else {
            panic!("expected offer");
        };

        let frame: Value = serde_json::from_str(&payload.to_frame("offer", sender)).unwrap();
        assert_eq!(
            frame,
            json!({
                "type": "offer",
                "shareCode": "AB12CD",
                "sdp": "v=0...",
                "peerId": "a100000000000000",
            })
        );
    }

    #[test]
    fn to_frame_overwrites_stale_peer_id() {
        let sender = ClientId::from_bytes(&[0xb2, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let ClientMessage::Candidate(payload) = ClientMessage::parse(
            r#"{"type":"candidate","shareCode":"AB12CD","candidate":"c","peerId":"forged"}"#,
        )
        .unwrap()
        else {
            panic!("expected candidate");
        };

        let frame: Value =
            serde_json::from_str(&payload.to_frame("candidate", sender)).unwrap();
        assert_eq!(frame["peerId"], json!("b200000000000000"));
        assert_eq!(frame["candidate"], json!("c"));
    }

    #[test]
    fn server_messages_match_wire_shapes() {
        let a = ClientId::from_bytes(&[0xa1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let b = ClientId::from_bytes(&[0xb2, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let code: ShareCode = "AB12CD".parse().unwrap();

        let created = ServerMessage::RoomCreated {
            share_code: code,
            client_id: a,
        };
        assert_eq!(
            serde_json::from_str::<Value>(&created.to_json().unwrap()).unwrap(),
            json!({"type": "room_created", "shareCode": "AB12CD", "clientId": "a100000000000000"})
        );

        let joined = ServerMessage::RoomJoined {
            peer_id: a,
            client_id: b,
            share_code: code,
        };
        assert_eq!(
            serde_json::from_str::<Value>(&joined.to_json().unwrap()).unwrap(),
            json!({
                "type": "room_joined",
                "peerId": "a100000000000000",
                "clientId": "b200000000000000",
                "shareCode": "AB12CD",
            })
        );

        let left = ServerMessage::PeerLeft {
            peer_id: b,
            share_code: code,
        };
        assert_eq!(
            serde_json::from_str::<Value>(&left.to_json().unwrap()).unwrap(),
            json!({"type": "peer_left", "peerId": "b200000000000000", "shareCode": "AB12CD"})
        );

        let error = ServerMessage::Error {
            message: "Room is full.".to_string(),
        };
        assert_eq!(
            serde_json::from_str::<Value>(&error.to_json().unwrap()).unwrap(),
            json!({"type": "error", "message": "Room is full."})
        );
    }

    #[test]
    fn server_message_roundtrip() {
        let original = ServerMessage::PeerJoined {
            peer_id: ClientId::random(),
            share_code: ShareCode::random(),
        };
        let back: ServerMessage =
            serde_json::from_str(&original.to_json().unwrap()).unwrap();
        assert_eq!(back, original);
    }
}
