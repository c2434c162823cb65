//!
//! message.rs
//! Wire model for the ring election protocol: one JSON object per line,
//! newline-terminated, camelCase field names.
//!
use serde::{Deserialize, Serialize};

/// Directional label carried by OUT/IN/ANNOUNCE messages. Purely a label;
/// symmetry between `L` and `R` is strict, neither side is privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dir {
    #[serde(rename = "L")]
    L,
    #[serde(rename = "R")]
    R,
}

impl Dir {
    pub fn opposite(self) -> Dir {
        match self {
            Dir::L => Dir::R,
            Dir::R => Dir::L,
        }
    }
}

/// A single protocol message. Modeled as a tagged sum with a `type`
/// discriminant so the wire representation stays precise: each variant
/// carries only the fields that type actually uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "OUT")]
    Out {
        uid: i64,
        phase: u32,
        ttl: u64,
        dir: Dir,
        #[serde(rename = "senderIndex")]
        sender_index: usize,
    },
    #[serde(rename = "IN")]
    In {
        uid: i64,
        phase: u32,
        dir: Dir,
        #[serde(rename = "senderIndex")]
        sender_index: usize,
    },
    #[serde(rename = "ANNOUNCE")]
    Announce {
        uid: i64,
        winner: i64,
        dir: Dir,
        #[serde(rename = "senderIndex")]
        sender_index: usize,
    },
    #[serde(rename = "REPORT")]
    Report {
        uid: i64,
        winner: i64,
        rounds: u32,
        messages: u64,
    },
}

impl Message {
    /// The ring index of the node that sent this message, when the message
    /// type carries one (REPORT does not; it is addressed to the
    /// orchestrator, not to a ring peer).
    pub fn sender_index(&self) -> Option<usize> {
        match *self {
            Message::Out { sender_index, .. }
            | Message::In { sender_index, .. }
            | Message::Announce { sender_index, .. } => Some(sender_index),
            Message::Report { .. } => None,
        }
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse one line of the wire format. Parse failures and unknown
    /// message types both surface as `Err` here; callers drop the line and
    /// keep reading.
    pub fn from_line(line: &str) -> serde_json::Result<Message> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_message_round_trips_with_camel_case_sender_index() {
        let msg = Message::Out {
            uid: 42,
            phase: 3,
            ttl: 8,
            dir: Dir::L,
            sender_index: 5,
        };
        let line = msg.to_line().unwrap();
        assert!(line.contains("\"senderIndex\":5"));
        assert!(line.contains("\"type\":\"OUT\""));

        match Message::from_line(&line).unwrap() {
            Message::Out {
                uid,
                phase,
                ttl,
                dir,
                sender_index,
            } => {
                assert_eq!(uid, 42);
                assert_eq!(phase, 3);
                assert_eq!(ttl, 8);
                assert_eq!(dir, Dir::L);
                assert_eq!(sender_index, 5);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn report_has_no_sender_index() {
        let msg = Message::Report {
            uid: 1,
            winner: 1,
            rounds: 1,
            messages: 4,
        };
        assert_eq!(msg.sender_index(), None);
    }

    #[test]
    fn unknown_message_type_fails_to_parse() {
        let line = r#"{"type":"PING","uid":1}"#;
        assert!(Message::from_line(line).is_err());
    }

    #[test]
    fn malformed_json_fails_to_parse() {
        assert!(Message::from_line("not json").is_err());
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let line = r#"{"type":"IN","uid":7,"phase":2,"dir":"R","senderIndex":1,"bogus":true}"#;
        let msg = Message::from_line(line).unwrap();
        match msg {
            Message::In { uid, phase, dir, sender_index } => {
                assert_eq!(uid, 7);
                assert_eq!(phase, 2);
                assert_eq!(dir, Dir::R);
                assert_eq!(sender_index, 1);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
