use crate::errors::{new_err, ErrorKind, Result};

/// Separator of the seven wire fields. Values containing it are not escaped.
pub const FIELD_DELIMITER: char = '|';

/// Largest timestamp accepted off the wire. Leaves the receiving clock room
/// to advance past it.
pub const MAX_WIRE_TIMESTAMP: u64 = i64::MAX as u64;

const FIELD_COUNT: usize = 7;

/// Kind of a protocol message. The discriminant is the wire ordinal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum MessageKind {
    /// Client asks a replica to write `key=value`.
    PutRequest = 0,

    /// Client asks a replica for the committed value of `key`.
    GetRequest = 1,

    /// Coordinator propagates a write to the participants.
    MulticastOp = 2,

    /// Participant confirms it applied a multicast write.
    Ack = 3,

    /// Write reached quorum. Sent to replicas and, translated, to the client.
    Commit = 4,

    /// Replica answers a read.
    GetResponse = 5,
}

impl MessageKind {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<MessageKind> {
        match ordinal {
            0 => Some(MessageKind::PutRequest),
            1 => Some(MessageKind::GetRequest),
            2 => Some(MessageKind::MulticastOp),
            3 => Some(MessageKind::Ack),
            4 => Some(MessageKind::Commit),
            5 => Some(MessageKind::GetResponse),
            _ => None,
        }
    }
}

/// Protocol message exchanged between clients and replicas. Fields irrelevant
/// to a kind are left empty (or zero).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "{} key={} op={} from={} ts={}",
    kind,
    key,
    op_id,
    replica_id,
    timestamp
)]
pub struct Message {
    pub kind: MessageKind,
    pub key: String,
    pub value: String,

    /// Lamport timestamp of the sender.
    pub timestamp: u64,
    pub client_id: String,
    pub replica_id: String,

    /// `<origin>:<sequence>`. Client-minted for requests, replica-minted once
    /// a write is multicast.
    pub op_id: String,
}

/// Mints an op_id for the `sequence`-th operation of `origin`.
pub fn op_id(origin: &str, sequence: u64) -> String {
    format!("{}:{}", origin, sequence)
}

impl Message {
    pub fn new(kind: MessageKind) -> Message {
        Message {
            kind,
            key: String::new(),
            value: String::new(),
            timestamp: 0,
            client_id: String::new(),
            replica_id: String::new(),
            op_id: String::new(),
        }
    }

    pub fn put_request(client_id: &str, op_id: String, key: &str, value: &str) -> Message {
        Message {
            key: key.to_string(),
            value: value.to_string(),
            client_id: client_id.to_string(),
            op_id,
            ..Message::new(MessageKind::PutRequest)
        }
    }

    pub fn get_request(client_id: &str, op_id: String, key: &str) -> Message {
        Message {
            key: key.to_string(),
            client_id: client_id.to_string(),
            op_id,
            ..Message::new(MessageKind::GetRequest)
        }
    }

    pub fn ack(op_id: &str, replica_id: &str, timestamp: u64) -> Message {
        Message {
            timestamp,
            replica_id: replica_id.to_string(),
            op_id: op_id.to_string(),
            ..Message::new(MessageKind::Ack)
        }
    }

    pub fn commit(op_id: &str, replica_id: &str, timestamp: u64) -> Message {
        Message {
            timestamp,
            replica_id: replica_id.to_string(),
            op_id: op_id.to_string(),
            ..Message::new(MessageKind::Commit)
        }
    }

    /// Serializes into `type|key|value|timestamp|client_id|replica_id|op_id`.
    pub fn encode(&self) -> String {
        let delimiter = FIELD_DELIMITER.to_string();
        [
            self.kind.ordinal().to_string(),
            self.key.clone(),
            self.value.clone(),
            self.timestamp.to_string(),
            self.client_id.clone(),
            self.replica_id.clone(),
            self.op_id.clone(),
        ]
        .join(&delimiter)
    }

    /// Parses one wire line. Trailing line terminators are ignored.
    pub fn decode(line: &str) -> Result<Message> {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return new_err(
                ErrorKind::ProtocolDecode,
                format!("Expected {} fields, got {}", FIELD_COUNT, fields.len()),
                line.to_string(),
            );
        }

        let kind = match fields[0].parse::<u8>().ok().and_then(MessageKind::from_ordinal) {
            Some(kind) => kind,
            None => {
                return new_err(
                    ErrorKind::ProtocolDecode,
                    format!("Invalid message type '{}'", fields[0]),
                    line.to_string(),
                )
            }
        };

        let timestamp = match fields[3].parse::<u64>() {
            Ok(timestamp) if timestamp > MAX_WIRE_TIMESTAMP => {
                return new_err(
                    ErrorKind::ProtocolDecode,
                    format!("Timestamp {} out of range", timestamp),
                    line.to_string(),
                )
            }
            Ok(timestamp) => timestamp,
            Err(err) => {
                return new_err(
                    ErrorKind::ProtocolDecode,
                    format!("Invalid timestamp '{}'", fields[3]),
                    err.to_string(),
                )
            }
        };

        Ok(Message {
            kind,
            key: fields[1].to_string(),
            value: fields[2].to_string(),
            timestamp,
            client_id: fields[4].to_string(),
            replica_id: fields[5].to_string(),
            op_id: fields[6].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_field_order() {
        let mut msg = Message::put_request("C1", op_id("C1", 4), "x", "1");
        msg.timestamp = 9;
        msg.replica_id = "R2".to_string();

        assert_eq!("0|x|1|9|C1|R2|C1:4", msg.encode());
    }

    #[test]
    fn test_decode_encoded_message() {
        let mut msg = Message::commit("R1:7", "R1", 12);
        msg.key = "some key".to_string();
        msg.value = "value:with:colons".to_string();

        let decoded = Message::decode(&msg.encode()).expect("valid message");

        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_decode_strips_line_terminator() {
        let decoded = Message::decode("3|||5||R2|R1:1\r\n").expect("valid message");

        assert_eq!(MessageKind::Ack, decoded.kind);
        assert_eq!(5, decoded.timestamp);
        assert_eq!("R2", decoded.replica_id);
        assert_eq!("R1:1", decoded.op_id);
    }

    #[test]
    fn test_decode_empty_value() {
        let decoded = Message::decode("5|x||3|C1|R1|C1:1").expect("valid message");

        assert_eq!(MessageKind::GetResponse, decoded.kind);
        assert_eq!("", decoded.value);
    }

    #[test]
    fn test_decode_rejects_non_numeric_timestamp() {
        let err = Message::decode("0|x|1|abc|C1||C1:1").unwrap_err();

        assert_eq!(ErrorKind::ProtocolDecode, err.kind());
    }

    #[test]
    fn test_decode_rejects_out_of_range_timestamp() {
        let err = Message::decode("2|x|1|18446744073709551615||R1|R1:1").unwrap_err();
        assert_eq!(ErrorKind::ProtocolDecode, err.kind());

        let line = format!("2|x|1|{}||R1|R1:1", MAX_WIRE_TIMESTAMP);
        let decoded = Message::decode(&line).expect("largest accepted timestamp");
        assert_eq!(MAX_WIRE_TIMESTAMP, decoded.timestamp);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(Message::decode("6|x|1|1|C1||C1:1").is_err());
        assert!(Message::decode("put|x|1|1|C1||C1:1").is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        assert!(Message::decode("0|x|1|1|C1|C1:1").is_err());
        assert!(Message::decode("0|x|a|b|1|C1||C1:1").is_err());
        assert!(Message::decode("").is_err());
    }

    #[test]
    fn test_ordinals() {
        for ordinal in 0..6u8 {
            let kind = MessageKind::from_ordinal(ordinal).expect("known ordinal");
            assert_eq!(ordinal, kind.ordinal());
        }
        assert_eq!(None, MessageKind::from_ordinal(6));
    }
}
