use core::fmt;
use std::error::Error;
use std::fmt::Display;

/// Classifies failures surfaced by the store, its transports and its clients.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ErrorKind {
    /// Inbound line is not a valid wire message.
    ProtocolDecode,

    /// Peer or client endpoint could not be reached.
    Transport,

    /// Cluster configuration is malformed or incomplete.
    Configuration,

    /// Key or value cannot be carried by a wire message.
    InvalidRequest,

    /// No replica accepted the client request.
    NoLiveReplicas,

    /// Client gave up waiting for the reply.
    ReplyTimeout,

    /// Worker was stopped while the request was outstanding.
    Stopped,
}

#[derive(Clone, Debug)]
pub struct KvError {
    kind: ErrorKind,
    text: String,
    cause: String,
}

pub type Result<T> = std::result::Result<T, KvError>;

pub fn new_err<T>(kind: ErrorKind, text: String, cause: String) -> Result<T> {
    Err(KvError { kind, text, cause })
}

impl KvError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cause_word = {
            if !self.cause.is_empty() {
                " Cause: ".to_string()
            } else {
                String::new()
            }
        };
        write!(f, "{}.{}{}", self.text, cause_word, self.cause)
    }
}

impl Error for KvError {}
