use std::fmt::Debug;
use std::time::Duration;

use crate::communication::message::Message;
use crate::errors::KvError;

/// Message delivery between named endpoints.
pub trait MessageTransport: Clone + Send + Sync + Debug + 'static {
    /// Best-effort one-shot delivery to `address`. An error means the endpoint
    /// is unreachable right now.
    fn send(&self, address: &str, message: &Message) -> Result<(), KvError>;

    /// Pops the next decoded inbound message, or `None` once `timeout` elapses.
    fn receive(&self, timeout: Duration) -> Option<Message>;
}
