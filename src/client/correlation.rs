use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::communication::message::{Message, MessageKind};
use crate::errors::{new_err, ErrorKind, Result};

type ReplyKey = (MessageKind, String);

/// Correlation table of outstanding client requests: `(reply kind, op_id)`
/// to the channel completing the waiting call. Shared by the callers and the
/// reply dispatcher.
#[derive(Clone, Debug, Default)]
pub struct PendingReplies {
    inner: Arc<Mutex<PendingRepliesInner>>,
}

#[derive(Debug, Default)]
struct PendingRepliesInner {
    closed: bool,
    waiters: HashMap<ReplyKey, Sender<Message>>,
}

impl PendingReplies {
    pub fn new() -> PendingReplies {
        PendingReplies::default()
    }

    /// Registers a waiter for the reply of `kind` carrying `op_id`. Must be
    /// called before the request is sent so a fast reply is not missed.
    pub fn register(&self, kind: MessageKind, op_id: &str) -> Result<Receiver<Message>> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return new_err(
                ErrorKind::Stopped,
                format!("Cannot wait for {} {}", kind, op_id),
                "reply dispatcher stopped".to_string(),
            );
        }

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if inner
            .waiters
            .insert((kind, op_id.to_string()), reply_tx)
            .is_some()
        {
            warn!("Replaced waiter for {} {}", kind, op_id);
        }

        Ok(reply_rx)
    }

    pub fn cancel(&self, kind: MessageKind, op_id: &str) {
        self.inner.lock().waiters.remove(&(kind, op_id.to_string()));
    }

    /// Completes the waiter matching `message`. Returns `false` when nobody
    /// waits for it.
    pub fn resolve(&self, message: Message) -> bool {
        let waiter = self
            .inner
            .lock()
            .waiters
            .remove(&(message.kind, message.op_id.clone()));

        match waiter {
            Some(reply_tx) => reply_tx.try_send(message).is_ok(),
            None => false,
        }
    }

    /// Releases every waiter and rejects further registrations.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.waiters.clear();
    }

    pub fn outstanding(&self) -> usize {
        self.inner.lock().waiters.len()
    }
}
