use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use quorum_kv::{new_err, ErrorKind, KvError, Message, MessageTransport};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// In-memory message hub. Endpoints exchange encoded wire lines over bounded
/// channels; taking an endpoint offline simulates a crashed process.
#[derive(Clone, Debug)]
pub struct InProcNetwork {
    timeout: Duration,
    inner: Arc<RwLock<InProcNetworkInner>>,
}

#[derive(Debug, Default)]
struct InProcNetworkInner {
    endpoints: HashMap<String, Sender<String>>,
    offline: HashSet<String>,
}

/// Endpoint of an `InProcNetwork`, bound to one address.
#[derive(Clone, Debug)]
pub struct InProcTransport {
    address: String,
    network: InProcNetwork,
    inbound_rx: Receiver<String>,
}

impl InProcNetwork {
    /// Creates a hub whose sends give up after `timeout` on a full queue.
    pub fn new(timeout: Duration) -> InProcNetwork {
        InProcNetwork {
            timeout,
            inner: Arc::new(RwLock::new(InProcNetworkInner::default())),
        }
    }

    /// Registers `address` with an inbound queue of `queue_capacity` lines.
    pub fn add_endpoint(&self, address: &str, queue_capacity: usize) -> InProcTransport {
        let (inbound_tx, inbound_rx) = crossbeam_channel::bounded(queue_capacity);
        let mut inner = self.inner.write();
        if inner
            .endpoints
            .insert(address.to_string(), inbound_tx)
            .is_some()
        {
            warn!("InProc network - endpoint {} re-registered", address);
        }

        InProcTransport {
            address: address.to_string(),
            network: self.clone(),
            inbound_rx,
        }
    }

    /// Brings an endpoint down or up. An offline endpoint neither sends nor
    /// receives.
    pub fn set_online(&self, address: &str, online: bool) {
        let mut inner = self.inner.write();
        if online {
            inner.offline.remove(address);
        } else {
            inner.offline.insert(address.to_string());
        }
        info!("InProc network - {} is {}", address, if online { "up" } else { "down" });
    }

    pub fn is_online(&self, address: &str) -> bool {
        !self.inner.read().offline.contains(address)
    }

    fn deliver(&self, from: &str, to: &str, line: String) -> Result<(), KvError> {
        let inbound_tx = {
            let inner = self.inner.read();
            if inner.offline.contains(from) || inner.offline.contains(to) {
                return new_err(
                    ErrorKind::Transport,
                    format!("Endpoint {} is unreachable from {}", to, from),
                    "node is down".to_string(),
                );
            }

            match inner.endpoints.get(to) {
                Some(inbound_tx) => inbound_tx.clone(),
                None => {
                    return new_err(
                        ErrorKind::Transport,
                        format!("Unknown endpoint {}", to),
                        String::new(),
                    )
                }
            }
        };

        if let Err(err) = inbound_tx.send_timeout(line, self.timeout) {
            return new_err(
                ErrorKind::Transport,
                format!("Cannot deliver to {}", to),
                err.to_string(),
            );
        }

        Ok(())
    }
}

impl InProcTransport {
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl MessageTransport for InProcTransport {
    fn send(&self, address: &str, message: &Message) -> Result<(), KvError> {
        trace!("InProc {} -> {}: {}", self.address, address, message);

        self.network.deliver(&self.address, address, message.encode())
    }

    fn receive(&self, timeout: Duration) -> Option<Message> {
        let deadline = Instant::now() + timeout;
        loop {
            let line = self.inbound_rx.recv_deadline(deadline).ok()?;
            if !self.network.is_online(&self.address) {
                trace!("InProc {} is down. Dropped {}", self.address, line);
                continue;
            }

            match Message::decode(&line) {
                Ok(message) => return Some(message),
                Err(err) => warn!("InProc {} Dropped line '{}': {}", self.address, line, err),
            }
        }
    }
}
