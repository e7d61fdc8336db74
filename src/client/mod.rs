//! Client side of the commit protocol: ordered fail-over across replicas and
//! correlation of replies to outstanding requests.

mod correlation;

pub use correlation::PendingReplies;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;

use crate::common::{self, Worker};
use crate::communication::message::{op_id, Message, MessageKind, FIELD_DELIMITER};
use crate::communication::transport::MessageTransport;
use crate::configuration::{ClientConfiguration, ClientTimings, Cluster, Peer};
use crate::errors::{new_err, ErrorKind, Result};

/// Handle for issuing writes and reads. Cheap to clone; clones share the
/// request counters and the correlation table, so several requests may be in
/// flight at once.
#[derive(Clone, Debug)]
pub struct KvClient<Tr>
where
    Tr: MessageTransport,
{
    client_id: String,
    replicas: Arc<Vec<Peer>>,
    transport: Tr,
    timings: ClientTimings,
    put_sequence: Arc<AtomicU64>,
    get_sequence: Arc<AtomicU64>,
    pending_replies: PendingReplies,
}

struct ReplyDispatcherParams<Tr>
where
    Tr: MessageTransport,
{
    client_id: String,
    transport: Tr,
    timings: ClientTimings,
    pending_replies: PendingReplies,
}

/// Starts the reply dispatcher of a client. Dropping or terminating the
/// returned worker stops it and fails every outstanding request with
/// `ErrorKind::Stopped`.
pub fn start_client<Tr, Cl>(config: ClientConfiguration<Tr, Cl>) -> (KvClient<Tr>, Worker)
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    let mut replicas = Vec::new();
    for node_id in config.cluster.replica_ids() {
        if node_id == config.client_id {
            debug!(
                "Client {} is listed among the replicas. Excluded from fail-over",
                config.client_id
            );
            continue;
        }

        match config.cluster.resolve(&node_id) {
            Some(address) => replicas.push(Peer { node_id, address }),
            None => warn!(
                "Client {} cannot resolve replica {}. Replica skipped",
                config.client_id, node_id
            ),
        }
    }

    let pending_replies = PendingReplies::new();
    let client = KvClient {
        client_id: config.client_id.clone(),
        replicas: Arc::new(replicas),
        transport: config.transport.clone(),
        timings: config.timings,
        put_sequence: Arc::new(AtomicU64::new(0)),
        get_sequence: Arc::new(AtomicU64::new(0)),
        pending_replies: pending_replies.clone(),
    };

    let worker = common::run_worker(
        dispatch_replies,
        ReplyDispatcherParams {
            client_id: config.client_id,
            transport: config.transport,
            timings: config.timings,
            pending_replies,
        },
    );

    (client, worker)
}

fn dispatch_replies<Tr>(params: ReplyDispatcherParams<Tr>, terminate_worker_rx: Receiver<()>)
where
    Tr: MessageTransport,
{
    info!("Client {} reply dispatcher started", params.client_id);
    loop {
        if common::termination_requested(&terminate_worker_rx) {
            break;
        }

        if let Some(message) = params.transport.receive(params.timings.receive_timeout) {
            trace!("Client {} Received {}", params.client_id, message);
            if !params.pending_replies.resolve(message.clone()) {
                debug!(
                    "Client {} No request waits for {}. Dropped",
                    params.client_id, message
                );
            }
        }
    }

    params.pending_replies.close();
    info!("Client {} reply dispatcher stopped", params.client_id);
}

impl<Tr> KvClient<Tr>
where
    Tr: MessageTransport,
{
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Writes `key=value` and blocks until the coordinating replica reports
    /// the commit.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        check_field("value", value)?;

        let sequence = self.put_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let request =
            Message::put_request(&self.client_id, op_id(&self.client_id, sequence), key, value);

        self.send_and_wait(request, MessageKind::Commit, None)?;

        Ok(())
    }

    /// Reads the committed value of `key` from the first replica accepting the
    /// request. An empty value reads as absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_with_target(key, None)
    }

    /// Reads `key` from one specific replica, without fail-over.
    pub fn get_from(&self, replica_id: &str, key: &str) -> Result<Option<String>> {
        self.get_with_target(key, Some(replica_id))
    }

    fn get_with_target(&self, key: &str, replica_id: Option<&str>) -> Result<Option<String>> {
        check_key(key)?;

        let sequence = self.get_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let request =
            Message::get_request(&self.client_id, op_id(&self.client_id, sequence), key);

        let response = self.send_and_wait(request, MessageKind::GetResponse, replica_id)?;
        if response.value.is_empty() {
            return Ok(None);
        }

        Ok(Some(response.value))
    }

    fn send_and_wait(
        &self,
        request: Message,
        reply_kind: MessageKind,
        replica_id: Option<&str>,
    ) -> Result<Message> {
        let reply_rx = self.pending_replies.register(reply_kind, &request.op_id)?;

        if let Err(err) = self.send_with_failover(&request, replica_id) {
            self.pending_replies.cancel(reply_kind, &request.op_id);
            return Err(err);
        }

        self.wait_for_reply(reply_rx, reply_kind, &request.op_id)
    }

    /// Tries the replicas in configured order and stops at the first one that
    /// accepts the request. Never re-sends after a successful delivery.
    fn send_with_failover(&self, request: &Message, replica_id: Option<&str>) -> Result<()> {
        let candidates = self
            .replicas
            .iter()
            .filter(|replica| replica_id.map_or(true, |id| id == replica.node_id));

        for replica in candidates {
            match self.transport.send(&replica.address, request) {
                Ok(()) => {
                    debug!(
                        "Client {} Sent {} to replica {}",
                        self.client_id, request, replica.node_id
                    );
                    return Ok(());
                }
                Err(err) => debug!(
                    "Client {} Replica {} unreachable, trying next: {}",
                    self.client_id, replica.node_id, err
                ),
            }
        }

        new_err(
            ErrorKind::NoLiveReplicas,
            format!("{} failed: no live replicas", request.kind),
            request.op_id.clone(),
        )
    }

    fn wait_for_reply(
        &self,
        reply_rx: Receiver<Message>,
        reply_kind: MessageKind,
        op_id: &str,
    ) -> Result<Message> {
        let started = Instant::now();
        loop {
            let mut poll_interval = self.timings.reply_poll_interval;
            if let Some(max_wait) = self.timings.max_reply_wait {
                let elapsed = started.elapsed();
                if elapsed >= max_wait {
                    self.pending_replies.cancel(reply_kind, op_id);
                    return new_err(
                        ErrorKind::ReplyTimeout,
                        format!("No {} received for {}", reply_kind, op_id),
                        format!("waited {:?}", elapsed),
                    );
                }
                poll_interval = poll_interval.min(max_wait - elapsed);
            }

            select!(
                recv(reply_rx) -> res => {
                    return match res {
                        Ok(reply) => Ok(reply),
                        Err(err) => new_err(
                            ErrorKind::Stopped,
                            format!("Client {} stopped while waiting for {}", self.client_id, op_id),
                            err.to_string(),
                        ),
                    };
                },
                recv(crossbeam_channel::after(poll_interval)) -> _ => {
                    trace!("Client {} still waiting for {} {}", self.client_id, reply_kind, op_id);
                },
            );
        }
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return new_err(
            ErrorKind::InvalidRequest,
            "Empty key".to_string(),
            String::new(),
        );
    }

    check_field("key", key)
}

/// Rejects text that cannot travel as one wire field: the delimiter and line
/// terminators are reserved.
fn check_field(name: &str, field: &str) -> Result<()> {
    if field.contains(|c: char| c == FIELD_DELIMITER || c == '\n' || c == '\r') {
        return new_err(
            ErrorKind::InvalidRequest,
            format!("The {} '{}' holds a reserved character", name, field.escape_default()),
            "'|', '\\n' and '\\r' cannot be sent".to_string(),
        );
    }

    Ok(())
}
