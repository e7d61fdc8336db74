use std::collections::{HashMap, HashSet};

use crate::clock::LamportClock;
use crate::communication::message::{op_id, Message, MessageKind};
use crate::communication::transport::MessageTransport;
use crate::configuration::{Cluster, Peer};
use crate::store::ReplicatedStore;


/// Client request a replica-minted op_id was created for.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClientOrigin {
    pub client_id: String,
    pub client_op_id: String,
}

/// Acknowledgments needed to commit an operation multicast to `quorum_size`
/// live replicas.
pub fn required_acks(quorum_size: usize) -> usize {
    quorum_size / 2 + 1
}

/// Protocol state of one replica process. Owned by the engine thread; every
/// handler runs to completion before the next message is taken.
///
/// The coordinator role is not stored anywhere: a replica coordinates exactly
/// the operations it minted op_ids for while handling a `PutRequest`.
#[derive(Debug)]
pub struct ReplicaState<Tr, Cl>
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    pub id: String,
    clock: LamportClock,
    store: ReplicatedStore,

    op_client_map: HashMap<String, ClientOrigin>,
    ack_tracker: HashMap<String, HashSet<String>>,
    committed_ops: HashSet<String>,
    op_quorum_size: HashMap<String, usize>,

    peers: Vec<Peer>,
    transport: Tr,
    cluster: Cl,
}

impl<Tr, Cl> ReplicaState<Tr, Cl>
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    pub fn new(replica_id: String, cluster: Cl, transport: Tr) -> ReplicaState<Tr, Cl> {
        let mut peers = Vec::new();
        for node_id in cluster.peers(&replica_id) {
            match cluster.resolve(&node_id) {
                Some(address) => peers.push(Peer { node_id, address }),
                None => warn!(
                    "Replica {} cannot resolve peer {}. Peer skipped",
                    replica_id, node_id
                ),
            }
        }

        ReplicaState {
            id: replica_id,
            clock: LamportClock::new(),
            store: ReplicatedStore::new(),
            op_client_map: HashMap::new(),
            ack_tracker: HashMap::new(),
            committed_ops: HashSet::new(),
            op_quorum_size: HashMap::new(),
            peers,
            transport,
            cluster,
        }
    }

    pub fn store(&self) -> &ReplicatedStore {
        &self.store
    }

    pub fn clock(&self) -> &LamportClock {
        &self.clock
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn is_committed(&self, op_id: &str) -> bool {
        self.committed_ops.contains(op_id)
    }

    pub fn quorum_size(&self, op_id: &str) -> Option<usize> {
        self.op_quorum_size.get(op_id).cloned()
    }

    pub fn ack_count(&self, op_id: &str) -> usize {
        self.ack_tracker.get(op_id).map_or(0, HashSet::len)
    }

    pub fn process_message(&mut self, message: Message) {
        debug!(
            "Replica {} Received {} client={}",
            self.id, message, message.client_id
        );

        match message.kind {
            MessageKind::PutRequest => self.handle_put_request(message),
            MessageKind::MulticastOp => self.handle_multicast_op(message),
            MessageKind::Ack => self.handle_ack(message),
            MessageKind::Commit => self.handle_commit(message),
            MessageKind::GetRequest => self.handle_get_request(message),
            MessageKind::GetResponse => warn!(
                "Replica {} Unexpected GetResponse for op={}. Dropped",
                self.id, message.op_id
            ),
        }
    }

    fn handle_put_request(&mut self, mut message: Message) {
        if message.key.is_empty() {
            warn!(
                "Replica {} PutRequest {} from client {} has an empty key. Dropped",
                self.id, message.op_id, message.client_id
            );
            return;
        }

        let origin = ClientOrigin {
            client_id: message.client_id.clone(),
            client_op_id: message.op_id.clone(),
        };

        let timestamp = self.clock.tick();
        let replica_op_id = op_id(&self.id, timestamp);

        message.kind = MessageKind::MulticastOp;
        message.replica_id = self.id.clone();
        message.timestamp = timestamp;
        message.op_id = replica_op_id.clone();

        info!(
            "Replica {} Coordinating {} for client {} (client op={})",
            self.id, replica_op_id, origin.client_id, origin.client_op_id
        );
        self.op_client_map.insert(replica_op_id.clone(), origin);

        self.store.apply(&replica_op_id, &message.key, &message.value);
        self.ack_tracker
            .entry(replica_op_id.clone())
            .or_insert_with(HashSet::new)
            .insert(self.id.clone());

        let live_count = 1 + self.multicast(&message);
        trace!(
            "Replica {} Quorum for {} = {} (needed {})",
            self.id,
            replica_op_id,
            live_count,
            required_acks(live_count)
        );
        self.op_quorum_size.insert(replica_op_id.clone(), live_count);

        self.commit_on_quorum(&replica_op_id);
    }

    /// Sends `message` to every peer once. Returns the number of peers that
    /// accepted it.
    fn multicast(&self, message: &Message) -> usize {
        let mut delivered = 0;
        for peer in &self.peers {
            match self.transport.send(&peer.address, message) {
                Ok(()) => delivered += 1,
                Err(err) => warn!(
                    "Replica {} Peer {} down, excluding {} from quorum of {}: {}",
                    self.id, peer.node_id, peer.address, message.op_id, err
                ),
            }
        }

        delivered
    }

    fn handle_multicast_op(&mut self, message: Message) {
        self.clock.update(message.timestamp);
        self.store.apply(&message.op_id, &message.key, &message.value);

        let ack = Message::ack(&message.op_id, &self.id, self.clock.tick());
        match self.cluster.resolve(&message.replica_id) {
            Some(address) => {
                if let Err(err) = self.transport.send(&address, &ack) {
                    warn!(
                        "Replica {} Cannot send ack for {} to {}: {}",
                        self.id, message.op_id, message.replica_id, err
                    );
                }
            }
            None => warn!(
                "Replica {} Unknown coordinator {}. Ack for {} dropped",
                self.id, message.replica_id, message.op_id
            ),
        }
    }

    fn handle_ack(&mut self, message: Message) {
        if !self.op_quorum_size.contains_key(&message.op_id) {
            warn!(
                "Replica {} Ack from {} for unknown op={}. Ignored",
                self.id, message.replica_id, message.op_id
            );
            return;
        }

        self.ack_tracker
            .entry(message.op_id.clone())
            .or_insert_with(HashSet::new)
            .insert(message.replica_id);

        self.commit_on_quorum(&message.op_id);
    }

    /// Commits `op_id` the first time its ack set reaches the quorum recorded
    /// at multicast time.
    fn commit_on_quorum(&mut self, op_id: &str) {
        if self.committed_ops.contains(op_id) {
            return;
        }

        let quorum_size = match self.op_quorum_size.get(op_id) {
            Some(size) => *size,
            None => return,
        };
        if self.ack_count(op_id) < required_acks(quorum_size) {
            return;
        }

        self.committed_ops.insert(op_id.to_string());

        let commit = Message::commit(op_id, &self.id, self.clock.tick());
        for peer in &self.peers {
            if let Err(err) = self.transport.send(&peer.address, &commit) {
                warn!(
                    "Replica {} Cannot send commit {} to {}: {}",
                    self.id, op_id, peer.node_id, err
                );
            }
        }
        self.store.commit(op_id);
        info!(
            "Replica {} Committed {} with {} of {} acks",
            self.id,
            op_id,
            self.ack_count(op_id),
            quorum_size
        );

        self.notify_client(op_id);
    }

    fn notify_client(&self, op_id: &str) {
        let origin = match self.op_client_map.get(op_id) {
            Some(origin) => origin,
            None => return,
        };

        let mut reply = Message::commit(&origin.client_op_id, &self.id, self.clock.tick());
        reply.client_id = origin.client_id.clone();

        match self.cluster.resolve(&origin.client_id) {
            Some(address) => {
                info!(
                    "Replica {} Sending Commit to client {} for client op={}",
                    self.id, origin.client_id, origin.client_op_id
                );
                if let Err(err) = self.transport.send(&address, &reply) {
                    warn!(
                        "Replica {} Cannot notify client {}: {}",
                        self.id, origin.client_id, err
                    );
                }
            }
            None => warn!(
                "Replica {} Unknown client {}. Commit for {} not delivered",
                self.id, origin.client_id, origin.client_op_id
            ),
        }
    }

    fn handle_commit(&mut self, message: Message) {
        if self.committed_ops.insert(message.op_id.clone()) {
            self.store.commit(&message.op_id);
            debug!("Replica {} Committed {} on notice", self.id, message.op_id);
        }
    }

    fn handle_get_request(&mut self, message: Message) {
        let value = self.store.get(&message.key).unwrap_or_default().to_string();

        let response = Message {
            kind: MessageKind::GetResponse,
            key: message.key,
            value,
            timestamp: self.clock.tick(),
            client_id: message.client_id,
            replica_id: self.id.clone(),
            op_id: message.op_id,
        };

        match self.cluster.resolve(&response.client_id) {
            Some(address) => {
                debug!(
                    "Replica {} Replying GetResponse to {} {}='{}'",
                    self.id, response.client_id, response.key, response.value
                );
                if let Err(err) = self.transport.send(&address, &response) {
                    warn!(
                        "Replica {} Cannot reply to client {}: {}",
                        self.id, response.client_id, err
                    );
                }
            }
            None => warn!(
                "Replica {} Unknown client {}. GetResponse dropped",
                self.id, response.client_id
            ),
        }
    }
}
