use crate::steps;
use kv_modules::{ClusterConfiguration, InProcNetwork, InProcTransport, NetworkTransport, NodeEntry, NodeRole};
use quorum_kv::{ClientConfiguration, KvClient, MessageTransport, ReplicaConfiguration, Worker};
use std::collections::HashMap;

const INBOUND_QUEUE_CAPACITY: usize = 64;

pub struct CaseCluster<Tr>
where
    Tr: MessageTransport,
{
    pub configuration: ClusterConfiguration,
    pub replica_workers: Vec<Worker>,
    pub clients: HashMap<String, (KvClient<Tr>, Worker)>,
    pub transports: Vec<Tr>,
}

/// Starts every replica and client of `entries`, taking the transport of
/// each node from `transport_for`.
pub fn start_cluster<Tr, F>(entries: Vec<NodeEntry>, mut transport_for: F) -> CaseCluster<Tr>
where
    Tr: MessageTransport,
    F: FnMut(&NodeEntry) -> Tr,
{
    let configuration = ClusterConfiguration::new(entries);

    let mut replica_workers = Vec::new();
    let mut clients = HashMap::new();
    let mut transports = Vec::new();

    for entry in configuration.entries() {
        let transport = transport_for(entry);
        transports.push(transport.clone());

        match entry.role {
            NodeRole::Replica => {
                let replica_worker = quorum_kv::start_replica(ReplicaConfiguration {
                    replica_id: entry.node_id.clone(),
                    cluster: configuration.clone(),
                    transport,
                    timings: steps::get_replica_timings(),
                });
                replica_workers.push(replica_worker);
            }
            NodeRole::Client => {
                let client = quorum_kv::start_client(ClientConfiguration {
                    client_id: entry.node_id.clone(),
                    cluster: configuration.clone(),
                    transport,
                    timings: steps::get_client_timings(),
                });
                clients.insert(entry.node_id.clone(), client);
            }
        }
    }

    CaseCluster {
        configuration,
        replica_workers,
        clients,
        transports,
    }
}

/// Starts replicas and clients connected through one in-memory network.
pub fn start_inproc_cluster(
    replica_ids: &[&str],
    client_ids: &[&str],
) -> (InProcNetwork, CaseCluster<InProcTransport>) {
    let network = InProcNetwork::new(steps::get_communication_timeout());

    let mut entries = Vec::new();
    for (index, replica_id) in replica_ids.iter().enumerate() {
        entries.push(NodeEntry::new(replica_id, "inproc", 7000 + index as u16, NodeRole::Replica));
    }
    for (index, client_id) in client_ids.iter().enumerate() {
        entries.push(NodeEntry::new(client_id, "inproc", 7100 + index as u16, NodeRole::Client));
    }

    let cluster = start_cluster(entries, |entry| {
        network.add_endpoint(&entry.address(), INBOUND_QUEUE_CAPACITY)
    });

    (network, cluster)
}

/// Starts replicas and clients talking TCP over loopback on ephemeral ports.
pub fn start_network_cluster(replica_ids: &[&str], client_ids: &[&str]) -> CaseCluster<NetworkTransport> {
    let mut bound = HashMap::new();
    let mut entries = Vec::new();

    let nodes = replica_ids
        .iter()
        .map(|id| (id, NodeRole::Replica))
        .chain(client_ids.iter().map(|id| (id, NodeRole::Client)));
    for (node_id, role) in nodes {
        let transport = NetworkTransport::bind(
            "127.0.0.1:0",
            steps::get_communication_timeout(),
            INBOUND_QUEUE_CAPACITY,
        )
        .expect("can bind loopback port");

        entries.push(NodeEntry::new(node_id, "127.0.0.1", transport.local_address().port(), role));
        bound.insert(node_id.to_string(), transport);
    }

    start_cluster(entries, |entry| {
        bound
            .remove(&entry.node_id)
            .expect("transport bound for every node")
    })
}

impl<Tr> CaseCluster<Tr>
where
    Tr: MessageTransport,
{
    pub fn client(&self, client_id: &str) -> KvClient<Tr> {
        self.clients[client_id].0.clone()
    }

    pub fn address(&self, node_id: &str) -> String {
        self.configuration
            .entry(node_id)
            .expect("node is configured")
            .address()
    }

    pub fn terminate(self) -> Vec<Tr> {
        for (_, (_, client_worker)) in self.clients {
            client_worker.terminate();
        }

        for replica_worker in self.replica_workers {
            replica_worker.terminate();
        }

        self.transports
    }
}

impl CaseCluster<NetworkTransport> {
    pub fn terminate_network(self) {
        for transport in self.terminate() {
            transport.shutdown();
        }
    }
}
