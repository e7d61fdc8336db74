use std::fmt::Debug;
use std::time::Duration;

use crate::communication::transport::MessageTransport;

/// Static membership and address book of the deployment.
pub trait Cluster: Send + Sync + Clone + Debug + 'static {
    /// Address of a replica or client, if configured.
    fn resolve(&self, node_id: &str) -> Option<String>;

    /// Replica ids in configured order.
    fn replica_ids(&self) -> Vec<String>;

    /// Replicas other than `node_id`, in configured order.
    fn peers(&self, node_id: &str) -> Vec<String> {
        let mut peer_ids = self.replica_ids();
        peer_ids.retain(|id| id != node_id);

        peer_ids
    }
}

/// Resolved replica endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Peer {
    pub node_id: String,
    pub address: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ReplicaTimings {
    /// Bounded wait of one inbound queue poll. Also bounds shutdown latency.
    pub receive_timeout: Duration,
}

impl Default for ReplicaTimings {
    fn default() -> Self {
        ReplicaTimings {
            receive_timeout: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ClientTimings {
    pub receive_timeout: Duration,

    /// Interval between re-checks while a reply is outstanding.
    pub reply_poll_interval: Duration,

    /// Overall wait for a reply. `None` waits until the client is stopped.
    pub max_reply_wait: Option<Duration>,
}

impl Default for ClientTimings {
    fn default() -> Self {
        ClientTimings {
            receive_timeout: Duration::from_millis(500),
            reply_poll_interval: Duration::from_secs(5),
            max_reply_wait: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReplicaConfiguration<Tr, Cl>
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    pub replica_id: String,
    pub cluster: Cl,
    pub transport: Tr,
    pub timings: ReplicaTimings,
}

#[derive(Clone, Debug)]
pub struct ClientConfiguration<Tr, Cl>
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    pub client_id: String,
    pub cluster: Cl,
    pub transport: Tr,
    pub timings: ClientTimings,
}
