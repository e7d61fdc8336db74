#[macro_use]
extern crate log;
extern crate crossbeam_channel;
extern crate quorum_kv;

mod cluster;
mod communication;

pub use cluster::{ClusterConfiguration, NodeEntry, NodeRole};
pub use communication::inproc::inproc_transport::{InProcNetwork, InProcTransport};
pub use communication::network::network_transport::NetworkTransport;
