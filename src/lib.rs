//! Quorum-replicated key-value store.
//!
//! Replicas coordinate writes with a two-phase protocol: the replica receiving
//! a client write multicasts it, collects acknowledgments from a majority of the
//! replicas that were reachable at multicast time and then broadcasts a commit.
//! Lamport clocks stamp every protocol message. Reads are served from the
//! committed view of a single replica.

#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
#[macro_use]
extern crate derive_more;

mod client;
mod clock;
mod common;
mod communication;
mod configuration;
mod errors;
mod replica;
mod store;

pub use client::{start_client, KvClient, PendingReplies};
pub use clock::LamportClock;
pub use common::Worker;
pub use communication::message::{
    op_id, Message, MessageKind, FIELD_DELIMITER, MAX_WIRE_TIMESTAMP,
};
pub use communication::transport::MessageTransport;
pub use configuration::{
    ClientConfiguration, ClientTimings, Cluster, Peer, ReplicaConfiguration, ReplicaTimings,
};
pub use errors::{new_err, ErrorKind, KvError};
pub use replica::state::{required_acks, ClientOrigin, ReplicaState};
pub use store::{PendingWrite, ReplicatedStore};

/// Starts the coordination engine of a replica on its own thread.
pub fn start_replica<Tr, Cl>(config: ReplicaConfiguration<Tr, Cl>) -> Worker
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    common::run_worker(replica::run_replica, config)
}
