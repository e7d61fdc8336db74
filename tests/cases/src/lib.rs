//! # Quorum KV test cases
//!
//! This subproject provides scenario tests running whole clusters of replicas
//! and clients, in-process and over loopback TCP.

#[macro_use]
extern crate log;
pub mod cases;
mod steps;

pub use self::cases::{
    concurrent_requests, failover, happy_path, network_smoke, no_live_replicas, partial_failure,
};
