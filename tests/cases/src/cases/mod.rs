pub mod concurrent_requests;
pub mod failover;
pub mod happy_path;
pub mod network_smoke;
pub mod no_live_replicas;
pub mod partial_failure;
