use quorum_kv::{ClientTimings, ReplicaTimings};
use std::thread;
use std::time::Duration;

pub mod cluster;
pub mod data;

pub fn sleep_millis(millis: u64) {
    thread::sleep(Duration::from_millis(millis));
}

pub fn get_communication_timeout() -> Duration {
    Duration::from_millis(500)
}

pub fn get_replica_timings() -> ReplicaTimings {
    ReplicaTimings {
        receive_timeout: Duration::from_millis(100),
    }
}

pub fn get_client_timings() -> ClientTimings {
    ClientTimings {
        receive_timeout: Duration::from_millis(100),
        reply_poll_interval: Duration::from_secs(1),
        max_reply_wait: Some(Duration::from_secs(10)),
    }
}
