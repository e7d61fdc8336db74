use crate::steps;
use quorum_kv::{KvClient, MessageTransport};
use std::time::{Duration, Instant};

const PROPAGATION_WAIT: Duration = Duration::from_secs(5);

pub fn put_sample<Tr: MessageTransport>(client: &KvClient<Tr>, key: &str, value: &str) {
    let resp = client.put(key, value);
    info!("Put {}={} sent by client {}. Response = {:?}", key, value, client.client_id(), resp);

    resp.expect("put committed");
}

/// Polls `replica_id` until it serves `expected` for `key`. Commit notices
/// reach the other replicas asynchronously.
pub fn wait_for_value<Tr: MessageTransport>(
    client: &KvClient<Tr>,
    replica_id: &str,
    key: &str,
    expected: Option<&str>,
) -> bool {
    let started = Instant::now();
    loop {
        match client.get_from(replica_id, key) {
            Ok(value) if value.as_ref().map(String::as_str) == expected => return true,
            Ok(value) => trace!("Replica {} serves {}={:?} so far", replica_id, key, value),
            Err(err) => warn!("Read of {} from replica {} failed: {}", key, replica_id, err),
        }

        if started.elapsed() > PROPAGATION_WAIT {
            error!(
                "Replica {} did not serve {}={:?} within {:?}",
                replica_id, key, expected, PROPAGATION_WAIT
            );
            return false;
        }
        steps::sleep_millis(50);
    }
}
