use crate::steps;
use quorum_kv::ErrorKind;

pub fn run() {
    let replica_ids = ["R1", "R2", "R3"];
    let (network, cluster) = steps::cluster::start_inproc_cluster(&replica_ids, &["C1"]);
    let client = cluster.client("C1");

    for replica_id in &replica_ids {
        network.set_online(&cluster.address(replica_id), false);
    }

    let err = client.put("x", "1").unwrap_err();
    assert_eq!(ErrorKind::NoLiveReplicas, err.kind());

    let err = client.get("x").unwrap_err();
    assert_eq!(ErrorKind::NoLiveReplicas, err.kind());

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_no_live_replicas() {
        crate::cases::no_live_replicas::run()
    }
}
