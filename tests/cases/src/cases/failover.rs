use crate::steps;
use quorum_kv::ErrorKind;

pub fn run() {
    let (network, cluster) = steps::cluster::start_inproc_cluster(&["R1", "R2", "R3"], &["C1"]);
    let client = cluster.client("C1");

    network.set_online(&cluster.address("R1"), false);

    steps::data::put_sample(&client, "x", "1");
    assert_eq!(Some("1".to_string()), client.get("x").expect("get answered by R2"));
    assert!(steps::data::wait_for_value(&client, "R3", "x", Some("1")));

    let err = client.get_from("R1", "x").unwrap_err();
    assert_eq!(ErrorKind::NoLiveReplicas, err.kind());

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_failover() {
        crate::cases::failover::run()
    }
}
