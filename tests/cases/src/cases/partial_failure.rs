use crate::steps;

pub fn run() {
    let (network, cluster) = steps::cluster::start_inproc_cluster(&["R1", "R2", "R3"], &["C1"]);
    let client = cluster.client("C1");

    network.set_online(&cluster.address("R3"), false);

    // R1 multicasts to R2 only: quorum of 2, committed by R2's ack alone
    steps::data::put_sample(&client, "x", "1");
    assert!(steps::data::wait_for_value(&client, "R1", "x", Some("1")));
    assert!(steps::data::wait_for_value(&client, "R2", "x", Some("1")));

    // R3 missed both the write and the commit notice
    network.set_online(&cluster.address("R3"), true);
    assert_eq!(None, client.get_from("R3", "x").expect("get answered"));

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_partial_failure() {
        crate::cases::partial_failure::run()
    }
}
