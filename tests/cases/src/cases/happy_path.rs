use crate::steps;

pub fn run() {
    let (_network, cluster) = steps::cluster::start_inproc_cluster(&["R1", "R2", "R3"], &["C1"]);
    let client = cluster.client("C1");

    assert_eq!(None, client.get("x").expect("get answered"));

    steps::data::put_sample(&client, "x", "1");

    for replica_id in &["R1", "R2", "R3"] {
        assert!(steps::data::wait_for_value(&client, replica_id, "x", Some("1")));
    }

    steps::data::put_sample(&client, "x", "2");
    assert_eq!(Some("2".to_string()), client.get("x").expect("get answered"));

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_happy_path() {
        crate::cases::happy_path::run()
    }
}
