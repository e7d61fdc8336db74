use crate::steps;

pub fn run() {
    let cluster = steps::cluster::start_network_cluster(&["R1", "R2", "R3"], &["C1", "C2"]);
    let writer = cluster.client("C1");
    let reader = cluster.client("C2");

    steps::data::put_sample(&writer, "x", "1");
    steps::data::put_sample(&reader, "y", "2");

    for replica_id in &["R1", "R2", "R3"] {
        assert!(steps::data::wait_for_value(&reader, replica_id, "x", Some("1")));
        assert!(steps::data::wait_for_value(&writer, replica_id, "y", Some("2")));
    }

    cluster.terminate_network();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_network_smoke() {
        crate::cases::network_smoke::run()
    }
}
