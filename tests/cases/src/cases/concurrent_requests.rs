use crate::steps;
use std::thread;

const WRITER_COUNT: usize = 8;

pub fn run() {
    let (_network, cluster) = steps::cluster::start_inproc_cluster(&["R1", "R2", "R3"], &["C1"]);
    let client = cluster.client("C1");

    // one client, several writes in flight at once
    let writers: Vec<_> = (0..WRITER_COUNT)
        .map(|index| {
            let client = client.clone();
            thread::spawn(move || client.put(&format!("key{}", index), &format!("value{}", index)))
        })
        .collect();

    for writer in writers {
        writer
            .join()
            .expect("writer thread finished")
            .expect("put committed");
    }

    for index in 0..WRITER_COUNT {
        let expected = format!("value{}", index);
        assert!(steps::data::wait_for_value(
            &client,
            "R1",
            &format!("key{}", index),
            Some(expected.as_str())
        ));
    }

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_concurrent_requests() {
        crate::cases::concurrent_requests::run()
    }
}
