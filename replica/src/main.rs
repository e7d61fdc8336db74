#[macro_use]
extern crate log;
extern crate chrono;
extern crate crossbeam_channel;
extern crate env_logger;

extern crate kv_modules;
extern crate quorum_kv;

use std::env;
use std::io::Write;
use std::process;
use std::time::Duration;

use chrono::prelude::{DateTime, Local};

use kv_modules::{ClusterConfiguration, NetworkTransport, NodeRole};
use quorum_kv::{KvError, ReplicaConfiguration, ReplicaTimings};

const INBOUND_QUEUE_CAPACITY: usize = 1024;

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            writeln!(buf, "{:5}: {} - {}", record.level(), now.format("%H:%M:%S.%3f").to_string(), record.args())
        })
        .init();
}

fn main() {
    init_logger();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <replica_id> <config_file>", args[0]);
        process::exit(1);
    }

    if let Err(err) = run(&args[1], &args[2]) {
        error!("Replica {} failed: {}", args[1], err);
        process::exit(1);
    }
}

fn run(replica_id: &str, config_file: &str) -> Result<(), KvError> {
    let cluster = ClusterConfiguration::from_file(config_file)?;
    let port = cluster.require(replica_id, NodeRole::Replica)?.port;

    let transport = NetworkTransport::bind(
        &format!("0.0.0.0:{}", port),
        get_communication_timeout(),
        INBOUND_QUEUE_CAPACITY,
    )?;

    let replica_config = ReplicaConfiguration {
        replica_id: replica_id.to_string(),
        cluster,
        transport: transport.clone(),
        timings: ReplicaTimings::default(),
    };

    let replica_worker = quorum_kv::start_replica(replica_config);
    info!("Replica {} started on port {}", replica_id, port);

    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    let handler = ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    });
    if let Err(err) = handler {
        warn!("Cannot install the interrupt handler, running until killed: {}", err);
        if replica_worker.join_handle.join().is_err() {
            error!("Replica {} worker panicked", replica_id);
        }
        return Ok(());
    }

    if shutdown_rx.recv().is_ok() {
        info!("Replica {} interrupted, shutting down", replica_id);
    }

    replica_worker.terminate();
    transport.shutdown();

    info!("Replica {} stopped", replica_id);
    Ok(())
}

fn get_communication_timeout() -> Duration {
    Duration::from_millis(500)
}
