pub mod state;

use crossbeam_channel::Receiver;

use crate::common;
use crate::communication::transport::MessageTransport;
use crate::configuration::{Cluster, ReplicaConfiguration};
use state::ReplicaState;

/// Runs the coordination engine of one replica until termination is requested.
/// All protocol state lives on this thread.
pub fn run_replica<Tr, Cl>(config: ReplicaConfiguration<Tr, Cl>, terminate_worker_rx: Receiver<()>)
where
    Tr: MessageTransport,
    Cl: Cluster,
{
    let receive_timeout = config.timings.receive_timeout;
    let transport = config.transport.clone();
    let mut replica = ReplicaState::new(config.replica_id, config.cluster, config.transport);

    info!(
        "Replica {} started with peers {:?}",
        replica.id,
        replica.peers()
    );

    loop {
        if common::termination_requested(&terminate_worker_rx) {
            break;
        }

        if let Some(message) = transport.receive(receive_timeout) {
            replica.process_message(message);
        }
    }

    info!(
        "Replica {} stopped. Clock = {}, pending writes = {}",
        replica.id,
        replica.clock().read(),
        replica.store().pending_count()
    );
}
