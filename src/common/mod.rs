use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::thread;
use std::thread::JoinHandle;

/// Handle of a background thread started with `run_worker`. Sending `()` to
/// `terminate_worker_tx` (or dropping it) asks the worker to stop.
#[derive(Debug)]
pub struct Worker {
    pub join_handle: JoinHandle<()>,
    pub terminate_worker_tx: Sender<()>,
}

impl Worker {
    /// Requests termination and waits for the worker thread to exit.
    pub fn terminate(self) {
        if self.terminate_worker_tx.send(()).is_err() {
            warn!("Worker is already stopped");
        }

        if self.join_handle.join().is_err() {
            error!("Worker returned an error")
        }
    }
}

pub fn run_worker<T: Send + 'static, F: Fn(T, Receiver<()>) + Send + 'static>(
    worker: F,
    params: T,
) -> Worker {
    let (terminate_worker_tx, terminate_worker_rx): (Sender<()>, Receiver<()>) =
        crossbeam_channel::unbounded();

    let join_handle = thread::spawn(move || worker(params, terminate_worker_rx));

    Worker {
        join_handle,
        terminate_worker_tx,
    }
}

/// Polls the termination channel without blocking. A disconnected channel
/// counts as a termination request.
pub(crate) fn termination_requested(terminate_worker_rx: &Receiver<()>) -> bool {
    match terminate_worker_rx.try_recv() {
        Ok(()) => true,
        Err(TryRecvError::Empty) => false,
        Err(TryRecvError::Disconnected) => true,
    }
}
