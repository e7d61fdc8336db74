use crossbeam_channel::Sender;
use quorum_kv::Message;

use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Accepts connections until `stop` is raised. Every connection is read on
/// its own thread; each decoded line is pushed to the inbound queue, blocking
/// while the queue is full.
pub fn run_server(
    listener: TcpListener,
    inbound_tx: Sender<Message>,
    stop: Arc<AtomicBool>,
    read_timeout: Duration,
) {
    let local_address = listener
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    info!("Network transport: listening on {}", local_address);

    for stream in listener.incoming() {
        if stop.load(Ordering::SeqCst) {
            break;
        }

        match stream {
            Ok(stream) => {
                let inbound_tx = inbound_tx.clone();
                thread::spawn(move || read_connection(stream, inbound_tx, read_timeout));
            }
            Err(err) => warn!("Network transport: accept error: {}", err),
        }
    }

    info!("Network transport: {} stopped listening", local_address);
}

fn read_connection(stream: TcpStream, inbound_tx: Sender<Message>, read_timeout: Duration) {
    if let Err(err) = stream.set_read_timeout(Some(read_timeout)) {
        warn!("Network transport: cannot set read timeout: {}", err);
    }

    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                debug!("Network transport: connection read failed: {}", err);
                return;
            }
        };
        if line.is_empty() {
            continue;
        }

        match Message::decode(&line) {
            Ok(message) => {
                if inbound_tx.send(message).is_err() {
                    return;
                }
            }
            Err(err) => warn!("Network transport: dropped line '{}': {}", line, err),
        }
    }
}
