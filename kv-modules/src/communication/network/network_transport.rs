use crate::communication::network::server;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use quorum_kv::{new_err, ErrorKind, KvError, Message, MessageTransport};

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// TCP implementation of the MessageTransport trait. Every send opens a
/// connection, writes one newline-terminated wire line and closes it. Inbound
/// lines are decoded by the accept loop and queued in a bounded FIFO.
#[derive(Clone, Debug)]
pub struct NetworkTransport {
    local_address: SocketAddr,
    timeout: Duration,
    inbound_rx: Receiver<Message>,
    stop: Arc<AtomicBool>,
    server_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NetworkTransport {
    /// Binds `listen_address` and starts accepting connections. `timeout`
    /// bounds connects, writes and reads.
    pub fn bind(
        listen_address: &str,
        timeout: Duration,
        queue_capacity: usize,
    ) -> Result<NetworkTransport, KvError> {
        let listener = match TcpListener::bind(listen_address) {
            Ok(listener) => listener,
            Err(err) => {
                return new_err(
                    ErrorKind::Transport,
                    format!("Cannot bind {}", listen_address),
                    err.to_string(),
                )
            }
        };
        let local_address = match listener.local_addr() {
            Ok(address) => address,
            Err(err) => {
                return new_err(
                    ErrorKind::Transport,
                    format!("Cannot read local address of {}", listen_address),
                    err.to_string(),
                )
            }
        };

        let (inbound_tx, inbound_rx) = crossbeam_channel::bounded(queue_capacity);
        let stop = Arc::new(AtomicBool::new(false));

        let server_stop = stop.clone();
        let server_handle =
            thread::spawn(move || server::run_server(listener, inbound_tx, server_stop, timeout));

        Ok(NetworkTransport {
            local_address,
            timeout,
            inbound_rx,
            stop,
            server_handle: Arc::new(Mutex::new(Some(server_handle))),
        })
    }

    /// Address the listener is bound to. Resolves an ephemeral port.
    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    /// Stops the accept loop and waits for it. Later calls do nothing.
    pub fn shutdown(&self) {
        let server_handle = match self.server_handle.lock().take() {
            Some(handle) => handle,
            None => return,
        };

        self.stop.store(true, Ordering::SeqCst);

        let mut wakeup_address = self.local_address;
        if wakeup_address.ip().is_unspecified() {
            wakeup_address.set_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        if let Err(err) = TcpStream::connect_timeout(&wakeup_address, self.timeout) {
            warn!(
                "Network transport: cannot wake up listener {}: {}",
                wakeup_address, err
            );
            return;
        }

        if server_handle.join().is_err() {
            error!("Network transport: listener thread panicked");
        }
    }

    fn write_line(&self, address: &str, line: &str) -> std::io::Result<()> {
        let socket_address = address.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "address resolved to nothing")
        })?;

        let mut stream = TcpStream::connect_timeout(&socket_address, self.timeout)?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()
    }
}

impl MessageTransport for NetworkTransport {
    fn send(&self, address: &str, message: &Message) -> Result<(), KvError> {
        trace!("Network transport: sending {} to {}", message, address);

        match self.write_line(address, &message.encode()) {
            Ok(()) => Ok(()),
            Err(err) => new_err(
                ErrorKind::Transport,
                format!("Cannot send {} to {}", message.kind, address),
                err.to_string(),
            ),
        }
    }

    fn receive(&self, timeout: Duration) -> Option<Message> {
        self.inbound_rx.recv_timeout(timeout).ok()
    }
}
