pub mod network_transport;
mod server;
