pub mod inproc;
pub mod network;
