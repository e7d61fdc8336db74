#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
extern crate chrono;
extern crate env_logger;

extern crate kv_modules;
extern crate quorum_kv;

mod command;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use std::thread;
use std::time::Duration;

use chrono::prelude::{DateTime, Local};
use crossbeam_channel::Sender;

use command::{parse_command, Command};
use kv_modules::{ClusterConfiguration, NetworkTransport};
use quorum_kv::{ClientConfiguration, ClientTimings, KvClient, KvError};

const INBOUND_QUEUE_CAPACITY: usize = 256;

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
        eprintln!("Usage: {} <client_id> <config_file>", args[0]);
        process::exit(1);
    }

    if let Err(err) = run(&args[1], &args[2]) {
        error!("Client {} failed: {}", args[1], err);
        process::exit(1);
    }
}

fn run(client_id: &str, config_file: &str) -> Result<(), KvError> {
    let cluster = ClusterConfiguration::from_file(config_file)?;
    // Untagged lines count as replicas; the client only needs its own port.
    let port = cluster.lookup(client_id)?.port;

    let transport = NetworkTransport::bind(
        &format!("0.0.0.0:{}", port),
        get_communication_timeout(),
        INBOUND_QUEUE_CAPACITY,
    )?;

    let client_config = ClientConfiguration {
        client_id: client_id.to_string(),
        cluster,
        transport: transport.clone(),
        timings: ClientTimings::default(),
    };
    let (client, client_worker) = quorum_kv::start_client(client_config);

    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    let handler_tx = shutdown_tx.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = handler_tx.try_send(());
    }) {
        warn!("Cannot install the interrupt handler: {}", err);
    }

    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    thread::spawn(move || run_commands(client, done_tx));

    select!(
        recv(shutdown_rx) -> _ => info!("Client {} interrupted, shutting down", client_id),
        recv(done_rx) -> _ => info!("Client {} exiting", client_id),
    );
    drop(shutdown_tx);

    client_worker.terminate();
    transport.shutdown();

    Ok(())
}

/// Reads commands from stdin until `exit` or end of input. Dropping
/// `_done_tx` on return tells the main thread the prompt is finished.
fn run_commands(client: KvClient<NetworkTransport>, _done_tx: Sender<()>) {
    print_prompt();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!("Cannot read the command line: {}", err);
                return;
            }
        };

        match parse_command(&line) {
            Command::Put { key, value } => match client.put(&key, &value) {
                Ok(()) => println!("PUT committed: {}={}", key, value),
                Err(err) => println!("PUT failed: {}", err),
            },
            Command::Get { key } => match client.get(&key) {
                Ok(Some(value)) => println!("GET response: {}", value),
                Ok(None) => println!("GET response: <absent>"),
                Err(err) => println!("GET failed: {}", err),
            },
            Command::Exit => return,
            Command::Empty => {}
            Command::Invalid(line) => {
                println!("Unknown command '{}'. Use: put <key> <value> | get <key> | exit", line)
            }
        }

        print_prompt();
    }
}

fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn get_communication_timeout() -> Duration {
    Duration::from_millis(500)
}
