#[macro_use] extern crate log;
extern crate env_logger;
extern crate chrono;

use std::io::Write;
use chrono::prelude::{DateTime, Local};


extern crate cases;

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

    info!("Stand-alone network smoke test started");

    cases::network_smoke::run();

    info!("Stand-alone network smoke test completed");
}
