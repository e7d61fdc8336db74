extern crate cases;
extern crate chrono;
extern crate env_logger;

use chrono::prelude::{DateTime, Local};
use std::io::Write;

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            let now_str = now.format("%H:%M:%S.%3f").to_string();
            writeln!(buf, "{:5}: {} - {}", record.level(), now_str, record.args())
        })
        .init();
}

fn main() {
    init_logger();

    cases::happy_path::run();
    cases::partial_failure::run();
    cases::failover::run();
    cases::no_live_replicas::run();
    cases::concurrent_requests::run();
    cases::network_smoke::run();
}
