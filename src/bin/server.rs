//! Relay server binary.
//! Run with: cargo run --bin relay-server

use std::process::ExitCode;

use relay_agent::start_relay_agent;

fn main() -> ExitCode {
    start_relay_agent::run()
}
