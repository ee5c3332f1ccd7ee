//! Default binary entrypoint for the relay agent.

use std::process::ExitCode;

use relay_agent::start_relay_agent;

fn main() -> ExitCode {
    start_relay_agent::run()
}
