//! # minivalved — minivalve daemon
//!
//! Composition root that wires the valve controller to its adapters and
//! serves a command console on stdin.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Construct the virtual network and the tokio timer service (adapters)
//! - Construct the valve controller, injecting both via port traits
//! - Register the valve endpoint and resync its state
//! - Read console commands until EOF, `quit` or ctrl-c
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod console;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use minivalve_adapter_timer_tokio::TokioTimerService;
use minivalve_adapter_virtual::VirtualNetwork;

use crate::config::Config;
use crate::console::{Command, CommandError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let timers = TokioTimerService::current()?;
    let network = VirtualNetwork::default();

    // Valve
    let valve = network
        .add_valve(config.valve.endpoint(), config.valve.on_time(), timers)
        .context("failed to register valve endpoint")?;
    let endpoint = valve.endpoint();
    valve.on_value_changed(move |state| {
        tracing::info!(%endpoint, state, "valve {}", if state { "opened" } else { "closed" });
    });
    if config.valve.initial_state {
        valve.set_valve(true).context("failed to open valve")?;
    } else {
        valve.restore_valve().context("failed to restore valve")?;
    }
    tracing::info!(
        %endpoint,
        on_time = %valve.on_time(),
        "minivalved ready, type `status`, `on`, `off`, `toggle`, `remote on|off`, `on-time <tenths>` or `quit`"
    );

    // Console
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => match console::execute(&network, &valve, command) {
                        Ok(reply) => println!("{reply}"),
                        Err(err) => println!("error: {err}"),
                    },
                    Err(CommandError::Empty) => {}
                    Err(err) => println!("error: {err}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("shutting down");
    Ok(())
}
