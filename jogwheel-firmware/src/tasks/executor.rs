//! Command executor task
//!
//! Sole owner of the Grbl UART. Runs on core 1 and handles one command at
//! a time.

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_time::Delay;

use jogwheel_core::config::JogConfig;
use jogwheel_core::{CommandExecutor, ProtocolResult};

use crate::channels::COMMAND_QUEUE;

/// Executor task
#[embassy_executor::task]
pub async fn executor_task(uart: BufferedUart, config: JogConfig) {
    info!("Executor task started");

    let mut executor = CommandExecutor::new(uart, Delay, &config);

    loop {
        let (command, outcome) = executor.serve_next(&COMMAND_QUEUE).await;
        let name = command.action.name();

        match outcome {
            Ok(ProtocolResult::Acknowledged) => {
                debug!("{} {} acknowledged", name, command.arg);
            }
            Ok(ProtocolResult::Rejected(code)) => {
                warn!("{} {} rejected: error:{}", name, command.arg, code.as_str());
            }
            Ok(ProtocolResult::TimedOut) => {
                warn!("{} {} timed out", name, command.arg);
            }
            Err(e) => {
                error!("{} {} failed: {:?}", name, command.arg, e);
            }
        }
    }
}
