//! Board-agnostic core logic for the jog pendant firmware
//!
//! This crate contains everything between the pins and the serial port
//! that does not depend on a specific board:
//!
//! - Debounce, quadrature decoding and speed tier selection
//! - Shared capture state and the periodic input poll
//! - Command model and the bounded command queue
//! - Command executor speaking the controller's line protocol
//! - Configuration type definitions and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod capture;
pub mod command;
pub mod config;
pub mod executor;
pub mod input;
pub mod poll;
pub mod queue;

pub use capture::{CaptureContext, CaptureState};
pub use command::{Action, Command};
pub use executor::{CommandExecutor, ExecError, ExecState, Outcome, ProtocolResult};
pub use poll::{InputPoller, PollBatch};
pub use queue::{CommandQueue, QueueFull, Request, QUEUE_CAPACITY};
