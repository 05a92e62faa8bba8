//! Inter-task communication
//!
//! The command queue is the only link between the capture tasks on core 0
//! and the executor on core 1.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use jogwheel_core::{CaptureContext, CommandQueue, QUEUE_CAPACITY};

/// Commands from the poll loop to the executor
pub static COMMAND_QUEUE: CommandQueue<CriticalSectionRawMutex, QUEUE_CAPACITY> =
    CommandQueue::new();

/// Capture state shared by the edge tasks and the poll task
pub type SharedCapture = CaptureContext<CriticalSectionRawMutex>;
