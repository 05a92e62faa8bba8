//! Embassy async tasks
//!
//! Capture tasks run on core 0 and only touch the shared capture context;
//! the executor task runs alone on core 1.

pub mod buttons;
pub mod encoder;
pub mod executor;
pub mod poll;

pub use buttons::button_task;
pub use encoder::encoder_task;
pub use executor::executor_task;
pub use poll::{poll_task, SpeedInputs};
