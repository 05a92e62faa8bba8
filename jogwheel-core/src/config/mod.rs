//! Configuration types
//!
//! Board-agnostic pendant configuration and the parser for the
//! `jogwheel.toml` file embedded in the firmware.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
