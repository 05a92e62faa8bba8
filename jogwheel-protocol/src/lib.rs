//! Grbl Line Protocol
//!
//! This crate defines the serial protocol between the jog pendant and the
//! external motion controller (Grbl or a compatible firmware). The protocol
//! is ASCII, newline-terminated and strictly request/response:
//!
//! ```text
//! pendant ──▶  $J=G91 X-0.250 F1000\n
//! pendant ◀──  ok\n            (accepted)
//!          or  error:9\n       (rejected, code "9")
//! ```
//!
//! Only one command is ever outstanding. Lines that are neither `ok` nor
//! `error...` (status reports, `[MSG:...]`, banners) are skipped while a
//! reply is awaited.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod render;
pub mod response;

pub use render::{Jog, MachineCommand, RenderError, RenderedLine, MAX_LINE_LEN};
pub use response::{ErrorCode, Reply, ResponseError, ResponseParser, MAX_RESPONSE_LEN};
