//! Response classification for the Grbl line protocol.
//!
//! Replies are read one byte at a time. A line ends at `\n` or `\r`;
//! empty lines (the second half of a `\r\n` pair) are ignored.
//!
//! - a line starting with `ok` acknowledges the outstanding command
//! - a line starting with `error` rejects it; the rest of the line, minus a
//!   leading `:`, is the error code
//! - any other line is discarded

use heapless::{String, Vec};

/// Longest line the parser accepts before giving up on a terminator
pub const MAX_RESPONSE_LEN: usize = 128;

/// Maximum stored length of a rejection code
pub const MAX_ERROR_CODE_LEN: usize = 24;

/// Error code or message carried by a rejection
pub type ErrorCode = String<MAX_ERROR_CODE_LEN>;

/// A classified reply line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Command accepted
    Ok,
    /// Command rejected with the controller's code
    Error(ErrorCode),
}

/// Errors that can occur while reading a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseError {
    /// Line buffer filled up without seeing a terminator
    Overflow,
}

/// Incremental line reader and classifier
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    line: Vec<u8, MAX_RESPONSE_LEN>,
}

impl ResponseParser {
    /// Create a new response parser
    pub fn new() -> Self {
        Self { line: Vec::new() }
    }

    /// Discard any partially received line
    pub fn reset(&mut self) {
        self.line.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(reply))` when a terminated line classifies as a reply,
    /// `Ok(None)` while more bytes are needed (or after a discarded line),
    /// and `Err(Overflow)` when the line does not fit the buffer.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Reply>, ResponseError> {
        if byte == b'\n' || byte == b'\r' {
            let reply = classify(&self.line);
            self.line.clear();
            return Ok(reply);
        }

        if self.line.push(byte).is_err() {
            self.line.clear();
            return Err(ResponseError::Overflow);
        }
        Ok(None)
    }
}

fn classify(line: &[u8]) -> Option<Reply> {
    if line.starts_with(b"ok") {
        return Some(Reply::Ok);
    }

    let rest = line.strip_prefix(b"error")?;
    let rest = rest.strip_prefix(b":").unwrap_or(rest);

    let mut code = ErrorCode::new();
    for &byte in rest.trim_ascii() {
        // Keep printable ASCII only; long messages are cut at capacity
        if !byte.is_ascii_graphic() && byte != b' ' {
            continue;
        }
        if code.push(byte as char).is_err() {
            break;
        }
    }
    Some(Reply::Error(code))
}
