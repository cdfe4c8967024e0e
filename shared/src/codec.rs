//! Datagram codec for grid commands
//!
//! A command travels as a single UDP datagram whose payload is the
//! command's UTF-8 bytes, with no framing:
//! ```text
//! [ N bytes: command (UTF-8) ]
//! ```
//!
//! An empty command is a valid, zero-length datagram.

use bytes::Bytes;
use thiserror::Error;

use crate::UdpCommand;

/// Largest payload a single IPv4 UDP datagram can carry
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Payload too large: {0} bytes (max: {MAX_DATAGRAM_SIZE})")]
    PayloadTooLarge(usize),

    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Encode a command into its datagram payload
pub fn encode(command: &UdpCommand) -> Result<Bytes, CodecError> {
    let len = command.command.len();

    if len > MAX_DATAGRAM_SIZE {
        return Err(CodecError::PayloadTooLarge(len));
    }

    Ok(Bytes::copy_from_slice(command.command.as_bytes()))
}

/// Decode a received datagram payload back into the command string
pub fn decode(payload: &[u8]) -> Result<String, CodecError> {
    if payload.len() > MAX_DATAGRAM_SIZE {
        return Err(CodecError::PayloadTooLarge(payload.len()));
    }

    Ok(std::str::from_utf8(payload)?.to_owned())
}
