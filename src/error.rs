//! Error handling module
//!
//! Defines the error types for the Emberfall client network core.
//!
//! The split follows the recovery policy of the session layer: network and
//! framing errors terminate the current connection and require a reconnect,
//! while per-message protocol errors are contained at the dispatch boundary.

use std::io;

use thiserror::Error;

/// Main error type for the client network core
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Protocol-related errors
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Network-specific errors (transport layer)
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("not connected")]
    NotConnected,

    #[error("connect to {address} failed: {reason}")]
    ConnectFailed { address: String, reason: String },

    #[error("read error: {0}")]
    ReadError(String),

    #[error("write error: {0}")]
    WriteError(String),
}

/// Protocol-specific errors (framing and message decoding)
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The frame header failed to validate against the receive key state.
    /// Either the cipher is desynchronized or the peer does not speak the
    /// protocol; the connection cannot be recovered.
    #[error("frame header failed validation")]
    BadHeader,

    #[error("packet too large: {size} bytes (max: {max})")]
    PacketTooLarge { size: usize, max: usize },

    #[error("packet too small: {size} bytes")]
    PacketTooSmall { size: usize },

    #[error("protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u16, actual: u16 },

    #[error("read past end of packet: needed {needed}, remaining {remaining}")]
    PacketExhausted { needed: usize, remaining: usize },

    #[error("malformed packet: {0}")]
    MalformedPacket(String),
}

/// Result type alias for network core operations
pub type Result<T> = std::result::Result<T, Error>;
