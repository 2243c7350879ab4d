//! Emberfall Client Network Core
//!
//! This library implements the transport/session layer of the Emberfall game
//! client: it turns a raw TCP byte stream into discrete, decrypted game
//! messages and routes each one to a registered handler by opcode.
//!
//! ## Modules
//!
//! - `config` - Client network configuration
//! - `crypto` - ISAAC keystream generator used by the packet cipher
//! - `error` - Error types and result definitions
//! - `net` - Session, framing, cipher and packet dispatch

pub mod config;
pub mod crypto;
pub mod error;
pub mod net;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use net::session::{Session, TcpSession};
pub use net::switch::PacketSwitch;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version (must match the server)
pub const PROTOCOL_VERSION: u16 = 83;
