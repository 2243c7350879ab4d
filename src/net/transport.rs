//! Transport seam
//!
//! The session talks to the network through the [`Transport`] trait so the
//! reassembly and cipher logic can be exercised against an in-memory stream
//! in tests. [`TcpTransport`] is the production implementation over a
//! `std::net::TcpStream`.
//!
//! Reads are poll-style: `receive` returns 0 when no data is pending and
//! the session simply tries again next tick. Writes block until the bytes
//! are handed to the OS; there is one logical session per client, so a slow
//! server blocking the caller is acceptable.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{NetworkError, Result};

/// Timeout for the blocking key-material handshake read
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Backoff while the kernel send buffer is full
const WRITE_BACKOFF: Duration = Duration::from_millis(1);

/// Duplex byte-stream transport
pub trait Transport: Sized {
    /// Open a connection to the given host and port
    fn open(host: &str, port: u16) -> Result<Self>;

    /// Read whatever is available into `buf`, returning the byte count.
    /// Returns 0 when no data is pending.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Read exactly `buf.len()` bytes, waiting for them if necessary.
    /// Used once per connection for the key-material handshake.
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `bytes`, blocking until handed to the OS
    fn send_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Tear the connection down; further calls will fail
    fn close(&mut self);
}

/// TCP transport over a non-blocking `std::net::TcpStream`
pub struct TcpTransport {
    stream: TcpStream,
    /// Set once the handshake is done and the stream flips to non-blocking
    polling: bool,
}

impl Transport for TcpTransport {
    fn open(host: &str, port: u16) -> Result<Self> {
        let address = (host, port)
            .to_socket_addrs()
            .map_err(|e| NetworkError::ConnectFailed {
                address: format!("{}:{}", host, port),
                reason: e.to_string(),
            })?
            .next()
            .ok_or_else(|| NetworkError::ConnectFailed {
                address: format!("{}:{}", host, port),
                reason: "no addresses resolved".to_string(),
            })?;

        let stream = TcpStream::connect(address).map_err(|e| NetworkError::ConnectFailed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        stream
            .set_nodelay(true)
            .map_err(|e| NetworkError::ConnectFailed {
                address: address.to_string(),
                reason: e.to_string(),
            })?;
        stream
            .set_read_timeout(Some(HANDSHAKE_TIMEOUT))
            .map_err(|e| NetworkError::ConnectFailed {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        debug!(address = %address, "connected");

        Ok(Self {
            stream,
            polling: false,
        })
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.polling {
            self.stream
                .set_nonblocking(true)
                .map_err(|e| NetworkError::ReadError(e.to_string()))?;
            self.polling = true;
        }

        match self.stream.read(buf) {
            Ok(0) => Err(NetworkError::ConnectionClosed.into()),
            Ok(count) => {
                trace!(count = count, "received chunk");
                Ok(count)
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => {
                Ok(0)
            }
            Err(e) => Err(NetworkError::ReadError(e.to_string()).into()),
        }
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf).map_err(|e| {
            match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                    NetworkError::ReadError("timed out waiting for handshake".to_string())
                }
                ErrorKind::UnexpectedEof => NetworkError::ConnectionClosed,
                _ => NetworkError::ReadError(e.to_string()),
            }
            .into()
        })
    }

    fn send_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < bytes.len() {
            match self.stream.write(&bytes[written..]) {
                Ok(0) => {
                    return Err(NetworkError::WriteError("wrote zero bytes".to_string()).into())
                }
                Ok(count) => written += count,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(WRITE_BACKOFF);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(NetworkError::WriteError(e.to_string()).into()),
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
