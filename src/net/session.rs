//! Session management
//!
//! The session owns one connection to the game server: the transport
//! handle, the packet cipher and the streaming reassembly state. It is
//! synchronous and poll-driven; the host calls [`Session::poll`] once per
//! tick and every complete message contained in that read is dispatched
//! before the call returns.
//!
//! TCP delivers chunk boundaries that are unrelated to message boundaries,
//! so the reassembler carries partial state across reads: a partly received
//! header or body is finished with the next chunk, and several complete
//! messages in a single chunk are all drained in order. Leftover bytes are
//! never discarded between reads.
//!
//! Framing violations (a header that fails validation, or a declared length
//! outside the legal range) mean the cipher is desynchronized or the peer
//! does not speak the protocol. They are unrecoverable: the session closes
//! the transport and stays disconnected until `reconnect`. Handler errors,
//! by contrast, are contained per message by the dispatch table.

use tracing::{debug, info, warn};

use crate::error::{NetworkError, ProtocolError, Result};
use crate::net::cipher::{Handshake, PacketCipher, HANDSHAKE_LENGTH};
use crate::net::switch::PacketSwitch;
use crate::net::transport::{TcpTransport, Transport};
use crate::net::{opcode, HEADER_LENGTH, MAX_PACKET_LENGTH, OPCODE_LENGTH};
use crate::ClientConfig;
use crate::PROTOCOL_VERSION;

/// Size of the per-poll read buffer. A message larger than one read simply
/// spans multiple polls.
const READ_CHUNK_LENGTH: usize = 4096;

/// A connection to the game server
pub struct Session<T: Transport = TcpTransport> {
    transport: T,
    cipher: PacketCipher,
    /// Protocol version the server handshake must carry
    expected_version: u16,
    /// Last-used address, for `reconnect`
    host: String,
    port: u16,
    /// Reassembly buffer for the message body in progress
    buffer: Box<[u8]>,
    /// Bytes of the current body received so far
    pos: usize,
    /// Declared length of the body in progress; 0 while assembling a header
    declared_len: usize,
    /// Partially received header bytes carried across reads
    header: [u8; HEADER_LENGTH],
    header_len: usize,
    connected: bool,
    trace_packets: bool,
}

/// Session over the production TCP transport
pub type TcpSession = Session<TcpTransport>;

impl<T: Transport> Session<T> {
    /// Connect to the server and establish cipher state from its handshake
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let transport = T::open(host, port)?;
        Self::establish(transport, host, port)
    }

    /// Connect using the supplied configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = T::open(&config.host, config.port)?;
        let mut session = Self::establish_inner(
            transport,
            &config.host,
            config.port,
            config.protocol_version,
        )?;
        session.trace_packets = config.trace_packets;
        Ok(session)
    }

    /// Establish a session over an already opened transport.
    ///
    /// Reads the key-material handshake and derives the cipher. Intended
    /// for custom transports; `connect` is the usual entry point.
    pub fn establish(transport: T, host: &str, port: u16) -> Result<Self> {
        Self::establish_inner(transport, host, port, PROTOCOL_VERSION)
    }

    fn establish_inner(
        mut transport: T,
        host: &str,
        port: u16,
        expected_version: u16,
    ) -> Result<Self> {
        let cipher = Self::read_handshake(&mut transport, expected_version)?;

        Ok(Self {
            transport,
            cipher,
            expected_version,
            host: host.to_string(),
            port,
            buffer: vec![0u8; MAX_PACKET_LENGTH].into_boxed_slice(),
            pos: 0,
            declared_len: 0,
            header: [0u8; HEADER_LENGTH],
            header_len: 0,
            connected: true,
            trace_packets: false,
        })
    }

    /// Read the key material the server sends on every new connection
    fn read_handshake(transport: &mut T, expected_version: u16) -> Result<PacketCipher> {
        let mut raw = [0u8; HANDSHAKE_LENGTH];
        transport.receive_exact(&mut raw)?;

        let handshake = Handshake::parse(&raw);
        if handshake.version != expected_version {
            return Err(ProtocolError::VersionMismatch {
                expected: expected_version,
                actual: handshake.version,
            }
            .into());
        }

        info!(version = handshake.version, "session keys established");
        Ok(PacketCipher::from_handshake(&handshake))
    }

    /// Check if the connection is alive
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Log every sent packet with its opcode name
    pub fn set_packet_trace(&mut self, enabled: bool) {
        self.trace_packets = enabled;
    }

    /// Close the current connection and open a new one to the last-used
    /// address
    pub fn reconnect(&mut self) -> Result<()> {
        let host = self.host.clone();
        let port = self.port;
        self.reconnect_to(&host, port)
    }

    /// Close the current connection and open a new one.
    ///
    /// Any partially assembled inbound message is discarded; a message
    /// cannot span a reconnect. On return the session is either fully
    /// connected with fresh keys or fully disconnected.
    pub fn reconnect_to(&mut self, host: &str, port: u16) -> Result<()> {
        self.drop_connection();

        let mut transport = T::open(host, port)?;
        let cipher = Self::read_handshake(&mut transport, self.expected_version)?;

        self.transport = transport;
        self.cipher = cipher;
        self.host = host.to_string();
        self.port = port;
        self.connected = true;

        debug!(host = host, port = port, "reconnected");
        Ok(())
    }

    /// Frame, encrypt and transmit one message body.
    ///
    /// Blocks until both header and body are handed to the transport. A
    /// transport failure leaves the session disconnected, so a partial
    /// frame is never followed by more data.
    pub fn send(&mut self, body: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(NetworkError::NotConnected.into());
        }
        if body.len() < OPCODE_LENGTH {
            return Err(ProtocolError::PacketTooSmall { size: body.len() }.into());
        }
        if body.len() > MAX_PACKET_LENGTH {
            return Err(ProtocolError::PacketTooLarge {
                size: body.len(),
                max: MAX_PACKET_LENGTH,
            }
            .into());
        }

        if self.trace_packets {
            let opcode = u16::from_le_bytes([body[0], body[1]]);
            debug!(
                opcode = opcode,
                name = opcode::send_name(opcode).unwrap_or("?"),
                length = body.len(),
                "sent packet"
            );
        }

        let header = self.cipher.encode_header(body.len() as u16);
        let mut payload = body.to_vec();
        self.cipher.encrypt(&mut payload);

        let written = self
            .transport
            .send_all(&header)
            .and_then(|()| self.transport.send_all(&payload));

        if let Err(e) = written {
            warn!(error = %e, "send failed, dropping connection");
            self.drop_connection();
            return Err(e);
        }
        Ok(())
    }

    /// Read available data and dispatch every complete message it contains.
    ///
    /// Performs at most one transport read. Does nothing while
    /// disconnected; the host is expected to check [`is_connected`] and
    /// offer a reconnect path.
    ///
    /// [`is_connected`]: Session::is_connected
    pub fn poll(&mut self, switch: &PacketSwitch) -> Result<()> {
        if !self.connected {
            return Ok(());
        }

        let mut chunk = [0u8; READ_CHUNK_LENGTH];
        let count = match self.transport.receive(&mut chunk) {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "read failed, dropping connection");
                self.drop_connection();
                return Err(e);
            }
        };
        if count == 0 {
            return Ok(());
        }

        if let Err(e) = self.process(switch, &chunk[..count]) {
            warn!(error = %e, "framing failure, dropping connection");
            self.drop_connection();
            return Err(e);
        }
        Ok(())
    }

    /// Feed one received chunk through the reassembler, dispatching each
    /// completed message and sending any handler replies
    fn process(&mut self, switch: &PacketSwitch, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            if self.declared_len == 0 {
                // Assembling a header; finish it before anything else
                let needed = HEADER_LENGTH - self.header_len;
                let take = needed.min(data.len());
                self.header[self.header_len..self.header_len + take]
                    .copy_from_slice(&data[..take]);
                self.header_len += take;
                data = &data[take..];

                if self.header_len < HEADER_LENGTH {
                    // Carried over to the next read
                    break;
                }
                self.header_len = 0;

                let declared = self.cipher.decode_header(&self.header)? as usize;
                if declared > MAX_PACKET_LENGTH {
                    return Err(ProtocolError::PacketTooLarge {
                        size: declared,
                        max: MAX_PACKET_LENGTH,
                    }
                    .into());
                }
                if declared < OPCODE_LENGTH {
                    return Err(ProtocolError::PacketTooSmall { size: declared }.into());
                }
                self.declared_len = declared;
                self.pos = 0;
                continue;
            }

            let take = (self.declared_len - self.pos).min(data.len());
            self.buffer[self.pos..self.pos + take].copy_from_slice(&data[..take]);
            self.pos += take;
            data = &data[take..];

            if self.pos == self.declared_len {
                let length = self.declared_len;
                // Exactly one decrypt per message; this advances the
                // receive key
                self.cipher.decrypt(&mut self.buffer[..length]);
                let reply = switch.dispatch(&self.buffer[..length]);
                self.pos = 0;
                self.declared_len = 0;

                if let Some(packet) = reply {
                    packet.dispatch(self)?;
                }
            }
        }
        Ok(())
    }

    /// Close the transport and clear all per-connection state
    fn drop_connection(&mut self) {
        self.transport.close();
        self.connected = false;
        self.pos = 0;
        self.declared_len = 0;
        self.header_len = 0;
    }
}
