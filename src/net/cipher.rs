//! Packet cipher
//!
//! Stateful, bidirectional transform between message bodies and wire frames:
//!
//! - The 4-byte frame header carries the body length, obfuscated with the
//!   current key of the sending direction. The receiver can validate a
//!   header against its own key state without consuming anything, so a
//!   corrupt header is detected instead of silently desynchronizing the
//!   stream.
//! - Message bodies are XORed with an ISAAC keystream. Every processed
//!   message advances that direction's key, so message N+1 can never be
//!   decrypted with message N's key; replayed or reordered bytes decode to
//!   garbage and fail the header check.
//!
//! Key material is issued by the server in the unencrypted handshake block
//! sent directly after the TCP connect, and is fresh for every connection.

use crate::crypto::Isaac;
use crate::error::ProtocolError;
use crate::net::HEADER_LENGTH;

/// Length of the key-material handshake block in bytes
pub const HANDSHAKE_LENGTH: usize = 10;

/// Multiplier used to spread one IV word into four ISAAC seed words
const SEED_SPREAD: u32 = 0x6c07_8965;

/// Key material received from the server on connect.
///
/// Directions are named from the client's point of view: `recv_iv` keys the
/// server-to-client stream, `send_iv` the client-to-server stream. The
/// server derives the mirrored cipher by swapping the two IVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    pub version: u16,
    pub recv_iv: u32,
    pub send_iv: u32,
}

impl Handshake {
    /// Decode the handshake block from the wire
    pub fn parse(raw: &[u8; HANDSHAKE_LENGTH]) -> Self {
        Self {
            version: u16::from_le_bytes([raw[0], raw[1]]),
            recv_iv: u32::from_le_bytes([raw[2], raw[3], raw[4], raw[5]]),
            send_iv: u32::from_le_bytes([raw[6], raw[7], raw[8], raw[9]]),
        }
    }

    /// Encode the handshake block for the wire
    pub fn to_bytes(&self) -> [u8; HANDSHAKE_LENGTH] {
        let mut raw = [0u8; HANDSHAKE_LENGTH];
        raw[0..2].copy_from_slice(&self.version.to_le_bytes());
        raw[2..6].copy_from_slice(&self.recv_iv.to_le_bytes());
        raw[6..10].copy_from_slice(&self.send_iv.to_le_bytes());
        raw
    }
}

/// Spread a single IV word into four ISAAC seed words
fn spread_seed(iv: u32) -> [u32; 4] {
    let mut seed = [0u32; 4];
    let mut x = iv;
    for word in &mut seed {
        x = x.wrapping_mul(SEED_SPREAD).wrapping_add(1);
        *word = x;
    }
    seed
}

/// One direction of the cipher: a keystream plus the current header mask
#[derive(Debug, Clone)]
struct KeyStream {
    stream: Isaac,
    mask: u32,
}

impl KeyStream {
    fn new(iv: u32) -> Self {
        let mut stream = Isaac::new(&spread_seed(iv));
        let mask = stream.next_word();
        Self { stream, mask }
    }

    /// XOR `data` with the keystream, then roll the header mask forward.
    /// Both endpoints must apply this exactly once per message.
    fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte ^= self.stream.next_byte();
        }
        self.mask = self.stream.next_word();
    }
}

/// Bidirectional packet cipher for one connection
#[derive(Debug, Clone)]
pub struct PacketCipher {
    version: u16,
    send: KeyStream,
    recv: KeyStream,
}

impl PacketCipher {
    /// Create a cipher from raw key material
    pub fn new(version: u16, send_iv: u32, recv_iv: u32) -> Self {
        Self {
            version,
            send: KeyStream::new(send_iv),
            recv: KeyStream::new(recv_iv),
        }
    }

    /// Create the client-side cipher from a parsed handshake
    pub fn from_handshake(handshake: &Handshake) -> Self {
        Self::new(handshake.version, handshake.send_iv, handshake.recv_iv)
    }

    /// Build the obfuscated header for an outgoing body of `body_len` bytes.
    ///
    /// Pure read of the send key; the key only advances when the body is
    /// encrypted.
    pub fn encode_header(&self, body_len: u16) -> [u8; HEADER_LENGTH] {
        let check = (self.send.mask >> 16) as u16 ^ self.version;
        let length = (self.send.mask & 0xffff) as u16 ^ body_len;

        let mut header = [0u8; HEADER_LENGTH];
        header[0..2].copy_from_slice(&check.to_le_bytes());
        header[2..4].copy_from_slice(&length.to_le_bytes());
        header
    }

    /// Validate an incoming header and extract the declared body length.
    ///
    /// Never mutates key state, on success or failure: validation is a pure
    /// read of the receive key, so a corrupt header cannot desynchronize
    /// later messages.
    pub fn decode_header(&self, header: &[u8; HEADER_LENGTH]) -> Result<u16, ProtocolError> {
        let check = u16::from_le_bytes([header[0], header[1]]);
        let length = u16::from_le_bytes([header[2], header[3]]);

        if check != (self.recv.mask >> 16) as u16 ^ self.version {
            return Err(ProtocolError::BadHeader);
        }

        Ok(length ^ (self.recv.mask & 0xffff) as u16)
    }

    /// Encrypt an outgoing body in place and advance the send key
    pub fn encrypt(&mut self, body: &mut [u8]) {
        self.send.apply(body);
    }

    /// Decrypt an incoming body in place and advance the receive key
    pub fn decrypt(&mut self, body: &mut [u8]) {
        self.recv.apply(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION: u16 = 83;

    /// Client cipher plus the matching server-side cipher (IVs swapped)
    fn cipher_pair() -> (PacketCipher, PacketCipher) {
        let handshake = Handshake {
            version: VERSION,
            recv_iv: 0x0bad_f00d,
            send_iv: 0x1337_beef,
        };
        let client = PacketCipher::from_handshake(&handshake);
        let server = PacketCipher::new(handshake.version, handshake.recv_iv, handshake.send_iv);
        (client, server)
    }

    #[test]
    fn test_handshake_wire_round_trip() {
        let handshake = Handshake {
            version: VERSION,
            recv_iv: 12345,
            send_iv: 67890,
        };
        assert_eq!(Handshake::parse(&handshake.to_bytes()), handshake);
    }

    #[test]
    fn test_header_round_trip() {
        let (client, server) = cipher_pair();

        for len in [0u16, 1, 2, 6, 255, 1024, 32768] {
            let header = client.encode_header(len);
            let decoded = server.decode_header(&header).unwrap();
            assert_eq!(decoded, len, "length {} did not survive the header", len);
        }
    }

    #[test]
    fn test_corrupt_header_rejected_without_desync() {
        let (client, server) = cipher_pair();

        let mut header = client.encode_header(100);
        header[0] ^= 0x01;
        assert!(server.decode_header(&header).is_err());

        // The failed decode must not have consumed key state
        header[0] ^= 0x01;
        assert_eq!(server.decode_header(&header).unwrap(), 100);
    }

    #[test]
    fn test_body_round_trip() {
        let (mut client, mut server) = cipher_pair();

        for original in [&b"ping"[..], &[0u8; 64][..], &b"\x18\x00hello world"[..]] {
            let mut body = original.to_vec();
            client.encrypt(&mut body);
            assert_ne!(&body[..], original);
            server.decrypt(&mut body);
            assert_eq!(&body[..], original);
        }
    }

    #[test]
    fn test_key_advances_per_message() {
        let (mut client, mut server) = cipher_pair();

        let mut first = b"first message".to_vec();
        client.encrypt(&mut first);

        let mut second = b"first message".to_vec();
        client.encrypt(&mut second);

        // Same plaintext, different keystream
        assert_ne!(first, second);

        // Decrypting out of order yields garbage, in order round-trips
        let mut stale = second.clone();
        server.decrypt(&mut first);
        assert_eq!(&first[..], b"first message");
        server.decrypt(&mut stale);
        assert_eq!(&stale[..], b"first message");
    }

    #[test]
    fn test_header_tracks_message_count() {
        let (mut client, mut server) = cipher_pair();

        let first_header = client.encode_header(8);
        let mut body = [0u8; 8];
        client.encrypt(&mut body);

        // After one message the header key has rolled
        let second_header = client.encode_header(8);
        assert_ne!(first_header, second_header);

        // A replayed first header no longer validates on the server
        assert_eq!(server.decode_header(&first_header).unwrap(), 8);
        server.decrypt(&mut body);
        assert!(server.decode_header(&first_header).is_err());
        assert_eq!(server.decode_header(&second_header).unwrap(), 8);
    }

    #[test]
    fn test_directions_are_independent() {
        let (mut client, _) = cipher_pair();

        let before = client.encode_header(4);
        let mut inbound = [1u8, 2, 3, 4];
        client.decrypt(&mut inbound);

        // Receiving must not advance the send-direction key
        assert_eq!(client.encode_header(4), before);
    }
}
