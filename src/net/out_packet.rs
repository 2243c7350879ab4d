//! Outbound packet builder
//!
//! Sequential little-endian byte builder for messages sent to the server.
//! Constructing the packet writes its 2-byte opcode; the field writers
//! append in call order. `dispatch` hands the finished body to the session,
//! which frames and encrypts it for the wire.

use bytes::{BufMut, BytesMut};
use chrono::Utc;
use tracing::warn;

use crate::error::Result;
use crate::net::session::Session;
use crate::net::transport::Transport;
use crate::net::Point;

/// A packet to be sent to the server
#[derive(Debug, Clone)]
pub struct OutPacket {
    bytes: BytesMut,
    opcode: u16,
}

impl OutPacket {
    /// Start a packet by writing its opcode
    pub fn new(opcode: u16) -> Self {
        let mut bytes = BytesMut::with_capacity(32);
        bytes.put_u16_le(opcode);
        Self { bytes, opcode }
    }

    /// The opcode this packet was created with
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Current body length in bytes, opcode included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append `count` zero bytes of padding
    pub fn skip(&mut self, count: usize) {
        self.bytes.put_bytes(0, count);
    }

    /// Write a byte
    pub fn write_byte(&mut self, value: i8) {
        self.bytes.put_i8(value);
    }

    /// Write a short
    pub fn write_short(&mut self, value: i16) {
        self.bytes.put_i16_le(value);
    }

    /// Write an int
    pub fn write_int(&mut self, value: i32) {
        self.bytes.put_i32_le(value);
    }

    /// Write a long
    pub fn write_long(&mut self, value: i64) {
        self.bytes.put_i64_le(value);
    }

    /// Write a point as two shorts, x then y
    pub fn write_point(&mut self, point: Point) {
        self.write_short(point.x);
        self.write_short(point.y);
    }

    /// Write the current time as milliseconds since the epoch, truncated to
    /// an int as the protocol expects
    pub fn write_time(&mut self) {
        self.write_int(Utc::now().timestamp_millis() as i32);
    }

    /// Write a length-prefixed string (u16 length, then raw bytes).
    ///
    /// The length prefix caps strings at 65535 bytes; longer input is
    /// truncated.
    pub fn write_string(&mut self, value: &str) {
        let mut bytes = value.as_bytes();
        if bytes.len() > u16::MAX as usize {
            warn!(
                opcode = self.opcode,
                length = bytes.len(),
                "string truncated to length-field maximum"
            );
            bytes = &bytes[..u16::MAX as usize];
        }
        self.bytes.put_u16_le(bytes.len() as u16);
        self.bytes.put_slice(bytes);
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.put_slice(bytes);
    }

    /// Write a random int, used by the protocol as a per-message nonce
    pub fn write_random(&mut self) {
        self.write_int(rand::random::<i32>());
    }

    /// Consume the packet, returning the finished body
    pub fn build(self) -> Vec<u8> {
        self.bytes.freeze().to_vec()
    }

    /// Frame, encrypt and send this packet through the session
    pub fn dispatch<T: Transport>(self, session: &mut Session<T>) -> Result<()> {
        session.send(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_opcode_written_first() {
        let packet = OutPacket::new(0x0118);
        assert_eq!(packet.build(), vec![0x18, 0x01]);
    }

    #[test]
    fn test_little_endian_field_layout() {
        let mut packet = OutPacket::new(1);
        packet.write_byte(-1);
        packet.write_short(0x1234);
        packet.write_int(0x12345678);
        packet.write_long(0x0102030405060708);

        assert_eq!(
            packet.build(),
            vec![
                0x01, 0x00, // opcode
                0xff, // byte
                0x34, 0x12, // short
                0x78, 0x56, 0x34, 0x12, // int
                0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // long
            ]
        );
    }

    #[test]
    fn test_skip_pads_with_zeros() {
        let mut packet = OutPacket::new(2);
        packet.write_byte(0x7f);
        packet.skip(3);
        packet.write_byte(0x01);

        assert_eq!(packet.build(), vec![0x02, 0x00, 0x7f, 0, 0, 0, 0x01]);
    }

    #[test]
    fn test_write_string() {
        let mut packet = OutPacket::new(3);
        packet.write_string("abc");

        assert_eq!(
            packet.build(),
            vec![0x03, 0x00, 0x03, 0x00, b'a', b'b', b'c']
        );
    }

    #[test]
    fn test_write_empty_string() {
        let mut packet = OutPacket::new(3);
        packet.write_string("");

        assert_eq!(packet.build(), vec![0x03, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_write_point() {
        let mut packet = OutPacket::new(4);
        packet.write_point(Point::new(-2, 300));

        assert_eq!(packet.build(), vec![0x04, 0x00, 0xfe, 0xff, 0x2c, 0x01]);
    }

    #[test]
    fn test_lengths() {
        let mut packet = OutPacket::new(5);
        assert_eq!(packet.len(), 2);
        assert_eq!(packet.opcode(), 5);

        packet.write_time();
        packet.write_random();
        assert_eq!(packet.len(), 10);
    }
}
