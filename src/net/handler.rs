//! Packet handler capability
//!
//! One handler per opcode, registered into the [`PacketSwitch`] at startup.
//! Handlers receive the decoded message body (opcode already consumed) and
//! may return a reply packet, which the session sends back to the server.
//!
//! [`PacketSwitch`]: crate::net::switch::PacketSwitch

use crate::error::ProtocolError;
use crate::net::in_packet::InPacket;
use crate::net::opcode;
use crate::net::out_packet::OutPacket;

/// Consumer of one decoded message body
pub trait PacketHandler: Send + Sync {
    /// Handle a single message.
    ///
    /// Returning `Err` drops this message only; the session keeps running.
    /// Returning `Ok(Some(reply))` queues the reply for transmission.
    fn handle(&self, recv: &mut InPacket<'_>) -> Result<Option<OutPacket>, ProtocolError>;
}

/// Keep-alive handler. The server pings periodically and disconnects
/// clients that fail to answer.
pub struct PingHandler;

impl PacketHandler for PingHandler {
    fn handle(&self, _recv: &mut InPacket<'_>) -> Result<Option<OutPacket>, ProtocolError> {
        Ok(Some(OutPacket::new(opcode::send::PONG)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_replies_pong() {
        let body: &[u8] = &[];
        let mut recv = InPacket::new(body);

        let reply = PingHandler.handle(&mut recv).unwrap().unwrap();
        assert_eq!(reply.opcode(), opcode::send::PONG);
    }
}
