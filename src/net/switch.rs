//! Packet dispatch table
//!
//! Fixed-size, opcode-indexed registry of packet handlers. Opcodes arrive
//! from the network and are attacker-influenced, so every lookup is bounds
//! checked; out-of-range or unregistered opcodes are logged and the message
//! is dropped without disturbing the session. Handler failures are likewise
//! contained here: a malformed body in one message type never takes down
//! the connection.
//!
//! The table is populated once at startup and read-only afterwards.

use tracing::{debug, warn};

use crate::net::handler::{PacketHandler, PingHandler};
use crate::net::in_packet::InPacket;
use crate::net::opcode;
use crate::net::out_packet::OutPacket;
use crate::net::OPCODE_LENGTH;

/// Number of handler slots; sized generously above the largest opcode in use
pub const NUM_HANDLERS: usize = 500;

/// Opcode-indexed handler registry
pub struct PacketSwitch {
    handlers: Vec<Option<Box<dyn PacketHandler>>>,
    trace_packets: bool,
}

impl PacketSwitch {
    /// Create an empty dispatch table
    pub fn new() -> Self {
        let mut handlers = Vec::with_capacity(NUM_HANDLERS);
        handlers.resize_with(NUM_HANDLERS, || None);
        Self {
            handlers,
            trace_packets: false,
        }
    }

    /// Log every dispatched packet with its opcode name
    pub fn set_packet_trace(&mut self, enabled: bool) {
        self.trace_packets = enabled;
    }

    /// Register the handlers the core itself provides (keep-alive)
    pub fn register_core(&mut self) {
        self.register(opcode::recv::PING, Box::new(PingHandler));
    }

    /// Register a handler for an opcode.
    ///
    /// Duplicate registration is a programmer error: the first handler is
    /// kept and the conflict is logged.
    pub fn register(&mut self, opcode: u16, handler: Box<dyn PacketHandler>) {
        let index = opcode as usize;

        if index >= NUM_HANDLERS {
            warn!(opcode = opcode, "handler opcode exceeds table bounds");
            return;
        }
        if self.handlers[index].is_some() {
            warn!(opcode = opcode, "handler registered twice, keeping first");
            return;
        }

        self.handlers[index] = Some(handler);
    }

    /// Check whether an opcode has a registered handler
    pub fn is_registered(&self, opcode: u16) -> bool {
        (opcode as usize) < NUM_HANDLERS && self.handlers[opcode as usize].is_some()
    }

    /// Route one decrypted message body to its handler.
    ///
    /// Returns the handler's reply packet, if any. All per-message failures
    /// are absorbed here; only the session's framing layer can end the
    /// connection.
    pub fn dispatch(&self, body: &[u8]) -> Option<OutPacket> {
        if body.len() < OPCODE_LENGTH {
            warn!(length = body.len(), "dropped message shorter than an opcode");
            return None;
        }

        let mut recv = InPacket::new(body);
        let opcode = match recv.read_ushort() {
            Ok(opcode) => opcode,
            Err(_) => return None,
        };

        if self.trace_packets {
            debug!(
                opcode = opcode,
                name = opcode::recv_name(opcode).unwrap_or("?"),
                length = body.len(),
                "received packet"
            );
        }

        if opcode as usize >= self.handlers.len() {
            warn!(opcode = opcode, "opcode out of bounds");
            return None;
        }

        match &self.handlers[opcode as usize] {
            Some(handler) => match handler.handle(&mut recv) {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(opcode = opcode, error = %e, "handler failed");
                    None
                }
            },
            None => {
                warn!(opcode = opcode, "unhandled packet");
                None
            }
        }
    }
}

impl Default for PacketSwitch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::error::ProtocolError;

    use super::*;

    /// Counts invocations; optionally fails every call
    struct CountingHandler {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PacketHandler for CountingHandler {
        fn handle(&self, _recv: &mut InPacket<'_>) -> Result<Option<OutPacket>, ProtocolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ProtocolError::MalformedPacket("forced failure".to_string()))
            } else {
                Ok(None)
            }
        }
    }

    fn counting(calls: &Arc<AtomicUsize>, fail: bool) -> Box<dyn PacketHandler> {
        Box::new(CountingHandler {
            calls: calls.clone(),
            fail,
        })
    }

    /// Body bytes for an opcode with no payload
    fn body(opcode: u16) -> Vec<u8> {
        opcode.to_le_bytes().to_vec()
    }

    #[test]
    fn test_dispatch_invokes_registered_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut switch = PacketSwitch::new();
        switch.register(42, counting(&calls, false));

        assert!(switch.dispatch(&body(42)).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_out_of_bounds_opcode_is_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut switch = PacketSwitch::new();
        switch.register(1, counting(&calls, false));

        // NUM_HANDLERS and beyond, up to u16::MAX
        assert!(switch.dispatch(&body(NUM_HANDLERS as u16)).is_none());
        assert!(switch.dispatch(&body(u16::MAX)).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregistered_opcode_is_dropped() {
        let switch = PacketSwitch::new();
        assert!(switch.dispatch(&body(7)).is_none());
    }

    #[test]
    fn test_truncated_body_is_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut switch = PacketSwitch::new();
        switch.register(0, counting(&calls, false));

        assert!(switch.dispatch(&[0x00]).is_none());
        assert!(switch.dispatch(&[]).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_error_is_contained() {
        let failing_calls = Arc::new(AtomicUsize::new(0));
        let ok_calls = Arc::new(AtomicUsize::new(0));
        let mut switch = PacketSwitch::new();
        switch.register(10, counting(&failing_calls, true));
        switch.register(11, counting(&ok_calls, false));

        // The failing handler runs, its error is absorbed, and the next
        // message still reaches its handler
        assert!(switch.dispatch(&body(10)).is_none());
        assert!(switch.dispatch(&body(11)).is_none());
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ok_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut switch = PacketSwitch::new();
        switch.register(5, counting(&first, false));
        switch.register(5, counting(&second, false));

        switch.dispatch(&body(5));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_register_out_of_bounds_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut switch = PacketSwitch::new();
        switch.register(NUM_HANDLERS as u16, counting(&calls, false));

        assert!(!switch.is_registered(NUM_HANDLERS as u16));
    }

    #[test]
    fn test_core_handlers_reply() {
        let mut switch = PacketSwitch::new();
        switch.register_core();

        let reply = switch.dispatch(&body(opcode::recv::PING)).unwrap();
        assert_eq!(reply.opcode(), opcode::send::PONG);
    }
}
