use crate::connection::Session;
use crate::error::{ProtocolError, ProtocolResult};
use crate::state::{ProtocolState, NUM_STATES};

/// A packet handler. Receives the session (for state advancement and
/// queueing replies) and the raw payload bytes of one packet.
pub type Handler = Box<dyn Fn(&mut Session, &[u8]) -> anyhow::Result<()> + Send + Sync>;

/// Two-level callback table: protocol state, then packet id. Each slot holds
/// an insertion-ordered list of handlers; duplicates are legal and each
/// fires. The registry owns every handler until it is dropped or cleared.
pub struct EventRegistry {
    slots: [Vec<Vec<Handler>>; NUM_STATES],
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Build an empty table with one slot per known packet id of each state.
    pub fn new() -> Self {
        let slot_vec = |state: ProtocolState| {
            let mut v = Vec::with_capacity(state.packet_count());
            v.resize_with(state.packet_count(), Vec::new);
            v
        };
        Self {
            slots: [
                slot_vec(ProtocolState::Handshake),
                slot_vec(ProtocolState::Login),
                slot_vec(ProtocolState::Play),
            ],
        }
    }

    /// Append a handler to the `(state, packet_id)` slot. Handlers fire in
    /// registration order.
    pub fn register<F>(&mut self, state: ProtocolState, packet_id: u32, f: F) -> ProtocolResult<()>
    where
        F: Fn(&mut Session, &[u8]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let slot = self.slots[state.index()]
            .get_mut(packet_id as usize)
            .ok_or(ProtocolError::InvalidPacketId { state, id: packet_id })?;
        slot.push(Box::new(f));
        Ok(())
    }

    /// All handlers registered for `(state, packet_id)`, in registration
    /// order. An empty slice is not an error; unrouted packets are ignored.
    pub fn handlers_for(
        &self,
        state: ProtocolState,
        packet_id: u32,
    ) -> ProtocolResult<&[Handler]> {
        self.slots[state.index()]
            .get(packet_id as usize)
            .map(Vec::as_slice)
            .ok_or(ProtocolError::InvalidPacketId { state, id: packet_id })
    }

    /// Drop every registered handler, keeping the table shape. Safe to call
    /// more than once.
    pub fn clear(&mut self) {
        for table in &mut self.slots {
            for slot in table.iter_mut() {
                slot.clear();
            }
        }
    }

    /// Total handler count across all states.
    pub fn handler_count(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|table| table.iter())
            .map(Vec::len)
            .sum()
    }
}
