/// The phase of a protocol session, ordered by progression.
/// A session only ever moves forward; reconnecting starts a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolState {
    Handshake,
    Login,
    Play,
}

pub const NUM_STATES: usize = 3;

impl ProtocolState {
    /// Number of distinct clientbound packet ids this state supports
    /// (protocol 47). A static protocol fact, not discovered at runtime.
    pub const fn packet_count(self) -> usize {
        match self {
            ProtocolState::Handshake => 1,
            ProtocolState::Login => 4,
            ProtocolState::Play => 0x50,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}
