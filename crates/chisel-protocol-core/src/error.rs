use crate::codec::CodecError;
use crate::state::ProtocolState;
use thiserror::Error;

/// Connection-fatal protocol errors. Recoverable framing conditions
/// (empty packet, oversized discard) are `ReadOutcome` variants instead.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("packet id {id:#04x} out of range for {state:?} state")]
    InvalidPacketId { state: ProtocolState, id: u32 },
    #[error("connection closed by peer")]
    TransportClosed,
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
