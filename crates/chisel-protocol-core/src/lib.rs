pub mod codec;
pub mod state;
pub mod error;
pub mod registry;
pub mod dispatch;
pub mod connection;
pub mod packets;

pub use codec::*;
pub use state::*;
pub use error::*;
pub use registry::{EventRegistry, Handler};
pub use dispatch::{dispatch, DispatchReport};
pub use connection::{
    Connection, Frame, ReadOutcome, Session, DEFAULT_PACKET_THRESHOLD,
};
