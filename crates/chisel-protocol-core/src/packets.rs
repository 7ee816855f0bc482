//! Outbound packet builders and packet id constants for protocol 47.
//!
//! Builders produce fully framed `[varint len][varint id][payload]` buffers
//! ready for the transport write path; the framing core treats them as
//! opaque bytes and does not validate them.

use crate::codec::{varint_len, write_string, write_varint};
use bytes::{BufMut, Bytes, BytesMut};

/// Clientbound login packet ids.
pub mod login {
    pub const DISCONNECT: u32 = 0x00;
    pub const ENCRYPTION_REQUEST: u32 = 0x01;
    pub const SUCCESS: u32 = 0x02;
    pub const SET_COMPRESSION: u32 = 0x03;
}

/// Clientbound play packet ids the bot cares about.
pub mod play {
    pub const KEEP_ALIVE: u32 = 0x00;
    pub const JOIN_GAME: u32 = 0x01;
    pub const DISCONNECT: u32 = 0x40;
}

const HANDSHAKE_ID: u32 = 0x00;
const LOGIN_START_ID: u32 = 0x00;
const SERVERBOUND_KEEP_ALIVE_ID: u32 = 0x00;

/// Wrap a packet id and payload into a complete frame.
pub fn build_frame(packet_id: u32, payload: &[u8]) -> Bytes {
    let body_len = varint_len(packet_id) + payload.len();
    let mut frame = BytesMut::with_capacity(varint_len(body_len as u32) + body_len);
    write_varint(&mut frame, body_len as u32);
    write_varint(&mut frame, packet_id);
    frame.put_slice(payload);
    frame.freeze()
}

/// Serverbound handshake: protocol version, server address/port, next state
/// (1 = status, 2 = login).
pub fn handshake(
    protocol_version: u32,
    server_address: &str,
    server_port: u16,
    next_state: u32,
) -> Bytes {
    let mut payload = BytesMut::new();
    write_varint(&mut payload, protocol_version);
    write_string(&mut payload, server_address);
    payload.put_u16(server_port);
    write_varint(&mut payload, next_state);
    build_frame(HANDSHAKE_ID, &payload)
}

/// Serverbound login start: just the player name.
pub fn login_start(name: &str) -> Bytes {
    let mut payload = BytesMut::new();
    write_string(&mut payload, name);
    build_frame(LOGIN_START_ID, &payload)
}

/// Serverbound keep-alive echo carrying the id the server sent.
pub fn keep_alive(id: u32) -> Bytes {
    let mut payload = BytesMut::new();
    write_varint(&mut payload, id);
    build_frame(SERVERBOUND_KEEP_ALIVE_ID, &payload)
}
