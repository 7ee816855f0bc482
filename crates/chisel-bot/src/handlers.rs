use crate::config::BotConfig;
use crate::hex::hexdump;
use bytes::{Buf, BytesMut};
use chisel_protocol_core::{
    packets, read_string, read_varint, EventRegistry, ProtocolResult, ProtocolState,
};
use tracing::{debug, info, warn};

const MAX_STRING_LEN: usize = 32767;

/// Register the bot's default packet handlers: login flow, keep-alive echo,
/// and disconnect handling.
pub fn register_defaults(registry: &mut EventRegistry, config: &BotConfig) -> ProtocolResult<()> {
    let play_threshold = config.play_packet_threshold;
    registry.register(ProtocolState::Login, packets::login::SUCCESS, move |session, payload| {
        let mut buf = BytesMut::from(payload);
        let uuid = read_string(&mut buf, MAX_STRING_LEN)?;
        let name = read_string(&mut buf, MAX_STRING_LEN)?;
        info!("logged in as {} ({})", name, uuid);
        session.advance(ProtocolState::Play);
        session.set_packet_threshold(play_threshold);
        Ok(())
    })?;

    registry.register(ProtocolState::Login, packets::login::DISCONNECT, |session, payload| {
        let mut buf = BytesMut::from(payload);
        let reason = read_string(&mut buf, MAX_STRING_LEN)?;
        warn!("kicked during login: {}", reason);
        session.disconnect();
        Ok(())
    })?;

    registry.register(
        ProtocolState::Login,
        packets::login::ENCRYPTION_REQUEST,
        |session, payload| {
            warn!("server requires encryption (online mode), disconnecting");
            debug!("encryption request payload:\n{}", hexdump(payload));
            session.disconnect();
            Ok(())
        },
    )?;

    registry.register(
        ProtocolState::Login,
        packets::login::SET_COMPRESSION,
        |session, payload| {
            let mut buf = BytesMut::from(payload);
            let threshold = read_varint(&mut buf)?;
            warn!(
                "server enabled compression (threshold {}), disconnecting",
                threshold
            );
            session.disconnect();
            Ok(())
        },
    )?;

    registry.register(ProtocolState::Play, packets::play::KEEP_ALIVE, |session, payload| {
        let mut buf = BytesMut::from(payload);
        let id = read_varint(&mut buf)?;
        session.queue(packets::keep_alive(id));
        Ok(())
    })?;

    registry.register(ProtocolState::Play, packets::play::JOIN_GAME, |_, payload| {
        let mut buf = BytesMut::from(payload);
        if buf.remaining() >= 4 {
            info!("joined game as entity {}", buf.get_i32());
        }
        Ok(())
    })?;

    registry.register(ProtocolState::Play, packets::play::DISCONNECT, |session, payload| {
        let mut buf = BytesMut::from(payload);
        let reason = read_string(&mut buf, MAX_STRING_LEN)?;
        warn!("disconnected by server: {}", reason);
        session.disconnect();
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel_protocol_core::{dispatch, write_string, Connection, Frame, Session};
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    fn test_config() -> BotConfig {
        BotConfig::default()
    }

    fn string_frame(packet_id: u32, text: &str) -> Frame {
        let mut payload = BytesMut::new();
        write_string(&mut payload, text);
        Frame { packet_id, payload }
    }

    #[test]
    fn test_login_success_enters_play_and_raises_threshold() {
        let mut registry = EventRegistry::new();
        register_defaults(&mut registry, &test_config()).unwrap();

        let mut payload = BytesMut::new();
        write_string(&mut payload, "069a79f4-44e9-4726-a5be-fca90e38aaf5");
        write_string(&mut payload, "an_guy");
        let frame = Frame {
            packet_id: packets::login::SUCCESS,
            payload,
        };

        let mut session = Session::new(512);
        session.advance(ProtocolState::Login);
        let report = dispatch(&registry, &mut session, &frame).unwrap();
        assert!(report.all_ok());
        assert_eq!(session.state(), ProtocolState::Play);
        assert_eq!(session.packet_threshold(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_login_disconnect_requests_close() {
        let mut registry = EventRegistry::new();
        register_defaults(&mut registry, &test_config()).unwrap();

        let frame = string_frame(packets::login::DISCONNECT, "{\"text\":\"nope\"}");
        let mut session = Session::new(512);
        session.advance(ProtocolState::Login);
        dispatch(&registry, &mut session, &frame).unwrap();
        assert!(session.close_requested());
    }

    #[test]
    fn test_compression_request_requests_close() {
        let mut registry = EventRegistry::new();
        register_defaults(&mut registry, &test_config()).unwrap();

        let mut payload = BytesMut::new();
        chisel_protocol_core::write_varint(&mut payload, 256);
        let frame = Frame {
            packet_id: packets::login::SET_COMPRESSION,
            payload,
        };
        let mut session = Session::new(512);
        session.advance(ProtocolState::Login);
        dispatch(&registry, &mut session, &frame).unwrap();
        assert!(session.close_requested());
    }

    #[tokio::test]
    async fn test_keep_alive_echo_round_trip() {
        let mut registry = EventRegistry::new();
        register_defaults(&mut registry, &test_config()).unwrap();

        let (client, mut server) = duplex(1024);
        let mut conn = Connection::new(client, 512);
        conn.session.advance(ProtocolState::Play);

        // keep-alive id 0x1234, then a play disconnect to end the loop
        server.write_all(&[0x03, 0x00, 0xB4, 0x24]).await.unwrap();
        let mut kick = BytesMut::new();
        write_string(&mut kick, "{\"text\":\"bye\"}");
        server
            .write_all(&packets::build_frame(packets::play::DISCONNECT, &kick))
            .await
            .unwrap();

        conn.run(&registry).await.unwrap();

        let mut echoed = [0u8; 4];
        server.read_exact(&mut echoed).await.unwrap();
        assert_eq!(echoed, [0x03, 0x00, 0xB4, 0x24]);
    }
}
