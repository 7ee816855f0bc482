use crate::codec::{decode_varint, expect_more, read_varint, VARINT_MAX_BYTES};
use crate::dispatch::dispatch;
use crate::error::{ProtocolError, ProtocolResult};
use crate::registry::EventRegistry;
use crate::state::ProtocolState;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace, warn};

/// Default maximum frame size accepted into the receive buffer. The login
/// flow raises this once the session reaches play state.
pub const DEFAULT_PACKET_THRESHOLD: usize = 512;

/// One fully delimited inbound packet. Lives only until it is dispatched.
#[derive(Debug)]
pub struct Frame {
    pub packet_id: u32,
    pub payload: BytesMut,
}

/// Result of one frame-decode cycle. `Empty` and `Discarded` are
/// recoverable; the connection continues with the next frame.
#[derive(Debug)]
pub enum ReadOutcome {
    Frame(Frame),
    /// The length prefix decoded to zero.
    Empty,
    /// The frame exceeded the packet threshold and was drained from the
    /// stream to keep it byte-aligned.
    Discarded { total_size: usize },
}

/// The handler-visible half of a connection: current protocol state, the
/// framing threshold, a queue of outbound frames, and the close flag.
pub struct Session {
    state: ProtocolState,
    packet_threshold: usize,
    outbox: Vec<Bytes>,
    close_requested: bool,
}

impl Session {
    pub fn new(packet_threshold: usize) -> Self {
        Self {
            state: ProtocolState::Handshake,
            packet_threshold,
            outbox: Vec::new(),
            close_requested: false,
        }
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Advance the protocol state. States only move forward; an attempt to
    /// regress is logged and ignored.
    pub fn advance(&mut self, next: ProtocolState) {
        if next > self.state {
            debug!("protocol state {:?} -> {:?}", self.state, next);
            self.state = next;
        } else if next < self.state {
            warn!(
                "ignoring state regression {:?} -> {:?}",
                self.state, next
            );
        }
    }

    pub fn packet_threshold(&self) -> usize {
        self.packet_threshold
    }

    /// Change the framing threshold. Takes effect with the next frame, never
    /// mid-frame.
    pub fn set_packet_threshold(&mut self, threshold: usize) {
        self.packet_threshold = threshold;
    }

    /// Queue a fully framed packet for delivery after the current dispatch.
    pub fn queue(&mut self, frame: Bytes) {
        self.outbox.push(frame);
    }

    /// Ask the receive loop to stop and close the transport.
    pub fn disconnect(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

/// A framed protocol connection over any duplex byte stream.
pub struct Connection<T> {
    transport: T,
    buf: BytesMut,
    pub session: Session,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Connection<T> {
    pub fn new(transport: T, packet_threshold: usize) -> Self {
        Self {
            transport,
            buf: BytesMut::with_capacity(packet_threshold),
            session: Session::new(packet_threshold),
        }
    }

    /// Decode one frame from the transport.
    ///
    /// Recoverable conditions come back as `Ok` variants; an `Err` means the
    /// stream can no longer be trusted and the connection must be torn down.
    pub async fn read_frame(&mut self) -> ProtocolResult<ReadOutcome> {
        let threshold = self.session.packet_threshold;
        self.buf.clear();
        self.buf.reserve(threshold);

        // Length prefix: single-byte reads up to the varint ceiling, stopping
        // at the first byte without its continuation bit.
        let mut byte = [0u8; 1];
        for _ in 0..VARINT_MAX_BYTES {
            if self.transport.read(&mut byte).await? == 0 {
                return Err(ProtocolError::TransportClosed);
            }
            self.buf.put_u8(byte[0]);
            if !expect_more(byte[0]) {
                break;
            }
        }
        let (length, prefix_len) = decode_varint(&self.buf)?;
        if length == 0 {
            return Ok(ReadOutcome::Empty);
        }

        // Total frame size including the prefix itself.
        let total_size = length as usize + prefix_len;
        if total_size > threshold {
            self.drain(total_size - prefix_len).await?;
            debug!("discarded oversized frame: {} > {}", total_size, threshold);
            return Ok(ReadOutcome::Discarded { total_size });
        }

        self.buf.resize(total_size, 0);
        self.transport
            .read_exact(&mut self.buf[prefix_len..])
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ProtocolError::TransportClosed,
                _ => ProtocolError::Transport(e),
            })?;

        let mut body = self.buf.split_off(prefix_len);
        let packet_id = read_varint(&mut body)?;
        trace!("read frame id=0x{:02X} len={}", packet_id, body.len());
        Ok(ReadOutcome::Frame(Frame {
            packet_id,
            payload: body,
        }))
    }

    /// Consume and discard exactly `remaining` bytes, reusing the receive
    /// buffer as scratch, so the next frame starts aligned.
    async fn drain(&mut self, mut remaining: usize) -> ProtocolResult<()> {
        let chunk_len = self.session.packet_threshold.max(1).min(remaining);
        self.buf.resize(chunk_len, 0);
        while remaining > 0 {
            let want = remaining.min(self.buf.len());
            let n = self.transport.read(&mut self.buf[..want]).await?;
            if n == 0 {
                return Err(ProtocolError::TransportClosed);
            }
            remaining -= n;
        }
        Ok(())
    }

    /// Write an already-framed packet, looping until fully delivered.
    pub async fn write_raw(&mut self, frame: &[u8]) -> ProtocolResult<()> {
        self.transport.write_all(frame).await?;
        Ok(())
    }

    /// Deliver everything handlers have queued since the last flush.
    pub async fn flush(&mut self) -> ProtocolResult<()> {
        for frame in std::mem::take(&mut self.session.outbox) {
            self.transport.write_all(&frame).await?;
        }
        Ok(())
    }

    /// Drive the connection: read a frame, dispatch it, flush queued
    /// replies, repeat. Returns `Ok(())` when a handler requests close;
    /// fatal framing or transport errors propagate.
    pub async fn run(&mut self, registry: &EventRegistry) -> ProtocolResult<()> {
        loop {
            match self.read_frame().await? {
                ReadOutcome::Frame(frame) => {
                    let report = dispatch(registry, &mut self.session, &frame)?;
                    for err in &report.failures {
                        warn!(
                            "handler failed for {:?} packet 0x{:02X}: {:#}",
                            self.session.state, frame.packet_id, err
                        );
                    }
                }
                ReadOutcome::Empty => trace!("empty frame, skipping"),
                ReadOutcome::Discarded { total_size } => {
                    debug!("frame of {} bytes discarded", total_size);
                }
            }
            self.flush().await?;
            if self.session.close_requested {
                return Ok(());
            }
        }
    }

    /// Close the transport. In-flight reads on other holders observe EOF.
    pub async fn shutdown(&mut self) -> ProtocolResult<()> {
        self.transport.shutdown().await?;
        Ok(())
    }
}
