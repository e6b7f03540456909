use std::{fmt, io};

use bytes::{Bytes, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    constants::{DEFAULT_BUFFER_CAPACITY, MAX_PACKET_SIZE},
    error::Error,
    packets::Packet,
    protocol::detect,
};

#[derive(Debug)]
pub enum ConnectionError {
    Io(io::Error),

    /// The peer closed the stream in the middle of a packet.
    ConnectionReset,

    /// A fixed header announced a packet larger than the configured limit.
    PacketTooLarge { size: usize, max: usize },

    Codec(Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO Error: {e}"),
            Self::ConnectionReset => write!(f, "Connection Reset"),
            Self::PacketTooLarge { size, max } => {
                write!(f, "Packet Too Large: {size} bytes, limit is {max}")
            }
            Self::Codec(e) => write!(f, "Codec Error: {e}"),
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::ConnectionReset | Self::PacketTooLarge { .. } => None,
        }
    }
}

impl From<io::Error> for ConnectionError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<Error> for ConnectionError {
    fn from(e: Error) -> Self {
        Self::Codec(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Initial capacity of the read buffer.
    pub initial_capacity: usize,

    /// Frames announcing more bytes than this are refused before being buffered.
    pub max_packet_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { initial_capacity: DEFAULT_BUFFER_CAPACITY, max_packet_size: MAX_PACKET_SIZE }
    }
}

/// Splits a byte stream into MQTT frames and writes encoded packets back to it.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    config: ConnectionConfig,
}

impl<S> Connection<S> {
    pub fn new(stream: S) -> Connection<S> {
        Self::with_config(stream, ConnectionConfig::default())
    }

    pub fn with_config(stream: S, config: ConnectionConfig) -> Connection<S> {
        Connection { stream, buffer: BytesMut::with_capacity(config.initial_capacity), config }
    }

    /// Splits the next complete frame off the read buffer.
    fn parse_frame(&mut self) -> Result<Option<Bytes>, ConnectionError> {
        let Some((len, packet_type)) = detect(&self.buffer)? else {
            return Ok(None);
        };

        if len > self.config.max_packet_size {
            return Err(ConnectionError::PacketTooLarge {
                size: len,
                max: self.config.max_packet_size,
            });
        }

        // The announced length is untrusted, grow at most one chunk ahead of the data
        if self.buffer.len() < len {
            let missing = len - self.buffer.len();
            self.buffer.reserve(missing.min(self.config.initial_capacity));
            return Ok(None);
        }

        trace!("framed {packet_type} of {len} bytes");

        Ok(Some(self.buffer.split_to(len).freeze()))
    }
}

impl<S: AsyncRead + Unpin> Connection<S> {
    /// Read one complete frame from the connection.
    ///
    /// The frame holds the whole packet, fixed header included, ready for
    /// [`Packet::decode`]. Returns `None` if EOF is reached between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>, ConnectionError> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(Some(frame));
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }

                debug!("stream closed with {} buffered bytes", self.buffer.len());
                return Err(ConnectionError::ConnectionReset);
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> Connection<S> {
    /// Write a packet to the connection.
    pub async fn write_packet(&mut self, packet: &Packet<'_>) -> Result<(), ConnectionError> {
        let buf = packet.to_bytes()?;
        trace!("writing {} of {} bytes", packet.kind(), buf.len());

        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;

        Ok(())
    }
}
