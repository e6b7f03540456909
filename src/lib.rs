//! Encoding and decoding of MQTT 3.1.1 control packets.
//!
//! Decoded packets borrow their strings and payloads from the input buffer.
//! Encoding writes into a caller-supplied slice after checking its size.

pub mod codec;
pub mod connection;
pub mod constants;
pub mod error;
pub mod packets;
pub mod protocol;

pub use connection::{Connection, ConnectionConfig, ConnectionError};
pub use error::Error;
pub use packets::{ControlPacket, DecodablePacket, EncodablePacket, Packet};
pub use protocol::{detect, packet_type::PacketType, qos::QoS};
