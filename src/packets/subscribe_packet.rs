use std::{fmt, io::Cursor};

use bytes::Buf;
use log::debug;

use crate::{
    codec::{
        read_packet_id, read_u8, read_utf8_string, string_len, write_packet_id, write_u8,
        write_utf8_string,
    },
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType, qos::QoS},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

/// One subscription request: a topic filter and the maximum `QoS` wanted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicFilter<'a> {
    pub topic: &'a str,
    pub qos: QoS,
}

/// Represents an MQTT SUBSCRIBE packet.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718063>
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscribePacket<'a> {
    pub packet_id: u16,

    /// Never empty on the wire.
    pub filters: Vec<TopicFilter<'a>>,
}

impl ControlPacket for SubscribePacket<'_> {
    const PACKET_TYPE: PacketType = PacketType::Subscribe;
}

impl<'a> DecodablePacket<'a> for SubscribePacket<'a> {
    fn decode_body(_header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        let packet_id = read_packet_id(cursor)?;

        // The payload must contain at least one topic filter
        if !cursor.has_remaining() {
            return Err(Error::MalformedPacket("subscribe without topic filters"));
        }

        let mut filters = Vec::new();
        while cursor.has_remaining() {
            let topic = read_utf8_string(cursor)?;
            let requested_qos = read_u8(cursor)?;

            // The upper 6 bits of the requested QoS byte are reserved
            if requested_qos & 0b1111_1100 != 0 {
                return Err(Error::MalformedPacket("reserved requested qos bits set"));
            }

            let qos = QoS::from_u8(requested_qos).ok_or(Error::InvalidQos(requested_qos))?;
            filters.push(TopicFilter { topic, qos });
        }

        debug!("subscribe {packet_id} with {} filters", filters.len());

        Ok(Self { packet_id, filters })
    }
}

impl EncodablePacket for SubscribePacket<'_> {
    fn validate(&self) -> Result<(), Error> {
        if self.packet_id == 0 {
            return Err(Error::ZeroPacketId);
        }

        if self.filters.is_empty() {
            return Err(Error::MalformedPacket("subscribe without topic filters"));
        }

        Ok(())
    }

    fn remaining_len(&self) -> usize {
        2 + self.filters.iter().map(|filter| string_len(filter.topic) + 1).sum::<usize>()
    }

    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
        write_packet_id(buf, self.packet_id)?;

        for filter in &self.filters {
            write_utf8_string(buf, filter.topic)?;
            write_u8(buf, filter.qos.to_u8())?;
        }

        Ok(())
    }
}

impl fmt::Display for SubscribePacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: packet_id={} filters=[", Self::PACKET_TYPE, self.packet_id)?;

        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}@{}", filter.topic, filter.qos)?;
        }

        write!(f, "]")
    }
}
