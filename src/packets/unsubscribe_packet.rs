use std::{fmt, io::Cursor};

use bytes::Buf;

use crate::{
    codec::{read_packet_id, read_utf8_string, string_len, write_packet_id, write_utf8_string},
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

/// Represents an MQTT UNSUBSCRIBE packet.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718072>
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnsubscribePacket<'a> {
    pub packet_id: u16,

    /// Topic filters to remove. Never empty on the wire.
    pub topics: Vec<&'a str>,
}

impl ControlPacket for UnsubscribePacket<'_> {
    const PACKET_TYPE: PacketType = PacketType::Unsubscribe;
}

impl<'a> DecodablePacket<'a> for UnsubscribePacket<'a> {
    fn decode_body(_header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        let packet_id = read_packet_id(cursor)?;

        if !cursor.has_remaining() {
            return Err(Error::MalformedPacket("unsubscribe without topic filters"));
        }

        let mut topics = Vec::new();
        while cursor.has_remaining() {
            topics.push(read_utf8_string(cursor)?);
        }

        Ok(Self { packet_id, topics })
    }
}

impl EncodablePacket for UnsubscribePacket<'_> {
    fn validate(&self) -> Result<(), Error> {
        if self.packet_id == 0 {
            return Err(Error::ZeroPacketId);
        }

        if self.topics.is_empty() {
            return Err(Error::MalformedPacket("unsubscribe without topic filters"));
        }

        Ok(())
    }

    fn remaining_len(&self) -> usize {
        2 + self.topics.iter().map(|topic| string_len(topic)).sum::<usize>()
    }

    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
        write_packet_id(buf, self.packet_id)?;

        for topic in &self.topics {
            write_utf8_string(buf, topic)?;
        }

        Ok(())
    }
}

impl fmt::Display for UnsubscribePacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: packet_id={} topics={:?}", Self::PACKET_TYPE, self.packet_id, self.topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_unsubscribe() {
        let bytes = [0xA2, 0x09, 0x00, 0x03, 0x00, 0x01, b'a', 0x00, 0x02, b'b', b'/'];
        let (packet, len) = UnsubscribePacket::decode(&bytes).unwrap();

        assert_eq!(len, 11);
        assert_eq!(packet.packet_id, 3);
        assert_eq!(packet.topics, vec!["a", "b/"]);
        assert_eq!(packet.to_string(), "UNSUBSCRIBE: packet_id=3 topics=[\"a\", \"b/\"]");
    }

    #[test]
    fn decode_requires_a_topic() {
        assert!(matches!(
            UnsubscribePacket::decode(&[0xA2, 0x02, 0x00, 0x03]),
            Err(Error::MalformedPacket(_))
        ));
    }

    #[test]
    fn decode_invalid_utf8_topic() {
        assert_eq!(
            UnsubscribePacket::decode(&[0xA2, 0x06, 0x00, 0x03, 0x00, 0x02, 0xC3, 0x28]),
            Err(Error::InvalidUtf8)
        );
    }

    #[test]
    fn encode_unsubscribe() {
        let packet = UnsubscribePacket { packet_id: 3, topics: vec!["a", "b/"] };

        assert_eq!(packet.encoded_len(), 11);
        assert_eq!(
            &packet.to_bytes().unwrap()[..],
            &[0xA2, 0x09, 0x00, 0x03, 0x00, 0x01, b'a', 0x00, 0x02, b'b', b'/']
        );
    }

    #[test]
    fn encode_rules() {
        let mut buf = [0u8; 16];

        let empty = UnsubscribePacket { packet_id: 3, topics: Vec::new() };
        assert!(matches!(empty.encode(&mut buf), Err(Error::MalformedPacket(_))));

        let zero_id = UnsubscribePacket { packet_id: 0, topics: vec!["a"] };
        assert_eq!(zero_id.encode(&mut buf), Err(Error::ZeroPacketId));
    }
}
