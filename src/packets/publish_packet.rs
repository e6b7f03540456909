use std::{fmt, io::Cursor};

use log::trace;

use crate::{
    codec::{
        read_packet_id, read_remaining, read_utf8_string, string_len, write_bytes,
        write_packet_id, write_utf8_string,
    },
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType, qos::QoS},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

const DUP_FLAG: u8 = 0b0000_1000;
const QOS_SHIFT: u8 = 1;
const RETAIN_FLAG: u8 = 0b0000_0001;

/// Represents an MQTT PUBLISH packet.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718037>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishPacket<'a> {
    /// Set when the packet is a redelivery of an earlier attempt.
    pub dup: bool,

    pub qos: QoS,

    pub retain: bool,

    pub topic: &'a str,

    /// Only present on the wire for `QoS` 1 and 2, where it must be non-zero.
    /// Decodes as 0 for `QoS` 0 and is ignored on encode.
    pub packet_id: u16,

    /// Everything after the variable header.
    pub payload: &'a [u8],
}

impl PublishPacket<'_> {
    fn has_packet_id(&self) -> bool {
        self.qos != QoS::AtMostOnce
    }
}

impl ControlPacket for PublishPacket<'_> {
    const PACKET_TYPE: PacketType = PacketType::Publish;
}

impl<'a> DecodablePacket<'a> for PublishPacket<'a> {
    fn decode_body(header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        let raw_qos = (header.flags >> QOS_SHIFT) & 0b11;
        let qos = QoS::from_u8(raw_qos).ok_or(Error::InvalidQos(raw_qos))?;

        let topic = read_utf8_string(cursor)?;
        let packet_id = if qos == QoS::AtMostOnce { 0 } else { read_packet_id(cursor)? };
        let payload = read_remaining(cursor);
        trace!("publish on {topic:?} carries {} payload bytes", payload.len());

        Ok(Self {
            dup: header.flags & DUP_FLAG != 0,
            qos,
            retain: header.flags & RETAIN_FLAG != 0,
            topic,
            packet_id,
            payload,
        })
    }
}

impl EncodablePacket for PublishPacket<'_> {
    fn flags(&self) -> u8 {
        let mut flags = self.qos.to_u8() << QOS_SHIFT;

        if self.dup {
            flags |= DUP_FLAG;
        }

        if self.retain {
            flags |= RETAIN_FLAG;
        }

        flags
    }

    fn validate(&self) -> Result<(), Error> {
        if self.has_packet_id() && self.packet_id == 0 {
            return Err(Error::ZeroPacketId);
        }

        Ok(())
    }

    fn remaining_len(&self) -> usize {
        let packet_id_len = if self.has_packet_id() { 2 } else { 0 };
        string_len(self.topic) + packet_id_len + self.payload.len()
    }

    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
        write_utf8_string(buf, self.topic)?;

        if self.has_packet_id() {
            write_packet_id(buf, self.packet_id)?;
        }

        write_bytes(buf, self.payload)
    }
}

impl fmt::Display for PublishPacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: topic={:?} qos={} packet_id={} dup={} retain={} payload={}",
            Self::PACKET_TYPE,
            self.topic,
            self.qos,
            self.packet_id,
            self.dup,
            self.retain,
            hex::encode(self.payload)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_qos0_publish() {
        let bytes = [0x31, 0x07, 0x00, 0x03, b'a', b'/', b'b', b'h', b'i'];
        let (packet, len) = PublishPacket::decode(&bytes).unwrap();

        assert_eq!(len, 9);
        assert!(packet.retain);
        assert!(!packet.dup);
        assert_eq!(packet.qos, QoS::AtMostOnce);
        assert_eq!(packet.topic, "a/b");
        assert_eq!(packet.packet_id, 0);
        assert_eq!(packet.payload, b"hi");
    }

    #[test]
    fn decode_qos1_publish() {
        let bytes = [0x3A, 0x08, 0x00, 0x01, b't', 0x00, 0x0A, 0x01, 0x02, 0x03];
        let (packet, _) = PublishPacket::decode(&bytes).unwrap();

        assert!(packet.dup);
        assert_eq!(packet.qos, QoS::AtLeastOnce);
        assert_eq!(packet.packet_id, 10);
        assert_eq!(packet.payload, &[0x01, 0x02, 0x03]);
        assert_eq!(
            packet.to_string(),
            "PUBLISH: topic=\"t\" qos=1 packet_id=10 dup=true retain=false payload=010203"
        );
    }

    #[test]
    fn decode_empty_payload() {
        let (packet, _) = PublishPacket::decode(&[0x30, 0x03, 0x00, 0x01, b't']).unwrap();
        assert!(packet.payload.is_empty());
    }

    #[test]
    fn decode_payload_is_a_view() {
        let bytes = [0x30, 0x05, 0x00, 0x01, b't', 0xAB, 0xCD];
        let (packet, _) = PublishPacket::decode(&bytes).unwrap();
        assert_eq!(packet.payload.as_ptr(), bytes[5..].as_ptr());
    }

    #[test]
    fn decode_rejects_qos3() {
        assert_eq!(
            PublishPacket::decode(&[0x36, 0x03, 0x00, 0x01, b't']),
            Err(Error::MalformedFlags { packet_type: PacketType::Publish, flags: 0b0110 })
        );
    }

    #[test]
    fn decode_zero_packet_id() {
        assert_eq!(
            PublishPacket::decode(&[0x32, 0x05, 0x00, 0x01, b't', 0x00, 0x00]),
            Err(Error::ZeroPacketId)
        );
    }

    #[test]
    fn decode_topic_past_remaining_length() {
        assert_eq!(
            PublishPacket::decode(&[0x30, 0x02, 0x00, 0x05, b't']),
            Err(Error::MalformedRemainingLength)
        );
    }

    #[test]
    fn encode_qos2_publish() {
        let packet = PublishPacket {
            dup: false,
            qos: QoS::ExactlyOnce,
            retain: true,
            topic: "a",
            packet_id: 0x0102,
            payload: b"xyz",
        };

        let mut buf = [0u8; 10];
        assert_eq!(packet.encoded_len(), 10);
        assert_eq!(packet.encode(&mut buf), Ok(10));
        assert_eq!(buf, [0x35, 0x08, 0x00, 0x01, b'a', 0x01, 0x02, b'x', b'y', b'z']);
    }

    #[test]
    fn encode_qos0_skips_packet_id() {
        let packet =
            PublishPacket { topic: "a", packet_id: 99, payload: b"x", ..Default::default() };
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(&bytes[..], &[0x30, 0x04, 0x00, 0x01, b'a', b'x']);
    }

    #[test]
    fn encode_into_short_buffer() {
        let packet = PublishPacket {
            qos: QoS::AtLeastOnce,
            topic: "a/b",
            packet_id: 1,
            payload: b"hello",
            ..Default::default()
        };

        let mut buf = [0u8; 13];
        assert_eq!(packet.encoded_len(), 14);
        assert_eq!(packet.encode(&mut buf), Err(Error::BufferTooShort));
    }

    #[test]
    fn decode_truncated_payload() {
        // The header announces 9 body bytes, only 7 follow
        assert_eq!(
            PublishPacket::decode(&[0x30, 0x09, 0x00, 0x01, b't', b'a', b'b', b'c', b'd']),
            Err(Error::BufferTooShort)
        );
    }

    #[test]
    fn encode_zero_packet_id() {
        let packet = PublishPacket { qos: QoS::AtLeastOnce, topic: "a", ..Default::default() };
        let mut buf = [0u8; 16];
        assert_eq!(packet.encode(&mut buf), Err(Error::ZeroPacketId));
    }

    #[test]
    fn encode_large_payload_uses_multi_byte_length() {
        let payload = vec![0x55u8; 200];
        let packet = PublishPacket { topic: "t", payload: &payload, ..Default::default() };

        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes.len(), 1 + 2 + 3 + 200);
        assert_eq!(&bytes[..3], &[0x30, 0xCB, 0x01]);

        let (decoded, _) = PublishPacket::decode(&bytes).unwrap();
        assert_eq!(decoded, packet);
    }
}
