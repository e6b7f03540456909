use std::{fmt, io::Cursor};

use bytes::{Buf, BytesMut};
use log::debug;

use crate::{
    codec::remaining_length_len,
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType},
};

pub mod conn_ack_packet;
pub mod connect_packet;
pub mod disconnect_packet;
pub mod identified_packet;
pub mod ping_req_packet;
pub mod ping_resp_packet;
pub mod publish_packet;
pub mod sub_ack_packet;
pub mod subscribe_packet;
pub mod unsubscribe_packet;

use conn_ack_packet::ConnAckPacket;
use connect_packet::ConnectPacket;
use disconnect_packet::DisconnectPacket;
use identified_packet::{PubAckPacket, PubCompPacket, PubRecPacket, PubRelPacket, UnsubAckPacket};
use ping_req_packet::PingReqPacket;
use ping_resp_packet::PingRespPacket;
use publish_packet::PublishPacket;
use sub_ack_packet::SubAckPacket;
use subscribe_packet::SubscribePacket;
use unsubscribe_packet::UnsubscribePacket;

/// A packet layout bound to one packet type.
pub trait ControlPacket {
    const PACKET_TYPE: PacketType;

    fn kind(&self) -> PacketType {
        Self::PACKET_TYPE
    }
}

pub trait DecodablePacket<'a>: ControlPacket + Sized {
    /// Checks the declared remaining length before any body byte is read.
    fn validate_remaining_length(_remaining_length: u32) -> Result<(), Error> {
        Ok(())
    }

    /// Parses the body. `cursor` covers exactly the declared remaining length.
    fn decode_body(header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error>;

    /// Decodes one packet from the start of `src`.
    ///
    /// Returns the packet and the number of bytes it occupied. Variable-length
    /// fields of the packet borrow from `src`.
    ///
    /// # Errors
    /// - `BufferTooShort` if `src` holds less than the whole packet.
    /// - `MismatchedMessageType` if the header belongs to another packet type.
    /// - `MalformedRemainingLength` if the body fields do not fill the declared length exactly.
    /// - Any error of the fixed header or body decoding.
    fn decode(src: &'a [u8]) -> Result<(Self, usize), Error> {
        let (header, header_len) = FixedHeader::decode(src)?;

        if header.packet_type != Self::PACKET_TYPE {
            return Err(Error::MismatchedMessageType {
                expected: Self::PACKET_TYPE,
                actual: header.packet_type,
            });
        }

        Self::validate_remaining_length(header.remaining_length)?;

        let total_len = header_len + header.remaining_length as usize;
        if src.len() < total_len {
            return Err(Error::BufferTooShort);
        }

        let mut cursor = Cursor::new(&src[header_len..total_len]);

        // The body slice is complete, so running out of it means the declared length is wrong
        let packet = Self::decode_body(&header, &mut cursor).map_err(|e| match e {
            Error::BufferTooShort => Error::MalformedRemainingLength,
            e => e,
        })?;

        if cursor.has_remaining() {
            debug!("{} left {} unread body bytes", Self::PACKET_TYPE, cursor.remaining());
            return Err(Error::MalformedRemainingLength);
        }

        Ok((packet, total_len))
    }
}

pub trait EncodablePacket: ControlPacket {
    /// Flags nibble written to the fixed header.
    fn flags(&self) -> u8 {
        Self::PACKET_TYPE.fixed_flags().unwrap_or(0)
    }

    /// Checks the field values before anything is written.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Size of the body computed from the current field values.
    fn remaining_len(&self) -> usize;

    /// Writes the body. `buf` is exactly [`EncodablePacket::remaining_len`] bytes long.
    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error>;

    /// Total size of the encoded packet.
    fn encoded_len(&self) -> usize {
        let remaining_len = self.remaining_len();
        1 + remaining_length_len(remaining_len) + remaining_len
    }

    /// Encodes the packet into the start of `dst`.
    ///
    /// Returns the number of bytes written, always [`EncodablePacket::encoded_len`].
    /// On error the content of `dst` is unspecified.
    ///
    /// # Errors
    /// - `BufferTooShort` if `dst` is smaller than the encoded packet.
    /// - `RemainingLengthTooLarge` if the body exceeds the protocol maximum.
    /// - Any validation error of the packet fields.
    fn encode(&self, dst: &mut [u8]) -> Result<usize, Error> {
        self.validate()?;

        let header = FixedHeader::new(Self::PACKET_TYPE, self.flags(), self.remaining_len())?;
        let total_len = header.packet_len();
        if dst.len() < total_len {
            return Err(Error::BufferTooShort);
        }

        let header_len = header.encode(dst)?;
        let mut body = &mut dst[header_len..total_len];
        self.encode_body(&mut body)?;

        Ok(total_len)
    }

    /// Encodes the packet into a freshly allocated buffer.
    fn to_bytes(&self) -> Result<BytesMut, Error> {
        let mut buf = BytesMut::zeroed(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

/// Any MQTT 3.1.1 packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet<'a> {
    Connect(ConnectPacket<'a>),
    ConnAck(ConnAckPacket),
    Publish(PublishPacket<'a>),
    PubAck(PubAckPacket),
    PubRec(PubRecPacket),
    PubRel(PubRelPacket),
    PubComp(PubCompPacket),
    Subscribe(SubscribePacket<'a>),
    SubAck(SubAckPacket),
    Unsubscribe(UnsubscribePacket<'a>),
    UnsubAck(UnsubAckPacket),
    PingReq(PingReqPacket),
    PingResp(PingRespPacket),
    Disconnect(DisconnectPacket),
}

macro_rules! dispatch {
    ($packet:expr, $inner:ident => $body:expr) => {
        match $packet {
            Packet::Connect($inner) => $body,
            Packet::ConnAck($inner) => $body,
            Packet::Publish($inner) => $body,
            Packet::PubAck($inner) => $body,
            Packet::PubRec($inner) => $body,
            Packet::PubRel($inner) => $body,
            Packet::PubComp($inner) => $body,
            Packet::Subscribe($inner) => $body,
            Packet::SubAck($inner) => $body,
            Packet::Unsubscribe($inner) => $body,
            Packet::UnsubAck($inner) => $body,
            Packet::PingReq($inner) => $body,
            Packet::PingResp($inner) => $body,
            Packet::Disconnect($inner) => $body,
        }
    };
}

fn decode_as<'a, P, F>(src: &'a [u8], wrap: F) -> Result<(Packet<'a>, usize), Error>
where
    P: DecodablePacket<'a>,
    F: FnOnce(P) -> Packet<'a>,
{
    P::decode(src).map(|(packet, len)| (wrap(packet), len))
}

impl<'a> Packet<'a> {
    /// Creates a default-valued packet of the given type.
    ///
    /// # Errors
    /// - `InvalidMessageType` for the reserved codes 0 and 15.
    pub fn new(packet_type: PacketType) -> Result<Self, Error> {
        let packet = match packet_type {
            PacketType::Connect => Self::Connect(ConnectPacket::default()),
            PacketType::ConnAck => Self::ConnAck(ConnAckPacket::default()),
            PacketType::Publish => Self::Publish(PublishPacket::default()),
            PacketType::PubAck => Self::PubAck(PubAckPacket::default()),
            PacketType::PubRec => Self::PubRec(PubRecPacket::default()),
            PacketType::PubRel => Self::PubRel(PubRelPacket::default()),
            PacketType::PubComp => Self::PubComp(PubCompPacket::default()),
            PacketType::Subscribe => Self::Subscribe(SubscribePacket::default()),
            PacketType::SubAck => Self::SubAck(SubAckPacket::default()),
            PacketType::Unsubscribe => Self::Unsubscribe(UnsubscribePacket::default()),
            PacketType::UnsubAck => Self::UnsubAck(UnsubAckPacket::default()),
            PacketType::PingReq => Self::PingReq(PingReqPacket),
            PacketType::PingResp => Self::PingResp(PingRespPacket),
            PacketType::Disconnect => Self::Disconnect(DisconnectPacket),
            PacketType::Reserved | PacketType::Reserved2 => {
                return Err(Error::InvalidMessageType(packet_type.to_u8()))
            }
        };

        Ok(packet)
    }

    /// Decodes the packet at the start of `src`, whatever its type.
    ///
    /// Returns the packet and the number of bytes it occupied.
    ///
    /// # Errors
    /// - `BufferTooShort` if `src` is empty or holds less than the whole packet.
    /// - `InvalidMessageType` for the reserved codes 0 and 15.
    /// - Any error of the matching per-type decode.
    pub fn decode(src: &'a [u8]) -> Result<(Self, usize), Error> {
        let Some(&byte) = src.first() else {
            return Err(Error::BufferTooShort);
        };

        match PacketType::from_header_byte(byte) {
            PacketType::Connect => decode_as(src, Self::Connect),
            PacketType::ConnAck => decode_as(src, Self::ConnAck),
            PacketType::Publish => decode_as(src, Self::Publish),
            PacketType::PubAck => decode_as(src, Self::PubAck),
            PacketType::PubRec => decode_as(src, Self::PubRec),
            PacketType::PubRel => decode_as(src, Self::PubRel),
            PacketType::PubComp => decode_as(src, Self::PubComp),
            PacketType::Subscribe => decode_as(src, Self::Subscribe),
            PacketType::SubAck => decode_as(src, Self::SubAck),
            PacketType::Unsubscribe => decode_as(src, Self::Unsubscribe),
            PacketType::UnsubAck => decode_as(src, Self::UnsubAck),
            PacketType::PingReq => decode_as(src, Self::PingReq),
            PacketType::PingResp => decode_as(src, Self::PingResp),
            PacketType::Disconnect => decode_as(src, Self::Disconnect),
            packet_type @ (PacketType::Reserved | PacketType::Reserved2) => {
                Err(Error::InvalidMessageType(packet_type.to_u8()))
            }
        }
    }

    pub fn kind(&self) -> PacketType {
        dispatch!(self, p => p.kind())
    }

    pub fn encoded_len(&self) -> usize {
        dispatch!(self, p => p.encoded_len())
    }

    /// Encodes the packet into the start of `dst`, see [`EncodablePacket::encode`].
    pub fn encode(&self, dst: &mut [u8]) -> Result<usize, Error> {
        dispatch!(self, p => p.encode(dst))
    }

    pub fn to_bytes(&self) -> Result<BytesMut, Error> {
        dispatch!(self, p => p.to_bytes())
    }
}

impl fmt::Display for Packet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, p => fmt::Display::fmt(p, f))
    }
}
