use std::{fmt, io::Cursor};

use log::debug;

use crate::{
    codec::{
        binary_len, read_binary, read_u16, read_u8, read_utf8_string, string_len, write_binary,
        write_u16, write_u8, write_utf8_string,
    },
    constants::{PROTOCOL_NAME, PROTOCOL_NAME_V31, PROTOCOL_VERSION, PROTOCOL_VERSION_V31},
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType, qos::QoS},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

const RESERVED_FLAG: u8 = 0b0000_0001;
const CLEAN_SESSION_FLAG: u8 = 0b0000_0010;
const WILL_FLAG: u8 = 0b0000_0100;
const WILL_QOS_SHIFT: u8 = 3;
const WILL_RETAIN_FLAG: u8 = 0b0010_0000;
const PASSWORD_FLAG: u8 = 0b0100_0000;
const USERNAME_FLAG: u8 = 0b1000_0000;

/// Protocol level announced in CONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// MQTT 3.1, protocol name `MQIsdp`.
    V31,

    /// MQTT 3.1.1, protocol name `MQTT`.
    #[default]
    V311,
}

impl ProtocolVersion {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            PROTOCOL_VERSION_V31 => Some(Self::V31),
            PROTOCOL_VERSION => Some(Self::V311),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::V31 => PROTOCOL_VERSION_V31,
            Self::V311 => PROTOCOL_VERSION,
        }
    }

    pub fn protocol_name(self) -> &'static str {
        match self {
            Self::V31 => PROTOCOL_NAME_V31,
            Self::V311 => PROTOCOL_NAME,
        }
    }
}

/// Message the server publishes when the client disappears without DISCONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Will<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

/// Represents an MQTT CONNECT packet.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718028>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPacket<'a> {
    /// Revision level of the protocol used by the client. Also selects the protocol name.
    pub protocol_version: ProtocolVersion,

    /// Specifies whether the connection starts a new session or is a continuation of an
    /// existing session.
    pub clean_session: bool,

    /// It is the maximum time interval in seconds that is permitted to elapse between two
    /// packets sent by the client.
    pub keep_alive: u16,

    /// The Client Identifier identifies the Client to the Server.
    pub client_id: &'a str,

    pub will: Option<Will<'a>>,

    /// It can be used by the Server for authentication and authorization.
    pub username: Option<&'a str>,

    /// Although this field is called Password, it can be used to carry any credential information.
    pub password: Option<&'a [u8]>,
}

impl Default for ConnectPacket<'_> {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::V311,
            clean_session: true,
            keep_alive: 0,
            client_id: "",
            will: None,
            username: None,
            password: None,
        }
    }
}

impl ConnectPacket<'_> {
    fn connect_flags(&self) -> u8 {
        let mut flags = 0;

        if self.clean_session {
            flags |= CLEAN_SESSION_FLAG;
        }

        if let Some(will) = &self.will {
            flags |= WILL_FLAG | (will.qos.to_u8() << WILL_QOS_SHIFT);
            if will.retain {
                flags |= WILL_RETAIN_FLAG;
            }
        }

        if self.username.is_some() {
            flags |= USERNAME_FLAG;
        }

        if self.password.is_some() {
            flags |= PASSWORD_FLAG;
        }

        flags
    }
}

impl ControlPacket for ConnectPacket<'_> {
    const PACKET_TYPE: PacketType = PacketType::Connect;
}

impl<'a> DecodablePacket<'a> for ConnectPacket<'a> {
    fn decode_body(_header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        let protocol_name = read_utf8_string(cursor)?;

        let raw_version = read_u8(cursor)?;
        let Some(protocol_version) = ProtocolVersion::from_u8(raw_version) else {
            return Err(Error::UnsupportedProtocolVersion(raw_version));
        };

        if protocol_name != protocol_version.protocol_name() {
            debug!("protocol name {protocol_name:?} does not match level {raw_version}");
            return Err(Error::MalformedPacket("protocol name does not match protocol level"));
        }

        let connect_flags = read_u8(cursor)?;

        // The reserved flag must be 0
        if connect_flags & RESERVED_FLAG != 0 {
            return Err(Error::MalformedPacket("reserved connect flag set"));
        }

        let clean_session = connect_flags & CLEAN_SESSION_FLAG != 0;
        let will_flag = connect_flags & WILL_FLAG != 0;
        let raw_will_qos = (connect_flags >> WILL_QOS_SHIFT) & 0b11;
        let will_retain = connect_flags & WILL_RETAIN_FLAG != 0;
        let password_flag = connect_flags & PASSWORD_FLAG != 0;
        let username_flag = connect_flags & USERNAME_FLAG != 0;

        // If the will_flag is set to 1, then will_qos can be 0, 1, or 2
        let Some(will_qos) = QoS::from_u8(raw_will_qos) else {
            return Err(Error::InvalidQos(raw_will_qos));
        };

        // If the will_flag is set to 0, then will_qos and will_retain must be set to 0
        if !will_flag && (will_qos != QoS::AtMostOnce || will_retain) {
            return Err(Error::MalformedPacket("will qos or retain set without will flag"));
        }

        // If the username_flag is set to 0, the password_flag must be set to 0
        if password_flag && !username_flag {
            return Err(Error::MalformedPacket("password flag set without username flag"));
        }

        let keep_alive = read_u16(cursor)?;
        let client_id = read_utf8_string(cursor)?;

        let will = if will_flag {
            let topic = read_utf8_string(cursor)?;
            let payload = read_binary(cursor)?;
            Some(Will { topic, payload, qos: will_qos, retain: will_retain })
        } else {
            None
        };

        let username = if username_flag { Some(read_utf8_string(cursor)?) } else { None };
        let password = if password_flag { Some(read_binary(cursor)?) } else { None };

        Ok(Self {
            protocol_version,
            clean_session,
            keep_alive,
            client_id,
            will,
            username,
            password,
        })
    }
}

impl EncodablePacket for ConnectPacket<'_> {
    fn validate(&self) -> Result<(), Error> {
        if self.password.is_some() && self.username.is_none() {
            return Err(Error::MalformedPacket("password set without username"));
        }

        Ok(())
    }

    fn remaining_len(&self) -> usize {
        // Protocol name + level + connect flags + keep alive
        let mut len = string_len(self.protocol_version.protocol_name()) + 1 + 1 + 2;

        len += string_len(self.client_id);

        if let Some(will) = &self.will {
            len += string_len(will.topic) + binary_len(will.payload);
        }

        if let Some(username) = self.username {
            len += string_len(username);
        }

        if let Some(password) = self.password {
            len += binary_len(password);
        }

        len
    }

    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
        write_utf8_string(buf, self.protocol_version.protocol_name())?;
        write_u8(buf, self.protocol_version.to_u8())?;
        write_u8(buf, self.connect_flags())?;
        write_u16(buf, self.keep_alive)?;
        write_utf8_string(buf, self.client_id)?;

        if let Some(will) = &self.will {
            write_utf8_string(buf, will.topic)?;
            write_binary(buf, will.payload)?;
        }

        if let Some(username) = self.username {
            write_utf8_string(buf, username)?;
        }

        if let Some(password) = self.password {
            write_binary(buf, password)?;
        }

        Ok(())
    }
}

impl fmt::Display for ConnectPacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: protocol={} level={} client_id={:?} clean_session={} keep_alive={}",
            Self::PACKET_TYPE,
            self.protocol_version.protocol_name(),
            self.protocol_version.to_u8(),
            self.client_id,
            self.clean_session,
            self.keep_alive,
        )?;

        if let Some(will) = &self.will {
            write!(
                f,
                " will_topic={:?} will_payload={} will_qos={} will_retain={}",
                will.topic,
                hex::encode(will.payload),
                will.qos,
                will.retain
            )?;
        }

        if let Some(username) = self.username {
            write!(f, " username={username:?}")?;
        }

        if self.password.is_some() {
            write!(f, " password=<redacted>")?;
        }

        Ok(())
    }
}
