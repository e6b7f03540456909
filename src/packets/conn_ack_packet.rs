use std::{fmt, io::Cursor};

use crate::{
    codec::{read_u8, write_u8},
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

/// Return code of a CONNACK packet.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718035>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnAckCode {
    /// Connection accepted.
    #[default]
    Accepted,

    /// The Server does not support the level of the MQTT protocol requested by the Client.
    UnacceptableProtocolVersion,

    /// The Client identifier is correct UTF-8 but not allowed by the Server.
    IdentifierRejected,

    /// The Network Connection has been made but the MQTT service is unavailable.
    ServerUnavailable,

    /// The data in the user name or password is malformed.
    BadUsernameOrPassword,

    /// The Client is not authorized to connect.
    NotAuthorized,

    /// Codes 6 to 255 are reserved for future use.
    Reserved(u8),
}

impl ConnAckCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Accepted,
            1 => Self::UnacceptableProtocolVersion,
            2 => Self::IdentifierRejected,
            3 => Self::ServerUnavailable,
            4 => Self::BadUsernameOrPassword,
            5 => Self::NotAuthorized,
            code => Self::Reserved(code),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Accepted => 0,
            Self::UnacceptableProtocolVersion => 1,
            Self::IdentifierRejected => 2,
            Self::ServerUnavailable => 3,
            Self::BadUsernameOrPassword => 4,
            Self::NotAuthorized => 5,
            Self::Reserved(code) => code,
        }
    }

    /// Turns a refusal into its [`ConnAckError`].
    pub fn check(self) -> Result<(), ConnAckError> {
        match self {
            Self::Accepted => Ok(()),
            Self::UnacceptableProtocolVersion => Err(ConnAckError::UnacceptableProtocolVersion),
            Self::IdentifierRejected => Err(ConnAckError::IdentifierRejected),
            Self::ServerUnavailable => Err(ConnAckError::ServerUnavailable),
            Self::BadUsernameOrPassword => Err(ConnAckError::BadUsernameOrPassword),
            Self::NotAuthorized => Err(ConnAckError::NotAuthorized),
            Self::Reserved(code) => Err(ConnAckError::ReservedCode(code)),
        }
    }
}

impl fmt::Display for ConnAckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Connection accepted"),
            Self::Reserved(code) => write!(f, "Reserved ({code})"),
            refused => match refused.check() {
                Err(e) => write!(f, "{e}"),
                Ok(()) => Ok(()),
            },
        }
    }
}

/// Why a server refused a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnAckError {
    UnacceptableProtocolVersion,
    IdentifierRejected,
    ServerUnavailable,
    BadUsernameOrPassword,
    NotAuthorized,
    ReservedCode(u8),
}

impl std::error::Error for ConnAckError {}

impl fmt::Display for ConnAckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnacceptableProtocolVersion => {
                write!(f, "Connection Refused: unacceptable protocol version")
            }
            Self::IdentifierRejected => write!(f, "Connection Refused: identifier rejected"),
            Self::ServerUnavailable => write!(f, "Connection Refused: server unavailable"),
            Self::BadUsernameOrPassword => {
                write!(f, "Connection Refused: bad user name or password")
            }
            Self::NotAuthorized => write!(f, "Connection Refused: not authorized"),
            Self::ReservedCode(code) => {
                write!(f, "Connection Refused: reserved return code {code}")
            }
        }
    }
}

/// The CONNACK packet is sent by the server in response to a CONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnAckPacket {
    /// Whether the server already holds a session for this client.
    pub session_present: bool,

    pub return_code: ConnAckCode,
}

impl ControlPacket for ConnAckPacket {
    const PACKET_TYPE: PacketType = PacketType::ConnAck;
}

impl<'a> DecodablePacket<'a> for ConnAckPacket {
    fn validate_remaining_length(remaining_length: u32) -> Result<(), Error> {
        if remaining_length != 2 {
            return Err(Error::MalformedRemainingLength);
        }

        Ok(())
    }

    fn decode_body(_header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        let acknowledge_flags = read_u8(cursor)?;

        // Bits 7-1 are reserved and must be 0
        if acknowledge_flags & 0b1111_1110 != 0 {
            return Err(Error::MalformedPacket("reserved connect acknowledge flags set"));
        }

        let return_code = ConnAckCode::from_u8(read_u8(cursor)?);

        Ok(Self { session_present: acknowledge_flags & 0x01 != 0, return_code })
    }
}

impl EncodablePacket for ConnAckPacket {
    fn remaining_len(&self) -> usize {
        2
    }

    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
        write_u8(buf, u8::from(self.session_present))?;
        write_u8(buf, self.return_code.to_u8())
    }
}

impl fmt::Display for ConnAckPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: session_present={} return_code={}",
            Self::PACKET_TYPE,
            self.session_present,
            self.return_code.to_u8()
        )
    }
}
