/// Protocol name used by MQTT 3.1.1.
pub const PROTOCOL_NAME: &str = "MQTT";

/// Protocol name used by MQTT 3.1.
pub const PROTOCOL_NAME_V31: &str = "MQIsdp";

/// Protocol level of MQTT 3.1.
pub const PROTOCOL_VERSION_V31: u8 = 3;

/// Protocol level of MQTT 3.1.1.
pub const PROTOCOL_VERSION: u8 = 4;

/// Largest value the remaining length field can carry.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Largest possible packet: a 5 byte fixed header plus the largest body.
pub const MAX_PACKET_SIZE: usize = 1 + 4 + MAX_REMAINING_LENGTH;

/// Maximum allowed length for a UTF-8 encoded string or binary field.
pub const MAX_STRING_LENGTH: usize = 65_535;

/// Return code marking a rejected subscription in a SUBACK payload.
pub const QOS_FAILURE: u8 = 0x80;

/// Initial capacity of a connection read buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;
