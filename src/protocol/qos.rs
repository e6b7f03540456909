use std::fmt;

/// Quality of Service levels.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718099>
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[allow(clippy::enum_variant_names)]
pub enum QoS {
    /// The message arrives at the receiver either once or not at all.
    #[default]
    AtMostOnce = 0,

    /// The message arrives at the receiver at least once.
    AtLeastOnce = 1,

    /// The message arrives at the receiver exactly once.
    ExactlyOnce = 2,
}

impl QoS {
    /// Converts a numeric value to a `QoS`.
    ///
    /// Returns `None` for anything other than 0, 1 or 2.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::AtMostOnce),
            1 => Some(Self::AtLeastOnce),
            2 => Some(Self::ExactlyOnce),
            _ => None,
        }
    }

    /// Converts the `QoS` to its numeric value.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_u8())
    }
}
