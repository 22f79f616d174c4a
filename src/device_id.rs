use crate::constants::{DEVICE_ID_MAX_LEN, DEVICE_ID_PREFIX_LEN};

/// A device identifier reported by an inquiry scan.
///
/// The RN-42 prints the peer's address as the first comma-separated field
/// of each result line, either as 12 bare hex digits or colon-separated.
/// Identifiers are stored verbatim up to [`DEVICE_ID_MAX_LEN`] bytes;
/// anything longer is truncated, the same drop-excess policy the reply
/// buffer applies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(heapless::String<DEVICE_ID_MAX_LEN>);

impl DeviceId {
    /// Build an identifier from the address token of a result line.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let mut id = heapless::String::new();
        for c in token.chars() {
            if id.push(c).is_err() {
                break;
            }
        }
        Self(id)
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against another identifier on the first
    /// [`DEVICE_ID_PREFIX_LEN`] bytes, the significant span of a bare MAC.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        let a = self.0.as_bytes().iter().take(DEVICE_ID_PREFIX_LEN);
        let b = other.as_bytes().iter().take(DEVICE_ID_PREFIX_LEN);
        a.eq(b)
    }
}

impl From<&str> for DeviceId {
    fn from(token: &str) -> Self {
        Self::from_token(token)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for DeviceId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
