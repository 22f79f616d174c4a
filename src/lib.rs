#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

// Logging macro shim, must come before the modules that use it.
#[macro_use]
mod fmt;

pub mod constants;
mod device_id;
mod driver;
mod reader;
pub mod scan;
pub mod transport;

use crate::constants::{DEFAULT_SCAN_SECS, DEFAULT_TIMEOUT_TICKS, SETTLE_DELAY_MS};

pub use device_id::DeviceId;
pub use driver::BlueSmirf;
pub use reader::{LineBuffer, LineReader};
pub use scan::ScanState;
pub use transport::{Monotonic, SerialTransport};

/// Errors reported by the driver.
///
/// Almost every operation on the module is total: malformed replies are
/// skipped, timeouts read as "no data yet" and full buffers drop excess
/// bytes. Only the two explicit input rejections surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A scan duration of four seconds or less was requested. The module
    /// reserves four seconds of the window for its own inquiry overhead,
    /// so shorter windows would leave no time to actually scan.
    ScanWindowTooShort,
    /// A device name longer than [`constants::MAX_NAME_LENGTH`] bytes was
    /// passed to [`BlueSmirf::set_name`].
    NameTooLong,
}

/// Operating mode of the transceiver.
///
/// In `Configuration` mode the module interprets incoming lines as
/// management commands; in `Normal` mode bytes pass through transparently
/// to the remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Command mode, entered with the `$$$` escape sequence.
    Configuration,
    /// Transparent pass-through mode.
    Normal,
}

/// Outcome of one discovery poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanPoll {
    /// Nothing to do yet: either a scan is still running on the module, or
    /// the scan-rate limiter has not elapsed since the previous scan.
    Pending,
    /// A new inquiry scan was dispatched to the module this tick.
    Started,
    /// A scan completed and its results were harvested; carries the number
    /// of devices now available via [`BlueSmirf::discovered`].
    Ready(usize),
}

/// Options for configuring a [`BlueSmirf`] driver instance.
///
/// # Examples
///
/// ```rust
/// use bluesmirf::BlueSmirfOptions;
///
/// // Shorter reply timeout for a fast, quiet link
/// let options = BlueSmirfOptions {
///     timeout_ticks: 100,
///     ..BlueSmirfOptions::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlueSmirfOptions {
    /// Reply-read timeout budget in ticks. One tick is one poll of the
    /// transport plus a one millisecond yield when no byte is available.
    pub timeout_ticks: u16,
    /// Delay in milliseconds applied after sending a command, before the
    /// module's reply (or echo) is drained or read.
    pub settle_delay_ms: u32,
    /// Scan window in seconds used by [`BlueSmirf::detect`]. Must be
    /// greater than four; the module keeps four seconds for itself.
    pub scan_secs: u8,
}

impl Default for BlueSmirfOptions {
    fn default() -> Self {
        Self {
            timeout_ticks: DEFAULT_TIMEOUT_TICKS,
            settle_delay_ms: SETTLE_DELAY_MS,
            scan_secs: DEFAULT_SCAN_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BlueSmirfOptions::default();
        assert_eq!(options.timeout_ticks, DEFAULT_TIMEOUT_TICKS);
        assert_eq!(options.settle_delay_ms, SETTLE_DELAY_MS);
        assert_eq!(options.scan_secs, DEFAULT_SCAN_SECS);
    }

    #[test]
    fn test_custom_options() {
        let options = BlueSmirfOptions {
            timeout_ticks: 50,
            settle_delay_ms: 10,
            scan_secs: 8,
        };
        assert_eq!(options.timeout_ticks, 50);
        assert_eq!(options.settle_delay_ms, 10);
        assert_eq!(options.scan_secs, 8);
    }

    #[test]
    fn test_scan_poll_equality() {
        assert_eq!(ScanPoll::Ready(2), ScanPoll::Ready(2));
        assert_ne!(ScanPoll::Ready(2), ScanPoll::Ready(3));
        assert_ne!(ScanPoll::Pending, ScanPoll::Started);
    }
}
