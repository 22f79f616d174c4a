//! `Bluesmirf` Constants
//!
//! This module contains all the constants used throughout the `Bluesmirf`
//! library: buffer sizes, capacities, timing defaults and the RN-42
//! command tokens driving the wire protocol.

/// Maximum number of devices kept from one inquiry scan.
///
/// The RN-41/RN-42 can report up to 9; the driver keeps the first 3 and
/// silently drops the rest, a documented limitation inherited from the
/// module's small reply buffers.
pub const MAX_DISCOVERABLE: usize = 3;

/// Capacity of the reply line buffer in bytes, one of which is reserved
/// for the logical line terminator.
pub const REPLY_BUFFER_SIZE: usize = 32;

/// Default reply-read timeout budget in ticks (1 tick ~= 1 ms idle).
pub const DEFAULT_TIMEOUT_TICKS: u16 = 500;

/// Delay in milliseconds for the module to settle after a command.
pub const SETTLE_DELAY_MS: u32 = 100;

/// Seconds the module keeps for itself out of every scan window, spent on
/// inquiry setup and teardown before results are printed.
pub const INQUIRY_MARGIN_SECS: u8 = 4;

/// Default scan window in seconds used by `detect`.
pub const DEFAULT_SCAN_SECS: u8 = 10;

/// Number of leading bytes of a device identifier that participate in
/// identity comparisons (a bare MAC is 12 hex digits).
pub const DEVICE_ID_PREFIX_LEN: usize = 12;

/// Maximum stored length of a device identifier in bytes; fits both the
/// bare 12-digit form and the colon-separated `AA:BB:CC:DD:EE:FF` form.
pub const DEVICE_ID_MAX_LEN: usize = 17;

/// Maximum device name length accepted by `SN,<name>` (RN-42 limit).
pub const MAX_NAME_LENGTH: usize = 20;

/// Capacity of the formatted `SN,<name>` command line.
pub const SET_NAME_CMD_CAPACITY: usize = MAX_NAME_LENGTH + 3;

/// Factory default baud rate of the module.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Escape sequence entering Configuration mode, sent without a terminator.
pub const CMD_ENTER_CONFIG: &str = "$$$";

/// Command leaving Configuration mode.
pub const CMD_EXIT_CONFIG: &str = "---";

/// Command querying the basic settings dump.
pub const CMD_INFO: &str = "D";

/// Command querying the extended settings dump.
pub const CMD_EXTENDED_INFO: &str = "E";

/// Command printing the module's built-in help screen.
pub const CMD_HELP: &str = "H";

/// Command reporting the link quality of the current connection.
pub const CMD_LINK_QUALITY: &str = "L";

/// Command making the module non-discoverable ("quiet").
pub const CMD_QUIET: &str = "Q";

/// Command making the module discoverable again ("wake").
pub const CMD_WAKE: &str = "W";

/// Command rebooting the module.
pub const CMD_REBOOT: &str = "R,1";
