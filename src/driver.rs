//! BlueSMiRF driver - command mode management, discovery and one-shot commands
//!
//! This module implements the protocol engine around the RN-42's
//! line-oriented AT command set.
//!
//! ## Architecture
//!
//! The driver follows a single-owner design:
//!
//! 1. One caller thread drives one [`BlueSmirf`] instance against one
//!    serial transport; there are no background tasks or callbacks.
//! 2. Device discovery is split into two phases by the [`crate::scan`]
//!    state machine so a multi-second hardware scan never blocks the
//!    caller's control loop: one call to [`BlueSmirf::poll`] dispatches
//!    the inquiry, a later call harvests the results.
//! 3. Everything that parses or drains a reply goes through the shared
//!    [`LineReader`], which bounds every wait by a tick budget.
//!
//! ## Command mode
//!
//! Management commands are only interpreted after the `$$$` escape
//! sequence. The escape toggles rather than latches, so entry is
//! idempotent here: a second entry request while already in
//! Configuration mode sends nothing. Operations that need command mode
//! enter it themselves; callers never have to sequence it manually.
//!
//! ## Error philosophy
//!
//! The serial link is noisy and latency-variable, so the driver reports
//! degraded results instead of failing: malformed result lines are
//! skipped, timeouts read as "nothing yet", and full buffers drop excess
//! bytes. See [`crate::Error`] for the two deliberate exceptions.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::constants::{
    CMD_ENTER_CONFIG, CMD_EXIT_CONFIG, CMD_EXTENDED_INFO, CMD_HELP, CMD_INFO, CMD_LINK_QUALITY,
    CMD_QUIET, CMD_REBOOT, CMD_WAKE, INQUIRY_MARGIN_SECS, MAX_DISCOVERABLE, MAX_NAME_LENGTH,
    SET_NAME_CMD_CAPACITY,
};
use crate::reader::LineReader;
use crate::scan::{self, ScanAction, ScanState};
use crate::transport::{Monotonic, SerialTransport};
use crate::{BlueSmirfOptions, DeviceId, Error, Mode, ScanPoll};

/// Driver for a BlueSMiRF / RN-42 module on a serial transport.
///
/// The transport and clock are injected at construction; pass `&mut`
/// handles to lend them for the driver's lifetime and take them back
/// afterwards, or values to transfer ownership (recoverable via
/// [`free`](Self::free)).
pub struct BlueSmirf<T: SerialTransport, C: Monotonic> {
    serial: T,
    clock: C,
    mode: Mode,
    reader: LineReader,
    scan: ScanState,
    last_scan_start: Option<u64>,
    discovered: Vec<DeviceId, MAX_DISCOVERABLE>,
    options: BlueSmirfOptions,
}

impl<T: SerialTransport, C: Monotonic> BlueSmirf<T, C> {
    /// Create a driver with default options. The module starts out in
    /// Normal (pass-through) mode.
    pub fn new(serial: T, clock: C) -> Self {
        Self::with_options(serial, clock, BlueSmirfOptions::default())
    }

    /// Create a driver with custom options.
    pub fn with_options(serial: T, clock: C, options: BlueSmirfOptions) -> Self {
        Self {
            serial,
            clock,
            mode: Mode::Normal,
            reader: LineReader::new(),
            scan: ScanState::Idle,
            last_scan_start: None,
            discovered: Vec::new(),
            options,
        }
    }

    /// Release the transport and clock.
    pub fn free(self) -> (T, C) {
        (self.serial, self.clock)
    }

    /// Current command/pass-through mode, as tracked by the driver.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current discovery state.
    #[must_use]
    pub fn scan_state(&self) -> ScanState {
        self.scan
    }

    /// Devices found by the most recent completed scan, in arrival order.
    /// Overwritten wholesale by the next completed scan.
    #[must_use]
    pub fn discovered(&self) -> &[DeviceId] {
        &self.discovered
    }

    /// The last reply line captured by a query helper.
    #[must_use]
    pub fn last_reply(&self) -> &str {
        self.reader.last_line()
    }

    /// Switch the link to a new baud rate.
    ///
    /// The `U,<baud>,N` command is necessarily sent at the *old* rate;
    /// the transport is reconfigured immediately after, so the closing
    /// mode-exit handshake already runs at the new rate.
    pub fn begin(&mut self, baud: u32) {
        self.enter_config_mode();
        let mut cmd: String<16> = String::new();
        write!(cmd, "U,{baud},N").ok();
        self.serial.write_line(&cmd);
        self.serial.set_baud(baud);
        self.exit_config_mode();
    }

    /// Enter Configuration mode.
    ///
    /// No-op when already in it: the `$$$` escape toggles command mode
    /// rather than asserting it, so resending would drop back out. The
    /// escape is sent bare (no terminator), followed by the settle delay
    /// and a flush of whatever acknowledgement the module prints.
    pub fn enter_config_mode(&mut self) {
        if self.mode == Mode::Configuration {
            return;
        }
        debug!("entering configuration mode");
        self.send_cmd(CMD_ENTER_CONFIG, false);
        self.mode = Mode::Configuration;
    }

    /// Leave Configuration mode, unconditionally.
    pub fn exit_config_mode(&mut self) {
        debug!("leaving configuration mode");
        self.send_cmd(CMD_EXIT_CONFIG, true);
        self.mode = Mode::Normal;
    }

    /// Drive the discovery state machine by one tick.
    ///
    /// Call this once per iteration of the control loop; it never blocks
    /// for the scan duration. A new scan starts only once `scan_secs`
    /// seconds have passed since the previous scan started (the very
    /// first scan starts immediately). The module itself scans for
    /// `scan_secs - 4` seconds; once that window closes, the next poll
    /// collects the result lines and returns [`ScanPoll::Ready`].
    ///
    /// Ceasing to poll safely idles the machine, though an inquiry
    /// already dispatched to the module cannot be cancelled device-side.
    ///
    /// # Errors
    ///
    /// [`Error::ScanWindowTooShort`] if `scan_secs` is four or less,
    /// which would leave the module no time to scan.
    pub fn poll(&mut self, scan_secs: u8) -> Result<ScanPoll, Error> {
        if scan_secs <= INQUIRY_MARGIN_SECS {
            return Err(Error::ScanWindowTooShort);
        }

        let now = self.clock.now_millis();
        let (next, action) = scan::step(self.scan, now, self.last_scan_start, scan_secs);
        self.scan = next;

        match action {
            ScanAction::Wait => Ok(ScanPoll::Pending),
            ScanAction::StartInquiry { window_secs } => {
                self.enter_config_mode();
                self.flush_input();

                let mut cmd: String<8> = String::new();
                write!(cmd, "IN,{window_secs}").ok();
                self.serial.write_line(&cmd);
                self.last_scan_start = Some(now);
                debug!("inquiry dispatched, window {=u8}s", window_secs);
                Ok(ScanPoll::Started)
            }
            ScanAction::Harvest => {
                let count = self.harvest();
                debug!("inquiry complete, {=usize} device(s)", count);
                Ok(ScanPoll::Ready(count))
            }
        }
    }

    /// Collect the result lines of a finished inquiry.
    ///
    /// The first line is the module's `Inquiry,...` echo and is
    /// discarded. Each following line carries a device identifier before
    /// the first comma; a zero-length read marks the end of the stream.
    /// Lines without a comma are skipped. Identifiers beyond
    /// [`MAX_DISCOVERABLE`] are dropped.
    fn harvest(&mut self) -> usize {
        self.discovered.clear();

        let ticks = self.options.timeout_ticks;
        self.reader
            .read_line(&mut self.serial, &mut self.clock, ticks, false);

        loop {
            let len = self
                .reader
                .read_line(&mut self.serial, &mut self.clock, ticks, false);
            if len == 0 {
                break;
            }
            let Some((token, _)) = self.reader.last_line().split_once(',') else {
                continue;
            };
            let id = DeviceId::from_token(token);
            debug!("found {=str}", id.as_str());
            self.discovered.push(id).ok();
        }

        self.discovered.len()
    }

    /// Scan for a specific device.
    ///
    /// Runs one discovery poll (with the configured
    /// [`scan_secs`](BlueSmirfOptions::scan_secs) window) and reports
    /// whether `id` is among the results, comparing the first 12 bytes of
    /// each identifier. Because it rides the same rate-limited poll, a
    /// single call usually returns `false` while the scan is still
    /// pending; keep calling it across loop iterations until the
    /// underlying scan completes.
    pub fn detect(&mut self, id: &str) -> bool {
        let scan_secs = self.options.scan_secs;
        match self.poll(scan_secs) {
            Ok(ScanPoll::Ready(_)) => self.discovered.iter().any(|d| d.matches(id)),
            _ => false,
        }
    }

    /// Query the settings dump (`D`) and capture the reply.
    ///
    /// Returns the number of reply bytes captured; the text is available
    /// via [`last_reply`](Self::last_reply), truncated to the reply
    /// buffer's capacity.
    pub fn settings(&mut self) -> usize {
        self.query(CMD_INFO)
    }

    /// Query the extended settings dump (`E`) and capture the reply.
    pub fn extended_settings(&mut self) -> usize {
        self.query(CMD_EXTENDED_INFO)
    }

    /// Print the module's help screen (`H`) and capture the reply.
    pub fn help(&mut self) -> usize {
        self.query(CMD_HELP)
    }

    /// Query the link quality of the current connection (`L`).
    pub fn link_quality(&mut self) -> usize {
        self.query(CMD_LINK_QUALITY)
    }

    /// Make the module discoverable (`W`).
    pub fn enable_discoverability(&mut self) {
        self.enter_config_mode();
        self.send_cmd(CMD_WAKE, true);
    }

    /// Make the module non-discoverable (`Q`).
    pub fn disable_discoverability(&mut self) {
        self.enter_config_mode();
        self.send_cmd(CMD_QUIET, true);
    }

    /// Reboot the module (`R,1`).
    ///
    /// The restart drops command mode on the device side, so the driver
    /// resets to Normal without an exit handshake.
    pub fn reboot(&mut self) {
        self.enter_config_mode();
        self.send_cmd(CMD_REBOOT, true);
        self.mode = Mode::Normal;
    }

    /// Set the module's friendly name (`SN,<name>`).
    ///
    /// # Errors
    ///
    /// [`Error::NameTooLong`] if `name` exceeds [`MAX_NAME_LENGTH`]
    /// bytes; nothing is sent in that case.
    pub fn set_name(&mut self, name: &str) -> Result<(), Error> {
        if name.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong);
        }
        self.enter_config_mode();
        let mut cmd: String<SET_NAME_CMD_CAPACITY> = String::new();
        write!(cmd, "SN,{name}").ok();
        self.send_cmd(&cmd, true);
        self.exit_config_mode();
        Ok(())
    }

    /// Write a command, wait for the module to settle, drop its reply.
    fn send_cmd(&mut self, cmd: &str, line_ending: bool) {
        if line_ending {
            self.serial.write_line(cmd);
        } else {
            self.serial.write(cmd.as_bytes());
        }
        self.clock.delay_millis(self.options.settle_delay_ms);
        self.flush_input();
    }

    /// Write a command and capture its reply instead of dropping it.
    fn query(&mut self, cmd: &str) -> usize {
        self.enter_config_mode();
        self.serial.write_line(cmd);
        self.clock.delay_millis(self.options.settle_delay_ms);
        let ticks = self.options.timeout_ticks;
        self.reader
            .read_line(&mut self.serial, &mut self.clock, ticks, true)
    }

    fn flush_input(&mut self) {
        while self.serial.read_byte().is_some() {}
    }
}
