//! Discovery scan state machine.
//!
//! The two-phase inquiry protocol is modeled as a pure transition
//! function over an explicit state: [`step`] maps (state, now, last scan
//! start, requested window) to a successor state plus the side effect the
//! driver must perform. Keeping the transitions free of I/O makes the
//! machine testable without a transport or a real clock.
//!
//! ```text
//! Idle     --(rate limiter elapsed)--> Scanning   [StartInquiry]
//! Scanning --(window still open)----> Scanning    [Wait]
//! Scanning --(window closed)--------> Idle        [Harvest]
//! ```

use crate::constants::INQUIRY_MARGIN_SECS;

/// State of the discovery cycle.
///
/// `Idle` is both the initial state and the terminal state of every
/// cycle; a completed scan always returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    /// No scan in flight.
    Idle,
    /// An inquiry was dispatched to the module and is still running.
    Scanning {
        /// Clock reading when the inquiry was dispatched, in ms.
        started_at: u64,
        /// Full requested window in seconds, margin included.
        duration_secs: u8,
    },
}

/// Side effect the driver must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanAction {
    /// Nothing to do this tick.
    Wait,
    /// Send `IN,<window_secs>` to the module.
    StartInquiry {
        /// Device-side scan duration: the requested window minus the
        /// module's fixed setup margin.
        window_secs: u8,
    },
    /// The module has finished printing results; collect them.
    Harvest,
}

/// Advance the state machine by one poll.
///
/// `last_start` is the start time of the previous scan, if any; a new
/// scan is admitted only once `scan_secs` seconds have passed since then,
/// a global rate limiter independent of whether that scan succeeded. The
/// harvest fires once the device-side window (`scan_secs` minus
/// [`INQUIRY_MARGIN_SECS`]) has elapsed.
///
/// `scan_secs` must be greater than [`INQUIRY_MARGIN_SECS`]; the driver
/// rejects shorter windows before calling in here.
#[must_use]
pub fn step(
    state: ScanState,
    now: u64,
    last_start: Option<u64>,
    scan_secs: u8,
) -> (ScanState, ScanAction) {
    match state {
        ScanState::Idle => {
            let due = match last_start {
                None => true,
                Some(started) => now.saturating_sub(started) > u64::from(scan_secs) * 1000,
            };
            if due {
                let window_secs = scan_secs.saturating_sub(INQUIRY_MARGIN_SECS);
                (
                    ScanState::Scanning {
                        started_at: now,
                        duration_secs: scan_secs,
                    },
                    ScanAction::StartInquiry { window_secs },
                )
            } else {
                (ScanState::Idle, ScanAction::Wait)
            }
        }
        ScanState::Scanning {
            started_at,
            duration_secs,
        } => {
            let window_ms =
                u64::from(duration_secs.saturating_sub(INQUIRY_MARGIN_SECS)) * 1000;
            if now.saturating_sub(started_at) > window_ms {
                (ScanState::Idle, ScanAction::Harvest)
            } else {
                (state, ScanAction::Wait)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_scan_starts_immediately() {
        let (state, action) = step(ScanState::Idle, 0, None, 10);
        assert_eq!(
            state,
            ScanState::Scanning {
                started_at: 0,
                duration_secs: 10
            }
        );
        assert_eq!(action, ScanAction::StartInquiry { window_secs: 6 });
    }

    #[test]
    fn test_rate_limiter_blocks_early_restart() {
        // 10s have not yet passed since the previous scan start
        let (state, action) = step(ScanState::Idle, 9_000, Some(0), 10);
        assert_eq!(state, ScanState::Idle);
        assert_eq!(action, ScanAction::Wait);

        // Exactly at the bound is still too early
        let (_, action) = step(ScanState::Idle, 10_000, Some(0), 10);
        assert_eq!(action, ScanAction::Wait);

        let (state, action) = step(ScanState::Idle, 10_001, Some(0), 10);
        assert_eq!(action, ScanAction::StartInquiry { window_secs: 6 });
        assert_eq!(
            state,
            ScanState::Scanning {
                started_at: 10_001,
                duration_secs: 10
            }
        );
    }

    #[test]
    fn test_scanning_waits_until_window_closes() {
        let scanning = ScanState::Scanning {
            started_at: 1_000,
            duration_secs: 10,
        };

        // Device-side window is 6s; still open
        let (state, action) = step(scanning, 6_500, Some(1_000), 10);
        assert_eq!(state, scanning);
        assert_eq!(action, ScanAction::Wait);

        let (state, action) = step(scanning, 7_001, Some(1_000), 10);
        assert_eq!(state, ScanState::Idle);
        assert_eq!(action, ScanAction::Harvest);
    }

    #[test]
    fn test_repeated_waits_are_idempotent() {
        let scanning = ScanState::Scanning {
            started_at: 0,
            duration_secs: 10,
        };
        for now in [0, 1, 1_000, 5_999] {
            let (state, action) = step(scanning, now, Some(0), 10);
            assert_eq!(state, scanning);
            assert_eq!(action, ScanAction::Wait);
        }
    }

    #[test]
    fn test_full_cycle_returns_to_idle() {
        let (state, _) = step(ScanState::Idle, 0, None, 10);
        let (state, _) = step(state, 3_000, Some(0), 10);
        let (state, action) = step(state, 6_001, Some(0), 10);
        assert_eq!(state, ScanState::Idle);
        assert_eq!(action, ScanAction::Harvest);

        // Next cycle only after the full 10s rate limit
        let (_, action) = step(state, 9_999, Some(0), 10);
        assert_eq!(action, ScanAction::Wait);
        let (_, action) = step(state, 10_001, Some(0), 10);
        assert_eq!(action, ScanAction::StartInquiry { window_secs: 6 });
    }
}
