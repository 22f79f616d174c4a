//! Transport and time capabilities consumed by the driver.
//!
//! The driver never talks to hardware directly: it is handed a byte
//! channel ([`SerialTransport`]) and a time source ([`Monotonic`]) at
//! construction and depends on nothing else. Both traits are implemented
//! for `&mut T`, so a caller can lend its UART to the driver and take it
//! back afterwards.

/// A byte-oriented serial channel to the Bluetooth module.
///
/// Reads must be non-blocking: [`read_byte`](Self::read_byte) returns
/// `None` immediately when no byte is pending. The driver supplies all
/// waiting and pacing itself.
pub trait SerialTransport {
    /// Check whether at least one received byte is pending.
    fn available(&self) -> bool;

    /// Take the next received byte, or `None` if nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write raw bytes, without any terminator.
    fn write(&mut self, bytes: &[u8]);

    /// Write a command line followed by the `\n` terminator.
    fn write_line(&mut self, line: &str) {
        self.write(line.as_bytes());
        self.write(b"\n");
    }

    /// Reconfigure the channel's line rate. Bytes written afterwards are
    /// clocked out at the new rate.
    fn set_baud(&mut self, baud: u32);
}

impl<T: SerialTransport + ?Sized> SerialTransport for &mut T {
    fn available(&self) -> bool {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes);
    }

    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }

    fn set_baud(&mut self, baud: u32) {
        (**self).set_baud(baud);
    }
}

/// A monotonic millisecond clock with a short-delay primitive.
///
/// `now_millis` drives the scan state machine; `delay_millis` paces the
/// line reader's idle ticks and the post-command settle delay. The values
/// are budgets, not real-time guarantees: on a system with irregular
/// scheduling, timeouts stretch proportionally.
pub trait Monotonic {
    /// Milliseconds elapsed since some fixed epoch (e.g. boot).
    fn now_millis(&self) -> u64;

    /// Block the caller for roughly `ms` milliseconds.
    fn delay_millis(&mut self, ms: u32);
}

impl<C: Monotonic + ?Sized> Monotonic for &mut C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }

    fn delay_millis(&mut self, ms: u32) {
        (**self).delay_millis(ms);
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Shared test doubles: a scriptable serial channel and a clock whose
    //! delays simply advance its reading of "now".
    //!
    //! Both implement their trait for `&Self` (interior mutability), so a
    //! test can hand the driver one handle and keep another for pushing
    //! replies and advancing time mid-scenario.

    use super::{Monotonic, SerialTransport};
    use core::cell::{Cell, RefCell};
    use heapless::Vec;

    struct Inner {
        rx: Vec<u8, 1024>,
        cursor: usize,
        tx: Vec<u8, 1024>,
        baud_changes: Vec<(usize, u32), 4>,
    }

    pub(crate) struct MockSerial {
        inner: RefCell<Inner>,
    }

    impl MockSerial {
        pub(crate) fn new() -> Self {
            Self {
                inner: RefCell::new(Inner {
                    rx: Vec::new(),
                    cursor: 0,
                    tx: Vec::new(),
                    baud_changes: Vec::new(),
                }),
            }
        }

        /// Queue bytes the driver will see as received from the module.
        pub(crate) fn push_reply(&self, reply: &str) {
            let mut inner = self.inner.borrow_mut();
            inner
                .rx
                .extend_from_slice(reply.as_bytes())
                .expect("mock rx buffer full");
        }

        /// Everything the driver has written so far.
        pub(crate) fn tx(&self) -> Vec<u8, 1024> {
            self.inner.borrow().tx.clone()
        }

        /// Count occurrences of `needle` in the written output.
        pub(crate) fn tx_count(&self, needle: &str) -> usize {
            let inner = self.inner.borrow();
            let n = needle.as_bytes();
            if n.is_empty() {
                return 0;
            }
            inner.tx.windows(n.len()).filter(|w| *w == n).count()
        }

        /// Baud reconfigurations as (bytes written before the change, rate).
        pub(crate) fn baud_changes(&self) -> Vec<(usize, u32), 4> {
            self.inner.borrow().baud_changes.clone()
        }
    }

    impl SerialTransport for &MockSerial {
        fn available(&self) -> bool {
            let inner = self.inner.borrow();
            inner.cursor < inner.rx.len()
        }

        fn read_byte(&mut self) -> Option<u8> {
            let mut inner = self.inner.borrow_mut();
            let byte = inner.rx.get(inner.cursor).copied()?;
            inner.cursor += 1;
            Some(byte)
        }

        fn write(&mut self, bytes: &[u8]) {
            self.inner
                .borrow_mut()
                .tx
                .extend_from_slice(bytes)
                .expect("mock tx buffer full");
        }

        fn set_baud(&mut self, baud: u32) {
            let mut inner = self.inner.borrow_mut();
            let mark = inner.tx.len();
            inner.baud_changes.push((mark, baud)).expect("too many baud changes");
        }
    }

    pub(crate) struct MockClock {
        now: Cell<u64>,
    }

    impl MockClock {
        pub(crate) fn new() -> Self {
            Self { now: Cell::new(0) }
        }

        pub(crate) fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }

        pub(crate) fn now(&self) -> u64 {
            self.now.get()
        }
    }

    impl Monotonic for &MockClock {
        fn now_millis(&self) -> u64 {
            self.now.get()
        }

        fn delay_millis(&mut self, ms: u32) {
            self.now.set(self.now.get() + u64::from(ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockClock, MockSerial};
    use super::{Monotonic, SerialTransport};

    #[test]
    fn test_mock_serial_round_trip() {
        let serial = MockSerial::new();
        let mut handle = &serial;

        assert!(!handle.available());
        assert_eq!(handle.read_byte(), None);

        serial.push_reply("OK\n");
        assert!(handle.available());
        assert_eq!(handle.read_byte(), Some(b'O'));
        assert_eq!(handle.read_byte(), Some(b'K'));
        assert_eq!(handle.read_byte(), Some(b'\n'));
        assert_eq!(handle.read_byte(), None);
    }

    #[test]
    fn test_mock_serial_write_line_appends_terminator() {
        let serial = MockSerial::new();
        let mut handle = &serial;

        handle.write_line("SN,robot");
        assert_eq!(serial.tx().as_slice(), b"SN,robot\n");
        assert_eq!(serial.tx_count("SN,"), 1);
    }

    #[test]
    fn test_mock_clock_delay_advances_now() {
        let clock = MockClock::new();
        let mut handle = &clock;

        assert_eq!(handle.now_millis(), 0);
        handle.delay_millis(100);
        clock.advance(400);
        assert_eq!(handle.now_millis(), 500);
    }
}
