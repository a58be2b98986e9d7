//! Capabilities the report scheduler needs from the USB device stack.
//!
//! The firmware binds this trait to `embassy-usb` (see `usb::transport`
//! in the binary); host tests use [`RecordingTransport`].

pub mod recording;

pub use recording::{RecordingTransport, TransportEvent};

use crate::error::Error;

pub trait TransportClient {
    /// `true` if a report handed over now will be accepted.
    fn is_ready(&mut self) -> bool;

    /// Queue a keyboard report with the given keys held down.
    ///
    /// Completion on the bus is not observed.
    fn send_press_report(&mut self, report_id: u8, modifier: u8, keycodes: [u8; 6])
        -> Result<(), Error>;

    /// Queue an all-zero keyboard report (every key released).
    fn send_release_report(&mut self, report_id: u8) -> Result<(), Error>;

    /// Milliseconds since boot. Wraps silently at `u32::MAX`.
    fn now_millis(&self) -> u32;

    /// Best-effort activity indicator (status LED).
    fn set_indicator(&mut self, on: bool);
}
