//! Unified error type for keypulse.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for on-target logging when the `defmt`
//! feature is enabled.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The USB endpoint path cannot take a report right now
    /// (not configured, bus suspended, or endpoint busy).
    NotReady,

    /// The outgoing report queue is full.
    QueueFull,

    /// USB stack returned an error.
    Usb(UsbError),
}

/// Subset of USB endpoint errors we propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbError {
    /// Report did not fit into the endpoint's max packet size.
    BufferOverflow,
    /// The endpoint is disabled (device not configured or detached).
    Disabled,
}

impl From<UsbError> for Error {
    fn from(e: UsbError) -> Self {
        Error::Usb(e)
    }
}
