//! Application-wide constants and compile-time configuration.
//!
//! All pin assignments, timing parameters, and USB identity constants
//! live here so they can be tuned in one place.

// Report scheduling

/// Time between two synthetic key strokes (ms).
pub const REPORT_INTERVAL_MS: u32 = 90_000;

/// Report ID of the keyboard collection in the HID report descriptor.
pub const REPORT_ID_KEYBOARD: u8 = 1;

/// Modifier byte sent with every press report (no modifiers).
pub const REPORT_MODIFIER: u8 = 0x00;

/// Key typed on every stroke (HID usage 0x0A, "g").
pub const REPORT_KEYCODE: u8 = crate::hid::keyboard::KEY_G;

/// How often the main loop polls the scheduler (ms).
pub const SCHEDULER_POLL_MS: u64 = 1;

/// Hold time after an emitted key stroke (ms).
///
/// Keeps the status LED visibly lit and rate-limits the scheduler task.
/// Only the scheduler task waits; the USB tasks keep running.
pub const POST_EMISSION_HOLD_MS: u64 = 50;

/// Capacity of the scheduler → HID writer report queue.
pub const REPORT_QUEUE_DEPTH: usize = 4;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "keypulse";
pub const USB_PRODUCT: &str = "keypulse HID keyboard";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 10;

/// Largest IN report: report ID + 8-byte keyboard report.
pub const USB_HID_MAX_PACKET: u16 = 16;

// GPIO pin assignments (nRF52840 dongle defaults)
//
// Logical names only; the concrete `embassy_nrf::peripherals::*` pin is
// picked in `main.rs`.
//
//   Status LED     → P0.06 (active-low)

/// The status LED lights when the pin is driven low.
pub const STATUS_LED_ACTIVE_LOW: bool = true;
