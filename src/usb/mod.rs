//! USB Device subsystem - presents a HID keyboard to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. The device has a single HID interface (keyboard,
//! report ID 1).
//!
//! The scheduler never touches the endpoint directly: it enqueues frames
//! through [`transport::UsbTransport`], and the HID writer task drains the
//! queue onto the IN endpoint.

pub mod hid_device;
pub mod transport;
