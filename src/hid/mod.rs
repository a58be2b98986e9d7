//! HID report types and host request handling.

pub mod host_requests;
pub mod keyboard;


pub use keyboard::{KeyboardFrame, KeyboardReport};
