//! Answers to HID class requests issued by the host.
//!
//! The device is input-only: it keeps no report state that the host could
//! read back, and output reports (keyboard LEDs) never change its behaviour.
//! The USB request handler in the firmware delegates here so the policy can
//! be tested on the host.

/// Kind of report addressed by a GET_REPORT / SET_REPORT request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

/// Keyboard LED state carried by the output report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedIndicators {
    pub num_lock: bool,
    pub caps_lock: bool,
    pub scroll_lock: bool,
    pub compose: bool,
    pub kana: bool,
}

impl LedIndicators {
    pub fn from_bits(bits: u8) -> Self {
        Self {
            num_lock: bits & 0x01 != 0,
            caps_lock: bits & 0x02 != 0,
            scroll_lock: bits & 0x04 != 0,
            compose: bits & 0x08 != 0,
            kana: bits & 0x10 != 0,
        }
    }
}

/// What the device did with a SET_REPORT request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetReportAction {
    /// LED output report understood; no device state changes.
    LedsIgnored(LedIndicators),
    /// Anything else; dropped.
    Ignored,
}

/// An IN report finished transmitting. Nothing is chained after it.
pub fn report_complete(_report_id: u8) {}

/// GET_REPORT: there is no retained report to return.
///
/// `None` tells the USB stack to STALL the request.
pub fn get_report(_kind: ReportKind, _report_id: u8, _buf: &mut [u8]) -> Option<usize> {
    None
}

/// SET_REPORT: accept and ignore.
///
/// With report IDs in use the payload starts with the ID byte; a bare
/// one-byte payload is also accepted as the LED bitfield.
pub fn set_report(kind: ReportKind, report_id: u8, data: &[u8]) -> SetReportAction {
    if kind != ReportKind::Output {
        return SetReportAction::Ignored;
    }

    let bits = match data {
        [id, bits, ..] if *id == report_id => *bits,
        [bits] => *bits,
        _ => return SetReportAction::Ignored,
    };

    SetReportAction::LedsIgnored(LedIndicators::from_bits(bits))
}
