//! Hardware-backed [`TransportClient`].
//!
//! Reports go into [`ReportQueue`] without waiting; a full queue rejects
//! them immediately. Bus state is only consulted by `is_ready`: a frame
//! queued just before a suspend is written once the bus resumes.

use embassy_time::Instant;
use embedded_hal::digital::OutputPin;
use keypulse::error::Error;
use keypulse::hid::keyboard::{KeyboardFrame, KeyboardReport};
use keypulse::TransportClient;

use super::hid_device::{self, ReportQueue};
use crate::status_led::StatusLed;

pub struct UsbTransport<P: OutputPin> {
    queue: &'static ReportQueue,
    led: StatusLed<P>,
}

impl<P: OutputPin> UsbTransport<P> {
    pub fn new(queue: &'static ReportQueue, led: StatusLed<P>) -> Self {
        Self { queue, led }
    }

    fn enqueue(&mut self, frame: KeyboardFrame) -> Result<(), Error> {
        self.queue.try_send(frame).map_err(|_| Error::QueueFull)
    }
}

impl<P: OutputPin> TransportClient for UsbTransport<P> {
    fn is_ready(&mut self) -> bool {
        hid_device::bus_ready() && !self.queue.is_full()
    }

    fn send_press_report(
        &mut self,
        report_id: u8,
        modifier: u8,
        keycodes: [u8; 6],
    ) -> Result<(), Error> {
        let report = KeyboardReport {
            modifier,
            reserved: 0,
            keycodes,
        };
        self.enqueue(KeyboardFrame::new(report_id, report))
    }

    fn send_release_report(&mut self, report_id: u8) -> Result<(), Error> {
        self.enqueue(KeyboardFrame::new(report_id, KeyboardReport::released()))
    }

    fn now_millis(&self) -> u32 {
        // Truncation is the wrap.
        Instant::now().as_millis() as u32
    }

    fn set_indicator(&mut self, on: bool) {
        self.led.set(on);
    }
}
