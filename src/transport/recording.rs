//! In-memory transport that records every call.
//!
//! `no_std` friendly so it also links into integration tests and
//! on-target self tests.

use heapless::Vec;

use super::TransportClient;
use crate::error::Error;

/// Maximum number of events kept. Pushing past it marks the log as
/// overflowed and every log accessor panics from then on.
pub const MAX_RECORDED_EVENTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportEvent {
    Press {
        report_id: u8,
        modifier: u8,
        keycodes: [u8; 6],
    },
    Release {
        report_id: u8,
    },
    Indicator(bool),
}

#[derive(Debug)]
pub struct RecordingTransport {
    /// Answer for `is_ready`.
    pub ready: bool,
    /// When `false`, sends are rejected with [`Error::QueueFull`] and not recorded.
    pub accept: bool,
    /// Value returned by `now_millis`.
    pub now: u32,
    indicator: bool,
    overflowed: bool,
    events: Vec<TransportEvent, MAX_RECORDED_EVENTS>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            ready: true,
            accept: true,
            now: 0,
            indicator: false,
            overflowed: false,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[TransportEvent] {
        assert!(
            !self.overflowed,
            "recording overflowed: more than {} events",
            MAX_RECORDED_EVENTS
        );
        &self.events
    }

    /// `true` once an event could not be stored.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Empties the log and resets the overflow mark.
    pub fn clear(&mut self) {
        self.events.clear();
        self.overflowed = false;
    }

    /// Accepted press and release reports, indicator writes excluded.
    pub fn reports(&self) -> impl Iterator<Item = &TransportEvent> {
        self.events()
            .iter()
            .filter(|e| !matches!(e, TransportEvent::Indicator(_)))
    }

    pub fn report_count(&self) -> usize {
        self.reports().count()
    }

    /// Current indicator state.
    pub fn indicator(&self) -> bool {
        self.indicator
    }

    fn record_send(&mut self, event: TransportEvent) -> Result<(), Error> {
        if !self.ready {
            return Err(Error::NotReady);
        }
        if !self.accept {
            return Err(Error::QueueFull);
        }
        self.record(event);
        Ok(())
    }

    fn record(&mut self, event: TransportEvent) {
        if self.events.push(event).is_err() {
            self.overflowed = true;
        }
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportClient for RecordingTransport {
    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn send_press_report(
        &mut self,
        report_id: u8,
        modifier: u8,
        keycodes: [u8; 6],
    ) -> Result<(), Error> {
        self.record_send(TransportEvent::Press {
            report_id,
            modifier,
            keycodes,
        })
    }

    fn send_release_report(&mut self, report_id: u8) -> Result<(), Error> {
        self.record_send(TransportEvent::Release { report_id })
    }

    fn now_millis(&self) -> u32 {
        self.now
    }

    /// Only transitions are recorded.
    fn set_indicator(&mut self, on: bool) {
        if self.indicator != on {
            self.indicator = on;
            self.record(TransportEvent::Indicator(on));
        }
    }
}
