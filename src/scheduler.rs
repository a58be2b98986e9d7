//! Periodic key-stroke scheduler.
//!
//! Once per main-loop iteration the scheduler checks whether a full
//! interval has passed since the last stroke and, if so, hands a press
//! report followed by a release report to the transport.
//!
//! Reports are fire-and-forget: a rejected press is not retried, the
//! next window is simply awaited. The only carried-over obligation is a
//! release whose press was accepted; it is re-attempted on the next ready
//! tick, and no new press goes out until it has been accepted. The host
//! never sees a stuck key and never sees a release without a press.

use crate::config;
use crate::transport::TransportClient;

/// Fixed parameters of the key stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Minimum time between two press reports (ms).
    pub interval_ms: u32,
    pub report_id: u8,
    pub modifier: u8,
    pub keycode: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: config::REPORT_INTERVAL_MS,
            report_id: config::REPORT_ID_KEYBOARD,
            modifier: config::REPORT_MODIFIER,
            keycode: config::REPORT_KEYCODE,
        }
    }
}

/// Result of a single [`ReportScheduler::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Transport not ready; scheduler state untouched.
    NotReady,
    /// Interval not yet elapsed, or a release is still owed.
    Waiting,
    /// Press report accepted (release sent or left pending).
    Emitted,
    /// Interval elapsed but the press was rejected; window consumed.
    Dropped,
}

#[derive(Debug)]
pub struct ReportScheduler {
    config: SchedulerConfig,
    last_emission_ms: u32,
    release_pending: bool,
}

impl ReportScheduler {
    pub const fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            last_emission_ms: 0,
            release_pending: false,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Timestamp (ms since boot) of the last press window.
    pub fn last_emission_ms(&self) -> u32 {
        self.last_emission_ms
    }

    /// `true` between an accepted press and its accepted release.
    pub fn release_pending(&self) -> bool {
        self.release_pending
    }

    /// Run one tick using the transport's own clock.
    pub fn poll<T: TransportClient>(&mut self, transport: &mut T) -> TickOutcome {
        let now = transport.now_millis();
        self.tick(now, transport)
    }

    /// Run one tick at time `now` (ms since boot, wrapping).
    pub fn tick<T: TransportClient>(&mut self, now: u32, transport: &mut T) -> TickOutcome {
        transport.set_indicator(false);

        if !transport.is_ready() {
            return TickOutcome::NotReady;
        }

        self.flush_release(transport);

        // No new press while the previous key is still held on the host.
        if self.release_pending {
            return TickOutcome::Waiting;
        }

        if now.wrapping_sub(self.last_emission_ms) < self.config.interval_ms {
            return TickOutcome::Waiting;
        }
        self.last_emission_ms = now;

        let keycodes = [self.config.keycode, 0, 0, 0, 0, 0];
        match transport.send_press_report(self.config.report_id, self.config.modifier, keycodes) {
            Ok(()) => self.release_pending = true,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Scheduler: press dropped ({})", _e);
                return TickOutcome::Dropped;
            }
        }

        self.flush_release(transport);
        transport.set_indicator(true);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Scheduler: key stroke at {} ms (release pending: {})",
            now,
            self.release_pending
        );

        TickOutcome::Emitted
    }

    /// Send the release for an accepted press, if one is owed.
    fn flush_release<T: TransportClient>(&mut self, transport: &mut T) {
        if !self.release_pending {
            return;
        }
        if transport.send_release_report(self.config.report_id).is_ok() {
            self.release_pending = false;
        }
    }
}

impl Default for ReportScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
