//! Host-testable core of keypulse.
//!
//! Holds everything that does not touch hardware: the key-stroke
//! scheduler, the transport capability it drives, keyboard report
//! types and the host request policy.
//!
//! Usage: `cargo test --lib` (host) or `cargo test` for the integration
//! tests as well.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links this library for its logic.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod hid;
pub mod scheduler;
pub mod transport;

pub use error::{Error, UsbError};
pub use scheduler::{ReportScheduler, SchedulerConfig, TickOutcome};
pub use transport::TransportClient;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::hid::keyboard::KEY_G;
    use super::transport::{RecordingTransport, TransportEvent};
    use super::*;

    const INTERVAL: u32 = 900;

    fn scheduler() -> ReportScheduler {
        ReportScheduler::new(SchedulerConfig {
            interval_ms: INTERVAL,
            report_id: 1,
            modifier: 0,
            keycode: KEY_G,
        })
    }

    fn press() -> TransportEvent {
        TransportEvent::Press {
            report_id: 1,
            modifier: 0,
            keycodes: [KEY_G, 0, 0, 0, 0, 0],
        }
    }

    fn release() -> TransportEvent {
        TransportEvent::Release { report_id: 1 }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Interval Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn new_scheduler_starts_idle() {
        let s = scheduler();
        assert_eq!(s.last_emission_ms(), 0);
        assert!(!s.release_pending());
    }

    #[test]
    fn default_config_comes_from_constants() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.interval_ms, config::REPORT_INTERVAL_MS);
        assert_eq!(cfg.report_id, config::REPORT_ID_KEYBOARD);
        assert_eq!(cfg.keycode, 0x0A);
        assert_eq!(cfg.modifier, 0);
    }

    #[test]
    fn below_interval_is_a_noop() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        for now in [0, 1, 450, 899] {
            assert_eq!(s.tick(now, &mut t), TickOutcome::Waiting);
        }
        assert_eq!(t.report_count(), 0);
        assert_eq!(s.last_emission_ms(), 0);
        assert!(!s.release_pending());
    }

    #[test]
    fn elapsed_interval_sends_press_then_release() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        assert_eq!(s.tick(900, &mut t), TickOutcome::Emitted);

        let reports: std::vec::Vec<_> = t.reports().copied().collect();
        assert_eq!(reports, [press(), release()]);
        assert_eq!(s.last_emission_ms(), 900);
        assert!(!s.release_pending());
    }

    #[test]
    fn scenario_899_900_1000() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        assert_eq!(s.tick(899, &mut t), TickOutcome::Waiting);
        assert_eq!(t.report_count(), 0);

        assert_eq!(s.tick(900, &mut t), TickOutcome::Emitted);
        assert_eq!(t.report_count(), 2);
        assert_eq!(s.last_emission_ms(), 900);

        assert_eq!(s.tick(1000, &mut t), TickOutcome::Waiting);
        assert_eq!(t.report_count(), 2);
        assert_eq!(s.last_emission_ms(), 900);
    }

    #[test]
    fn one_stroke_per_interval() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        // 1 ms polling over five intervals.
        for now in 0..=(5 * INTERVAL) {
            s.tick(now, &mut t);
        }
        let presses = t
            .reports()
            .filter(|e| matches!(e, TransportEvent::Press { .. }))
            .count();
        assert_eq!(presses, 5);
        assert_eq!(t.report_count(), 10);
        assert_eq!(s.last_emission_ms(), 5 * INTERVAL);
    }

    #[test]
    fn late_tick_reanchors_to_now() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        assert_eq!(s.tick(2500, &mut t), TickOutcome::Emitted);
        assert_eq!(s.last_emission_ms(), 2500);
        assert_eq!(s.tick(3399, &mut t), TickOutcome::Waiting);
        assert_eq!(s.tick(3400, &mut t), TickOutcome::Emitted);
    }

    #[test]
    fn poll_reads_transport_clock() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        t.now = 899;
        assert_eq!(s.poll(&mut t), TickOutcome::Waiting);
        t.now = 901;
        assert_eq!(s.poll(&mut t), TickOutcome::Emitted);
        assert_eq!(s.last_emission_ms(), 901);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Wraparound Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn wraparound_below_interval_waits() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        assert_eq!(s.tick(0xFFFF_FFF0, &mut t), TickOutcome::Emitted);
        t.clear();

        // 0x10 - 0xFFFF_FFF0 wraps to 0x20 = 32 ms.
        assert_eq!(s.tick(0x0000_0010, &mut t), TickOutcome::Waiting);
        assert_eq!(t.report_count(), 0);
        assert_eq!(s.last_emission_ms(), 0xFFFF_FFF0);
    }

    #[test]
    fn wraparound_past_interval_triggers() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        s.tick(0xFFFF_FF00, &mut t);
        t.clear();

        // 0xFFFF_FF00 + 900 wraps to 0x284.
        assert_eq!(s.tick(0x0000_0283, &mut t), TickOutcome::Waiting);
        assert_eq!(s.tick(0x0000_0284, &mut t), TickOutcome::Emitted);
        assert_eq!(s.last_emission_ms(), 0x284);
        assert_eq!(t.report_count(), 2);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Backpressure Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn not_ready_blocks_emission_and_keeps_state() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();
        t.ready = false;

        for now in [900, 5_000, 1_000_000] {
            assert_eq!(s.tick(now, &mut t), TickOutcome::NotReady);
        }
        assert_eq!(t.report_count(), 0);
        assert_eq!(s.last_emission_ms(), 0);
        assert!(!s.release_pending());
    }

    #[test]
    fn ready_again_reevaluates_from_current_time() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        t.ready = false;
        assert_eq!(s.tick(1200, &mut t), TickOutcome::NotReady);

        t.ready = true;
        assert_eq!(s.tick(1300, &mut t), TickOutcome::Emitted);
        assert_eq!(s.last_emission_ms(), 1300);
        assert_eq!(t.report_count(), 2);
    }

    #[test]
    fn rejected_press_consumes_window_without_retry() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();
        t.accept = false;

        assert_eq!(s.tick(900, &mut t), TickOutcome::Dropped);
        assert_eq!(s.last_emission_ms(), 900);
        assert!(!s.release_pending());

        t.accept = true;
        assert_eq!(s.tick(901, &mut t), TickOutcome::Waiting);
        assert_eq!(t.report_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Release Tracking Tests
    // ════════════════════════════════════════════════════════════════════════

    /// Accepts the press, then reports busy for everything after it.
    struct BusyAfterPress {
        inner: RecordingTransport,
    }

    impl TransportClient for BusyAfterPress {
        fn is_ready(&mut self) -> bool {
            self.inner.is_ready()
        }

        fn send_press_report(
            &mut self,
            report_id: u8,
            modifier: u8,
            keycodes: [u8; 6],
        ) -> Result<(), Error> {
            let r = self.inner.send_press_report(report_id, modifier, keycodes);
            self.inner.ready = false;
            r
        }

        fn send_release_report(&mut self, report_id: u8) -> Result<(), Error> {
            self.inner.send_release_report(report_id)
        }

        fn now_millis(&self) -> u32 {
            self.inner.now_millis()
        }

        fn set_indicator(&mut self, on: bool) {
            self.inner.set_indicator(on)
        }
    }

    #[test]
    fn rejected_release_is_flushed_on_next_ready_tick() {
        let mut s = scheduler();
        let mut t = BusyAfterPress {
            inner: RecordingTransport::new(),
        };

        assert_eq!(s.tick(900, &mut t), TickOutcome::Emitted);
        assert!(s.release_pending());
        assert_eq!(t.inner.report_count(), 1);

        // Still busy: nothing goes out, release stays owed.
        assert_eq!(s.tick(905, &mut t), TickOutcome::NotReady);
        assert!(s.release_pending());

        t.inner.ready = true;
        assert_eq!(s.tick(910, &mut t), TickOutcome::Waiting);
        assert!(!s.release_pending());

        let reports: std::vec::Vec<_> = t.inner.reports().copied().collect();
        assert_eq!(reports, [press(), release()]);
    }

    #[test]
    fn release_never_sent_without_press() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        for now in 0..INTERVAL {
            s.tick(now, &mut t);
        }
        t.accept = false;
        s.tick(INTERVAL, &mut t);
        t.accept = true;
        for now in (INTERVAL + 1)..(2 * INTERVAL) {
            s.tick(now, &mut t);
        }

        assert!(!t
            .reports()
            .any(|e| matches!(e, TransportEvent::Release { .. })));
    }

    /// Always ready, but refuses releases until `releases_ok` is set.
    struct RejectsReleases {
        inner: RecordingTransport,
        releases_ok: bool,
    }

    impl TransportClient for RejectsReleases {
        fn is_ready(&mut self) -> bool {
            self.inner.is_ready()
        }

        fn send_press_report(
            &mut self,
            report_id: u8,
            modifier: u8,
            keycodes: [u8; 6],
        ) -> Result<(), Error> {
            self.inner.send_press_report(report_id, modifier, keycodes)
        }

        fn send_release_report(&mut self, report_id: u8) -> Result<(), Error> {
            if !self.releases_ok {
                return Err(Error::QueueFull);
            }
            self.inner.send_release_report(report_id)
        }

        fn now_millis(&self) -> u32 {
            self.inner.now_millis()
        }

        fn set_indicator(&mut self, on: bool) {
            self.inner.set_indicator(on)
        }
    }

    #[test]
    fn owed_release_blocks_next_press() {
        let mut s = scheduler();
        let mut t = RejectsReleases {
            inner: RecordingTransport::new(),
            releases_ok: false,
        };

        assert_eq!(s.tick(900, &mut t), TickOutcome::Emitted);
        assert!(s.release_pending());

        // Next window is due, but the key is still held on the host.
        assert_eq!(s.tick(1800, &mut t), TickOutcome::Waiting);
        assert_eq!(s.last_emission_ms(), 900);
        let presses = t
            .inner
            .reports()
            .filter(|e| matches!(e, TransportEvent::Press { .. }))
            .count();
        assert_eq!(presses, 1);

        // Owed release goes out first, then the overdue window fires.
        t.releases_ok = true;
        assert_eq!(s.tick(1801, &mut t), TickOutcome::Emitted);
        assert!(!s.release_pending());
        assert_eq!(s.last_emission_ms(), 1801);

        let reports: std::vec::Vec<_> = t.inner.reports().copied().collect();
        assert_eq!(reports, [press(), release(), press(), release()]);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Recording Transport Tests
    // ════════════════════════════════════════════════════════════════════════

    fn run_ninety_nine_strokes(t: &mut RecordingTransport) {
        let mut s = ReportScheduler::new(SchedulerConfig {
            interval_ms: 10,
            ..SchedulerConfig::default()
        });
        for now in 0..1000 {
            assert_ne!(s.tick(now, t), TickOutcome::Dropped);
        }
    }

    #[test]
    fn recording_overflow_is_flagged() {
        let mut t = RecordingTransport::new();
        assert!(!t.overflowed());

        run_ninety_nine_strokes(&mut t);
        assert!(t.overflowed());

        t.clear();
        assert!(!t.overflowed());
        assert_eq!(t.report_count(), 0);
    }

    #[test]
    #[should_panic(expected = "recording overflowed")]
    fn report_count_refuses_truncated_log() {
        let mut t = RecordingTransport::new();
        run_ninety_nine_strokes(&mut t);
        let _ = t.report_count();
    }

    #[test]
    #[should_panic(expected = "recording overflowed")]
    fn events_refuses_truncated_log() {
        let mut t = RecordingTransport::new();
        run_ninety_nine_strokes(&mut t);
        let _ = t.events();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Indicator Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn indicator_lights_on_emission_and_clears_next_tick() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();

        s.tick(100, &mut t);
        assert!(!t.indicator());

        s.tick(900, &mut t);
        assert!(t.indicator());
        assert_eq!(t.events().last(), Some(&TransportEvent::Indicator(true)));

        s.tick(950, &mut t);
        assert!(!t.indicator());
    }

    #[test]
    fn indicator_stays_off_when_press_dropped() {
        let mut s = scheduler();
        let mut t = RecordingTransport::new();
        t.accept = false;

        s.tick(900, &mut t);
        assert!(!t.indicator());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Error Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn recording_transport_reports_reason_for_rejection() {
        let mut t = RecordingTransport::new();
        t.ready = false;
        assert_eq!(t.send_release_report(1), Err(Error::NotReady));

        t.ready = true;
        t.accept = false;
        assert_eq!(t.send_press_report(1, 0, [0; 6]), Err(Error::QueueFull));
    }

    #[test]
    fn usb_error_converts_into_error() {
        let e: Error = UsbError::Disabled.into();
        assert_eq!(e, Error::Usb(UsbError::Disabled));
    }
}
