//! keypulse firmware entry point (nRF52840).
//!
//! Tasks:
//!   - `usb_task`        - runs the USB device stack (enumeration, suspend)
//!   - `hid_writer`      - drains queued keyboard frames onto the IN endpoint
//!   - main              - polls the report scheduler every millisecond

#![no_std]
#![no_main]

mod status_led;
mod usb;

use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::config::HfclkSource;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_time::{Duration, Ticker, Timer};
use embassy_usb::UsbDevice;
use keypulse::{config, ReportScheduler, SchedulerConfig, TickOutcome};
use status_led::StatusLed;
use usb::hid_device::{self, KeyboardWriter, UsbDriver, REPORT_QUEUE};
use usb::transport::UsbTransport;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_writer(writer: KeyboardWriter) -> ! {
    hid_device::hid_writer_task(writer, REPORT_QUEUE.receiver()).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // USB needs the external 32 MHz crystal.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    info!("keypulse starting");

    let usb = hid_device::init(p.USBD);
    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(hid_writer(usb.keyboard_writer));

    // Level::High keeps the active-low LED off at boot.
    let led = StatusLed::new(
        Output::new(p.P0_06, Level::High, OutputDrive::Standard),
        config::STATUS_LED_ACTIVE_LOW,
    );
    let mut transport = UsbTransport::new(&REPORT_QUEUE, led);

    let scheduler_config = SchedulerConfig::default();
    info!(
        "Scheduler: key {:#x} every {} ms",
        scheduler_config.keycode, scheduler_config.interval_ms
    );
    let mut scheduler = ReportScheduler::new(scheduler_config);
    let mut ticker = Ticker::every(Duration::from_millis(config::SCHEDULER_POLL_MS));

    loop {
        if scheduler.poll(&mut transport) == TickOutcome::Emitted {
            Timer::after(Duration::from_millis(config::POST_EMISSION_HOLD_MS)).await;
        }
        ticker.next().await;
    }
}
