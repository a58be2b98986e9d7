//! USB HID keyboard device.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral, tracks bus state for transport readiness, and answers
//! HID class requests.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{debug, info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use keypulse::config::{self, REPORT_QUEUE_DEPTH};
use keypulse::error::{Error, UsbError};
use keypulse::hid::host_requests::{self, ReportKind, SetReportAction};
use keypulse::hid::keyboard::{KeyboardFrame, KEYBOARD_FRAME_SIZE, KEYBOARD_REPORT_DESCRIPTOR};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
pub type KeyboardWriter = HidWriter<'static, UsbDriver, KEYBOARD_FRAME_SIZE>;

/// Scheduler → HID writer queue.
pub type ReportQueue = Channel<CriticalSectionRawMutex, KeyboardFrame, REPORT_QUEUE_DEPTH>;

pub static REPORT_QUEUE: ReportQueue = Channel::new();

static KB_STATE: StaticCell<State> = StaticCell::new();
static KB_REQUEST_HANDLER: StaticCell<KeyboardRequestHandler> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_BUS_HANDLER: StaticCell<UsbBusHandler> = StaticCell::new();

static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);
static USB_SUSPENDED: AtomicBool = AtomicBool::new(false);

/// `true` once the host has configured the device and the bus is awake.
pub fn bus_ready() -> bool {
    USB_CONFIGURED.load(Ordering::Relaxed) && !USB_SUSPENDED.load(Ordering::Relaxed)
}

struct UsbBusHandler;

impl embassy_usb::Handler for UsbBusHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            USB_CONFIGURED.store(false, Ordering::Relaxed);
        }
        info!("USB: enabled={}", enabled);
    }

    fn reset(&mut self) {
        USB_CONFIGURED.store(false, Ordering::Relaxed);
        USB_SUSPENDED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        USB_CONFIGURED.store(configured, Ordering::Relaxed);
        info!("USB: configured={}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        USB_SUSPENDED.store(suspended, Ordering::Relaxed);
        info!("USB: suspended={}", suspended);
    }
}

/// Input-only keyboard: GET_REPORT stalls, SET_REPORT is ignored.
struct KeyboardRequestHandler;

fn split_report_id(id: ReportId) -> (ReportKind, u8) {
    match id {
        ReportId::In(id) => (ReportKind::Input, id),
        ReportId::Out(id) => (ReportKind::Output, id),
        ReportId::Feature(id) => (ReportKind::Feature, id),
    }
}

impl RequestHandler for KeyboardRequestHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        let (kind, report_id) = split_report_id(id);
        debug!("GET_REPORT {} id={} - stalling", kind, report_id);
        host_requests::get_report(kind, report_id, buf)
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let (kind, report_id) = split_report_id(id);
        match host_requests::set_report(kind, report_id, data) {
            SetReportAction::LedsIgnored(leds) => debug!("SET_REPORT leds: {}", leds),
            SetReportAction::Ignored => debug!("SET_REPORT {} id={} ignored", kind, report_id),
        }
        OutResponse::Accepted
    }
}

/// Build result containing the USB device runner and the keyboard writer.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: KeyboardWriter,
}

/// Initialise the USB stack and create the HID keyboard.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    builder.handler(USB_BUS_HANDLER.init(UsbBusHandler));

    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: Some(KB_REQUEST_HANDLER.init(KeyboardRequestHandler)),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: config::USB_HID_MAX_PACKET,
    };
    let keyboard_writer = HidWriter::new(&mut builder, KB_STATE.init(State::new()), kb_config);

    let device = builder.build();

    info!("USB HID keyboard initialised");

    UsbHidDevice {
        device,
        keyboard_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// Handles enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

fn endpoint_error(e: EndpointError) -> Error {
    match e {
        EndpointError::BufferOverflow => UsbError::BufferOverflow.into(),
        EndpointError::Disabled => UsbError::Disabled.into(),
    }
}

/// HID report forwarding task - drains the report queue onto the
/// keyboard IN endpoint.
pub async fn hid_writer_task(
    mut keyboard: KeyboardWriter,
    reports: Receiver<'static, CriticalSectionRawMutex, KeyboardFrame, REPORT_QUEUE_DEPTH>,
) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; KEYBOARD_FRAME_SIZE];

    loop {
        let frame = reports.receive().await;
        let n = frame.serialize(&mut buf);

        match keyboard.write(&buf[..n]).await.map_err(endpoint_error) {
            Ok(()) => host_requests::report_complete(frame.report_id),
            Err(e) => warn!("USB keyboard write failed: {}", e),
        }
    }
}
