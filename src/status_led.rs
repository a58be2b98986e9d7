//! Status LED.

use embedded_hal::digital::OutputPin;

pub struct StatusLed<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Best-effort; pin errors are ignored.
    pub fn set(&mut self, on: bool) {
        let _ = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
