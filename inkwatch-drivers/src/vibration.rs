//! Vibration motor
//!
//! The motor hangs off a GPIO through a transistor. A pattern toggles the
//! pin `toggles` times, holding each level for `interval_ms`; the first
//! toggle switches the motor on.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use inkwatch_core::config::VibrationPattern;

/// Vibration motor on a GPIO pin
pub struct VibrationMotor<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> VibrationMotor<P, D> {
    /// Create the driver; the motor starts off
    pub fn new(mut pin: P, delay: D) -> Self {
        let _ = pin.set_low();
        Self { pin, delay }
    }

    /// Play a pattern, leaving the motor off afterwards
    pub async fn play(&mut self, pattern: VibrationPattern) -> Result<(), P::Error> {
        let mut on = false;
        for _ in 0..pattern.toggles {
            on = !on;
            if on {
                self.pin.set_high()?;
            } else {
                self.pin.set_low()?;
            }
            self.delay.delay_ms(u32::from(pattern.interval_ms)).await;
        }
        self.pin.set_low()
    }

    /// Release the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
