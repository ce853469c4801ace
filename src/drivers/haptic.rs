// StepWatch — Haptic Motor Driver
//
// Simple GPIO-driven vibration motor.

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use stepwatch::VibePattern;

pub struct HapticDriver<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> HapticDriver<'d> {
    pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { pin }
    }

    /// Short 50 ms vibration pulse — tactile acknowledgement.
    pub fn trigger(&mut self) {
        self.buzz(Duration::from_millis(50));
    }

    /// Vibrate for a custom duration (blocks the calling thread).
    pub fn buzz(&mut self, duration: Duration) {
        let _ = self.pin.set_high();
        thread::sleep(duration);
        let _ = self.pin.set_low();
    }

    /// Play an on/off pattern (blocks the calling thread).
    pub fn play(&mut self, pattern: &VibePattern) {
        for (i, &ms) in pattern.durations_ms.iter().enumerate() {
            let duration = Duration::from_millis(u64::from(ms));
            if i % 2 == 0 {
                self.buzz(duration);
            } else {
                thread::sleep(duration);
            }
        }
        let _ = self.pin.set_low();
    }
}
