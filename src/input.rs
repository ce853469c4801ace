// StepWatch — Button Input Manager
//
// Debounced button handler with long-press detection. Designed to be polled
// at ~100 Hz from the UI task. A long press fires once, while the button is
// still held.

use std::sync::mpsc::Sender;
use std::time::Instant;

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use stepwatch::config::*;

use crate::tasks::UiEvent;

pub struct InputManager<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,
    ui_tx: Sender<UiEvent>,

    // Debounce state
    last_raw: bool,
    last_debounce: Instant,

    // Press tracking
    press_start: Option<Instant>,
    long_press_sent: bool,
}

impl<'d> InputManager<'d> {
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>, ui_tx: Sender<UiEvent>) -> Self {
        Self {
            pin,
            ui_tx,
            last_raw: true, // pull-up → idle HIGH
            last_debounce: Instant::now(),
            press_start: None,
            long_press_sent: false,
        }
    }

    /// Call every ~10 ms from the UI task loop.
    pub fn update(&mut self) {
        let current = self.pin.is_high(); // true = released (pull-up)
        let now = Instant::now();

        // ---- debounce filter ----
        if current != self.last_raw {
            self.last_debounce = now;
        }
        self.last_raw = current;

        let stable_ms = now.duration_since(self.last_debounce).as_millis() as u64;
        if stable_ms < DEBOUNCE_MS {
            return;
        }

        let pressed = !current; // active LOW
        if !pressed {
            self.press_start = None;
            self.long_press_sent = false;
            return;
        }

        let start = *self.press_start.get_or_insert(now);
        let hold_ms = now.duration_since(start).as_millis() as u64;
        if hold_ms >= LONG_PRESS_MS && !self.long_press_sent {
            self.long_press_sent = true;
            let _ = self.ui_tx.send(UiEvent::ButtonLongPress);
        }
    }
}
