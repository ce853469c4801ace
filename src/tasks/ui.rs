// StepWatch — UI Task
//
// Owns the haptic motor and the button. Polls the button at ~100 Hz, plays
// reminder patterns, and on display-facing events renders the status line
// from the pedometer's published snapshot to the log until a screen driver
// consumes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};

use stepwatch::config::*;
use stepwatch::goal::goal_thousands;
use stepwatch::{PedometerEvent, Snapshot};

use crate::drivers::haptic::HapticDriver;
use crate::input::InputManager;
use crate::tasks::{PedometerInput, UiEvent};

pub fn ui_task(
    button_pin: PinDriver<'static, AnyInputPin, Input>,
    haptic_pin: PinDriver<'static, AnyOutputPin, Output>,
    ui_rx: Receiver<UiEvent>,
    ui_tx: Sender<UiEvent>,
    pedometer_tx: Sender<PedometerInput>,
    snapshot: Arc<Mutex<Snapshot>>,
    sleep_requested: Arc<AtomicBool>,
) {
    log::info!("UI task started");

    let mut haptic = HapticDriver::new(haptic_pin);
    let mut input = InputManager::new(button_pin, ui_tx);
    let mut shutting_down = false;

    let poll_interval = Duration::from_millis(UI_POLL_INTERVAL_MS);

    loop {
        // 1. Poll the button (handles debounce + long-press detection internally).
        input.update();

        // 2. Drain all pending UI events (non-blocking).
        while let Ok(event) = ui_rx.try_recv() {
            match event {
                UiEvent::Pedometer(PedometerEvent::ReminderBuzz(pattern)) => {
                    log::info!("Reminder buzz (level {})", pattern.level);
                    haptic.play(&pattern);
                }

                UiEvent::Pedometer(PedometerEvent::GoalAchieved) => {
                    log::info!("Goal achieved!");
                    haptic.trigger();
                    thread::sleep(Duration::from_millis(150));
                    haptic.trigger();
                }

                UiEvent::Pedometer(PedometerEvent::StepsChanged { .. }) => {
                    render_status(&snapshot);
                }

                UiEvent::Pedometer(PedometerEvent::GaugeLevelChanged(level)) => {
                    log::info!("Inactivity gauge level {}", level);
                    render_status(&snapshot);
                }

                UiEvent::Pedometer(PedometerEvent::DayRollover { new_goal, band }) => {
                    let (thousands, hundredths) = goal_thousands(new_goal);
                    log::info!(
                        "New day — goal {}.{:02}K, performance {:?}",
                        thousands,
                        hundredths,
                        band
                    );
                    render_status(&snapshot);
                }

                UiEvent::ButtonLongPress => {
                    if shutting_down {
                        continue;
                    }
                    // 3-second hold → persist and power off.
                    shutting_down = true;
                    haptic.buzz(Duration::from_millis(500));
                    let _ = pedometer_tx.send(PedometerInput::Shutdown);
                    log::info!("Long press detected — shutting down");
                }
            }
        }

        // 3. Once sleep was requested, stop polling (power task handles sleep entry).
        if sleep_requested.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_secs(1));
            continue;
        }

        thread::sleep(poll_interval);
    }
}

/// Read the published snapshot; the pedometer task refreshes it before it
/// sends any event, so this never sees a half-applied callback.
fn render_status(snapshot: &Mutex<Snapshot>) {
    match snapshot.lock() {
        Ok(current) => log::info!("{}", *current),
        Err(_) => log::warn!("Snapshot lock poisoned — status not refreshed"),
    }
}
