// StepWatch — Pedometer Task
//
// Sole owner of the motion pipeline. Sample batches and minute ticks arrive
// on one channel, so the two callbacks never overlap. After each callback the
// published events go to the UI task and the shared snapshot is refreshed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use stepwatch::config::*;
use stepwatch::{Events, KeyValueStore, Pedometer, Snapshot};

use crate::tasks::{PedometerInput, UiEvent};

pub fn pedometer_task(
    mut pedometer: Pedometer,
    mut store: impl KeyValueStore,
    input_rx: Receiver<PedometerInput>,
    ui_tx: Sender<UiEvent>,
    snapshot: Arc<Mutex<Snapshot>>,
    sleep_requested: Arc<AtomicBool>,
) {
    log::info!("Pedometer task started");

    let mut minutes_since_checkpoint: u32 = 0;

    loop {
        let input = match input_rx.recv() {
            Ok(input) => input,
            Err(_) => {
                log::warn!("Input channels closed — exiting pedometer task");
                return;
            }
        };

        let events = match input {
            PedometerInput::Samples(batch) => pedometer.on_sample_batch(&batch),

            PedometerInput::MinuteTick { day_of_year } => {
                let events = pedometer.on_minute_tick(day_of_year);
                minutes_since_checkpoint += 1;
                if minutes_since_checkpoint >= CHECKPOINT_INTERVAL_MINUTES {
                    minutes_since_checkpoint = 0;
                    if let Err(e) = pedometer.checkpoint(&mut store) {
                        log::warn!("Checkpoint failed: {:#}", e);
                    }
                }
                events
            }

            PedometerInput::Shutdown => {
                if let Err(e) = pedometer.checkpoint(&mut store) {
                    log::error!("Final checkpoint failed: {:#}", e);
                }
                log::info!("State persisted — requesting deep sleep");
                sleep_requested.store(true, Ordering::SeqCst);
                Events::new()
            }
        };

        if let Ok(mut published) = snapshot.lock() {
            *published = pedometer.snapshot();
        }
        for event in events {
            let _ = ui_tx.send(UiEvent::Pedometer(event));
        }
    }
}
