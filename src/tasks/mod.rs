// StepWatch — Tasks & Inter-task Messages
//
// Every task is a std::thread (a FreeRTOS task underneath). The pedometer
// task is the only owner of the motion pipeline; everything else talks to it
// through channels.

pub mod clock;
pub mod pedometer;
pub mod power;
pub mod sensor;
pub mod ui;

use heapless::Vec;

use stepwatch::config::MAX_BATCH_SIZE;
use stepwatch::{MotionSample, PedometerEvent};

pub type SampleBatch = Vec<MotionSample, MAX_BATCH_SIZE>;

// ---------------------------------------------------------------------------
// Pedometer input — sent to the pedometer task
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub enum PedometerInput {
    /// One accelerometer batch from the sensor task.
    Samples(SampleBatch),
    /// A wall-clock minute boundary passed.
    MinuteTick { day_of_year: u16 },
    /// Persist everything, then allow deep sleep.
    Shutdown,
}

// ---------------------------------------------------------------------------
// UI events — sent to the UI task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy)]
pub enum UiEvent {
    /// Published by the pedometer after a callback committed.
    Pedometer(PedometerEvent),
    /// Long button press (≥ 3 s) detected.
    ButtonLongPress,
}
