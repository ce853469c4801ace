// StepWatch — Sensor Task
//
// Reads the accelerometer at 10 Hz and hands the pedometer task one batch of
// BATCH_SIZE samples per second.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use stepwatch::config::*;

use crate::drivers::imu::{Mpu6050, SharedBus};
use crate::tasks::{PedometerInput, SampleBatch};

pub fn sensor_task(bus: SharedBus, pedometer_tx: Sender<PedometerInput>) {
    log::info!("Sensor task started");

    let imu = Mpu6050::new(bus);
    if let Err(e) = imu.init() {
        log::error!("MPU6050 init failed in sensor task: {}", e);
        return;
    }

    let interval = Duration::from_millis(SENSOR_SAMPLE_INTERVAL_MS);
    let mut batch = SampleBatch::new();
    let mut ticks: usize = 0;

    loop {
        let tick_start = Instant::now();

        match imu.read_sample() {
            Ok(sample) => {
                let _ = batch.push(sample);
            }
            Err(e) => {
                // A dropped sample shortens the batch; the pipeline copes.
                log::warn!("IMU read error: {}", e);
            }
        }

        ticks += 1;
        if ticks >= BATCH_SIZE {
            ticks = 0;
            let full = core::mem::take(&mut batch);
            if pedometer_tx.send(PedometerInput::Samples(full)).is_err() {
                // Receiver dropped — pedometer task has exited. Shut down cleanly.
                log::warn!("Pedometer channel closed — exiting sensor task");
                return;
            }
        }

        // Sleep for the remainder of the sampling interval to hold 10 Hz.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
