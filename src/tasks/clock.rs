// StepWatch — Clock Task
//
// Polls local time once a second and emits a minute tick, with the current
// day-of-year, whenever the wall-clock minute changes.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use stepwatch::config::*;

use crate::tasks::PedometerInput;

struct LocalTime {
    minute: i32,
    day_of_year: u16,
}

fn local_time() -> LocalTime {
    unsafe {
        let now = esp_idf_sys::time(core::ptr::null_mut());
        let mut tm: esp_idf_sys::tm = core::mem::zeroed();
        esp_idf_sys::localtime_r(&now, &mut tm);
        LocalTime {
            minute: tm.tm_min,
            day_of_year: tm.tm_yday.clamp(0, 365) as u16,
        }
    }
}

pub fn clock_task(pedometer_tx: Sender<PedometerInput>) {
    log::info!("Clock task started");

    let poll = Duration::from_millis(CLOCK_POLL_INTERVAL_MS);
    let mut last_minute = local_time().minute;

    loop {
        thread::sleep(poll);

        let now = local_time();
        if now.minute == last_minute {
            continue;
        }
        last_minute = now.minute;

        let tick = PedometerInput::MinuteTick {
            day_of_year: now.day_of_year,
        };
        if pedometer_tx.send(tick).is_err() {
            log::warn!("Pedometer channel closed — exiting clock task");
            return;
        }
    }
}
