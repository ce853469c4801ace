// StepWatch — Power Management Task
//
// Waits until the pedometer task has persisted its state after a shutdown
// request, then enters deep sleep. The button wakes the watch again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use stepwatch::config::*;

pub fn power_task(sleep_requested: Arc<AtomicBool>) {
    log::info!("Power task started");

    let poll = Duration::from_millis(200);
    loop {
        if sleep_requested.load(Ordering::SeqCst) {
            // Let the UI task finish its acknowledgement buzz.
            thread::sleep(Duration::from_millis(600));
            enter_deep_sleep();
        }
        thread::sleep(poll);
    }
}

/// Configure GPIO wakeup on button press and enter deep sleep.
/// This function does not return.
pub fn enter_deep_sleep() -> ! {
    log::info!("Entering deep sleep — wake on button press (GPIO{})", PIN_BUTTON);
    unsafe {
        esp_idf_sys::esp_deep_sleep_enable_gpio_wakeup(
            1u64 << PIN_BUTTON,
            esp_idf_sys::esp_deepsleep_gpio_wake_up_mode_t_ESP_GPIO_WAKEUP_GPIO_LOW,
        );
        esp_idf_sys::esp_deep_sleep_start();
    }
}
