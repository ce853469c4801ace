// StepWatch — Firmware Entry Point
//
// Boot sequence:
//   1. Take peripherals, bring up the shared I2C bus and check the MPU6050.
//   2. Restore the pedometer from NVS.
//   3. Spawn sensor, clock, pedometer, UI, and power tasks.
//
// The watch enters deep sleep only after the user holds the button for
// 3 seconds and the pedometer has written its state back to NVS.

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod input;
#[cfg(target_os = "espidf")]
mod nvs;
#[cfg(target_os = "espidf")]
mod tasks;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, InputPin, Output, OutputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use stepwatch::config::*;
    use stepwatch::{Pedometer, PedometerConfig};

    use crate::drivers::imu::Mpu6050;
    use crate::nvs::NvsStore;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("StepWatch firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    let button = PinDriver::input(peripherals.pins.gpio3.downgrade_input())?;
    configure_pullup(&button);

    // ---- I2C bus ----------------------------------------------------------
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
    // It will live for the entire programme duration (embedded firmware never exits).
    let i2c_bus: &'static Mutex<I2cDriver<'static>> =
        Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

    // ---- Self-test --------------------------------------------------------
    let imu_ok = Mpu6050::new(i2c_bus).is_connected();
    if !imu_ok {
        log::error!("Boot check FAILED — MPU6050 not answering");
        // Continue anyway so we can still debug via serial.
    }

    // ---- Restore state ----------------------------------------------------
    let mut store = NvsStore::new(EspDefaultNvsPartition::take()?)?;
    let pedometer = Pedometer::load(PedometerConfig::default(), &mut store)?;
    let snapshot = Arc::new(Mutex::new(pedometer.snapshot()));
    log::info!("Boot complete — entering normal operation");

    // ---- Channels ---------------------------------------------------------
    let (pedometer_tx, pedometer_rx) = mpsc::channel();
    let (ui_tx, ui_rx) = mpsc::channel();

    // ---- Shared state -----------------------------------------------------
    let sleep_requested = Arc::new(AtomicBool::new(false));

    // ---- Prepare GPIO handles for tasks -----------------------------------
    // SAFETY: GPIO peripheral lives forever, same argument as I2C above.
    let button_static: PinDriver<'static, AnyInputPin, Input> =
        unsafe { core::mem::transmute(button) };

    let haptic_pin = PinDriver::output(peripherals.pins.gpio4.downgrade_output())?;
    let haptic_static: PinDriver<'static, AnyOutputPin, Output> =
        unsafe { core::mem::transmute(haptic_pin) };

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------

    // Sensor task — tightest timing.
    let sensor_tx = pedometer_tx.clone();
    thread::Builder::new()
        .name("sensor".into())
        .stack_size(STACK_SENSOR)
        .spawn(move || {
            tasks::sensor::sensor_task(i2c_bus, sensor_tx);
        })?;

    // Clock task — minute ticks.
    let clock_tx = pedometer_tx.clone();
    thread::Builder::new()
        .name("clock".into())
        .stack_size(STACK_CLOCK)
        .spawn(move || {
            tasks::clock::clock_task(clock_tx);
        })?;

    // Pedometer task — owns the motion pipeline and the store.
    let pedometer_ui_tx = ui_tx.clone();
    let pedometer_snapshot = Arc::clone(&snapshot);
    let pedometer_sleep = Arc::clone(&sleep_requested);
    thread::Builder::new()
        .name("pedometer".into())
        .stack_size(STACK_PEDOMETER)
        .spawn(move || {
            tasks::pedometer::pedometer_task(
                pedometer,
                store,
                pedometer_rx,
                pedometer_ui_tx,
                pedometer_snapshot,
                pedometer_sleep,
            );
        })?;

    // UI task (button + haptic, reads the published snapshot)
    let ui_sleep = Arc::clone(&sleep_requested);
    thread::Builder::new()
        .name("ui".into())
        .stack_size(STACK_UI)
        .spawn(move || {
            tasks::ui::ui_task(
                button_static,
                haptic_static,
                ui_rx,
                ui_tx,
                pedometer_tx,
                snapshot,
                ui_sleep,
            );
        })?;

    // Power management task
    let pwr_sleep = Arc::clone(&sleep_requested);
    thread::Builder::new()
        .name("power".into())
        .stack_size(STACK_POWER)
        .spawn(move || {
            tasks::power::power_task(pwr_sleep);
        })?;

    // Main thread has nothing left to do — park it forever.
    // (All work happens in the spawned FreeRTOS tasks.)
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

/// Configure internal pull-up on the button pin. The downgraded PinDriver has
/// no pull setter, so go through the raw API.
#[cfg(target_os = "espidf")]
fn configure_pullup(_pin: &esp_idf_hal::gpio::PinDriver<'_, esp_idf_hal::gpio::AnyInputPin, esp_idf_hal::gpio::Input>) {
    unsafe {
        esp_idf_sys::gpio_set_pull_mode(
            stepwatch::config::PIN_BUTTON,
            esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("the stepwatch firmware runs on ESP-IDF targets only; the motion core is the `stepwatch` library")
}
