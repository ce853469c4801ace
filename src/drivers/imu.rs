// StepWatch — MPU6050 Accelerometer Driver
//
// Custom register-level driver over shared I2C bus.
// Avoids external crate version conflicts with esp-idf-hal.

use std::sync::Mutex;

use anyhow::anyhow;
use esp_idf_hal::i2c::I2cDriver;

use stepwatch::config::*;
use stepwatch::MotionSample;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = self.bus.lock() else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel (±8 g), DLPF 5 Hz (Nyquist at 10 Hz).
    pub fn init(&self) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus mutex poisoned"))?;

        // Wake up (clear SLEEP bit)
        bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;

        // DLPF bandwidth 5 Hz
        bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x06], I2C_TIMEOUT_TICKS)?;

        // Accelerometer: ±8 g
        bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)?;

        log::info!("MPU6050 initialised (±8g, DLPF 5Hz)");
        Ok(())
    }

    /// Burst-read the three accel axes, in milli-g.
    pub fn read_sample(&self) -> anyhow::Result<MotionSample> {
        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus mutex poisoned"))?;
        let mut raw = [0u8; 6];
        bus.write_read(
            I2C_ADDR_MPU6050,
            &[REG_ACCEL_XOUT_H],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )?;

        Ok(MotionSample {
            x: to_milli_g(i16::from_be_bytes([raw[0], raw[1]])),
            y: to_milli_g(i16::from_be_bytes([raw[2], raw[3]])),
            z: to_milli_g(i16::from_be_bytes([raw[4], raw[5]])),
        })
    }
}

// ±8 g full scale stays within ±8000 mg, well inside i16.
fn to_milli_g(raw: i16) -> i16 {
    (i32::from(raw) * 1000 / ACCEL_LSB_PER_G_8G) as i16
}
