// StepWatch — Hardware, System & Tuning Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) + MPU6050
//
// Every empirical constant of the motion pipeline lives here under a name.
// The detector went through three tuning generations; the defaults follow the
// third, and the values used by the earlier two are noted beside each
// constant that differed.

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;      // D1/A1 — User button (INPUT_PULLUP, active LOW)
pub const PIN_HAPTIC: i32 = 4;      // D2/A2 — Haptic motor control
pub const PIN_I2C_SDA: i32 = 6;     // D4    — I2C data line
pub const PIN_I2C_SCL: i32 = 7;     // D5    — I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SENSOR: usize = 4096;
pub const STACK_CLOCK: usize = 4096;
pub const STACK_PEDOMETER: usize = 8192;
pub const STACK_UI: usize = 4096;
pub const STACK_POWER: usize = 4096;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
pub const SAMPLE_RATE_HZ: u32 = 10;
pub const SENSOR_SAMPLE_INTERVAL_MS: u64 = 1000 / SAMPLE_RATE_HZ as u64; // 100 ms
pub const CLOCK_POLL_INTERVAL_MS: u64 = 1000;
pub const UI_POLL_INTERVAL_MS: u64 = 10;               // 100 Hz input poll
pub const DEBOUNCE_MS: u64 = 50;
pub const LONG_PRESS_MS: u64 = 3000;                   // 3-second hold → shutdown
pub const CHECKPOINT_INTERVAL_MINUTES: u32 = 30;       // periodic NVS write-back

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale
// ---------------------------------------------------------------------------
// At ±8 g the sensor reports 4096 LSB/g; the pipeline works in milli-g, so a
// raw count is scaled by 1000 / 4096.
pub const ACCEL_LSB_PER_G_8G: i32 = 4096;

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------
pub const NVS_NAMESPACE: &str = "stepwatch";

// ---------------------------------------------------------------------------
// Bounded buffers
// ---------------------------------------------------------------------------
/// Capacity of every per-batch buffer. `PedometerConfig::batch_size` may be
/// smaller but never larger.
pub const MAX_BATCH_SIZE: usize = 16;
/// Longest moving-average window the baseline filter supports.
pub const MAX_BASELINE_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
// Motion pipeline defaults
// ---------------------------------------------------------------------------

/// Samples per accelerometer batch. The host delivers one batch per second at
/// 10 Hz.
pub const BATCH_SIZE: usize = 10;

/// Newton-Raphson iteration cap for the magnitude square root.
pub const SQRT_MAX_STEPS: u32 = 40;
/// Absolute tolerance (milli-g) on successive square-root estimates.
pub const SQRT_TOLERANCE: f32 = 0.01;

/// Moving-average window (samples) used to estimate the slow baseline.
/// Generation 2 averaged each sample with its successor inside the batch.
pub const BASELINE_WINDOW: usize = 2;
/// Upper bound on squared detrended energy (milli-g²), so one violent jolt
/// cannot dominate the batch statistics.
pub const ENERGY_CLIP: f32 = 1_000_000.0;

/// Two neighbouring energies whose ratio lies within 1 ± this tolerance are
/// one footfall; the smaller is zeroed.
pub const NEIGHBOR_TOLERANCE: f32 = 0.2;
/// Minimum samples between accepted peaks (≈3 steps/s at 10 Hz).
pub const MIN_PEAK_GAP: u32 = 2;
/// A gap of this many samples without a peak breaks the walking run.
pub const RUN_BREAK_GAP: u32 = 9;
/// Pending steps are committed once the run is longer than this.
pub const RUN_CONFIRMATION: u32 = 7;
/// Candidate peaks must reach `meanMax * ratio`, where meanMax is the mean of
/// the above-average energies of the batch.
/// Generation 1 used `mean * 1.1`; generation 2 used `mean + (max - mean) / 2`.
pub const PEAK_THRESHOLD_RATIO: f32 = 1.0;
/// The adaptive threshold itself must exceed this floor (milli-g²) or the
/// batch is stillness. Generation 2 used 575 000 on raw squared magnitude.
pub const STEP_ENERGY_FLOOR: f32 = 30_000.0;

/// Mean batch energy (milli-g²) below which the batch votes "quiet".
/// Generation 2 used 20 000 on raw squared magnitude.
pub const QUIET_ENERGY_THRESHOLD: f32 = 150.0;

/// Steps per minute above which the wearer is moving.
/// Generation 1 used 50.
pub const MOVING_STEPS_PER_MINUTE: u32 = 40;
/// Steps per minute below which an awake minute counts as inactive.
/// Generation 1 used 30.
pub const IDLE_STEPS_PER_MINUTE: u32 = 20;
/// A moving minute removes `steps / divisor` inactive segments.
/// Generation 1 used 4.
pub const RECOVERY_DIVISOR: u32 = 3;

/// Inactivity gauge ceiling (minutes). Reaching zero again from the ceiling
/// takes 360 steps at the default divisor.
pub const GAUGE_MAX: u32 = 120;
/// The reminder arms once the gauge exceeds this many segments.
pub const REMINDER_TRIGGER_SEGMENTS: u32 = 59;
/// A restored gauge is clamped to this value.
pub const RESTORE_GAUGE_CAP: u32 = 90;
/// Segments represented by one gauge indicator level.
pub const SEGMENTS_PER_LEVEL: u32 = 15;
/// Highest gauge indicator level.
pub const GAUGE_LEVELS: u8 = 4;

/// Minutes between reminder buzzes. Generation 1 used 6.
pub const BUZZ_INTERVAL_MINUTES: u32 = 15;
/// Highest escalation level; further buzzes repeat the strongest pattern.
pub const ESCALATION_CAP: u8 = 3;

/// Goal adaptation at rollover, in percent of the current goal.
pub const GOAL_SHRINK_PERCENT: u32 = 95;
pub const GOAL_GROW_PERCENT: u32 = 105;
/// Goals are rounded up to a multiple of this many steps.
pub const GOAL_ROUNDING: u32 = 10;
pub const DEFAULT_DAILY_GOAL: u32 = 8250;

/// Success ratio (percent) below which performance is `Low`.
/// Generation 1 used 30.
pub const BAND_LOW_PERCENT: u32 = 40;
/// Success ratio (percent) above which performance is `High`.
/// Generation 1 used 50.
pub const BAND_HIGH_PERCENT: u32 = 80;

// ---------------------------------------------------------------------------
// Reminder vibration patterns (on/off durations in ms, starting with "on")
// ---------------------------------------------------------------------------
pub const VIBE_PATTERNS: [&[u32]; ESCALATION_CAP as usize + 1] = [
    &[300, 400, 500],
    &[200, 400, 500, 400, 300],
    &[200, 400, 500, 400, 300, 200, 500],
    &[300, 300, 300, 300, 300, 300, 500],
];

// ---------------------------------------------------------------------------
// Tuning struct
// ---------------------------------------------------------------------------

/// Runtime tuning of the motion pipeline. `Default` is the reference tuning;
/// tests and experiments override individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PedometerConfig {
    pub batch_size: usize,
    pub sqrt_max_steps: u32,
    pub sqrt_tolerance: f32,
    pub baseline_window: usize,
    pub energy_clip: Option<f32>,
    pub neighbor_tolerance: f32,
    pub min_peak_gap: u32,
    pub run_break_gap: u32,
    pub run_confirmation: u32,
    pub peak_threshold_ratio: f32,
    pub step_energy_floor: f32,
    pub quiet_energy_threshold: f32,
    pub moving_steps_per_minute: u32,
    pub idle_steps_per_minute: u32,
    pub recovery_divisor: u32,
    pub gauge_max: u32,
    pub reminder_trigger_segments: u32,
    pub restore_gauge_cap: u32,
    pub segments_per_level: u32,
    pub gauge_levels: u8,
    pub buzz_interval_minutes: u32,
    pub escalation_cap: u8,
    pub goal_shrink_percent: u32,
    pub goal_grow_percent: u32,
    pub goal_rounding: u32,
    pub default_daily_goal: u32,
    pub band_low_percent: u32,
    pub band_high_percent: u32,
}

impl Default for PedometerConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            sqrt_max_steps: SQRT_MAX_STEPS,
            sqrt_tolerance: SQRT_TOLERANCE,
            baseline_window: BASELINE_WINDOW,
            energy_clip: Some(ENERGY_CLIP),
            neighbor_tolerance: NEIGHBOR_TOLERANCE,
            min_peak_gap: MIN_PEAK_GAP,
            run_break_gap: RUN_BREAK_GAP,
            run_confirmation: RUN_CONFIRMATION,
            peak_threshold_ratio: PEAK_THRESHOLD_RATIO,
            step_energy_floor: STEP_ENERGY_FLOOR,
            quiet_energy_threshold: QUIET_ENERGY_THRESHOLD,
            moving_steps_per_minute: MOVING_STEPS_PER_MINUTE,
            idle_steps_per_minute: IDLE_STEPS_PER_MINUTE,
            recovery_divisor: RECOVERY_DIVISOR,
            gauge_max: GAUGE_MAX,
            reminder_trigger_segments: REMINDER_TRIGGER_SEGMENTS,
            restore_gauge_cap: RESTORE_GAUGE_CAP,
            segments_per_level: SEGMENTS_PER_LEVEL,
            gauge_levels: GAUGE_LEVELS,
            buzz_interval_minutes: BUZZ_INTERVAL_MINUTES,
            escalation_cap: ESCALATION_CAP,
            goal_shrink_percent: GOAL_SHRINK_PERCENT,
            goal_grow_percent: GOAL_GROW_PERCENT,
            goal_rounding: GOAL_ROUNDING,
            default_daily_goal: DEFAULT_DAILY_GOAL,
            band_low_percent: BAND_LOW_PERCENT,
            band_high_percent: BAND_HIGH_PERCENT,
        }
    }
}

impl PedometerConfig {
    /// Reject tunings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::BatchSize {
                got: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        if self.baseline_window == 0 || self.baseline_window > MAX_BASELINE_WINDOW {
            return Err(ConfigError::BaselineWindow {
                got: self.baseline_window,
                max: MAX_BASELINE_WINDOW,
            });
        }
        if self.sqrt_max_steps == 0 {
            return Err(ConfigError::Zero("sqrt_max_steps"));
        }
        if self.recovery_divisor == 0 {
            return Err(ConfigError::Zero("recovery_divisor"));
        }
        if self.buzz_interval_minutes == 0 {
            return Err(ConfigError::Zero("buzz_interval_minutes"));
        }
        if self.segments_per_level == 0 {
            return Err(ConfigError::Zero("segments_per_level"));
        }
        if self.goal_rounding == 0 {
            return Err(ConfigError::Zero("goal_rounding"));
        }
        if self.idle_steps_per_minute >= self.moving_steps_per_minute {
            return Err(ConfigError::StepThresholds {
                idle: self.idle_steps_per_minute,
                moving: self.moving_steps_per_minute,
            });
        }
        if self.run_break_gap <= self.min_peak_gap {
            return Err(ConfigError::PeakGaps {
                debounce: self.min_peak_gap,
                run_break: self.run_break_gap,
            });
        }
        if self.restore_gauge_cap > self.gauge_max
            || self.reminder_trigger_segments >= self.gauge_max
        {
            return Err(ConfigError::GaugeLimits {
                max: self.gauge_max,
                restore_cap: self.restore_gauge_cap,
                trigger: self.reminder_trigger_segments,
            });
        }
        if self.band_low_percent > self.band_high_percent {
            return Err(ConfigError::PerformanceBands {
                low: self.band_low_percent,
                high: self.band_high_percent,
            });
        }
        if usize::from(self.escalation_cap) >= VIBE_PATTERNS.len() {
            return Err(ConfigError::EscalationCap {
                got: self.escalation_cap,
                patterns: VIBE_PATTERNS.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_is_valid() {
        assert_eq!(PedometerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let config = PedometerConfig {
            batch_size: MAX_BATCH_SIZE + 1,
            ..PedometerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BatchSize { got, .. }) if got == MAX_BATCH_SIZE + 1
        ));
    }

    #[test]
    fn inverted_step_thresholds_are_rejected() {
        let config = PedometerConfig {
            idle_steps_per_minute: 50,
            moving_steps_per_minute: 40,
            ..PedometerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StepThresholds { idle: 50, moving: 40 })
        ));
    }

    #[test]
    fn zero_buzz_interval_is_rejected() {
        let config = PedometerConfig {
            buzz_interval_minutes: 0,
            ..PedometerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero("buzz_interval_minutes"))
        );
    }
}
