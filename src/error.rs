//! Error types for the stepwatch core.
//!
//! The motion pipeline itself never fails; numeric edge cases degrade to "no
//! step" or "no reminder". The only rejections happen up front, when a tuning
//! cannot be run.

use thiserror::Error;

/// A `PedometerConfig` value outside its legal range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Batch size is zero or exceeds the bounded buffer capacity
    #[error("batch size {got} outside 1..={max}")]
    BatchSize { got: usize, max: usize },

    /// Moving-average window outside the supported range
    #[error("baseline window {got} outside 1..={max}")]
    BaselineWindow { got: usize, max: usize },

    /// A divisor, interval or step count that must be non-zero
    #[error("{0} must be non-zero")]
    Zero(&'static str),

    /// Idle threshold must sit below the moving threshold
    #[error("idle threshold {idle} steps/min must be below moving threshold {moving}")]
    StepThresholds { idle: u32, moving: u32 },

    /// Run-break gap must exceed the debounce gap
    #[error("run-break gap {run_break} must exceed debounce gap {debounce}")]
    PeakGaps { debounce: u32, run_break: u32 },

    /// Restore cap and reminder trigger must fit under the gauge ceiling
    #[error("gauge max {max} must cover restore cap {restore_cap} and exceed trigger {trigger}")]
    GaugeLimits {
        max: u32,
        restore_cap: u32,
        trigger: u32,
    },

    /// Low performance band must not sit above the high band
    #[error("performance band low {low}% above high {high}%")]
    PerformanceBands { low: u32, high: u32 },

    /// Escalation would run past the last vibration pattern
    #[error("escalation cap {got} needs more than {patterns} vibration patterns")]
    EscalationCap { got: u8, patterns: usize },
}
