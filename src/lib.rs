//! StepWatch motion core.
//!
//! Turns batches of raw accelerometer samples into a step count, a coarse
//! moving/resting/asleep classification, inactivity reminders and an
//! adaptive daily step goal. Everything here is plain state and arithmetic:
//! the firmware feeds in sample batches and minute ticks, and forwards the
//! returned [`PedometerEvent`]s to the display and the vibration motor.
//!
//! # Example
//!
//! ```
//! use stepwatch::{MotionSample, Pedometer, PedometerConfig};
//!
//! let mut pedometer = Pedometer::new(PedometerConfig::default())?;
//! let batch = [MotionSample::new(0, 0, 1000); 10];
//! let events = pedometer.on_sample_batch(&batch);
//! assert!(events.is_empty());
//! let _ = pedometer.on_minute_tick(42);
//! assert_eq!(pedometer.snapshot().total_steps, 0);
//! # Ok::<(), stepwatch::ConfigError>(())
//! ```

pub mod activity;
pub mod baseline;
pub mod config;
pub mod error;
pub mod events;
pub mod goal;
pub mod magnitude;
pub mod persist;
pub mod pipeline;
pub mod step_detector;

pub use config::PedometerConfig;
pub use error::ConfigError;
pub use events::{ActivityState, MotionSample, PedometerEvent, PerformanceBand, VibePattern};
pub use persist::{KeyValueStore, MemoryStore, PersistKey, PersistedState};
pub use pipeline::{Events, Pedometer, Snapshot};
