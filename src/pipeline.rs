// StepWatch — Motion Pipeline
//
// `Pedometer` is the single context object behind the two host callbacks:
//   - `on_sample_batch`: magnitude → baseline filter → step detector, plus the
//     batch's quiet/active vote,
//   - `on_minute_tick`:  activity classification, inactivity gauge, reminder,
//     and day rollover.
//
// Each callback works on a copy of the state and stores it back only at the
// end, so an aborted callback leaves nothing half-applied. Events are returned
// to the caller after that commit; the presentation side reads `snapshot()`.

use core::fmt;

use heapless::Vec;

use crate::activity::ActivityTracker;
use crate::baseline::{BaselineFilter, Signal};
use crate::config::{PedometerConfig, MAX_BATCH_SIZE};
use crate::error::ConfigError;
use crate::events::{ActivityState, MotionSample, PedometerEvent, PerformanceBand};
use crate::goal::{goal_thousands, GoalState};
use crate::magnitude::magnitude;
use crate::persist::{KeyValueStore, PersistedState};
use crate::step_detector::StepDetector;

/// Upper bound on events a single callback can publish.
pub const MAX_EVENTS: usize = 4;

pub type Events = Vec<PedometerEvent, MAX_EVENTS>;

/// Read-only view for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub total_steps: u32,
    pub daily_goal: u32,
    pub segments_inactive: u32,
    pub gauge_level: u8,
    pub activity: ActivityState,
    pub active_minutes: u32,
    pub goal_achieved_today: bool,
    pub band: PerformanceBand,
}

/// One-line status for the watch face, e.g.
/// `05210/8.25K steps | resting | gauge 2 | 14 active min`.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (thousands, hundredths) = goal_thousands(self.daily_goal);
        write!(
            f,
            "{:05}/{}.{:02}K steps | {} | gauge {} | {} active min",
            self.total_steps,
            thousands,
            hundredths,
            self.activity.display_name(),
            self.gauge_level,
            self.active_minutes
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PipelineState {
    filter: BaselineFilter,
    detector: StepDetector,
    activity: ActivityTracker,
    goal: GoalState,
    gauge_level: u8,
}

pub struct Pedometer {
    config: PedometerConfig,
    state: PipelineState,
}

impl Pedometer {
    pub fn new(config: PedometerConfig) -> Result<Self, ConfigError> {
        let initial = PersistedState::initial(&config);
        Self::restore(config, initial)
    }

    /// Rebuild the pipeline from a persisted record. In-memory filter state
    /// starts over; the gauge is clamped to the restore cap.
    pub fn restore(config: PedometerConfig, persisted: PersistedState) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut activity = ActivityTracker::new();
        activity.gauge.segments_inactive = persisted
            .segments_inactive
            .min(config.restore_gauge_cap)
            .min(config.gauge_max);
        activity.period.steps_at_period_start = persisted.steps_at_period_start;
        activity.active_minutes = persisted.active_minutes;

        let goal = GoalState {
            daily_goal: persisted.daily_goal,
            total_steps: persisted.total_steps,
            day_number: persisted.day_number,
            goal_achieved_today: persisted.goal_achieved_today,
            success_days: persisted.success_days,
            failure_days: persisted.failure_days,
        };

        let gauge_level = activity.gauge.level(&config);
        let state = PipelineState {
            filter: BaselineFilter::new(),
            detector: StepDetector::new(&config),
            activity,
            goal,
            gauge_level,
        };

        log::info!(
            "Pedometer restored: {} steps, goal {}, {} inactive minutes",
            goal.total_steps,
            goal.daily_goal,
            activity.gauge.segments_inactive
        );
        Ok(Self { config, state })
    }

    /// Restore from a store; unreadable fields fall back to defaults.
    pub fn load(
        config: PedometerConfig,
        store: &mut dyn KeyValueStore,
    ) -> Result<Self, ConfigError> {
        let persisted = PersistedState::load(store, &config);
        Self::restore(config, persisted)
    }

    /// Process one batch of up to `batch_size` samples; extra samples are
    /// ignored, an empty batch does nothing.
    pub fn on_sample_batch(&mut self, samples: &[MotionSample]) -> Events {
        let mut events = Events::new();
        let valid = &samples[..samples.len().min(self.config.batch_size)];
        if valid.is_empty() {
            return events;
        }

        let config = &self.config;
        let mut next = self.state;

        let magnitudes: Signal = valid
            .iter()
            .take(MAX_BATCH_SIZE)
            .map(|sample| magnitude(sample, config.sqrt_max_steps, config.sqrt_tolerance))
            .collect();
        let energy = next
            .filter
            .detrend(&magnitudes, config.baseline_window, config.energy_clip);
        let report = next.detector.process(&energy, config);
        next.activity.record_batch(report.mean_energy, config);

        log::debug!(
            "Batch: mean {:.0}, threshold {:?}, peaks {}, committed {}, discarded {}",
            report.mean_energy,
            report.threshold,
            report.peaks,
            report.committed,
            report.discarded
        );

        let mut goal_reached = false;
        if report.committed > 0 {
            goal_reached = next.goal.commit_steps(report.committed);
        }

        self.state = next;

        if report.committed > 0 {
            let _ = events.push(PedometerEvent::StepsChanged {
                total_steps: next.goal.total_steps,
                segments_inactive: next.activity.gauge.segments_inactive,
            });
        }
        if goal_reached {
            log::info!("Daily goal of {} steps reached", next.goal.daily_goal);
            let _ = events.push(PedometerEvent::GoalAchieved);
        }
        events
    }

    /// Close the current minute. `day_of_year` comes from the host clock.
    pub fn on_minute_tick(&mut self, day_of_year: u16) -> Events {
        let mut events = Events::new();
        let config = &self.config;
        let mut next = self.state;
        let before = (next.goal.total_steps, next.activity.gauge.segments_inactive);

        let outcome = next.activity.on_minute(next.goal.total_steps, config);
        log::debug!(
            "Minute: {} steps, {}, {} inactive",
            outcome.step_delta,
            outcome.state.display_name(),
            next.activity.gauge.segments_inactive
        );

        let rollover = next.goal.roll_over(day_of_year, config);
        if let Some(rollover) = rollover {
            next.activity.reset_day();
            log::info!(
                "Day rollover: {} of {} steps ({}), next goal {}",
                rollover.steps,
                rollover.previous_goal,
                if rollover.succeeded { "met" } else { "missed" },
                rollover.new_goal
            );
        }

        let level = next.activity.gauge.level(config);
        let level_changed = level != next.gauge_level;
        next.gauge_level = level;

        self.state = next;

        let after = (next.goal.total_steps, next.activity.gauge.segments_inactive);
        if after != before {
            let _ = events.push(PedometerEvent::StepsChanged {
                total_steps: after.0,
                segments_inactive: after.1,
            });
        }
        if level_changed {
            let _ = events.push(PedometerEvent::GaugeLevelChanged(level));
        }
        if let Some(pattern) = outcome.buzz {
            log::info!("Inactivity reminder, level {}", pattern.level);
            let _ = events.push(PedometerEvent::ReminderBuzz(pattern));
        }
        if let Some(rollover) = rollover {
            let _ = events.push(PedometerEvent::DayRollover {
                new_goal: rollover.new_goal,
                band: rollover.band,
            });
        }
        events
    }

    /// The record to write back at shutdown or checkpoint.
    pub fn persisted(&self) -> PersistedState {
        let goal = &self.state.goal;
        let activity = &self.state.activity;
        PersistedState {
            total_steps: goal.total_steps,
            segments_inactive: activity.gauge.segments_inactive,
            active_minutes: activity.active_minutes,
            steps_at_period_start: activity.period.steps_at_period_start,
            day_number: goal.day_number,
            daily_goal: goal.daily_goal,
            success_days: goal.success_days,
            failure_days: goal.failure_days,
            goal_achieved_today: goal.goal_achieved_today,
        }
    }

    pub fn checkpoint(&self, store: &mut dyn KeyValueStore) -> anyhow::Result<()> {
        self.persisted().save(store)?;
        log::debug!("Checkpoint written ({} steps)", self.state.goal.total_steps);
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let gauge = &state.activity.gauge;
        Snapshot {
            total_steps: state.goal.total_steps,
            daily_goal: state.goal.daily_goal,
            segments_inactive: gauge.segments_inactive,
            gauge_level: state.gauge_level,
            activity: ActivityState::from_flags(gauge.is_moving, gauge.is_sleeping),
            active_minutes: state.activity.active_minutes,
            goal_achieved_today: state.goal.goal_achieved_today,
            band: state.goal.band(&self.config),
        }
    }

    /// Current reminder escalation level (0 when no reminder is pending).
    pub fn escalation_level(&self) -> u8 {
        self.state.activity.reminder.escalation_level
    }

    pub fn reminder_armed(&self) -> bool {
        self.state.activity.reminder.need_buzz
    }
}
