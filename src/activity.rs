// StepWatch — Activity Classifier & Reminder Scheduler
//
// Per batch: a quiet/active vote on the mean energy.
// Per minute: sleep by majority vote, moving/idle from the minute's step
// delta, the inactivity gauge, and the escalating reminder.

use crate::config::PedometerConfig;
use crate::events::{ActivityState, VibePattern};

/// Per-minute counters, reset on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodAccumulator {
    pub quiet_batches: u32,
    pub active_batches: u32,
    pub steps_at_period_start: u32,
}

/// Accumulated sedentary time, in minutes ("segments").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InactivityGauge {
    pub segments_inactive: u32,
    pub is_moving: bool,
    pub is_sleeping: bool,
}

impl InactivityGauge {
    /// Indicator level: `min(levels, ceil(segments / per_level))`.
    pub fn level(&self, config: &PedometerConfig) -> u8 {
        let per_level = config.segments_per_level.max(1);
        let level = self.segments_inactive.div_ceil(per_level);
        level.min(u32::from(config.gauge_levels)) as u8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderState {
    pub need_buzz: bool,
    pub minutes_since_last_buzz: u32,
    pub escalation_level: u8,
}

/// Result of one minute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteOutcome {
    pub step_delta: u32,
    pub state: ActivityState,
    pub buzz: Option<VibePattern>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityTracker {
    pub period: PeriodAccumulator,
    pub gauge: InactivityGauge,
    pub reminder: ReminderState,
    /// Minutes classified as moving since the last day rollover.
    pub active_minutes: u32,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_batch(&mut self, mean_energy: f32, config: &PedometerConfig) {
        if mean_energy < config.quiet_energy_threshold {
            self.period.quiet_batches = self.period.quiet_batches.saturating_add(1);
        } else {
            self.period.active_batches = self.period.active_batches.saturating_add(1);
        }
    }

    pub fn on_minute(&mut self, total_steps: u32, config: &PedometerConfig) -> MinuteOutcome {
        self.reminder.minutes_since_last_buzz =
            self.reminder.minutes_since_last_buzz.saturating_add(1);

        let is_sleeping = self.period.quiet_batches > self.period.active_batches;
        let step_delta = total_steps.saturating_sub(self.period.steps_at_period_start);

        let gauge = &mut self.gauge;
        gauge.is_sleeping = is_sleeping;
        if step_delta > config.moving_steps_per_minute {
            let recovered = step_delta / config.recovery_divisor.max(1);
            gauge.segments_inactive = gauge.segments_inactive.saturating_sub(recovered);
            gauge.is_moving = true;
            self.active_minutes = self.active_minutes.saturating_add(1);
            self.reminder.need_buzz = false;
            self.reminder.escalation_level = 0;
        } else if step_delta < config.idle_steps_per_minute && !is_sleeping {
            gauge.segments_inactive = gauge
                .segments_inactive
                .saturating_add(1)
                .min(config.gauge_max);
            gauge.is_moving = false;
        } else {
            gauge.is_moving = false;
        }
        gauge.segments_inactive = gauge.segments_inactive.min(config.gauge_max);

        self.period = PeriodAccumulator {
            quiet_batches: 0,
            active_batches: 0,
            steps_at_period_start: total_steps,
        };

        let reminder = &mut self.reminder;
        if !reminder.need_buzz
            && gauge.segments_inactive > config.reminder_trigger_segments
            && !gauge.is_moving
        {
            log::info!(
                "Inactive for {} minutes — reminder armed",
                gauge.segments_inactive
            );
            reminder.need_buzz = true;
            reminder.minutes_since_last_buzz = 0;
        }

        let interval = config.buzz_interval_minutes.max(1);
        let mut buzz = None;
        if !is_sleeping && reminder.need_buzz && reminder.minutes_since_last_buzz % interval == 0 {
            buzz = Some(VibePattern::for_level(reminder.escalation_level));
            reminder.escalation_level = reminder
                .escalation_level
                .saturating_add(1)
                .min(config.escalation_cap);
            reminder.minutes_since_last_buzz = 0;
        }

        MinuteOutcome {
            step_delta,
            state: ActivityState::from_flags(gauge.is_moving, gauge.is_sleeping),
            buzz,
        }
    }

    /// Day rollover: the step baseline and active minutes start over.
    pub fn reset_day(&mut self) {
        self.period.steps_at_period_start = 0;
        self.active_minutes = 0;
    }
}
