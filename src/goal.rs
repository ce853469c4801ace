// StepWatch — Daily Goal Manager
//
// Owns the step total and the goal bookkeeping that must survive restarts.
// At each day boundary the goal shrinks or grows by a fixed percentage,
// rounded up to a whole multiple of GOAL_ROUNDING.

use crate::config::PedometerConfig;
use crate::events::PerformanceBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalState {
    pub daily_goal: u32,
    pub total_steps: u32,
    /// Day-of-year of the last rollover; `None` until the first tick after a
    /// fresh install.
    pub day_number: Option<u16>,
    pub goal_achieved_today: bool,
    /// Cumulative counters over the lifetime of the install.
    pub success_days: u32,
    pub failure_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollover {
    pub previous_goal: u32,
    pub new_goal: u32,
    pub steps: u32,
    pub succeeded: bool,
    pub band: PerformanceBand,
}

/// `ceil(goal * percent / 100 / rounding) * rounding`, in integers.
pub fn adapt_goal(goal: u32, percent: u32, rounding: u32) -> u32 {
    let rounding = u64::from(rounding.max(1));
    let scaled = u64::from(goal) * u64::from(percent);
    let units = scaled.div_ceil(100 * rounding);
    u32::try_from(units * rounding).unwrap_or(u32::MAX)
}

/// Goal as (thousands, hundredths of a thousand) for the "8.25K" display,
/// e.g. 8250 → (8, 25).
pub fn goal_thousands(goal: u32) -> (u32, u32) {
    (goal / 1000, (goal % 1000) / 10)
}

impl GoalState {
    pub fn new(config: &PedometerConfig) -> Self {
        Self {
            daily_goal: config.default_daily_goal,
            total_steps: 0,
            day_number: None,
            goal_achieved_today: false,
            success_days: 1,
            failure_days: 1,
        }
    }

    /// Add confirmed steps. Returns `true` exactly once per day, when the
    /// total first reaches the goal.
    pub fn commit_steps(&mut self, steps: u32) -> bool {
        self.total_steps = self.total_steps.saturating_add(steps);
        if !self.goal_achieved_today && self.total_steps >= self.daily_goal {
            self.goal_achieved_today = true;
            return true;
        }
        false
    }

    /// Success ratio over the lifetime of the install, in percent.
    pub fn success_percent(&self) -> u32 {
        let total = u64::from(self.success_days) + u64::from(self.failure_days);
        if total == 0 {
            return 50;
        }
        (u64::from(self.success_days) * 100 / total) as u32
    }

    pub fn band(&self, config: &PedometerConfig) -> PerformanceBand {
        PerformanceBand::from_percent(
            self.success_percent(),
            config.band_low_percent,
            config.band_high_percent,
        )
    }

    /// Close the previous day if `today` differs from the stored day.
    ///
    /// A fresh install adopts `today` without judging a day it never saw. A
    /// missed midnight is one rollover, whatever number of days passed.
    pub fn roll_over(&mut self, today: u16, config: &PedometerConfig) -> Option<Rollover> {
        let Some(day) = self.day_number else {
            self.day_number = Some(today);
            return None;
        };
        if day == today {
            return None;
        }

        let previous_goal = self.daily_goal;
        let steps = self.total_steps;
        let succeeded = steps >= previous_goal;
        let percent = if succeeded {
            self.success_days = self.success_days.saturating_add(1);
            config.goal_grow_percent
        } else {
            self.failure_days = self.failure_days.saturating_add(1);
            config.goal_shrink_percent
        };

        self.daily_goal = adapt_goal(previous_goal, percent, config.goal_rounding);
        self.total_steps = 0;
        self.goal_achieved_today = false;
        self.day_number = Some(today);

        Some(Rollover {
            previous_goal,
            new_goal: self.daily_goal,
            steps,
            succeeded,
            band: self.band(config),
        })
    }
}
