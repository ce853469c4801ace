// StepWatch — Motion Samples, States & Pipeline Events

use crate::config::VIBE_PATTERNS;

// ---------------------------------------------------------------------------
// Motion sample (3-axis accelerometer reading, milli-g)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl MotionSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

// ---------------------------------------------------------------------------
// Activity classification (per minute)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityState {
    #[default]
    Resting,
    Moving,
    Asleep,
}

impl ActivityState {
    /// Human-readable label (kept for debugging/logging purposes).
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Resting => "resting",
            Self::Moving => "moving",
            Self::Asleep => "asleep",
        }
    }

    pub fn from_flags(is_moving: bool, is_sleeping: bool) -> Self {
        if is_moving {
            Self::Moving
        } else if is_sleeping {
            Self::Asleep
        } else {
            Self::Resting
        }
    }
}

// ---------------------------------------------------------------------------
// Goal performance tiering
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceBand {
    Low,
    #[default]
    Middle,
    High,
}

impl PerformanceBand {
    /// Tier a success ratio given in percent.
    pub fn from_percent(percent: u32, low: u32, high: u32) -> Self {
        if percent < low {
            Self::Low
        } else if percent > high {
            Self::High
        } else {
            Self::Middle
        }
    }
}

// ---------------------------------------------------------------------------
// Reminder vibration
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibePattern {
    pub level: u8,
    /// Alternating on/off durations in milliseconds, starting with "on".
    pub durations_ms: &'static [u32],
}

impl VibePattern {
    /// Pattern for an escalation level; levels past the table repeat the
    /// strongest pattern.
    pub fn for_level(level: u8) -> Self {
        let index = usize::from(level).min(VIBE_PATTERNS.len() - 1);
        Self {
            level,
            durations_ms: VIBE_PATTERNS[index],
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline outputs — published after a callback has fully committed
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedometerEvent {
    /// Step total or inactivity segments changed (display refresh).
    StepsChanged { total_steps: u32, segments_inactive: u32 },
    /// Inactivity gauge indicator moved to a new level (0..=4).
    GaugeLevelChanged(u8),
    /// Today's goal was reached; fires once per day.
    GoalAchieved,
    /// Inactivity reminder: vibrate with this pattern.
    ReminderBuzz(VibePattern),
    /// A new day started with an adapted goal.
    DayRollover {
        new_goal: u32,
        band: PerformanceBand,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(PerformanceBand::from_percent(39, 40, 80), PerformanceBand::Low);
        assert_eq!(PerformanceBand::from_percent(40, 40, 80), PerformanceBand::Middle);
        assert_eq!(PerformanceBand::from_percent(80, 40, 80), PerformanceBand::Middle);
        assert_eq!(PerformanceBand::from_percent(81, 40, 80), PerformanceBand::High);
    }

    #[test]
    fn vibe_pattern_repeats_strongest_past_table() {
        assert_eq!(VibePattern::for_level(0).durations_ms, &[300, 400, 500]);
        assert_eq!(VibePattern::for_level(9).durations_ms, VIBE_PATTERNS[3]);
        assert_eq!(VibePattern::for_level(9).level, 9);
    }

    #[test]
    fn moving_wins_over_asleep() {
        assert_eq!(ActivityState::from_flags(true, true), ActivityState::Moving);
        assert_eq!(ActivityState::from_flags(false, true), ActivityState::Asleep);
        assert_eq!(ActivityState::from_flags(false, false).display_name(), "resting");
    }
}
