// StepWatch — Persisted State
//
// The state that must survive a restart is a flat record of integers under
// fixed numeric keys. The store behind it (NVS on the watch, a map in tests)
// only needs to read and write single integers.

use std::collections::BTreeMap;

use anyhow::Context;

use crate::config::PedometerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PersistKey {
    FailureDays,
    SuccessDays,
    TotalSteps,
    SegmentsInactive,
    ActiveMinutes,
    StepsAtPeriodStart,
    DayNumber,
    DailyGoal,
    GoalAchievedToday,
}

impl PersistKey {
    pub const ALL: [PersistKey; 9] = [
        Self::FailureDays,
        Self::SuccessDays,
        Self::TotalSteps,
        Self::SegmentsInactive,
        Self::ActiveMinutes,
        Self::StepsAtPeriodStart,
        Self::DayNumber,
        Self::DailyGoal,
        Self::GoalAchievedToday,
    ];

    /// Numeric key of the record. Gaps (3, 4) belong to retired fields and
    /// must not be reused.
    pub fn id(self) -> u32 {
        match self {
            Self::FailureDays => 1,
            Self::SuccessDays => 2,
            Self::TotalSteps => 5,
            Self::SegmentsInactive => 6,
            Self::ActiveMinutes => 7,
            Self::StepsAtPeriodStart => 8,
            Self::DayNumber => 9,
            Self::DailyGoal => 10,
            Self::GoalAchievedToday => 11,
        }
    }

    /// Short name for stores keyed by string (NVS keys are ≤ 15 bytes).
    pub fn name(self) -> &'static str {
        match self {
            Self::FailureDays => "failure_days",
            Self::SuccessDays => "success_days",
            Self::TotalSteps => "total_steps",
            Self::SegmentsInactive => "seg_inactive",
            Self::ActiveMinutes => "active_min",
            Self::StepsAtPeriodStart => "period_start",
            Self::DayNumber => "day_number",
            Self::DailyGoal => "daily_goal",
            Self::GoalAchievedToday => "goal_reached",
        }
    }
}

/// Durable key → integer storage.
pub trait KeyValueStore {
    fn read(&mut self, key: PersistKey) -> anyhow::Result<Option<i32>>;
    fn write(&mut self, key: PersistKey, value: i32) -> anyhow::Result<()>;
}

/// In-memory store, for host runs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<u32, i32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: PersistKey) -> Option<i32> {
        self.values.get(&key.id()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, key: PersistKey) -> anyhow::Result<Option<i32>> {
        Ok(self.values.get(&key.id()).copied())
    }

    fn write(&mut self, key: PersistKey, value: i32) -> anyhow::Result<()> {
        self.values.insert(key.id(), value);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    pub total_steps: u32,
    pub segments_inactive: u32,
    pub active_minutes: u32,
    pub steps_at_period_start: u32,
    pub day_number: Option<u16>,
    pub daily_goal: u32,
    pub success_days: u32,
    pub failure_days: u32,
    pub goal_achieved_today: bool,
}

impl PersistedState {
    /// State of a fresh install.
    pub fn initial(config: &PedometerConfig) -> Self {
        Self {
            total_steps: 0,
            segments_inactive: 0,
            active_minutes: 0,
            steps_at_period_start: 0,
            day_number: None,
            daily_goal: config.default_daily_goal,
            success_days: 1,
            failure_days: 1,
            goal_achieved_today: false,
        }
    }

    /// Read the record back. Missing, unreadable or out-of-range fields fall
    /// back to their defaults; the inactivity gauge is clamped to the restore
    /// cap. Never fails.
    pub fn load(store: &mut dyn KeyValueStore, config: &PedometerConfig) -> Self {
        let initial = Self::initial(config);
        let mut read = |key: PersistKey| match store.read(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Persisted {} unreadable, using default: {:#}", key.name(), e);
                None
            }
        };

        let counter = |value: Option<i32>, default: u32| {
            value.and_then(|v| u32::try_from(v).ok()).unwrap_or(default)
        };

        let total_steps = counter(read(PersistKey::TotalSteps), initial.total_steps);
        let segments_inactive = counter(read(PersistKey::SegmentsInactive), 0)
            .min(config.restore_gauge_cap)
            .min(config.gauge_max);
        let active_minutes = counter(read(PersistKey::ActiveMinutes), 0);
        let steps_at_period_start = counter(read(PersistKey::StepsAtPeriodStart), 0);
        let day_number = read(PersistKey::DayNumber)
            .and_then(|v| u16::try_from(v).ok())
            .filter(|&day| day <= 365);
        let daily_goal = counter(read(PersistKey::DailyGoal), initial.daily_goal);
        let daily_goal = if daily_goal == 0 {
            initial.daily_goal
        } else {
            daily_goal
        };
        let success_days = counter(read(PersistKey::SuccessDays), initial.success_days);
        let failure_days = counter(read(PersistKey::FailureDays), initial.failure_days);
        let goal_achieved_today = read(PersistKey::GoalAchievedToday).unwrap_or(0) != 0;

        Self {
            total_steps,
            segments_inactive,
            active_minutes,
            steps_at_period_start,
            day_number,
            daily_goal,
            success_days,
            failure_days,
            goal_achieved_today,
        }
    }

    /// Write every field back.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> anyhow::Result<()> {
        let day = self.day_number.map_or(-1, i32::from);
        let fields = [
            (PersistKey::FailureDays, to_i32(self.failure_days)),
            (PersistKey::SuccessDays, to_i32(self.success_days)),
            (PersistKey::TotalSteps, to_i32(self.total_steps)),
            (PersistKey::SegmentsInactive, to_i32(self.segments_inactive)),
            (PersistKey::ActiveMinutes, to_i32(self.active_minutes)),
            (PersistKey::StepsAtPeriodStart, to_i32(self.steps_at_period_start)),
            (PersistKey::DayNumber, day),
            (PersistKey::DailyGoal, to_i32(self.daily_goal)),
            (PersistKey::GoalAchievedToday, i32::from(self.goal_achieved_today)),
        ];
        for (key, value) in fields {
            store
                .write(key, value)
                .with_context(|| format!("writing persisted {}", key.name()))?;
        }
        Ok(())
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn read(&mut self, _key: PersistKey) -> anyhow::Result<Option<i32>> {
            anyhow::bail!("flash unavailable")
        }

        fn write(&mut self, _key: PersistKey, _value: i32) -> anyhow::Result<()> {
            anyhow::bail!("flash unavailable")
        }
    }

    #[test]
    fn empty_store_loads_defaults() {
        let config = PedometerConfig::default();
        let state = PersistedState::load(&mut MemoryStore::new(), &config);
        assert_eq!(state, PersistedState::initial(&config));
        assert_eq!(state.daily_goal, 8250);
        assert_eq!((state.success_days, state.failure_days), (1, 1));
    }

    #[test]
    fn save_then_load_round_trips() {
        let config = PedometerConfig::default();
        let state = PersistedState {
            total_steps: 4_321,
            segments_inactive: 37,
            active_minutes: 12,
            steps_at_period_start: 4_300,
            day_number: Some(200),
            daily_goal: 9_120,
            success_days: 14,
            failure_days: 3,
            goal_achieved_today: true,
        };
        let mut store = MemoryStore::new();
        state.save(&mut store).expect("memory store accepts writes");
        assert_eq!(store.len(), PersistKey::ALL.len());
        assert_eq!(store.get(PersistKey::TotalSteps), Some(4_321));
        assert_eq!(PersistedState::load(&mut store, &config), state);
    }

    #[test]
    fn corrupt_values_are_clamped_not_rejected() {
        let config = PedometerConfig::default();
        let mut store = MemoryStore::new();
        store.write(PersistKey::SegmentsInactive, 500).unwrap();
        store.write(PersistKey::TotalSteps, -7).unwrap();
        store.write(PersistKey::DayNumber, 4_000).unwrap();
        store.write(PersistKey::DailyGoal, 0).unwrap();

        let state = PersistedState::load(&mut store, &config);
        assert_eq!(state.segments_inactive, 90);
        assert_eq!(state.total_steps, 0);
        assert_eq!(state.day_number, None);
        assert_eq!(state.daily_goal, 8250);
    }

    #[test]
    fn unreadable_store_degrades_to_defaults() {
        let config = PedometerConfig::default();
        let state = PersistedState::load(&mut FailingStore, &config);
        assert_eq!(state, PersistedState::initial(&config));

        let err = state.save(&mut FailingStore).unwrap_err();
        assert!(format!("{err:#}").contains("failure_days"));
    }

    #[test]
    fn key_ids_are_stable() {
        let ids: Vec<u32> = PersistKey::ALL.iter().map(|key| key.id()).collect();
        assert_eq!(ids, vec![1, 2, 5, 6, 7, 8, 9, 10, 11]);
        assert!(PersistKey::ALL.iter().all(|key| key.name().len() <= 15));
    }
}
