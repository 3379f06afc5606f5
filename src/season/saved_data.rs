use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{SeasonCalendar, SeasonTime, SubSeason};

/// Key the season data is stored under in a level's data folder.
pub const DATA_IDENTIFIER: &str = "seasons";

/// Per-level season counter, attached to the level entity on first access.
///
/// The stored value is signed so corrupted saves (negative or past the end of the
/// cycle) still load; every read goes through [`SeasonSavedData::normalized_ticks`].
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSavedData {
    pub season_cycle_ticks: i64,
    #[serde(skip)]
    dirty: bool,
}

impl SeasonSavedData {
    pub fn new(season_cycle_ticks: i64) -> Self {
        Self {
            season_cycle_ticks,
            dirty: false,
        }
    }

    /// Fresh data for a level with no save. `starting_sub_season` is 1-based;
    /// 0 picks a random sub-season.
    pub fn starting<R: Rng + ?Sized>(
        calendar: SeasonCalendar,
        starting_sub_season: u8,
        rng: &mut R,
    ) -> Self {
        let index = match starting_sub_season {
            0 => rng.random_range(0..SubSeason::COUNT),
            n => (n as usize - 1) % SubSeason::COUNT,
        };
        let mut data = Self::new((index as u64 * calendar.sub_season_ticks()) as i64);
        data.set_dirty();
        data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Stored ticks clamped into `[0, cycle)`.
    pub fn normalized_ticks(&self, calendar: SeasonCalendar) -> u64 {
        let last = i64::try_from(calendar.cycle_duration() - 1).unwrap_or(i64::MAX);
        self.season_cycle_ticks.clamp(0, last) as u64
    }

    pub fn season_time(&self, calendar: SeasonCalendar) -> SeasonTime {
        calendar.time(self.normalized_ticks(calendar))
    }

    /// Advance by one tick, wrapping to 0 at the end of the cycle. Returns the new value.
    pub fn advance(&mut self, calendar: SeasonCalendar) -> u64 {
        let mut ticks = self.normalized_ticks(calendar) + 1;
        if ticks >= calendar.cycle_duration() {
            ticks = 0;
        }
        self.season_cycle_ticks = ticks as i64;
        self.set_dirty();
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> SeasonCalendar {
        SeasonCalendar::new(1000, 4)
    }

    #[test]
    fn advance_increments_and_marks_dirty() {
        let mut data = SeasonSavedData::new(10);
        assert!(!data.is_dirty());
        assert_eq!(data.advance(calendar()), 11);
        assert_eq!(data.season_cycle_ticks, 11);
        assert!(data.is_dirty());
    }

    #[test]
    fn advance_wraps_at_cycle_end() {
        let cal = calendar();
        let mut data = SeasonSavedData::new(cal.cycle_duration() as i64 - 1);
        assert_eq!(data.advance(cal), 0);
        assert_eq!(data.season_cycle_ticks, 0);
    }

    #[test]
    fn corrupted_values_are_clamped() {
        let cal = calendar();
        assert_eq!(SeasonSavedData::new(-500).normalized_ticks(cal), 0);
        assert_eq!(SeasonSavedData::new(10_000_000).normalized_ticks(cal), 47_999);

        let mut negative = SeasonSavedData::new(-3);
        assert_eq!(negative.advance(cal), 1);

        let mut overflow = SeasonSavedData::new(i64::MAX);
        assert_eq!(overflow.advance(cal), 0);
    }

    #[test]
    fn longest_calendar_still_advances() {
        let cal = SeasonCalendar::new(1 << 60, 1);
        let mut data = SeasonSavedData::new(5);
        assert_eq!(data.advance(cal), 6);

        let mut at_end = SeasonSavedData::new(i64::MAX);
        let last = cal.cycle_duration() - 1;
        assert_eq!(at_end.normalized_ticks(cal), last);
        assert_eq!(at_end.advance(cal), 0);
    }

    #[test]
    fn configured_starting_sub_season() {
        let cal = calendar();
        let mut rng = rand::rng();
        let data = SeasonSavedData::starting(cal, 1, &mut rng);
        assert_eq!(data.season_cycle_ticks, 0);
        assert!(data.is_dirty());

        let data = SeasonSavedData::starting(cal, 4, &mut rng);
        assert_eq!(data.season_time(cal).sub_season(), SubSeason::EarlySummer);
        assert_eq!(data.season_cycle_ticks, 12_000);
    }

    #[test]
    fn random_starting_sub_season_lands_on_boundary() {
        let cal = calendar();
        let mut rng = rand::rng();
        for _ in 0..32 {
            let data = SeasonSavedData::starting(cal, 0, &mut rng);
            let ticks = data.normalized_ticks(cal);
            assert_eq!(ticks % cal.sub_season_ticks(), 0);
            assert!(ticks < cal.cycle_duration());
        }
    }

    #[test]
    fn dirty_flag_is_not_serialized() {
        let mut data = SeasonSavedData::new(42);
        data.set_dirty();
        let json = serde_json::to_string(&data).unwrap();
        let loaded: SeasonSavedData = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.season_cycle_ticks, 42);
        assert!(!loaded.is_dirty());
    }
}
