use super::{Season, SubSeason, TropicalSeason};

/// Longest allowed day, in ticks.
pub const MAX_DAY_DURATION: u64 = 1 << 32;
/// Longest allowed sub-season, in days.
pub const MAX_SUB_SEASON_DURATION: u64 = 1 << 24;

/// Day and sub-season lengths the season clock is measured in.
///
/// Both lengths are at least 1, and capped so a full cycle fits in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    day_duration: u64,
    sub_season_duration: u64,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self::new(24_000, 8)
    }
}

impl SeasonCalendar {
    /// `day_duration` in ticks, `sub_season_duration` in days.
    pub fn new(day_duration: u64, sub_season_duration: u64) -> Self {
        Self {
            day_duration: day_duration.clamp(1, MAX_DAY_DURATION),
            sub_season_duration: sub_season_duration.clamp(1, MAX_SUB_SEASON_DURATION),
        }
    }

    #[inline]
    pub fn day_duration(&self) -> u64 {
        self.day_duration
    }

    #[inline]
    pub fn sub_season_duration(&self) -> u64 {
        self.sub_season_duration
    }

    /// Length of one sub-season in ticks.
    pub fn sub_season_ticks(&self) -> u64 {
        self.day_duration * self.sub_season_duration
    }

    /// Length of one full year in ticks.
    pub fn cycle_duration(&self) -> u64 {
        self.sub_season_ticks() * SubSeason::COUNT as u64
    }

    pub fn time(&self, ticks: u64) -> SeasonTime {
        SeasonTime::new(ticks, *self)
    }
}

/// Calendar view over a season cycle tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonTime {
    ticks: u64,
    calendar: SeasonCalendar,
}

impl SeasonTime {
    pub fn new(ticks: u64, calendar: SeasonCalendar) -> Self {
        Self { ticks, calendar }
    }

    #[inline]
    pub fn season_cycle_ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn day_duration(&self) -> u64 {
        self.calendar.day_duration()
    }

    /// Sub-season length in days.
    #[inline]
    pub fn sub_season_duration(&self) -> u64 {
        self.calendar.sub_season_duration()
    }

    pub fn sub_season_ticks(&self) -> u64 {
        self.calendar.sub_season_ticks()
    }

    pub fn season_ticks(&self) -> u64 {
        self.sub_season_ticks() * 3
    }

    pub fn cycle_duration(&self) -> u64 {
        self.calendar.cycle_duration()
    }

    pub fn day(&self) -> u64 {
        self.ticks / self.day_duration()
    }

    pub fn tick_of_day(&self) -> u64 {
        self.ticks % self.day_duration()
    }

    /// Zero-based day within the current sub-season.
    pub fn day_of_sub_season(&self) -> u64 {
        self.day() % self.sub_season_duration()
    }

    pub fn sub_season(&self) -> SubSeason {
        let index = (self.day() / self.sub_season_duration()) % SubSeason::COUNT as u64;
        SubSeason::from_index(index as usize)
    }

    pub fn season(&self) -> Season {
        self.sub_season().season()
    }

    pub fn tropical_season(&self) -> TropicalSeason {
        TropicalSeason::from_sub_season(self.sub_season())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> SeasonCalendar {
        SeasonCalendar::new(1000, 4)
    }

    #[test]
    fn cycle_duration_from_day_and_sub_season_lengths() {
        assert_eq!(calendar().cycle_duration(), 48_000);
        assert_eq!(calendar().sub_season_ticks(), 4_000);
        assert_eq!(SeasonCalendar::default().cycle_duration(), 24_000 * 8 * 12);
    }

    #[test]
    fn zero_lengths_are_raised_to_one() {
        let cal = SeasonCalendar::new(0, 0);
        assert_eq!(cal.day_duration(), 1);
        assert_eq!(cal.sub_season_duration(), 1);
        assert_eq!(cal.cycle_duration(), 12);
    }

    #[test]
    fn huge_lengths_are_capped() {
        let cal = SeasonCalendar::new(u64::MAX, u64::MAX);
        assert_eq!(cal.day_duration(), MAX_DAY_DURATION);
        assert_eq!(cal.sub_season_duration(), MAX_SUB_SEASON_DURATION);
        assert!(i64::try_from(cal.cycle_duration()).is_ok());
    }

    #[test]
    fn start_of_cycle_is_early_spring() {
        let time = calendar().time(0);
        assert_eq!(time.sub_season(), SubSeason::EarlySpring);
        assert_eq!(time.season(), Season::Spring);
        assert_eq!(time.day(), 0);
        assert_eq!(time.tick_of_day(), 0);
    }

    #[test]
    fn fourth_sub_season_is_early_summer() {
        let time = calendar().time(4000 * 3 + 1);
        assert_eq!(time.sub_season(), SubSeason::EarlySummer);
        assert_eq!(time.season(), Season::Summer);
        assert_eq!(time.day(), 12);
        assert_eq!(time.tick_of_day(), 1);
        assert_eq!(time.day_of_sub_season(), 0);
    }

    #[test]
    fn last_tick_of_cycle_is_late_winter() {
        let cal = calendar();
        let time = cal.time(cal.cycle_duration() - 1);
        assert_eq!(time.sub_season(), SubSeason::LateWinter);
        assert_eq!(time.day(), 47);
        assert_eq!(time.day_of_sub_season(), 3);
    }

    #[test]
    fn classification_wraps_with_cycle() {
        let cal = calendar();
        let cycle = cal.cycle_duration();
        for t in (0..cycle * 3).step_by(997) {
            let raw = cal.time(t);
            let wrapped = cal.time(t % cycle);
            assert_eq!(raw.sub_season(), wrapped.sub_season(), "t = {}", t);
            assert_eq!(raw.season(), wrapped.season(), "t = {}", t);
            assert_eq!(raw.tropical_season(), wrapped.tropical_season(), "t = {}", t);
        }
    }

    #[test]
    fn day_is_monotonic_within_cycle() {
        let cal = calendar();
        let mut last = 0;
        for t in 0..cal.cycle_duration() {
            let day = cal.time(t).day();
            assert!(day >= last);
            last = day;
        }
    }

    #[test]
    fn sub_seasons_advance_in_order() {
        let cal = calendar();
        for (i, expected) in SubSeason::ALL.iter().enumerate() {
            let time = cal.time(i as u64 * cal.sub_season_ticks());
            assert_eq!(time.sub_season(), *expected);
        }
    }
}
