pub mod client;
pub mod saved_data;
pub mod server;
pub mod time;

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use saved_data::SeasonSavedData;
pub use time::{MAX_DAY_DURATION, MAX_SUB_SEASON_DURATION, SeasonCalendar, SeasonTime};

/// One world tick on the server, end phase. Run by the host once per level update.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerTick;

/// One client tick. Run by the host once per client update.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientTick;

/// Ordering inside [`ServerTick`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerSet {
    /// Attach or load per-level data.
    Load,
    /// Advance counters and raise broadcasts.
    Advance,
    /// Hand broadcasts to the transport.
    Transport,
    /// Consumers of the advanced state (crops).
    Simulate,
}

/// Ordering inside [`ClientTick`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientSet {
    Receive,
    Advance,
    Render,
}

/// Identifies a world (dimension) by name, e.g. `overworld`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DimensionId(pub String);

impl DimensionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn overworld() -> Self {
        Self::new("overworld")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

/// Twelve subdivisions of the year, three per [`Season`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SubSeason {
    EarlySpring,
    MidSpring,
    LateSpring,
    EarlySummer,
    MidSummer,
    LateSummer,
    EarlyAutumn,
    MidAutumn,
    LateAutumn,
    EarlyWinter,
    MidWinter,
    LateWinter,
}

impl SubSeason {
    pub const COUNT: usize = 12;

    pub const ALL: [SubSeason; Self::COUNT] = [
        SubSeason::EarlySpring,
        SubSeason::MidSpring,
        SubSeason::LateSpring,
        SubSeason::EarlySummer,
        SubSeason::MidSummer,
        SubSeason::LateSummer,
        SubSeason::EarlyAutumn,
        SubSeason::MidAutumn,
        SubSeason::LateAutumn,
        SubSeason::EarlyWinter,
        SubSeason::MidWinter,
        SubSeason::LateWinter,
    ];

    /// Index wraps, so any value maps to a sub-season.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn season(self) -> Season {
        Season::ALL[self.index() / 3]
    }

    /// Lowercase identifier used for translation keys.
    pub fn key(self) -> &'static str {
        match self {
            SubSeason::EarlySpring => "early_spring",
            SubSeason::MidSpring => "mid_spring",
            SubSeason::LateSpring => "late_spring",
            SubSeason::EarlySummer => "early_summer",
            SubSeason::MidSummer => "mid_summer",
            SubSeason::LateSummer => "late_summer",
            SubSeason::EarlyAutumn => "early_autumn",
            SubSeason::MidAutumn => "mid_autumn",
            SubSeason::LateAutumn => "late_autumn",
            SubSeason::EarlyWinter => "early_winter",
            SubSeason::MidWinter => "mid_winter",
            SubSeason::LateWinter => "late_winter",
        }
    }
}

/// Dry/wet year used by biomes tagged tropical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TropicalSeason {
    EarlyDry,
    MidDry,
    LateDry,
    EarlyWet,
    MidWet,
    LateWet,
}

impl TropicalSeason {
    pub const COUNT: usize = 6;

    pub const ALL: [TropicalSeason; Self::COUNT] = [
        TropicalSeason::EarlyDry,
        TropicalSeason::MidDry,
        TropicalSeason::LateDry,
        TropicalSeason::EarlyWet,
        TropicalSeason::MidWet,
        TropicalSeason::LateWet,
    ];

    /// Each tropical season spans two sub-seasons, offset so that early spring is
    /// still late wet and mid spring opens the dry season.
    pub fn from_sub_season(sub_season: SubSeason) -> Self {
        Self::ALL[((sub_season.index() + 11) / 2) % Self::COUNT]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            TropicalSeason::EarlyDry => "early_dry",
            TropicalSeason::MidDry => "mid_dry",
            TropicalSeason::LateDry => "late_dry",
            TropicalSeason::EarlyWet => "early_wet",
            TropicalSeason::MidWet => "mid_wet",
            TropicalSeason::LateWet => "late_wet",
        }
    }
}
