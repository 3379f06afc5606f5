pub mod blend;
pub mod resolver;

use bevy::prelude::*;

use crate::season::{ClientSet, ClientTick, SubSeason, TropicalSeason};

pub use resolver::SeasonColorResolver;

/// Engine birch leaf colour, used when birch recolouring does not apply.
pub const DEFAULT_BIRCH_COLOR: u32 = 0x80A755;

/// Overlay value meaning "leave the original colour alone".
pub const NO_TINT: u32 = 0xFFFFFF;

/// Tint constants for one season. A negative saturation multiplier means the
/// overlay replaces the original colour outright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonColors {
    pub grass_overlay: u32,
    pub grass_saturation: f32,
    pub foliage_overlay: u32,
    pub foliage_saturation: f32,
    pub birch_color: u32,
}

const fn overlay(grass: u32, foliage: u32, birch: u32) -> SeasonColors {
    SeasonColors {
        grass_overlay: grass,
        grass_saturation: -1.0,
        foliage_overlay: foliage,
        foliage_saturation: -1.0,
        birch_color: birch,
    }
}

const fn weighted(grass: u32, grass_sat: f32, foliage: u32, foliage_sat: f32, birch: u32) -> SeasonColors {
    SeasonColors {
        grass_overlay: grass,
        grass_saturation: grass_sat,
        foliage_overlay: foliage,
        foliage_saturation: foliage_sat,
        birch_color: birch,
    }
}

/// Indexed by [`SubSeason::index`].
pub const SUB_SEASON_COLORS: [SeasonColors; SubSeason::COUNT] = [
    weighted(0x778087, 0.85, 0x6F818F, 0.85, 0x869A68),
    overlay(0x678297, 0x4F86AF, 0x6EB283),
    overlay(0x6F818F, 0x5F849F, 0x74AE73),
    overlay(0x778087, 0x6F818F, 0x7AAA64),
    overlay(NO_TINT, NO_TINT, 0x80A755),
    overlay(0x877777, 0x9F5F5F, 0x98A54B),
    overlay(0x8F6F6F, 0xC44040, 0xB1A442),
    overlay(0x9F5F5F, 0xEF2121, 0xE2A231),
    weighted(0xAF4F4F, 0.85, 0xDB3030, 0.85, 0xC98A35),
    weighted(0xAF4F4F, 0.60, 0xDB3030, 0.60, 0xB1723B),
    weighted(0xAF4F4F, 0.45, 0xDB3030, 0.45, 0xA0824D),
    weighted(0x8E8181, 0.60, 0xA57070, 0.60, 0x8F925F),
];

/// Indexed by [`TropicalSeason::index`].
pub const TROPICAL_SEASON_COLORS: [SeasonColors; TropicalSeason::COUNT] = [
    overlay(NO_TINT, NO_TINT, 0x80A755),
    weighted(0xA58668, 0.8, 0xB7867C, 0.95, 0x98A54B),
    weighted(0x8E7B6D, 0.9, 0xA08B86, 0.975, 0x80A755),
    overlay(0x758C8A, 0x728C91, 0x80A755),
    overlay(0x548384, 0x2498AE, 0x76AC6C),
    overlay(0x658989, 0x4E8893, 0x80A755),
];

impl SubSeason {
    pub fn colors(self) -> &'static SeasonColors {
        &SUB_SEASON_COLORS[self.index()]
    }
}

impl TropicalSeason {
    pub fn colors(self) -> &'static SeasonColors {
        &TROPICAL_SEASON_COLORS[self.index()]
    }
}

/// Which colour table a biome reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorProvider {
    Standard(SubSeason),
    Tropical(TropicalSeason),
}

impl ColorProvider {
    pub fn colors(self) -> &'static SeasonColors {
        match self {
            ColorProvider::Standard(sub_season) => sub_season.colors(),
            ColorProvider::Tropical(tropical) => tropical.colors(),
        }
    }
}

/// Biome tags the colour handlers care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BiomeTags {
    pub tropical: bool,
    /// Seasons never recolour this biome.
    pub blacklisted: bool,
    /// Birch leaves only shift part of the way to the seasonal colour.
    pub lesser_color_change: bool,
}

pub struct SeasonColorPlugin;

impl Plugin for SeasonColorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SeasonColorResolver>().add_systems(
            ClientTick,
            resolver::refresh_color_resolver.in_set(ClientSet::Render),
        );
    }
}
