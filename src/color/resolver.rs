use bevy::prelude::*;

use super::blend::{mix_colors, seasonal_foliage_color, seasonal_grass_color};
use super::{BiomeTags, ColorProvider, DEFAULT_BIRCH_COLOR};
use crate::config::SeasonConfig;
use crate::season::client::{ClientSeasons, LocalPlayer};
use crate::season::{SeasonTime, SubSeason, TropicalSeason};

/// Birch share of the seasonal colour in lesser-colour-change biomes.
const LESSER_BIRCH_WEIGHT: f32 = 0.75;

/// Grass, foliage and birch colour callbacks for the renderer.
///
/// Refreshed once per client tick from the client season clock; the renderer
/// calls it per column or block, so every method is a plain table lookup and a
/// blend with no allocation.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonColorResolver {
    sub_season: SubSeason,
    tropical_season: TropicalSeason,
    /// Seasons apply in the dimension the player is in.
    active: bool,
    change_birch_color: bool,
}

impl Default for SeasonColorResolver {
    fn default() -> Self {
        Self {
            sub_season: SubSeason::EarlySpring,
            tropical_season: TropicalSeason::LateWet,
            active: false,
            change_birch_color: true,
        }
    }
}

impl SeasonColorResolver {
    pub fn new(time: SeasonTime, active: bool, change_birch_color: bool) -> Self {
        Self {
            sub_season: time.sub_season(),
            tropical_season: time.tropical_season(),
            active,
            change_birch_color,
        }
    }

    pub fn sub_season(&self) -> SubSeason {
        self.sub_season
    }

    pub fn provider(&self, biome: &BiomeTags) -> ColorProvider {
        if biome.tropical {
            ColorProvider::Tropical(self.tropical_season)
        } else {
            ColorProvider::Standard(self.sub_season)
        }
    }

    /// Replacement grass colour. Without biome context the original is returned.
    pub fn grass_color(&self, biome: Option<&BiomeTags>, original: u32) -> u32 {
        match biome {
            Some(biome) if self.active => seasonal_grass_color(self.provider(biome), biome, original),
            _ => original,
        }
    }

    pub fn foliage_color(&self, biome: Option<&BiomeTags>, original: u32) -> u32 {
        match biome {
            Some(biome) if self.active => {
                seasonal_foliage_color(self.provider(biome), biome, original)
            }
            _ => original,
        }
    }

    /// Birch leaf tint at a block. Falls back to the engine's birch colour when
    /// recolouring is off, the dimension has no seasons, or the biome is unknown
    /// or blacklisted.
    pub fn birch_color(&self, biome: Option<&BiomeTags>) -> u32 {
        let Some(biome) = biome else {
            return DEFAULT_BIRCH_COLOR;
        };
        if !self.active || !self.change_birch_color || biome.blacklisted {
            return DEFAULT_BIRCH_COLOR;
        }
        let seasonal = self.provider(biome).colors().birch_color;
        if biome.lesser_color_change {
            mix_colors(seasonal, DEFAULT_BIRCH_COLOR, LESSER_BIRCH_WEIGHT)
        } else {
            seasonal
        }
    }
}

pub fn refresh_color_resolver(
    local: Res<LocalPlayer>,
    seasons: Res<ClientSeasons>,
    config: Res<SeasonConfig>,
    mut resolver: ResMut<SeasonColorResolver>,
) {
    let next = match &local.dimension {
        Some(dimension) => SeasonColorResolver::new(
            seasons.season_time(dimension, config.calendar()),
            config.is_dimension_whitelisted(dimension),
            config.change_birch_color,
        ),
        None => SeasonColorResolver {
            active: false,
            ..*resolver
        },
    };
    // Avoid tripping change detection every tick.
    resolver.set_if_neq(next);
}
