use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::{FertilityConfig, OutOfSeasonCropBehavior, SeasonConfig};
use crate::lang::Lang;
use crate::season::server::ServerLevel;
use crate::season::{DimensionId, Season, SeasonSavedData, ServerSet, ServerTick};

/// Minimum ticks before a crop stage advances.
pub const CROP_GROW_MIN: u32 = 400;
/// Maximum ticks before a crop stage advances.
pub const CROP_GROW_MAX: u32 = 800;
/// Chance an out-of-season crop still advances when growing slowly.
const SLOW_GROWTH_CHANCE: f32 = 0.25;

/// Seasons each crop is fertile in. Crops not listed grow all year.
#[derive(Resource, Debug, Clone)]
pub struct CropFertility {
    crops: HashMap<String, Vec<Season>>,
}

impl Default for CropFertility {
    fn default() -> Self {
        use Season::*;
        let mut table = Self {
            crops: HashMap::new(),
        };
        table.set("wheat", &[Spring, Summer, Autumn]);
        table.set("carrot", &[Spring, Autumn]);
        table.set("potato", &[Spring, Autumn]);
        table.set("beetroot", &[Spring, Autumn, Winter]);
        table.set("melon", &[Summer]);
        table.set("pumpkin", &[Summer, Autumn]);
        table.set("sweet_berry", &[Summer, Autumn]);
        table
    }
}

impl CropFertility {
    pub fn set(&mut self, crop: &str, seasons: &[Season]) {
        self.crops.insert(crop.to_string(), seasons.to_vec());
    }

    pub fn fertile_seasons(&self, crop: &str) -> Option<&[Season]> {
        self.crops.get(crop).map(Vec::as_slice)
    }

    pub fn is_fertile(&self, crop: &str, season: Season) -> bool {
        self.fertile_seasons(crop)
            .is_none_or(|seasons| seasons.contains(&season))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthDecision {
    Grow,
    GrowSlowly,
    Stall,
    Break,
}

/// Whether a crop may advance a growth stage right now.
pub fn growth_decision(
    config: &FertilityConfig,
    table: &CropFertility,
    crop: &str,
    season: Season,
    y: i32,
    sees_sky: bool,
) -> GrowthDecision {
    if !config.seasonal_crops || table.is_fertile(crop, season) {
        return GrowthDecision::Grow;
    }
    if y <= config.underground_fertility_level && !sees_sky {
        return GrowthDecision::Grow;
    }
    match config.out_of_season_crop_behavior {
        OutOfSeasonCropBehavior::GrowSlowly => GrowthDecision::GrowSlowly,
        OutOfSeasonCropBehavior::CantGrow => GrowthDecision::Stall,
        OutOfSeasonCropBehavior::Break => GrowthDecision::Break,
    }
}

/// Tooltip line listing a crop's fertile seasons, if tooltips are on and the crop
/// is seasonal.
pub fn fertility_tooltip(
    config: &FertilityConfig,
    table: &CropFertility,
    lang: &Lang,
    crop: &str,
) -> Option<String> {
    if !config.seasonal_crops || !config.crop_tooltips {
        return None;
    }
    let seasons = table.fertile_seasons(crop)?;
    let names: Vec<String> = seasons
        .iter()
        .map(|season| lang.get(&format!("desc.seasons.{}", season.key())).to_owned())
        .collect();
    Some(lang.translate("tooltip.seasons.fertile_seasons", &[names.join(", ")]))
}

/// A planted crop growing in a server level.
#[derive(Component, Debug, Clone)]
pub struct Crop {
    pub kind: String,
    pub stage: u8,
    pub max_stage: u8,
    /// Ticks until the next growth attempt.
    pub growth_timer: u32,
}

impl Crop {
    pub fn new(kind: impl Into<String>, max_stage: u8) -> Self {
        Self {
            kind: kind.into(),
            stage: 0,
            max_stage,
            growth_timer: random_growth_time(),
        }
    }

    pub fn is_grown(&self) -> bool {
        self.stage >= self.max_stage
    }
}

/// Where a crop is planted.
#[derive(Component, Debug, Clone)]
pub struct CropSite {
    pub dimension: DimensionId,
    pub y: i32,
    pub sees_sky: bool,
}

/// An out-of-season crop broke instead of growing.
#[derive(Message, Debug, Clone)]
pub struct CropWithered {
    pub kind: String,
    pub dimension: DimensionId,
}

fn random_growth_time() -> u32 {
    CROP_GROW_MIN + (rand::random::<f32>() * (CROP_GROW_MAX - CROP_GROW_MIN) as f32) as u32
}

pub struct FertilityPlugin;

impl Plugin for FertilityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CropFertility>()
            .init_resource::<SeasonConfig>()
            .add_message::<CropWithered>()
            .add_systems(ServerTick, grow_crops.in_set(ServerSet::Simulate));
    }
}

fn grow_crops(
    mut commands: Commands,
    mut crops: Query<(Entity, &mut Crop, &CropSite)>,
    levels: Query<(&ServerLevel, &SeasonSavedData)>,
    config: Res<SeasonConfig>,
    table: Res<CropFertility>,
    mut withered: MessageWriter<CropWithered>,
) {
    let calendar = config.calendar();
    let seasons: HashMap<&DimensionId, Season> = levels
        .iter()
        .map(|(level, data)| (&level.dimension, data.season_time(calendar).season()))
        .collect();

    for (entity, mut crop, site) in &mut crops {
        if crop.is_grown() {
            continue;
        }
        crop.growth_timer = crop.growth_timer.saturating_sub(1);
        if crop.growth_timer > 0 {
            continue;
        }

        let decision = match seasons.get(&site.dimension) {
            Some(season) => growth_decision(
                &config.fertility,
                &table,
                &crop.kind,
                *season,
                site.y,
                site.sees_sky,
            ),
            None => GrowthDecision::Grow,
        };

        let advance = match decision {
            GrowthDecision::Grow => true,
            GrowthDecision::GrowSlowly => rand::random::<f32>() < SLOW_GROWTH_CHANCE,
            GrowthDecision::Stall => false,
            GrowthDecision::Break => {
                debug!("[SEASONS] {} withered out of season", crop.kind);
                withered.write(CropWithered {
                    kind: crop.kind.clone(),
                    dimension: site.dimension.clone(),
                });
                commands.entity(entity).despawn();
                continue;
            }
        };

        if advance {
            crop.stage += 1;
        }
        if !crop.is_grown() {
            crop.growth_timer = random_growth_time();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::server::SeasonServerPlugin;

    fn config(behavior: OutOfSeasonCropBehavior) -> FertilityConfig {
        FertilityConfig {
            out_of_season_crop_behavior: behavior,
            ..default()
        }
    }

    #[test]
    fn in_season_crops_grow() {
        let table = CropFertility::default();
        let cfg = config(OutOfSeasonCropBehavior::Break);
        assert_eq!(
            growth_decision(&cfg, &table, "melon", Season::Summer, 64, true),
            GrowthDecision::Grow
        );
    }

    #[test]
    fn unlisted_crops_grow_all_year() {
        let table = CropFertility::default();
        let cfg = config(OutOfSeasonCropBehavior::Break);
        for season in Season::ALL {
            assert_eq!(
                growth_decision(&cfg, &table, "cactus", season, 64, true),
                GrowthDecision::Grow
            );
        }
    }

    #[test]
    fn out_of_season_behavior_is_configurable() {
        let table = CropFertility::default();
        let decide = |behavior| {
            growth_decision(&config(behavior), &table, "melon", Season::Winter, 64, true)
        };
        assert_eq!(decide(OutOfSeasonCropBehavior::GrowSlowly), GrowthDecision::GrowSlowly);
        assert_eq!(decide(OutOfSeasonCropBehavior::CantGrow), GrowthDecision::Stall);
        assert_eq!(decide(OutOfSeasonCropBehavior::Break), GrowthDecision::Break);
    }

    #[test]
    fn underground_crops_ignore_seasons() {
        let table = CropFertility::default();
        let cfg = config(OutOfSeasonCropBehavior::CantGrow);
        assert_eq!(
            growth_decision(&cfg, &table, "melon", Season::Winter, 48, false),
            GrowthDecision::Grow
        );
        // Open to the sky, so still seasonal.
        assert_eq!(
            growth_decision(&cfg, &table, "melon", Season::Winter, 30, true),
            GrowthDecision::Stall
        );
        assert_eq!(
            growth_decision(&cfg, &table, "melon", Season::Winter, 49, false),
            GrowthDecision::Stall
        );
    }

    #[test]
    fn seasonal_crops_can_be_disabled() {
        let table = CropFertility::default();
        let cfg = FertilityConfig {
            seasonal_crops: false,
            out_of_season_crop_behavior: OutOfSeasonCropBehavior::Break,
            ..default()
        };
        assert_eq!(
            growth_decision(&cfg, &table, "melon", Season::Winter, 64, true),
            GrowthDecision::Grow
        );
    }

    #[test]
    fn tooltip_lists_fertile_seasons() {
        let table = CropFertility::default();
        let lang = Lang::default();
        let cfg = FertilityConfig::default();
        assert_eq!(
            fertility_tooltip(&cfg, &table, &lang, "pumpkin").as_deref(),
            Some("Fertile seasons: Summer, Autumn")
        );
        assert_eq!(fertility_tooltip(&cfg, &table, &lang, "cactus"), None);

        let off = FertilityConfig {
            crop_tooltips: false,
            ..default()
        };
        assert_eq!(fertility_tooltip(&off, &table, &lang, "pumpkin"), None);
    }

    #[test]
    fn growth_time_in_range() {
        for _ in 0..100 {
            let t = random_growth_time();
            assert!((CROP_GROW_MIN..=CROP_GROW_MAX).contains(&t));
        }
    }

    fn crop_app(behavior: OutOfSeasonCropBehavior, level_ticks: i64) -> App {
        let mut app = App::new();
        let mut season_config = SeasonConfig {
            day_duration: 1000,
            sub_season_duration: 4,
            ..default()
        };
        season_config.fertility.out_of_season_crop_behavior = behavior;
        app.add_plugins((SeasonServerPlugin, FertilityPlugin))
            .insert_resource(season_config);
        app.world_mut().spawn((
            ServerLevel {
                dimension: DimensionId::overworld(),
            },
            crate::season::server::GameRules {
                do_season_cycle: false,
            },
            SeasonSavedData::new(level_ticks),
        ));
        app
    }

    fn plant(app: &mut App, kind: &str) -> Entity {
        app.world_mut()
            .spawn((
                Crop {
                    kind: kind.to_string(),
                    stage: 0,
                    max_stage: 2,
                    growth_timer: 1,
                },
                CropSite {
                    dimension: DimensionId::overworld(),
                    y: 64,
                    sees_sky: true,
                },
            ))
            .id()
    }

    #[test]
    fn in_season_crop_advances_a_stage() {
        // Mid summer.
        let mut app = crop_app(OutOfSeasonCropBehavior::Break, 16_000);
        let crop = plant(&mut app, "melon");
        app.world_mut().run_schedule(ServerTick);
        let state = app.world().get::<Crop>(crop).unwrap();
        assert_eq!(state.stage, 1);
        assert!(state.growth_timer >= CROP_GROW_MIN);
    }

    #[test]
    fn out_of_season_crop_stalls() {
        // Mid winter.
        let mut app = crop_app(OutOfSeasonCropBehavior::CantGrow, 40_000);
        let crop = plant(&mut app, "melon");
        app.world_mut().run_schedule(ServerTick);
        let state = app.world().get::<Crop>(crop).unwrap();
        assert_eq!(state.stage, 0);
        assert!(state.growth_timer >= CROP_GROW_MIN);
    }

    #[test]
    fn out_of_season_crop_breaks() {
        let mut app = crop_app(OutOfSeasonCropBehavior::Break, 40_000);
        let crop = plant(&mut app, "melon");
        app.world_mut().run_schedule(ServerTick);
        assert!(app.world().get_entity(crop).is_err());
    }

    #[test]
    fn grown_crop_is_left_alone() {
        let mut app = crop_app(OutOfSeasonCropBehavior::Break, 40_000);
        let crop = app
            .world_mut()
            .spawn((
                Crop {
                    kind: "melon".into(),
                    stage: 2,
                    max_stage: 2,
                    growth_timer: 0,
                },
                CropSite {
                    dimension: DimensionId::overworld(),
                    y: 64,
                    sees_sky: true,
                },
            ))
            .id();
        app.world_mut().run_schedule(ServerTick);
        assert_eq!(app.world().get::<Crop>(crop).unwrap().stage, 2);
    }
}
