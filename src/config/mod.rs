use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::season::{
    DimensionId, MAX_DAY_DURATION, MAX_SUB_SEASON_DURATION, SeasonCalendar, SubSeason,
};

/// Default location of the config file, relative to the game directory.
pub const CONFIG_PATH: &str = "config/seasons.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Server-side season options.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    /// Length of a day in ticks.
    pub day_duration: u64,
    /// Length of a sub-season in days.
    pub sub_season_duration: u64,
    /// Keep advancing the cycle while nobody is online.
    pub progress_season_while_offline: bool,
    /// 1-based sub-season new worlds start in; 0 picks one at random.
    pub starting_sub_season: u8,
    /// Dimensions that have seasons.
    pub whitelisted_dimensions: Vec<String>,
    pub change_birch_color: bool,
    pub fertility: FertilityConfig,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            day_duration: 24_000,
            sub_season_duration: 8,
            progress_season_while_offline: true,
            starting_sub_season: 1,
            whitelisted_dimensions: vec!["overworld".to_string()],
            change_birch_color: true,
            fertility: FertilityConfig::default(),
        }
    }
}

impl SeasonConfig {
    pub fn calendar(&self) -> SeasonCalendar {
        SeasonCalendar::new(self.day_duration, self.sub_season_duration)
    }

    pub fn is_dimension_whitelisted(&self, dimension: &DimensionId) -> bool {
        self.whitelisted_dimensions
            .iter()
            .any(|name| name == dimension.as_str())
    }

    /// Pull out-of-range values back into range.
    pub fn sanitize(&mut self) {
        self.day_duration = self.day_duration.clamp(1, MAX_DAY_DURATION);
        self.sub_season_duration = self.sub_season_duration.clamp(1, MAX_SUB_SEASON_DURATION);
        self.starting_sub_season = self.starting_sub_season.min(SubSeason::COUNT as u8);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfSeasonCropBehavior {
    #[default]
    GrowSlowly,
    CantGrow,
    Break,
}

/// How seasons affect crops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertilityConfig {
    pub seasonal_crops: bool,
    /// Show fertile seasons in crop tooltips.
    pub crop_tooltips: bool,
    pub out_of_season_crop_behavior: OutOfSeasonCropBehavior,
    /// Out-of-season crops at or below this height without sky access still grow.
    pub underground_fertility_level: i32,
}

impl Default for FertilityConfig {
    fn default() -> Self {
        Self {
            seasonal_crops: true,
            crop_tooltips: true,
            out_of_season_crop_behavior: OutOfSeasonCropBehavior::GrowSlowly,
            underground_fertility_level: 48,
        }
    }
}

pub fn read_config(path: &Path) -> Result<SeasonConfig, ConfigError> {
    let data = fs::read_to_string(path)?;
    let mut config: SeasonConfig = serde_json::from_str(&data)?;
    config.sanitize();
    Ok(config)
}

pub fn save_config(path: &Path, config: &SeasonConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read the config, writing out defaults when the file does not exist yet.
pub fn load_config(path: &Path) -> SeasonConfig {
    if !path.exists() {
        let config = SeasonConfig::default();
        if let Err(e) = save_config(path, &config) {
            warn!("[SEASONS] Failed to write default config to {}: {}", path.display(), e);
        }
        return config;
    }
    match read_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("[SEASONS] {}; using defaults", e);
            SeasonConfig::default()
        }
    }
}
