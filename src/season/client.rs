use bevy::app::FixedLast;
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;
use std::collections::HashMap;

use super::{ClientSet, ClientTick, DimensionId, SeasonCalendar, SeasonTime, SubSeason};
use crate::config::SeasonConfig;
use crate::network::ReceivedSeasonSync;

/// Where the local player currently is. `None` while not in a world.
#[derive(Resource, Debug, Default)]
pub struct LocalPlayer {
    pub dimension: Option<DimensionId>,
}

/// Host notification: the client (re)loaded a level.
#[derive(Message, Debug, Clone)]
pub struct LevelLoaded {
    pub dimension: DimensionId,
}

/// Tells the renderer that biome tints changed and chunk colour caches must be rebuilt.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiomeColorsInvalidated {
    pub sub_season: SubSeason,
}

/// Shadow season counters for each dimension visited this session. They free-run
/// between server syncs and are overwritten by each one.
#[derive(Resource, Debug, Default)]
pub struct ClientSeasons {
    cycle_ticks: HashMap<DimensionId, u64>,
    last_sub_season: Option<SubSeason>,
}

impl ClientSeasons {
    pub fn ticks(&self, dimension: &DimensionId) -> Option<u64> {
        self.cycle_ticks.get(dimension).copied()
    }

    pub fn set_ticks(&mut self, dimension: DimensionId, ticks: u64) {
        self.cycle_ticks.insert(dimension, ticks);
    }

    /// Store a server value, reduced into this client's cycle.
    pub fn apply_sync(&mut self, dimension: DimensionId, ticks: u64, calendar: SeasonCalendar) {
        self.set_ticks(dimension, ticks % calendar.cycle_duration());
    }

    /// A dimension seen for the first time starts at 0.
    pub fn advance(&mut self, dimension: &DimensionId, calendar: SeasonCalendar) -> u64 {
        let cycle = calendar.cycle_duration();
        let entry = self
            .cycle_ticks
            .entry(dimension.clone())
            .and_modify(|ticks| *ticks = *ticks % cycle + 1)
            .or_insert(0);
        if *entry >= cycle {
            *entry = 0;
        }
        *entry
    }

    /// Client view of a dimension's season; unknown dimensions read as tick 0.
    pub fn season_time(&self, dimension: &DimensionId, calendar: SeasonCalendar) -> SeasonTime {
        calendar.time(self.ticks(dimension).unwrap_or(0))
    }

    pub fn clear(&mut self) {
        self.cycle_ticks.clear();
        self.last_sub_season = None;
    }
}

pub struct SeasonClientPlugin;

impl Plugin for SeasonClientPlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(ClientTick)
            .init_resource::<SeasonConfig>()
            .init_resource::<LocalPlayer>()
            .init_resource::<ClientSeasons>()
            .add_message::<LevelLoaded>()
            .add_message::<ReceivedSeasonSync>()
            .add_message::<BiomeColorsInvalidated>()
            .configure_sets(
                ClientTick,
                (ClientSet::Receive, ClientSet::Advance, ClientSet::Render).chain(),
            )
            .add_systems(
                ClientTick,
                (clear_on_level_load, apply_season_sync, tick_client_seasons)
                    .chain()
                    .in_set(ClientSet::Advance),
            )
            .add_systems(
                FixedLast,
                run_client_tick.after(super::server::run_server_tick),
            );
    }
}

/// Drives [`ClientTick`] from the fixed timestep.
pub fn run_client_tick(world: &mut World) {
    world.run_schedule(ClientTick);
}

fn clear_on_level_load(mut loads: MessageReader<LevelLoaded>, mut seasons: ResMut<ClientSeasons>) {
    for load in loads.read() {
        debug!("[SEASONS] Level {} loaded, clearing client season state", load.dimension);
        seasons.clear();
    }
}

fn apply_season_sync(
    mut syncs: MessageReader<ReceivedSeasonSync>,
    config: Res<SeasonConfig>,
    mut seasons: ResMut<ClientSeasons>,
) {
    let calendar = config.calendar();
    for ReceivedSeasonSync(sync) in syncs.read() {
        seasons.apply_sync(sync.dimension.clone(), sync.season_cycle_ticks, calendar);
    }
}

fn tick_client_seasons(
    local: Res<LocalPlayer>,
    config: Res<SeasonConfig>,
    mut seasons: ResMut<ClientSeasons>,
    mut invalidated: MessageWriter<BiomeColorsInvalidated>,
) {
    let Some(dimension) = &local.dimension else {
        return;
    };
    if !config.is_dimension_whitelisted(dimension) {
        return;
    }

    let calendar = config.calendar();
    let ticks = seasons.advance(dimension, calendar);
    let sub_season = calendar.time(ticks).sub_season();
    if seasons.last_sub_season != Some(sub_season) {
        seasons.last_sub_season = Some(sub_season);
        invalidated.write(BiomeColorsInvalidated { sub_season });
    }
}
