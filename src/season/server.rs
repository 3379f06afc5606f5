use bevy::app::FixedLast;
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;
use std::collections::HashMap;

use super::{
    DimensionId, SeasonCalendar, SeasonSavedData, ServerSet, ServerTick, SubSeason, TropicalSeason,
};
use crate::config::SeasonConfig;
use crate::network::{SeasonBroadcast, SyncSeasonCycle};
use crate::save::SaveRoot;
use crate::save::persistence;

/// The server re-sends every level's counter this often.
pub const SYNC_INTERVAL_TICKS: u64 = 20;

/// A loaded server level. The host spawns one entity per dimension.
#[derive(Component, Debug, Clone)]
pub struct ServerLevel {
    pub dimension: DimensionId,
}

/// Per-level game rules the season cycle reads.
#[derive(Component, Debug, Clone, Copy)]
pub struct GameRules {
    pub do_season_cycle: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            do_season_cycle: true,
        }
    }
}

/// Number of connected players, kept up to date by the host.
#[derive(Resource, Debug, Default)]
pub struct PlayerList {
    pub count: usize,
}

/// Host notification: a player joined and is in `dimension`.
#[derive(Message, Debug, Clone)]
pub struct PlayerLoggedIn {
    pub dimension: DimensionId,
}

/// Host notification: the server is shutting down. Ends the broadcast session.
#[derive(Message, Debug, Clone, Default)]
pub struct ServerStopping;

/// Raised on a broadcast whose classification differs from the previous broadcast
/// of the same level.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum SeasonChanged {
    Standard {
        dimension: DimensionId,
        previous: SubSeason,
        current: SubSeason,
    },
    Tropical {
        dimension: DimensionId,
        previous: TropicalSeason,
        current: TropicalSeason,
    },
}

/// Counter value each dimension had at its last broadcast. Ticks can be skipped
/// (paused cycle, disabled rule, unloaded level), so the previous state is never
/// assumed to be `current - 1`.
///
/// Lives for one server session: entries survive level unloads and are cleared
/// on [`ServerStopping`].
#[derive(Resource, Debug, Default)]
pub struct PreviousBroadcastTicks {
    ticks: HashMap<DimensionId, u64>,
}

impl PreviousBroadcastTicks {
    pub fn get(&self, dimension: &DimensionId) -> Option<u64> {
        self.ticks.get(dimension).copied()
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonUpdate {
    pub changes: Vec<SeasonChanged>,
    pub sync: SyncSeasonCycle,
}

/// Compare `ticks` against the dimension's last broadcast, record it, and build the
/// sync for clients.
pub fn season_update(
    previous: &mut PreviousBroadcastTicks,
    dimension: &DimensionId,
    ticks: u64,
    calendar: SeasonCalendar,
) -> SeasonUpdate {
    let new_time = calendar.time(ticks);
    let prev_ticks = previous.ticks.insert(dimension.clone(), ticks).unwrap_or(ticks);
    let prev_time = calendar.time(prev_ticks);

    let mut changes = Vec::new();
    if prev_time.sub_season() != new_time.sub_season() {
        changes.push(SeasonChanged::Standard {
            dimension: dimension.clone(),
            previous: prev_time.sub_season(),
            current: new_time.sub_season(),
        });
    }
    if prev_time.tropical_season() != new_time.tropical_season() {
        changes.push(SeasonChanged::Tropical {
            dimension: dimension.clone(),
            previous: prev_time.tropical_season(),
            current: new_time.tropical_season(),
        });
    }

    SeasonUpdate {
        changes,
        sync: SyncSeasonCycle {
            dimension: dimension.clone(),
            season_cycle_ticks: ticks,
        },
    }
}

/// What a level does on a world tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Disabled,
    OfflinePaused,
    Active,
}

pub fn cycle_state(rules: &GameRules, config: &SeasonConfig, players: usize) -> CycleState {
    if !rules.do_season_cycle {
        CycleState::Disabled
    } else if !config.progress_season_while_offline && players == 0 {
        CycleState::OfflinePaused
    } else {
        CycleState::Active
    }
}

pub struct SeasonServerPlugin;

impl Plugin for SeasonServerPlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(ServerTick)
            .init_resource::<SeasonConfig>()
            .init_resource::<SaveRoot>()
            .init_resource::<PlayerList>()
            .init_resource::<PreviousBroadcastTicks>()
            .add_message::<PlayerLoggedIn>()
            .add_message::<ServerStopping>()
            .add_message::<SeasonChanged>()
            .add_message::<SeasonBroadcast>()
            .configure_sets(
                ServerTick,
                (
                    ServerSet::Load,
                    ServerSet::Advance,
                    ServerSet::Transport,
                    ServerSet::Simulate,
                )
                    .chain(),
            )
            .add_systems(
                ServerTick,
                (forget_broadcasts_on_stop, attach_season_data).in_set(ServerSet::Load),
            )
            .add_systems(
                ServerTick,
                (tick_season_cycle, broadcast_on_login)
                    .chain()
                    .in_set(ServerSet::Advance),
            )
            .add_systems(FixedLast, run_server_tick);
    }
}

/// Drives [`ServerTick`] from the fixed timestep.
pub fn run_server_tick(world: &mut World) {
    world.run_schedule(ServerTick);
}

fn forget_broadcasts_on_stop(
    mut stops: MessageReader<ServerStopping>,
    mut previous: ResMut<PreviousBroadcastTicks>,
) {
    if stops.read().count() > 0 {
        debug!("[SEASONS] Server stopping, clearing broadcast history");
        previous.clear();
    }
}

/// Give every new level its season data: the saved counter if one exists,
/// otherwise a fresh counter at the configured starting sub-season.
fn attach_season_data(
    mut commands: Commands,
    levels: Query<(Entity, &ServerLevel), Without<SeasonSavedData>>,
    config: Res<SeasonConfig>,
    root: Res<SaveRoot>,
) {
    for (entity, level) in &levels {
        let data = match persistence::load_season_data(&root.0, &level.dimension) {
            Some(data) => {
                info!(
                    "[SEASONS] Loaded {} at tick {}",
                    level.dimension, data.season_cycle_ticks
                );
                data
            }
            None => {
                let data = SeasonSavedData::starting(
                    config.calendar(),
                    config.starting_sub_season,
                    &mut rand::rng(),
                );
                info!(
                    "[SEASONS] New season cycle for {} starting in {:?}",
                    level.dimension,
                    data.season_time(config.calendar()).sub_season()
                );
                data
            }
        };
        commands.entity(entity).insert(data);
    }
}

fn tick_season_cycle(
    mut levels: Query<(&ServerLevel, Option<&GameRules>, &mut SeasonSavedData)>,
    config: Res<SeasonConfig>,
    players: Res<PlayerList>,
    mut previous: ResMut<PreviousBroadcastTicks>,
    mut changed: MessageWriter<SeasonChanged>,
    mut broadcasts: MessageWriter<SeasonBroadcast>,
) {
    let calendar = config.calendar();
    for (level, rules, mut data) in &mut levels {
        let rules = rules.copied().unwrap_or_default();
        if cycle_state(&rules, &config, players.count) != CycleState::Active {
            continue;
        }

        let ticks = data.advance(calendar);
        if ticks % SYNC_INTERVAL_TICKS == 0 {
            let update = season_update(&mut previous, &level.dimension, ticks, calendar);
            emit(update, &mut changed, &mut broadcasts);
        }
    }
}

fn broadcast_on_login(
    mut logins: MessageReader<PlayerLoggedIn>,
    levels: Query<(&ServerLevel, &SeasonSavedData)>,
    config: Res<SeasonConfig>,
    mut previous: ResMut<PreviousBroadcastTicks>,
    mut changed: MessageWriter<SeasonChanged>,
    mut broadcasts: MessageWriter<SeasonBroadcast>,
) {
    let calendar = config.calendar();
    for login in logins.read() {
        let Some((level, data)) = levels.iter().find(|(l, _)| l.dimension == login.dimension) else {
            continue;
        };
        let ticks = data.normalized_ticks(calendar);
        let update = season_update(&mut previous, &level.dimension, ticks, calendar);
        emit(update, &mut changed, &mut broadcasts);
    }
}

fn emit(
    update: SeasonUpdate,
    changed: &mut MessageWriter<SeasonChanged>,
    broadcasts: &mut MessageWriter<SeasonBroadcast>,
) {
    for change in update.changes {
        if let SeasonChanged::Standard {
            dimension, current, ..
        } = &change
        {
            info!("[SEASONS] {} is now {:?}", dimension, current);
        }
        changed.write(change);
    }
    broadcasts.write(SeasonBroadcast(update.sync));
}
