pub mod persistence;

use bevy::ecs::message::{Message, MessageReader};
use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use crate::season::server::{ServerLevel, ServerStopping};
use crate::season::{DimensionId, SeasonSavedData, ServerSet, ServerTick};

/// Length of one server tick for the auto-save timer.
const TICK_DURATION: Duration = Duration::from_millis(50);

/// Directory levels are saved under.
#[derive(Resource, Debug, Clone)]
pub struct SaveRoot(pub PathBuf);

impl Default for SaveRoot {
    fn default() -> Self {
        Self(PathBuf::from("saves/world"))
    }
}

/// Host notification: a level is about to unload and must be flushed.
#[derive(Message, Debug, Clone)]
pub struct LevelUnloading {
    pub dimension: DimensionId,
}

/// Host request to flush every dirty level now (e.g. a save-all command).
#[derive(Message, Debug, Clone, Default)]
pub struct SaveRequested;

#[derive(Resource)]
struct AutoSaveTimer(Timer);

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SaveRoot>()
            .insert_resource(AutoSaveTimer(Timer::from_seconds(
                60.0,
                TimerMode::Repeating,
            )))
            .add_message::<LevelUnloading>()
            .add_message::<SaveRequested>()
            .add_systems(
                ServerTick,
                (auto_save_system, manual_save_system, save_on_unload, save_on_stop)
                    .in_set(ServerSet::Simulate),
            );
    }
}

/// Write every dirty level's season data. Returns how many were written.
fn save_dirty(root: &SaveRoot, levels: &mut Query<(&ServerLevel, &mut SeasonSavedData)>) -> usize {
    let mut saved = 0;
    for (level, mut data) in levels.iter_mut() {
        if !data.is_dirty() {
            continue;
        }
        match persistence::save_season_data(&root.0, &level.dimension, &data) {
            Ok(()) => {
                data.clear_dirty();
                saved += 1;
            }
            Err(e) => warn!("[SEASONS] Failed to save season data for {}: {}", level.dimension, e),
        }
    }
    if saved > 0 {
        debug!("[SEASONS] Saved season data for {} level(s)", saved);
    }
    saved
}

fn auto_save_system(
    mut timer: ResMut<AutoSaveTimer>,
    root: Res<SaveRoot>,
    mut levels: Query<(&ServerLevel, &mut SeasonSavedData)>,
) {
    timer.0.tick(TICK_DURATION);
    if timer.0.just_finished() {
        save_dirty(&root, &mut levels);
    }
}

fn manual_save_system(
    mut requests: MessageReader<SaveRequested>,
    root: Res<SaveRoot>,
    mut levels: Query<(&ServerLevel, &mut SeasonSavedData)>,
) {
    if requests.read().count() > 0 {
        save_dirty(&root, &mut levels);
    }
}

fn save_on_stop(
    mut stops: MessageReader<ServerStopping>,
    root: Res<SaveRoot>,
    mut levels: Query<(&ServerLevel, &mut SeasonSavedData)>,
) {
    if stops.read().count() > 0 {
        let saved = save_dirty(&root, &mut levels);
        info!("[SEASONS] Saved {} level(s) on shutdown", saved);
    }
}

fn save_on_unload(
    mut unloads: MessageReader<LevelUnloading>,
    root: Res<SaveRoot>,
    mut levels: Query<(&ServerLevel, &mut SeasonSavedData)>,
) {
    for unload in unloads.read() {
        for (level, mut data) in levels.iter_mut() {
            if level.dimension != unload.dimension || !data.is_dirty() {
                continue;
            }
            match persistence::save_season_data(&root.0, &level.dimension, &data) {
                Ok(()) => data.clear_dirty(),
                Err(e) => warn!("[SEASONS] Failed to save season data for {}: {}", level.dimension, e),
            }
        }
    }
}
