use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::Path;
use std::time::Duration;

use seasons::SeasonsPlugin;
use seasons::command::RunSeasonCommand;
use seasons::config::{CONFIG_PATH, load_config};
use seasons::fertility::{Crop, CropSite, CropWithered};
use seasons::season::client::{BiomeColorsInvalidated, LevelLoaded, LocalPlayer};
use seasons::season::server::{GameRules, PlayerList, PlayerLoggedIn, SeasonChanged, ServerLevel};
use seasons::season::DimensionId;

/// Game ticks per second.
const TICK_RATE: f64 = 20.0;

fn main() {
    let config = load_config(Path::new(CONFIG_PATH));

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICK_RATE,
            ))),
            LogPlugin::default(),
        ))
        .insert_resource(Time::<Fixed>::from_hz(TICK_RATE))
        .add_plugins(SeasonsPlugin::new(config))
        .add_systems(Startup, setup_integrated_world)
        .add_systems(Update, (report_season_changes, log_color_invalidations, log_withered_crops))
        .run();
}

/// Stand up a single-player overworld with a small field.
fn setup_integrated_world(
    mut commands: Commands,
    mut players: ResMut<PlayerList>,
    mut local: ResMut<LocalPlayer>,
    mut loaded: MessageWriter<LevelLoaded>,
    mut logins: MessageWriter<PlayerLoggedIn>,
) {
    let overworld = DimensionId::overworld();
    commands.spawn((
        ServerLevel {
            dimension: overworld.clone(),
        },
        GameRules::default(),
    ));

    for (kind, y, sees_sky) in [
        ("wheat", 64, true),
        ("melon", 64, true),
        ("pumpkin", 64, true),
        ("carrot", 20, false),
    ] {
        commands.spawn((
            Crop::new(kind, 7),
            CropSite {
                dimension: overworld.clone(),
                y,
                sees_sky,
            },
        ));
    }

    players.count = 1;
    local.dimension = Some(overworld.clone());
    loaded.write(LevelLoaded {
        dimension: overworld.clone(),
    });
    logins.write(PlayerLoggedIn {
        dimension: overworld,
    });
}

fn report_season_changes(
    mut changes: MessageReader<SeasonChanged>,
    mut commands: MessageWriter<RunSeasonCommand>,
) {
    for change in changes.read() {
        if let SeasonChanged::Standard { dimension, .. } = change {
            commands.write(RunSeasonCommand {
                dimension: Some(dimension.clone()),
                input: "season get".to_string(),
            });
        }
    }
}

fn log_color_invalidations(mut invalidated: MessageReader<BiomeColorsInvalidated>) {
    for message in invalidated.read() {
        info!("Biome colors refreshed for {:?}", message.sub_season);
    }
}

fn log_withered_crops(mut withered: MessageReader<CropWithered>) {
    for crop in withered.read() {
        info!("A {} crop withered in {}", crop.kind, crop.dimension);
    }
}
