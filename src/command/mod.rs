use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;
use thiserror::Error;

use crate::config::SeasonConfig;
use crate::lang::Lang;
use crate::season::server::ServerLevel;
use crate::season::{DimensionId, SeasonSavedData, SeasonTime, SubSeason};

/// A `season ...` command typed by a player or the console.
#[derive(Message, Debug, Clone)]
pub struct RunSeasonCommand {
    /// Level the command source is in; `None` when there is no active world.
    pub dimension: Option<DimensionId>,
    pub input: String,
}

/// Reply to the invoker of a [`RunSeasonCommand`].
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct CommandFeedback {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown season command: {0}")]
    Unknown(String),
    #[error("no active world")]
    NoActiveWorld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonCommand {
    Get,
}

/// Accepts `get`, `season get` and `/season get`.
pub fn parse(input: &str) -> Result<SeasonCommand, CommandError> {
    let mut words = input.trim().trim_start_matches('/').split_whitespace();
    let mut word = words.next();
    if word == Some("season") {
        word = words.next();
    }
    match (word, words.next()) {
        (Some("get"), None) => Ok(SeasonCommand::Get),
        _ => Err(CommandError::Unknown(input.trim().to_string())),
    }
}

/// What `season get` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonReport {
    pub sub_season: SubSeason,
    /// 1-based.
    pub day_of_sub_season: u64,
    pub sub_season_duration: u64,
    pub tick_of_day: u64,
    pub day_duration: u64,
}

impl SeasonReport {
    pub fn from_time(time: &SeasonTime) -> Self {
        Self {
            sub_season: time.sub_season(),
            day_of_sub_season: time.day_of_sub_season() + 1,
            sub_season_duration: time.sub_season_duration(),
            tick_of_day: time.tick_of_day(),
            day_duration: time.day_duration(),
        }
    }

    pub fn message(&self, lang: &Lang) -> String {
        let name = lang.get(&format!("desc.seasons.{}", self.sub_season.key())).to_string();
        lang.translate(
            "commands.seasons.getseason.success",
            &[
                name,
                self.day_of_sub_season.to_string(),
                self.sub_season_duration.to_string(),
                self.tick_of_day.to_string(),
                self.day_duration.to_string(),
            ],
        )
    }
}

pub struct SeasonCommandPlugin;

impl Plugin for SeasonCommandPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Lang>()
            .init_resource::<SeasonConfig>()
            .add_message::<RunSeasonCommand>()
            .add_message::<CommandFeedback>()
            .add_systems(Update, execute_season_commands);
    }
}

/// Look up the season report for the command source's level.
pub fn get_season<'a>(
    dimension: Option<&DimensionId>,
    mut levels: impl Iterator<Item = (&'a ServerLevel, &'a SeasonSavedData)>,
    config: &SeasonConfig,
) -> Result<SeasonReport, CommandError> {
    let dimension = dimension.ok_or(CommandError::NoActiveWorld)?;
    let (_, data) = levels
        .find(|(level, _)| &level.dimension == dimension)
        .ok_or(CommandError::NoActiveWorld)?;
    Ok(SeasonReport::from_time(&data.season_time(config.calendar())))
}

fn execute_season_commands(
    mut requests: MessageReader<RunSeasonCommand>,
    levels: Query<(&ServerLevel, &SeasonSavedData)>,
    config: Res<SeasonConfig>,
    lang: Res<Lang>,
    mut feedback: MessageWriter<CommandFeedback>,
) {
    for command in requests.read() {
        let result = parse(&command.input).and_then(|parsed| match parsed {
            SeasonCommand::Get => get_season(command.dimension.as_ref(), levels.iter(), &config),
        });
        let reply = match result {
            Ok(report) => CommandFeedback {
                success: true,
                message: report.message(&lang),
            },
            Err(CommandError::Unknown(input)) => CommandFeedback {
                success: false,
                message: lang.translate("commands.seasons.unknown", &[input]),
            },
            Err(CommandError::NoActiveWorld) => CommandFeedback {
                success: false,
                message: lang.get("commands.seasons.no_world").to_string(),
            },
        };
        info!("[SEASONS] {}", reply.message);
        feedback.write(reply);
    }
}
