//! Seasons for a block world: a per-level season counter on the server, a
//! client mirror kept in sync over the network, seasonal grass and foliage
//! tints, seasonal crop fertility and a `season get` command.

pub mod color;
pub mod command;
pub mod config;
pub mod fertility;
pub mod lang;
pub mod network;
pub mod save;
pub mod season;

use bevy::prelude::*;

use config::SeasonConfig;

/// Everything needed to run seasons on an integrated host (server and client in
/// one app).
pub struct SeasonsPlugin {
    pub config: SeasonConfig,
    /// Feed server broadcasts straight into the local client.
    pub loopback: bool,
}

impl SeasonsPlugin {
    pub fn new(config: SeasonConfig) -> Self {
        Self {
            config,
            loopback: true,
        }
    }
}

impl Default for SeasonsPlugin {
    fn default() -> Self {
        Self::new(SeasonConfig::default())
    }
}

impl Plugin for SeasonsPlugin {
    fn build(&self, app: &mut App) {
        let mut config = self.config.clone();
        config.sanitize();
        app.insert_resource(config).add_plugins((
            season::server::SeasonServerPlugin,
            season::client::SeasonClientPlugin,
            network::NetworkPlugin {
                loopback: self.loopback,
            },
            color::SeasonColorPlugin,
            command::SeasonCommandPlugin,
            save::SavePlugin,
            fertility::FertilityPlugin,
        ));
    }
}
