use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

use crate::season::{ClientSet, ClientTick, DimensionId, ServerSet, ServerTick};

/// Authoritative counter for one dimension, sent to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSeasonCycle {
    pub dimension: DimensionId,
    pub season_cycle_ticks: u64,
}

/// Everything this crate puts on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonPacket {
    SyncSeasonCycle(SyncSeasonCycle),
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("failed to encode season packet: {0}")]
    Encode(bincode::Error),
    #[error("failed to decode season packet: {0}")]
    Decode(bincode::Error),
}

impl SeasonPacket {
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        bincode::serialize(self).map_err(PacketError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        bincode::deserialize(bytes).map_err(PacketError::Decode)
    }
}

/// Server side: a sync the transport must deliver to all clients.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SeasonBroadcast(pub SyncSeasonCycle);

/// Client side: a sync that arrived from the server.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ReceivedSeasonSync(pub SyncSeasonCycle);

/// In-process transport for integrated play: encoded packets queued from the
/// server half to the client half of the same app.
#[derive(Resource, Default)]
pub struct LoopbackTransport {
    inbound: VecDeque<Vec<u8>>,
}

impl LoopbackTransport {
    pub fn push(&mut self, bytes: Vec<u8>) {
        self.inbound.push_back(bytes);
    }

    pub fn len(&self) -> usize {
        self.inbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbound.is_empty()
    }
}

/// Registers the sync messages. With `loopback` set, also wires server
/// broadcasts straight into the local client.
pub struct NetworkPlugin {
    pub loopback: bool,
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SeasonBroadcast>()
            .add_message::<ReceivedSeasonSync>();

        if self.loopback {
            app.init_resource::<LoopbackTransport>()
                .add_systems(ServerTick, send_over_loopback.in_set(ServerSet::Transport))
                .add_systems(ClientTick, receive_from_loopback.in_set(ClientSet::Receive));
        }
    }
}

fn send_over_loopback(
    mut broadcasts: MessageReader<SeasonBroadcast>,
    mut transport: ResMut<LoopbackTransport>,
) {
    for SeasonBroadcast(sync) in broadcasts.read() {
        match SeasonPacket::SyncSeasonCycle(sync.clone()).encode() {
            Ok(bytes) => transport.push(bytes),
            Err(e) => warn!("[SEASONS] {}", e),
        }
    }
}

fn receive_from_loopback(
    mut transport: ResMut<LoopbackTransport>,
    mut received: MessageWriter<ReceivedSeasonSync>,
) {
    while let Some(bytes) = transport.inbound.pop_front() {
        match SeasonPacket::decode(&bytes) {
            Ok(SeasonPacket::SyncSeasonCycle(sync)) => {
                received.write(ReceivedSeasonSync(sync));
            }
            Err(e) => warn!("[SEASONS] Dropping packet: {}", e),
        }
    }
}
