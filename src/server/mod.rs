// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod plugin_messages;

use crate::world::{self, terrain, Dimension, DimensionRegistry};
use galena_protocol::format;
use galena_protocol::protocol::{self, mojang, packet, srv, Error, State, UUID};
use galena_protocol::protocol::{LenPrefixed, LenPrefixedBytes, VarInt};
use galena_protocol::types::{Gamemode, Metadata};
use log::{debug, error, info, warn};
use rand::Rng;
use std::net::IpAddr;
use std::sync::mpsc;
use std::thread;

/// Something the connection owner may want to react to beyond the world
/// store itself.
#[derive(Debug)]
pub enum Event {
    ChunkReceived { x: i32, z: i32 },
    EntityMetadata { entity_id: i32, metadata: Metadata },
    Disconnect(format::Component),
}

/// One fully decoded chunk column, produced on the reader thread.
struct DecodedChunk {
    x: i32,
    z: i32,
    new: bool,
    // Which section slots this packet addresses. Empty means all of them.
    mask: Vec<u64>,
    column: terrain::DecodedColumn,
}

impl DecodedChunk {
    fn updates_section(&self, idx: usize) -> bool {
        if self.mask.is_empty() {
            return true;
        }
        self.mask
            .get(idx >> 6)
            .map_or(false, |word| word & (1 << (idx & 0x3F)) != 0)
    }
}

enum Message {
    Packet(packet::Packet),
    Dimension(Dimension),
    Column(Box<DecodedChunk>),
    Error(Error),
}

/// Follows JoinGame/Respawn on the read side so chunk payloads can be
/// decoded with the right column geometry before they are handed off.
struct DimensionTracker {
    registry: DimensionRegistry,
    current: Dimension,
    // Whether sections carry inline sky light (pre-1.14 overworld).
    sky_light: bool,
}

impl DimensionTracker {
    fn new(registry: DimensionRegistry) -> DimensionTracker {
        DimensionTracker {
            registry,
            current: Dimension::default(),
            sky_light: true,
        }
    }

    fn set_numeric(&mut self, dimension: i32) {
        self.current = Dimension::default();
        self.sky_light = dimension == 0;
    }

    fn set_named(&mut self, name: &str) {
        self.current = match self.registry.get(name) {
            Some(dim) => dim,
            None => {
                warn!("unknown dimension type {:?}, assuming classic bounds", name);
                Dimension::default()
            }
        };
        self.sky_light = true;
    }

    fn set_inline(&mut self, tag: Option<&galena_protocol::nbt::NamedTag>) {
        self.current = match tag {
            Some(tag) => Dimension::from_tag(&tag.1),
            None => Dimension::default(),
        };
        self.sky_light = true;
    }

    fn set_index(&mut self, index: i32) {
        self.current = match self.registry.by_index(index) {
            Some(dim) => dim,
            None => {
                warn!("dimension registry has no entry {}, assuming classic bounds", index);
                Dimension::default()
            }
        };
        self.sky_light = true;
    }

    fn load_codec(&mut self, codec: Option<&galena_protocol::nbt::NamedTag>) {
        if let Some(codec) = codec {
            self.registry.load_codec(&codec.1);
        }
    }

    /// Updates the tracked dimension for packets that change it, returning
    /// the new bounds so the owner can resize its world.
    fn observe(&mut self, pck: &packet::Packet) -> Option<Dimension> {
        use packet::Packet::*;
        match pck {
            JoinGame_i32(p) => self.set_numeric(p.dimension),
            JoinGame_ViewDistance(p) => self.set_numeric(p.dimension),
            JoinGame_HashedSeed_Respawn(p) => self.set_numeric(p.dimension),
            JoinGame_WorldNames(p) => {
                self.load_codec(p.dimension_codec.as_ref());
                self.set_named(&p.dimension);
            }
            JoinGame_WorldNames_IsHard(p) => {
                self.load_codec(p.dimension_codec.as_ref());
                self.set_inline(p.dimension.as_ref());
            }
            JoinGame_WorldNames_IsHard_SimDist_NBT(p) => {
                self.load_codec(p.dimension_codec.as_ref());
                self.set_inline(p.dimension.as_ref());
            }
            JoinGame_WorldNames_IsHard_SimDist(p) => {
                self.load_codec(p.dimension_codec.as_ref());
                self.set_named(&p.dimension);
            }
            JoinGame_Cooldown(p) => {
                self.load_codec(p.dimension_codec.as_ref());
                self.set_named(&p.dimension);
            }
            JoinGame_Config(p) => self.set_named(&p.dimension),
            JoinGame_Config_VarIntDim(p) => self.set_index(p.dimension.0),
            Respawn_i32(p) => self.set_numeric(p.dimension),
            Respawn_Gamemode(p) => self.set_numeric(p.dimension),
            Respawn_HashedSeed(p) => self.set_numeric(p.dimension),
            Respawn_WorldName(p) => self.set_named(&p.dimension),
            Respawn_NBT(p) => self.set_inline(p.dimension.as_ref()),
            Respawn_Death(p) => self.set_named(&p.dimension),
            Respawn_Cooldown(p) => self.set_named(&p.dimension),
            Respawn_Config(p) => self.set_named(&p.dimension),
            Respawn_Config_VarIntDim(p) => self.set_index(p.dimension.0),
            _ => return None,
        }
        Some(self.current)
    }
}

macro_rules! handle_packet {
    ($s:ident $pck:ident {
        $($packet:ident => $func:ident,)*
    }) => (
        match $pck {
        $(
            packet::Packet::$packet(val) => $s.$func(val),
        )*
            _ => {},
        }
    )
}

pub struct Server {
    conn: Option<protocol::Conn>,
    read_queue: Option<mpsc::Receiver<Message>>,
    pub protocol_version: i32,

    pub profile: mojang::Profile,
    pub world: world::World,
    pending_dimension: Dimension,

    pub position: (f64, f64, f64),
    pub yaw: f64,
    pub pitch: f64,
    on_ground: bool,
    pub gamemode: Gamemode,
    pub entity_id: i32,

    world_age: i64,
    world_time: f64,
    world_time_target: f64,
    tick_time: bool,

    view_position: Option<(i32, i32)>,
    events: Vec<Event>,
    disconnect_reason: Option<format::Component>,

    tick_timer: f64,
}

impl Server {
    /// Connects, logs in and runs the configuration phase, returning a
    /// server with its reader thread already pumping packets.
    pub fn connect(
        profile: mojang::Profile,
        online: bool,
        address: &str,
        protocol_version: i32,
    ) -> Result<Server, Error> {
        protocol::set_current_protocol_version(protocol_version);
        let target = resolve_address(address);
        let mut conn = protocol::Conn::new(&target, protocol_version)?;

        let host = conn.host.clone();
        let port = conn.port;
        conn.write_packet(packet::handshake::serverbound::Handshake {
            protocol_version: VarInt(protocol_version),
            host,
            port,
            next: VarInt(2),
        })?;
        conn.state = State::Login;

        // Split before login. Cloning resets cipher state, so both halves
        // have to exist before encryption is enabled on each.
        let mut read = conn.clone();
        let mut write = conn;
        write_login_start(&mut write, &profile, protocol_version)?;

        let mut registry = DimensionRegistry::new();
        login(&mut read, &mut write, &profile, online, protocol_version)?;

        if protocol_version >= 764 {
            write.write_packet(packet::login::serverbound::LoginAcknowledged { empty: () })?;
            read.state = State::Configuration;
            write.state = State::Configuration;
            configure(&mut read, &mut write, &mut registry)?;
            read.state = State::Play;
            write.state = State::Play;
        } else {
            read.state = State::Play;
            write.state = State::Play;
            write.write_packet(
                plugin_messages::Brand {
                    brand: "galena".into(),
                }
                .as_message(),
            )?;
            write_client_settings(&mut write, protocol_version)?;
        }

        let mut tracker = DimensionTracker::new(registry);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || loop {
            match read.read_packet() {
                Ok(Some(pck)) => {
                    if let Some(dim) = tracker.observe(&pck) {
                        if tx.send(Message::Dimension(dim)).is_err() {
                            return;
                        }
                    }
                    let msg = decode_chunk_packet(pck, read.protocol_version, &tracker);
                    let fatal = matches!(msg, Message::Error(_));
                    if tx.send(msg).is_err() || fatal {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    let _ = tx.send(Message::Error(err));
                    return;
                }
            }
        });

        Ok(Server::new(profile, Some(write), Some(rx), protocol_version))
    }

    fn new(
        profile: mojang::Profile,
        conn: Option<protocol::Conn>,
        read_queue: Option<mpsc::Receiver<Message>>,
        protocol_version: i32,
    ) -> Server {
        Server {
            conn,
            read_queue,
            protocol_version,

            profile,
            world: world::World::new(Dimension::default()),
            pending_dimension: Dimension::default(),

            position: (0.0, 64.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
            gamemode: Gamemode::Survival,
            entity_id: 0,

            world_age: 0,
            world_time: 0.0,
            world_time_target: 0.0,
            tick_time: true,

            view_position: None,
            events: Vec::new(),
            disconnect_reason: None,

            tick_timer: 0.0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn disconnect_reason(&self) -> Option<&format::Component> {
        self.disconnect_reason.as_ref()
    }

    pub fn view_position(&self) -> Option<(i32, i32)> {
        self.view_position
    }

    pub fn world_age(&self) -> i64 {
        self.world_age
    }

    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    /// Drains events gathered since the last call.
    pub fn poll_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Advances the client. `delta` is measured in 50ms server ticks
    /// scaled by 3 (one tick per 3.0 delta), matching a 60fps frame time.
    pub fn tick(&mut self, delta: f64) {
        self.drain_packets();

        self.tick_timer += delta;
        while self.tick_timer >= 3.0 && self.is_connected() {
            self.minecraft_tick();
            self.tick_timer -= 3.0;
        }

        self.update_time(delta);
    }

    fn drain_packets(&mut self) {
        if let Some(rx) = self.read_queue.take() {
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    Message::Dimension(dim) => self.pending_dimension = dim,
                    Message::Column(chunk) => self.on_column(*chunk),
                    Message::Error(err) => {
                        error!("connection lost: {}", err);
                        self.disconnect(format::Component::from_string(&format!("{}", err)));
                        return;
                    }
                    Message::Packet(pck) => handle_packet! {
                        self pck {
                            JoinGame_i32 => on_game_join_i32,
                            JoinGame_ViewDistance => on_game_join_viewdistance,
                            JoinGame_HashedSeed_Respawn => on_game_join_hashedseed,
                            JoinGame_WorldNames => on_game_join_worldnames,
                            JoinGame_WorldNames_IsHard => on_game_join_ishard,
                            JoinGame_WorldNames_IsHard_SimDist_NBT => on_game_join_simdist_nbt,
                            JoinGame_WorldNames_IsHard_SimDist => on_game_join_simdist,
                            JoinGame_Cooldown => on_game_join_cooldown,
                            JoinGame_Config => on_game_join_config,
                            JoinGame_Config_VarIntDim => on_game_join_config_varint,
                            Respawn_i32 => on_respawn_i32,
                            Respawn_Gamemode => on_respawn_gamemode,
                            Respawn_HashedSeed => on_respawn_hashedseed,
                            Respawn_WorldName => on_respawn_worldname,
                            Respawn_NBT => on_respawn_nbt,
                            Respawn_Death => on_respawn_death,
                            Respawn_Cooldown => on_respawn_cooldown,
                            Respawn_Config => on_respawn_config,
                            Respawn_Config_VarIntDim => on_respawn_config_varint,
                            KeepAliveClientbound_i64 => on_keep_alive,
                            TeleportPlayer_WithConfirm => on_teleport_confirm,
                            TeleportPlayer_WithDismount => on_teleport_dismount,
                            BlockChange_VarInt => on_block_change,
                            MultiBlockChange_VarInt => on_multi_block_change,
                            MultiBlockChange_Packed => on_multi_block_change_packed,
                            MultiBlockChange_Sections => on_multi_block_change_sections,
                            ChunkUnload => on_chunk_unload,
                            ChunkUnload_ZX => on_chunk_unload_zx,
                            UpdateViewPosition => on_update_view_position,
                            EntityMetadata => on_entity_metadata,
                            TimeUpdate => on_time_update,
                            ChangeGameState => on_game_state_change,
                            Disconnect => on_disconnect,
                        }
                    },
                }
            }
            if self.is_connected() {
                self.read_queue = Some(rx);
            }
        }
    }

    fn minecraft_tick(&mut self) {
        let (x, y, z) = self.position;
        let packet = packet::play::serverbound::PlayerPositionLook {
            x,
            y,
            z,
            yaw: self.yaw as f32,
            pitch: self.pitch as f32,
            on_ground: self.on_ground,
        };
        self.write_packet(packet);
    }

    fn update_time(&mut self, delta: f64) {
        if self.tick_time {
            self.world_time_target += delta / 3.0;
            self.world_time_target = (24000.0 + self.world_time_target) % 24000.0;
            let mut diff = self.world_time_target - self.world_time;
            if diff < -12000.0 {
                diff += 24000.0;
            } else if diff > 12000.0 {
                diff -= 24000.0;
            }
            self.world_time += diff * (1.5 / 60.0) * delta;
            self.world_time = (24000.0 + self.world_time) % 24000.0;
        } else {
            self.world_time = self.world_time_target;
        }
    }

    pub fn write_packet<T: protocol::PacketType>(&mut self, p: T) {
        let result = match self.conn.as_mut() {
            Some(conn) => conn.write_packet(p),
            None => return,
        };
        if let Err(err) = result {
            error!("failed to send packet: {}", err);
            self.disconnect(format::Component::from_string(&format!("{}", err)));
        }
    }

    fn disconnect(&mut self, reason: format::Component) {
        self.conn = None;
        self.read_queue = None;
        self.disconnect_reason = Some(reason.clone());
        self.events.push(Event::Disconnect(reason));
    }

    fn on_column(&mut self, mut chunk: DecodedChunk) {
        if self.world.dimension != self.pending_dimension {
            // Dimension changed without a world reset, resize now.
            self.world = world::World::new(self.pending_dimension);
        }
        if chunk.new {
            self.world.unload_chunk(chunk.x, chunk.z);
        }
        let sections = std::mem::take(&mut chunk.column.sections);
        let height = sections.len();
        for (i, section) in sections.into_iter().enumerate() {
            if chunk.updates_section(i) {
                self.world.store_chunk(chunk.x, i, chunk.z, height, section);
            }
        }
        if let Some(biomes) = chunk.column.biomes.take() {
            self.world.set_biomes(chunk.x, chunk.z, biomes);
        }
        if chunk.new {
            self.world.finish_chunk(chunk.x, chunk.z);
        }
        self.events.push(Event::ChunkReceived {
            x: chunk.x,
            z: chunk.z,
        });
    }

    fn join_world(&mut self, entity_id: i32, gamemode: u8) {
        self.entity_id = entity_id;
        self.gamemode = Gamemode::from_int((gamemode & 0x7) as i32);
        self.world = world::World::new(self.pending_dimension);
        info!(
            "joined as entity {} in {:?} mode",
            entity_id, self.gamemode
        );
    }

    fn respawn_world(&mut self, gamemode: u8) {
        self.gamemode = Gamemode::from_int((gamemode & 0x7) as i32);
        self.world = world::World::new(self.pending_dimension);
    }

    fn on_game_join_i32(&mut self, join: packet::play::clientbound::JoinGame_i32) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_viewdistance(&mut self, join: packet::play::clientbound::JoinGame_ViewDistance) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_hashedseed(
        &mut self,
        join: packet::play::clientbound::JoinGame_HashedSeed_Respawn,
    ) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_worldnames(&mut self, join: packet::play::clientbound::JoinGame_WorldNames) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_ishard(&mut self, join: packet::play::clientbound::JoinGame_WorldNames_IsHard) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_simdist_nbt(
        &mut self,
        join: packet::play::clientbound::JoinGame_WorldNames_IsHard_SimDist_NBT,
    ) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_simdist(
        &mut self,
        join: packet::play::clientbound::JoinGame_WorldNames_IsHard_SimDist,
    ) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_cooldown(&mut self, join: packet::play::clientbound::JoinGame_Cooldown) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_config(&mut self, join: packet::play::clientbound::JoinGame_Config) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_game_join_config_varint(
        &mut self,
        join: packet::play::clientbound::JoinGame_Config_VarIntDim,
    ) {
        self.join_world(join.entity_id, join.gamemode);
    }

    fn on_respawn_i32(&mut self, respawn: packet::play::clientbound::Respawn_i32) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_gamemode(&mut self, respawn: packet::play::clientbound::Respawn_Gamemode) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_hashedseed(&mut self, respawn: packet::play::clientbound::Respawn_HashedSeed) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_worldname(&mut self, respawn: packet::play::clientbound::Respawn_WorldName) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_nbt(&mut self, respawn: packet::play::clientbound::Respawn_NBT) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_death(&mut self, respawn: packet::play::clientbound::Respawn_Death) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_cooldown(&mut self, respawn: packet::play::clientbound::Respawn_Cooldown) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_config(&mut self, respawn: packet::play::clientbound::Respawn_Config) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_respawn_config_varint(
        &mut self,
        respawn: packet::play::clientbound::Respawn_Config_VarIntDim,
    ) {
        self.respawn_world(respawn.gamemode);
    }

    fn on_keep_alive(&mut self, keep_alive: packet::play::clientbound::KeepAliveClientbound_i64) {
        self.write_packet(packet::play::serverbound::KeepAliveServerbound_i64 { id: keep_alive.id });
    }

    fn on_teleport(&mut self, x: f64, y: f64, z: f64, yaw: f32, pitch: f32, flags: u8, id: VarInt) {
        self.position.0 = calculate_relative_teleport(TeleportFlag::RelX, flags, self.position.0, x);
        self.position.1 = calculate_relative_teleport(TeleportFlag::RelY, flags, self.position.1, y);
        self.position.2 = calculate_relative_teleport(TeleportFlag::RelZ, flags, self.position.2, z);
        self.yaw = calculate_relative_teleport(TeleportFlag::RelYaw, flags, self.yaw, yaw as f64);
        self.pitch =
            calculate_relative_teleport(TeleportFlag::RelPitch, flags, self.pitch, pitch as f64);

        self.write_packet(packet::play::serverbound::TeleportConfirm { teleport_id: id });
    }

    fn on_teleport_confirm(
        &mut self,
        teleport: packet::play::clientbound::TeleportPlayer_WithConfirm,
    ) {
        self.on_teleport(
            teleport.x,
            teleport.y,
            teleport.z,
            teleport.yaw,
            teleport.pitch,
            teleport.flags,
            teleport.teleport_id,
        );
    }

    fn on_teleport_dismount(
        &mut self,
        teleport: packet::play::clientbound::TeleportPlayer_WithDismount,
    ) {
        self.on_teleport(
            teleport.x,
            teleport.y,
            teleport.z,
            teleport.yaw,
            teleport.pitch,
            teleport.flags,
            teleport.teleport_id,
        );
    }

    fn on_block_change(&mut self, block_change: packet::play::clientbound::BlockChange_VarInt) {
        self.world.set_block(
            block_change.location.x,
            block_change.location.y,
            block_change.location.z,
            world::Block(block_change.block_id.0 as u16),
        );
    }

    fn on_multi_block_change(
        &mut self,
        block_change: packet::play::clientbound::MultiBlockChange_VarInt,
    ) {
        let ox = block_change.chunk_x << 4;
        let oz = block_change.chunk_z << 4;
        for record in block_change.records.data {
            self.world.set_block(
                ox + (record.xz >> 4) as i32,
                record.y as i32,
                oz + (record.xz & 0xF) as i32,
                world::Block(record.block_id.0 as u16),
            );
        }
    }

    fn apply_packed_records(&mut self, section_pos: u64, records: Vec<protocol::VarLong>) {
        let (sx, sy, sz) = unpack_section_pos(section_pos);
        for record in records {
            let (id, x, y, z) = unpack_block_record(record.0);
            self.world.set_block(
                (sx << 4) + x,
                (sy << 4) + y,
                (sz << 4) + z,
                world::Block(id),
            );
        }
    }

    fn on_multi_block_change_packed(
        &mut self,
        block_change: packet::play::clientbound::MultiBlockChange_Packed,
    ) {
        self.apply_packed_records(block_change.chunk_section_pos, block_change.records.data);
    }

    fn on_multi_block_change_sections(
        &mut self,
        block_change: packet::play::clientbound::MultiBlockChange_Sections,
    ) {
        self.apply_packed_records(block_change.chunk_section_pos, block_change.records.data);
    }

    fn on_chunk_unload(&mut self, chunk_unload: packet::play::clientbound::ChunkUnload) {
        self.world.unload_chunk(chunk_unload.x, chunk_unload.z);
    }

    fn on_chunk_unload_zx(&mut self, chunk_unload: packet::play::clientbound::ChunkUnload_ZX) {
        self.world.unload_chunk(chunk_unload.x, chunk_unload.z);
    }

    fn on_update_view_position(
        &mut self,
        view: packet::play::clientbound::UpdateViewPosition,
    ) {
        self.view_position = Some((view.chunk_x.0, view.chunk_z.0));
    }

    fn on_entity_metadata(&mut self, metadata: packet::play::clientbound::EntityMetadata) {
        self.events.push(Event::EntityMetadata {
            entity_id: metadata.entity_id.0,
            metadata: metadata.metadata,
        });
    }

    fn on_time_update(&mut self, time_update: packet::play::clientbound::TimeUpdate) {
        self.world_age = time_update.world_age;
        self.world_time_target = (time_update.time_of_day % 24000) as f64;
        if self.world_time_target < 0.0 {
            self.world_time_target = -self.world_time_target;
            self.tick_time = false;
        } else {
            self.tick_time = true;
        }
    }

    fn on_game_state_change(&mut self, game_state: packet::play::clientbound::ChangeGameState) {
        if game_state.reason == 3 {
            self.gamemode = Gamemode::from_int(game_state.value as i32);
        }
    }

    fn on_disconnect(&mut self, disconnect: packet::play::clientbound::Disconnect) {
        self.disconnect(disconnect.reason);
    }
}

/// Applies SRV redirection for addresses given without an explicit port.
fn resolve_address(address: &str) -> String {
    if address.contains(':') || address.parse::<IpAddr>().is_ok() {
        return address.to_owned();
    }
    match srv::lookup(address) {
        Some((host, port)) => {
            info!("srv record points {} at {}:{}", address, host, port);
            format!("{}:{}", host, port)
        }
        None => address.to_owned(),
    }
}

fn write_login_start(
    conn: &mut protocol::Conn,
    profile: &mojang::Profile,
    protocol_version: i32,
) -> Result<(), Error> {
    use packet::login::serverbound::*;
    let username = profile.username.clone();
    let uuid = UUID::from_str(&profile.id).ok();
    match protocol_version {
        759 => conn.write_packet(LoginStart_Sig {
            username,
            has_sig: false,
            ..Default::default()
        }),
        760 => conn.write_packet(LoginStart_Sig_UUID {
            username,
            has_sig: false,
            has_uuid: uuid.is_some(),
            uuid: uuid.unwrap_or_default(),
            ..Default::default()
        }),
        761..=763 => conn.write_packet(LoginStart_UUID_Opt {
            username,
            has_uuid: uuid.is_some(),
            uuid: uuid.unwrap_or_default(),
        }),
        v if v >= 764 => conn.write_packet(LoginStart_UUID {
            username,
            uuid: uuid.unwrap_or_default(),
        }),
        _ => conn.write_packet(LoginStart { username }),
    }
}

/// Runs the login state to completion: encryption, compression, plugin
/// requests, ending on a login success or a disconnect.
fn login(
    read: &mut protocol::Conn,
    write: &mut protocol::Conn,
    profile: &mojang::Profile,
    online: bool,
    protocol_version: i32,
) -> Result<(), Error> {
    use packet::Packet::*;
    loop {
        match read.read_packet()? {
            Some(EncryptionRequest(req)) => complete_encryption(
                read,
                write,
                profile,
                online,
                protocol_version,
                &req.server_id,
                &req.public_key.data,
                &req.verify_token.data,
            )?,
            Some(EncryptionRequest_Auth(req)) => complete_encryption(
                read,
                write,
                profile,
                online && req.should_authenticate,
                protocol_version,
                &req.server_id,
                &req.public_key.data,
                &req.verify_token.data,
            )?,
            Some(SetInitialCompression(val)) => {
                read.set_compression(val.threshold.0);
                write.set_compression(val.threshold.0);
            }
            Some(LoginPluginRequest(req)) => {
                // Reject every login plugin channel, vanilla servers accept
                // an unsuccessful empty response.
                debug!("rejecting login plugin channel {}", req.channel);
                write.write_packet(packet::login::serverbound::LoginPluginResponse {
                    message_id: req.message_id,
                    successful: false,
                    data: vec![],
                })?;
            }
            Some(LoginDisconnect(val)) => {
                return Err(Error::Disconnect(format::Component::from_string(&val.reason)))
            }
            Some(LoginSuccess_String(val)) => {
                debug!("logged in as {} ({})", val.username, val.uuid);
                return Ok(());
            }
            Some(LoginSuccess_UUID(val)) => {
                debug!("logged in as {} ({:?})", val.username, val.uuid);
                return Ok(());
            }
            Some(LoginSuccess_Sig(val)) => {
                debug!("logged in as {} ({:?})", val.username, val.uuid);
                return Ok(());
            }
            Some(LoginSuccess_Sig_Strict(val)) => {
                debug!("logged in as {} ({:?})", val.username, val.uuid);
                return Ok(());
            }
            Some(other) => {
                return Err(Error::Err(format!("wrong packet during login: {:?}", other)))
            }
            None => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn complete_encryption(
    read: &mut protocol::Conn,
    write: &mut protocol::Conn,
    profile: &mojang::Profile,
    authenticate: bool,
    protocol_version: i32,
    server_id: &str,
    public_key: &[u8],
    verify_token: &[u8],
) -> Result<(), Error> {
    let mut shared = [0u8; 16];
    rand::thread_rng().fill(&mut shared[..]);

    let shared_e = rsa_public_encrypt_pkcs1::encrypt(public_key, &shared)
        .map_err(|err| Error::Err(format!("failed to encrypt the shared secret: {:?}", err)))?;
    let token_e = rsa_public_encrypt_pkcs1::encrypt(public_key, verify_token)
        .map_err(|err| Error::Err(format!("failed to encrypt the verify token: {:?}", err)))?;

    if authenticate {
        profile.join_server(server_id, &shared, public_key)?;
    }

    if matches!(protocol_version, 759 | 760) {
        write.write_packet(packet::login::serverbound::EncryptionResponse_Sig {
            shared_secret: LenPrefixedBytes::new(shared_e),
            has_verify_token: true,
            verify_token: LenPrefixedBytes::new(token_e),
            ..Default::default()
        })?;
    } else {
        write.write_packet(packet::login::serverbound::EncryptionResponse {
            shared_secret: LenPrefixedBytes::new(shared_e),
            verify_token: LenPrefixedBytes::new(token_e),
        })?;
    }

    read.enable_encryption(&shared)?;
    write.enable_encryption(&shared)
}

fn write_client_settings(conn: &mut protocol::Conn, protocol_version: i32) -> Result<(), Error> {
    use packet::play::serverbound::*;
    if protocol_version >= 757 {
        conn.write_packet(ClientSettings_Listing {
            locale: "en_us".to_owned(),
            view_distance: 8,
            chat_mode: VarInt(0),
            chat_colors: true,
            displayed_skin_parts: 0x7F,
            main_hand: VarInt(1),
            enable_text_filtering: false,
            allow_server_listings: true,
        })
    } else if protocol_version >= 755 {
        conn.write_packet(ClientSettings_Filtering {
            locale: "en_us".to_owned(),
            view_distance: 8,
            chat_mode: VarInt(0),
            chat_colors: true,
            displayed_skin_parts: 0x7F,
            main_hand: VarInt(1),
            enable_text_filtering: false,
        })
    } else {
        conn.write_packet(ClientSettings {
            locale: "en_us".to_owned(),
            view_distance: 8,
            chat_mode: VarInt(0),
            chat_colors: true,
            displayed_skin_parts: 0x7F,
            main_hand: VarInt(1),
        })
    }
}

/// Runs the configuration phase (1.20.2+): settings and brand out,
/// registries in, ending on the finish acknowledgement.
fn configure(
    read: &mut protocol::Conn,
    write: &mut protocol::Conn,
    registry: &mut DimensionRegistry,
) -> Result<(), Error> {
    use packet::configuration::serverbound as sb;
    use packet::Packet::*;

    write.write_packet(sb::ConfigClientSettings {
        locale: "en_us".to_owned(),
        view_distance: 8,
        chat_mode: VarInt(0),
        chat_colors: true,
        displayed_skin_parts: 0x7F,
        main_hand: VarInt(1),
        enable_text_filtering: false,
        allow_server_listings: true,
    })?;
    write.write_packet(
        plugin_messages::Brand {
            brand: "galena".into(),
        }
        .as_config_message(),
    )?;

    loop {
        match read.read_packet()? {
            Some(ConfigKeepAlive(val)) => {
                write.write_packet(sb::ConfigKeepAliveServerbound { id: val.id })?
            }
            Some(ConfigPing(val)) => write.write_packet(sb::ConfigPong { id: val.id })?,
            Some(ConfigPluginMessage(val)) => {
                debug!("configuration plugin message on {}", val.channel)
            }
            Some(RegistryData(val)) => {
                if let Some(tag) = val.data {
                    registry.load_codec(&tag.1);
                }
            }
            Some(RegistryData_Entries(val)) => {
                if val.registry_id.contains("dimension_type") {
                    for entry in val.entries.data {
                        if let Some(tag) = entry.data {
                            registry.insert(&entry.id, Dimension::from_tag(&tag.1));
                        }
                    }
                }
            }
            Some(SelectKnownPacks(_)) => {
                // Claim no packs so the server sends every registry whole.
                write.write_packet(sb::SelectKnownPacksResponse {
                    packs: LenPrefixed::new(vec![]),
                })?
            }
            Some(ConfigDisconnect(val)) => return Err(Error::Disconnect(val.reason)),
            Some(FinishConfiguration(_)) => {
                write.write_packet(sb::FinishConfigurationAck { empty: () })?;
                return Ok(());
            }
            Some(other) => debug!("unhandled configuration packet: {:?}", other),
            None => {}
        }
    }
}

/// Turns chunk-data packets into decoded columns, passing everything else
/// through untouched.
fn decode_chunk_packet(
    pck: packet::Packet,
    protocol_version: i32,
    tracker: &DimensionTracker,
) -> Message {
    use packet::Packet::*;
    let result = match pck {
        ChunkData(p) => decode_legacy(
            protocol_version,
            p.chunk_x,
            p.chunk_z,
            p.new,
            p.bitmask.0 as u16,
            tracker.sky_light,
            &p.data.data,
            None,
        ),
        ChunkData_HeightMap(p) => decode_legacy(
            protocol_version,
            p.chunk_x,
            p.chunk_z,
            p.new,
            p.bitmask.0 as u16,
            tracker.sky_light,
            &p.data.data,
            None,
        ),
        ChunkData_Biomes3D(p) => {
            let biomes = biome_field(p.new, p.biomes.data.iter().map(|v| *v as i16));
            decode_legacy(
                protocol_version,
                p.chunk_x,
                p.chunk_z,
                p.new,
                p.bitmask.0 as u16,
                tracker.sky_light,
                &p.data.data,
                biomes,
            )
        }
        ChunkData_Biomes3D_Bool(p) => {
            let biomes = biome_field(p.new, p.biomes.data.iter().map(|v| *v as i16));
            decode_legacy(
                protocol_version,
                p.chunk_x,
                p.chunk_z,
                p.new,
                p.bitmask.0 as u16,
                tracker.sky_light,
                &p.data.data,
                biomes,
            )
        }
        ChunkData_Biomes3D_VarInt(p) => {
            let biomes = biome_field(p.new, p.biomes.data.iter().map(|v| v.0 as i16));
            decode_legacy(
                protocol_version,
                p.chunk_x,
                p.chunk_z,
                p.new,
                p.bitmask.0 as u16,
                tracker.sky_light,
                &p.data.data,
                biomes,
            )
        }
        ChunkData_StripBitmask(p) => terrain::decode_column_strip(
            protocol_version,
            &p.bitmask.data,
            tracker.current.section_count(),
            &p.data.data,
        )
        .map(|mut column| {
            column.biomes = Some(p.biomes.data.iter().map(|v| v.0 as i16).collect());
            DecodedChunk {
                x: p.chunk_x,
                z: p.chunk_z,
                new: true,
                mask: p.bitmask.data.clone(),
                column,
            }
        }),
        ChunkData_AndLight(p) => terrain::decode_column_full(
            protocol_version,
            tracker.current.section_count(),
            &p.data.data,
        )
        .map(|column| DecodedChunk {
            x: p.chunk_x,
            z: p.chunk_z,
            new: true,
            mask: Vec::new(),
            column,
        }),
        other => return Message::Packet(other),
    };

    match result {
        Ok(chunk) => Message::Column(Box::new(chunk)),
        Err(err) => Message::Error(err),
    }
}

fn biome_field<I: Iterator<Item = i16>>(new: bool, iter: I) -> Option<Vec<i16>> {
    if new {
        Some(iter.collect())
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_legacy(
    protocol_version: i32,
    x: i32,
    z: i32,
    new: bool,
    bitmask: u16,
    sky_light: bool,
    data: &[u8],
    biomes: Option<Vec<i16>>,
) -> Result<DecodedChunk, Error> {
    let mut column = terrain::decode_column_legacy(protocol_version, new, bitmask, sky_light, data)?;
    if biomes.is_some() {
        column.biomes = biomes;
    }
    Ok(DecodedChunk {
        x,
        z,
        new,
        mask: vec![u64::from(bitmask)],
        column,
    })
}

/// Splits the 1.16.2+ packed section position into (x, y, z) section
/// coordinates. x and z are 22 bits, y the low 20, all signed.
fn unpack_section_pos(pos: u64) -> (i32, i32, i32) {
    let pos = pos as i64;
    ((pos >> 42) as i32, ((pos << 44) >> 44) as i32, ((pos << 22) >> 42) as i32)
}

/// Splits a packed block record into (state id, x, y, z) within a section.
fn unpack_block_record(record: i64) -> (u16, i32, i32, i32) {
    (
        (record >> 12) as u16,
        ((record >> 8) & 0xF) as i32,
        (record & 0xF) as i32,
        ((record >> 4) & 0xF) as i32,
    )
}

#[derive(Debug, Clone, Copy)]
enum TeleportFlag {
    RelX = 0b00001,
    RelY = 0b00010,
    RelZ = 0b00100,
    RelYaw = 0b01000,
    RelPitch = 0b10000,
}

fn calculate_relative_teleport(flag: TeleportFlag, flags: u8, base: f64, val: f64) -> f64 {
    if (flags & (flag as u8)) == 0 {
        val
    } else {
        base + val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galena_protocol::nbt;

    #[test]
    fn relative_teleports_add_absolute_replace() {
        assert_eq!(
            calculate_relative_teleport(TeleportFlag::RelX, 0b00001, 10.0, 2.0),
            12.0
        );
        assert_eq!(
            calculate_relative_teleport(TeleportFlag::RelX, 0, 10.0, 2.0),
            2.0
        );
        assert_eq!(
            calculate_relative_teleport(TeleportFlag::RelYaw, 0b01000, 90.0, -10.0),
            80.0
        );
    }

    #[test]
    fn section_positions_unpack_signed() {
        // x=5, z=-3, y=-2
        let packed = ((5i64 & 0x3FFFFF) << 42) | ((-3i64 & 0x3FFFFF) << 20) | (-2i64 & 0xFFFFF);
        assert_eq!(unpack_section_pos(packed as u64), (5, -2, -3));
    }

    #[test]
    fn block_records_unpack() {
        let record = (1234i64 << 12) | (7 << 8) | (3 << 4) | 9;
        assert_eq!(unpack_block_record(record), (1234, 7, 9, 3));
    }

    #[test]
    fn tracker_reads_inline_dimension_nbt() {
        let mut element = nbt::Tag::new_compound();
        element.put("min_y", nbt::Tag::Int(-64));
        element.put("height", nbt::Tag::Int(384));
        let tag = nbt::NamedTag(String::new(), element);

        let mut tracker = DimensionTracker::new(DimensionRegistry::new());
        tracker.set_inline(Some(&tag));
        assert_eq!(
            tracker.current,
            Dimension {
                min_y: -64,
                height: 384
            }
        );
    }

    #[test]
    fn tracker_falls_back_for_unknown_names() {
        let mut registry = DimensionRegistry::new();
        registry.insert(
            "minecraft:overworld",
            Dimension {
                min_y: -64,
                height: 384,
            },
        );
        let mut tracker = DimensionTracker::new(registry);
        tracker.set_named("minecraft:overworld");
        assert_eq!(tracker.current.height, 384);
        tracker.set_named("minecraft:the_moon");
        assert_eq!(tracker.current, Dimension::default());
    }

    #[test]
    fn numeric_dimensions_control_sky_light() {
        let mut tracker = DimensionTracker::new(DimensionRegistry::new());
        tracker.set_numeric(0);
        assert!(tracker.sky_light);
        tracker.set_numeric(-1);
        assert!(!tracker.sky_light);
    }

    #[test]
    fn decoded_columns_commit_through_the_store() {
        let mut server = Server::new(mojang::Profile::default(), None, None, 578);

        let mut section = world::Chunk::new();
        section.set(1, 2, 3, world::Block(9));
        let mut sections = vec![None; 16];
        sections[1] = Some(section);

        server.on_column(DecodedChunk {
            x: 4,
            z: -2,
            new: true,
            mask: vec![0b10],
            column: terrain::DecodedColumn {
                sections,
                biomes: Some(vec![0; 16 * 64]),
            },
        });

        assert_eq!(server.world.get_block(4 * 16 + 1, 16 + 2, -2 * 16 + 3), world::Block(9));
        assert_eq!(server.world.get_block(4 * 16 + 1, 2, -2 * 16 + 3), world::Block(0));
        assert!(matches!(
            server.poll_events().as_slice(),
            [Event::ChunkReceived { x: 4, z: -2 }]
        ));
    }

    #[test]
    fn decoded_chunks_mask_their_sections() {
        let chunk = DecodedChunk {
            x: 0,
            z: 0,
            new: true,
            mask: vec![0b101],
            column: terrain::DecodedColumn {
                sections: Vec::new(),
                biomes: None,
            },
        };
        assert!(chunk.updates_section(0));
        assert!(!chunk.updates_section(1));
        assert!(chunk.updates_section(2));

        let all = DecodedChunk {
            mask: Vec::new(),
            ..chunk
        };
        assert!(all.updates_section(63));
    }
}
