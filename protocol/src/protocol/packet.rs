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

use crate::nbt;

state_packets!(
    handshake Handshaking {
        serverbound Serverbound {
            /// Handshake is the first packet sent in the protocol.
            /// Its used for deciding if the request is a client
            /// is requesting status information about the server
            /// (MOTD, players etc) or trying to login to the server.
            ///
            /// The host and port fields are not used by the vanilla
            /// server but are there for virtual server hosting to
            /// be able to redirect a client to a target server with
            /// a single address + port.
            packet Handshake {
                /// The protocol version of the connecting client
                field protocol_version: VarInt =,
                /// The hostname the client connected to
                field host: String =,
                /// The port the client connected to
                field port: u16 =,
                /// The next protocol state the client wants
                field next: VarInt =,
            }
        }
        clientbound Clientbound {
        }
    }
    status Status {
        serverbound Serverbound {
            /// StatusRequest is sent by the client instantly after
            /// switching to the Status protocol state and is used
            /// to signal the server to send a StatusResponse to the
            /// client
            packet StatusRequest {
                field empty: () =,
            }
            /// StatusPing is sent by the client after recieving a
            /// StatusResponse. The client uses the time from sending
            /// the ping until the time of recieving a pong to measure
            /// the latency between the client and the server.
            packet StatusPing {
                field ping: i64 =,
            }
        }
        clientbound Clientbound {
            /// StatusResponse is sent as a reply to a StatusRequest.
            /// The Status should contain a json encoded structure with
            /// version information, a player sample, a description/MOTD
            /// and optionally a favicon.
            packet StatusResponse {
                field status: String =,
            }
            /// StatusPong is sent as a reply to a StatusPing.
            /// The Time field should be exactly the same as the
            /// one sent by the client.
            packet StatusPong {
                field ping: i64 =,
            }
        }
    }
    login Login {
        serverbound Serverbound {
            /// LoginStart is sent immeditately after switching into the login
            /// state. The passed username gives the server a chance to fetch
            /// the player's info from the session servers.
            packet LoginStart {
                field username: String =,
            }
            /// 1.19 variant carrying the optional chat signing key.
            /// Offline clients leave the key out.
            packet LoginStart_Sig {
                field username: String =,
                field has_sig: bool =,
                field timestamp: i64 = when(|p: &LoginStart_Sig| p.has_sig),
                field public_key: LenPrefixedBytes<VarInt> = when(|p: &LoginStart_Sig| p.has_sig),
                field signature: LenPrefixedBytes<VarInt> = when(|p: &LoginStart_Sig| p.has_sig),
            }
            /// 1.19.1 added the optional profile uuid after the key.
            packet LoginStart_Sig_UUID {
                field username: String =,
                field has_sig: bool =,
                field timestamp: i64 = when(|p: &LoginStart_Sig_UUID| p.has_sig),
                field public_key: LenPrefixedBytes<VarInt> = when(|p: &LoginStart_Sig_UUID| p.has_sig),
                field signature: LenPrefixedBytes<VarInt> = when(|p: &LoginStart_Sig_UUID| p.has_sig),
                field has_uuid: bool =,
                field uuid: UUID = when(|p: &LoginStart_Sig_UUID| p.has_uuid),
            }
            /// 1.19.3 dropped the signing key, keeping the optional uuid.
            packet LoginStart_UUID_Opt {
                field username: String =,
                field has_uuid: bool =,
                field uuid: UUID = when(|p: &LoginStart_UUID_Opt| p.has_uuid),
            }
            /// 1.20.2 made the profile uuid mandatory.
            packet LoginStart_UUID {
                field username: String =,
                field uuid: UUID =,
            }
            /// EncryptionResponse is sent as a reply to EncryptionRequest.
            /// Both fields are encrypted with the server's public key.
            packet EncryptionResponse {
                /// The key for the AES/CFB8 cipher encrypted with the
                /// public key
                field shared_secret: LenPrefixedBytes<VarInt> =,
                /// The verify token from the request encrypted with the
                /// public key
                field verify_token: LenPrefixedBytes<VarInt> =,
            }
            /// 1.19/1.19.2 let clients answer with a salted signature
            /// instead of the verify token when chat signing is active.
            packet EncryptionResponse_Sig {
                field shared_secret: LenPrefixedBytes<VarInt> =,
                field has_verify_token: bool =,
                field verify_token: LenPrefixedBytes<VarInt> = when(|p: &EncryptionResponse_Sig| p.has_verify_token),
                field salt: i64 = when(|p: &EncryptionResponse_Sig| !p.has_verify_token),
                field signature: LenPrefixedBytes<VarInt> = when(|p: &EncryptionResponse_Sig| !p.has_verify_token),
            }
            packet LoginPluginResponse {
                field message_id: VarInt =,
                field successful: bool =,
                field data: Vec<u8> =,
            }
            /// Acknowledges the LoginSuccess and moves the connection
            /// into the configuration state (1.20.2+).
            packet LoginAcknowledged {
                field empty: () =,
            }
        }
        clientbound Clientbound {
            /// LoginDisconnect is sent by the server if there was any issues
            /// authenticating the player during login or the general server
            /// issues (e.g. too many players). The reason is always a json
            /// encoded chat component, even on versions that moved play
            /// disconnects to nbt.
            packet LoginDisconnect {
                field reason: String =,
            }
            /// EncryptionRequest is sent by the server if it is in online mode
            /// to trigger the client to authenticate with the session servers.
            packet EncryptionRequest {
                /// Generally empty, left in from legacy auth but is still used
                /// by the client if provided
                field server_id: String =,
                /// A RSA Public key serialized in x.509 PRIX format
                field public_key: LenPrefixedBytes<VarInt> =,
                /// Token used by the server to verify encryption is working
                /// correctly
                field verify_token: LenPrefixedBytes<VarInt> =,
            }
            /// 1.20.5 added a flag telling the client whether it should
            /// talk to the session servers at all.
            packet EncryptionRequest_Auth {
                field server_id: String =,
                field public_key: LenPrefixedBytes<VarInt> =,
                field verify_token: LenPrefixedBytes<VarInt> =,
                field should_authenticate: bool =,
            }
            /// LoginSuccess is sent by the server if the player successfully
            /// authenicates. Pre-1.16 sends the uuid as a hyphenated string.
            packet LoginSuccess_String {
                field uuid: String =,
                field username: String =,
            }
            packet LoginSuccess_UUID {
                field uuid: UUID =,
                field username: String =,
            }
            /// 1.19 attached the profile property list (skin signature).
            packet LoginSuccess_Sig {
                field uuid: UUID =,
                field username: String =,
                field properties: LenPrefixed<VarInt, packet::LoginProperty> =,
            }
            /// 1.20.5 appended the strict error handling flag.
            packet LoginSuccess_Sig_Strict {
                field uuid: UUID =,
                field username: String =,
                field properties: LenPrefixed<VarInt, packet::LoginProperty> =,
                field strict_error_handling: bool =,
            }
            /// SetInitialCompression sets the compression threshold during the
            /// login state.
            packet SetInitialCompression {
                /// Threshold where a packet should be sent compressed
                field threshold: VarInt =,
            }
            packet LoginPluginRequest {
                field message_id: VarInt =,
                field channel: String =,
                field data: Vec<u8> =,
            }
        }
    }
    configuration Configuration {
        serverbound Serverbound {
            packet ConfigClientSettings {
                field locale: String =,
                field view_distance: u8 =,
                field chat_mode: VarInt =,
                field chat_colors: bool =,
                field displayed_skin_parts: u8 =,
                field main_hand: VarInt =,
                field enable_text_filtering: bool =,
                field allow_server_listings: bool =,
            }
            packet ConfigPluginMessageServerbound {
                field channel: String =,
                field data: Vec<u8> =,
            }
            /// Acknowledges FinishConfiguration and moves the
            /// connection into the play state.
            packet FinishConfigurationAck {
                field empty: () =,
            }
            packet ConfigKeepAliveServerbound {
                field id: i64 =,
            }
            packet ConfigPong {
                field id: i32 =,
            }
            /// Tells the server which data packs the client already has,
            /// letting it omit their registry contents (1.20.5+).
            packet SelectKnownPacksResponse {
                field packs: LenPrefixed<VarInt, packet::KnownPack> =,
            }
        }
        clientbound Clientbound {
            packet ConfigPluginMessage {
                field channel: String =,
                field data: Vec<u8> =,
            }
            packet ConfigDisconnect {
                field reason: format::Component =,
            }
            /// The server is done syncing registries and settings. The
            /// client acknowledges to enter play.
            packet FinishConfiguration {
                field empty: () =,
            }
            packet ConfigKeepAlive {
                field id: i64 =,
            }
            packet ConfigPing {
                field id: i32 =,
            }
            /// The full registry codec as one nbt blob (1.20.2/1.20.4).
            packet RegistryData {
                field data: Option<nbt::NamedTag> =,
            }
            /// 1.20.5 split the codec into one packet per registry with
            /// individually optional entry payloads.
            packet RegistryData_Entries {
                field registry_id: String =,
                field entries: LenPrefixed<VarInt, packet::RegistryEntry> =,
            }
            packet SelectKnownPacks {
                field packs: LenPrefixed<VarInt, packet::KnownPack> =,
            }
        }
    }
    play Play {
        serverbound Serverbound {
            /// TeleportConfirm is sent by the client as a reply to a telport
            /// from the server.
            packet TeleportConfirm {
                field teleport_id: VarInt =,
            }
            /// ChatMessage is used by the client to send chat messages to the
            /// server. Only mapped up to 1.18.2, later versions require
            /// signed chat.
            packet ChatMessage {
                field message: String =,
            }
            /// ClientSettings is sent by the client to update its current
            /// settings.
            packet ClientSettings {
                field locale: String =,
                field view_distance: u8 =,
                field chat_mode: VarInt =,
                field chat_colors: bool =,
                field displayed_skin_parts: u8 =,
                field main_hand: VarInt =,
            }
            /// 1.17 added the text filtering toggle.
            packet ClientSettings_Filtering {
                field locale: String =,
                field view_distance: u8 =,
                field chat_mode: VarInt =,
                field chat_colors: bool =,
                field displayed_skin_parts: u8 =,
                field main_hand: VarInt =,
                field enable_text_filtering: bool =,
            }
            /// 1.18 added the server listing toggle.
            packet ClientSettings_Listing {
                field locale: String =,
                field view_distance: u8 =,
                field chat_mode: VarInt =,
                field chat_colors: bool =,
                field displayed_skin_parts: u8 =,
                field main_hand: VarInt =,
                field enable_text_filtering: bool =,
                field allow_server_listings: bool =,
            }
            /// PluginMessageServerbound is used for custom messages between
            /// the client and server. This is mainly for plugins/mods but
            /// vanilla has a few channels registered too.
            packet PluginMessageServerbound {
                field channel: String =,
                field data: Vec<u8> =,
            }
            /// KeepAliveServerbound is sent by a client as a response to a
            /// KeepAliveClientbound. If the client doesn't reply the server
            /// may disconnect the client.
            packet KeepAliveServerbound_i64 {
                field id: i64 =,
            }
            /// PlayerPositionLook is a combination of PlayerPosition and
            /// PlayerLook.
            packet PlayerPositionLook {
                field x: f64 =,
                field y: f64 =,
                field z: f64 =,
                field yaw: f32 =,
                field pitch: f32 =,
                field on_ground: bool =,
            }
        }
        clientbound Clientbound {
            /// BlockChange is used to update a single block on the client.
            packet BlockChange_VarInt {
                field location: Position =,
                field block_id: VarInt =,
            }
            /// MultiBlockChange is used to update a batch of blocks in a
            /// single packet.
            packet MultiBlockChange_VarInt {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field records: LenPrefixed<VarInt, packet::BlockChangeRecord> =,
            }
            /// 1.16.2 packs the whole batch into one section position and
            /// per-record varlongs.
            packet MultiBlockChange_Packed {
                field chunk_section_pos: u64 =,
                field suppress_light_updates: bool =,
                field records: LenPrefixed<VarInt, VarLong> =,
            }
            /// 1.20 dropped the light suppression flag.
            packet MultiBlockChange_Sections {
                field chunk_section_pos: u64 =,
                field records: LenPrefixed<VarInt, VarLong> =,
            }
            /// PluginMessageClientbound mirrors PluginMessageServerbound.
            packet PluginMessageClientbound {
                field channel: String =,
                field data: Vec<u8> =,
            }
            /// Disconnect causes the client to disconnect displaying the
            /// passed reason.
            packet Disconnect {
                field reason: format::Component =,
            }
            /// ChangeGameState is used to modify the game's state like
            /// gamemode or weather.
            packet ChangeGameState {
                field reason: u8 =,
                field value: f32 =,
            }
            /// KeepAliveClientbound is sent by a server to check if the
            /// client is still responding and keep the connection open.
            /// The client should reply with the KeepAliveServerbound
            /// packet setting ID to the same as this one.
            packet KeepAliveClientbound_i64 {
                field id: i64 =,
            }
            /// ChunkData sends or updates a single chunk on the client.
            /// If New is set then biome data should be sent too.
            packet ChunkData {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field new: bool =,
                field bitmask: VarInt =,
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, Option<nbt::NamedTag>> =,
            }
            /// 1.14 attached the heightmaps and moved lighting out of the
            /// section payload.
            packet ChunkData_HeightMap {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field new: bool =,
                field bitmask: VarInt =,
                field heightmaps: Option<nbt::NamedTag> =,
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, Option<nbt::NamedTag>> =,
            }
            /// 1.15 moved biomes out of the section payload into a fixed
            /// 1024 entry cube grid sent for full chunks.
            packet ChunkData_Biomes3D {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field new: bool =,
                field bitmask: VarInt =,
                field heightmaps: Option<nbt::NamedTag> =,
                field biomes: Biomes3D = when(|p: &ChunkData_Biomes3D| p.new),
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, Option<nbt::NamedTag>> =,
            }
            /// 1.16 added the ignore old data flag.
            packet ChunkData_Biomes3D_Bool {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field new: bool =,
                field ignore_old_data: bool =,
                field bitmask: VarInt =,
                field heightmaps: Option<nbt::NamedTag> =,
                field biomes: Biomes3D = when(|p: &ChunkData_Biomes3D_Bool| p.new),
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, Option<nbt::NamedTag>> =,
            }
            /// 1.16.2 made the biome grid length prefixed.
            packet ChunkData_Biomes3D_VarInt {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field new: bool =,
                field bitmask: VarInt =,
                field heightmaps: Option<nbt::NamedTag> =,
                field biomes: LenPrefixed<VarInt, VarInt> = when(|p: &ChunkData_Biomes3D_VarInt| p.new),
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, Option<nbt::NamedTag>> =,
            }
            /// 1.17 widened the section bitmask to a long array for the
            /// taller worlds and dropped the full chunk flag.
            packet ChunkData_StripBitmask {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field bitmask: LenPrefixed<VarInt, u64> =,
                field heightmaps: Option<nbt::NamedTag> =,
                field biomes: LenPrefixed<VarInt, VarInt> =,
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, Option<nbt::NamedTag>> =,
            }
            /// 1.18 merged lighting back into the chunk packet, typed the
            /// block entity records and made every section present.
            packet ChunkData_AndLight {
                field chunk_x: i32 =,
                field chunk_z: i32 =,
                field heightmaps: Option<nbt::NamedTag> =,
                field data: LenPrefixedBytes<VarInt> =,
                field block_entities: LenPrefixed<VarInt, packet::ChunkBlockEntity> =,
                field light: packet::LightData =,
            }
            /// ChunkUnload tells the client to unload the chunk at the
            /// specified position.
            packet ChunkUnload {
                field x: i32 =,
                field z: i32 =,
            }
            /// 1.20.2 swapped the field order.
            packet ChunkUnload_ZX {
                field z: i32 =,
                field x: i32 =,
            }
            /// UpdateLight updates the lighting for a chunk. The payload is
            /// consumed as one blob on versions where the array lengths
            /// are not individually prefixed.
            packet UpdateLight_Masks {
                field chunk_x: VarInt =,
                field chunk_z: VarInt =,
                field data: Vec<u8> =,
            }
            packet UpdateLight_Arrays {
                field chunk_x: VarInt =,
                field chunk_z: VarInt =,
                field light: packet::LightData =,
            }
            /// JoinGame is sent after completing the login process. This
            /// sets the initial state for the client.
            packet JoinGame_i32 {
                /// The entity id the client will be referenced by
                field entity_id: i32 =,
                /// The starting gamemode of the client
                field gamemode: u8 =,
                /// The dimension the client is starting in
                field dimension: i32 =,
                /// The difficuilty setting for the server
                field difficulty: u8 =,
                /// The max number of players on the server
                field max_players: u8 =,
                /// The level type of the server
                field level_type: String =,
            }
            /// 1.14 moved difficulty to its own packet and added the view
            /// distance.
            packet JoinGame_ViewDistance {
                field entity_id: i32 =,
                field gamemode: u8 =,
                field dimension: i32 =,
                field max_players: u8 =,
                field level_type: String =,
                field view_distance: VarInt =,
                field reduced_debug_info: bool =,
            }
            /// 1.15 added the hashed seed and respawn screen toggle.
            packet JoinGame_HashedSeed_Respawn {
                field entity_id: i32 =,
                field gamemode: u8 =,
                field dimension: i32 =,
                field hashed_seed: i64 =,
                field max_players: u8 =,
                field level_type: String =,
                field view_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
            }
            /// 1.16 replaced numeric dimensions with the registry codec
            /// and named worlds.
            packet JoinGame_WorldNames {
                field entity_id: i32 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field world_names: LenPrefixed<VarInt, String> =,
                field dimension_codec: Option<nbt::NamedTag> =,
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field max_players: u8 =,
                field view_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field is_debug: bool =,
                field is_flat: bool =,
            }
            /// 1.16.2 added the hardcore flag and inlined the dimension
            /// type as nbt.
            packet JoinGame_WorldNames_IsHard {
                field entity_id: i32 =,
                field is_hardcore: bool =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field world_names: LenPrefixed<VarInt, String> =,
                field dimension_codec: Option<nbt::NamedTag> =,
                field dimension: Option<nbt::NamedTag> =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field max_players: VarInt =,
                field view_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field is_debug: bool =,
                field is_flat: bool =,
            }
            /// 1.18 added the simulation distance.
            packet JoinGame_WorldNames_IsHard_SimDist_NBT {
                field entity_id: i32 =,
                field is_hardcore: bool =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field world_names: LenPrefixed<VarInt, String> =,
                field dimension_codec: Option<nbt::NamedTag> =,
                field dimension: Option<nbt::NamedTag> =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field max_players: VarInt =,
                field view_distance: VarInt =,
                field simulation_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field is_debug: bool =,
                field is_flat: bool =,
            }
            /// 1.19 named the dimension type and added the optional death
            /// location.
            packet JoinGame_WorldNames_IsHard_SimDist {
                field entity_id: i32 =,
                field is_hardcore: bool =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field world_names: LenPrefixed<VarInt, String> =,
                field dimension_codec: Option<nbt::NamedTag> =,
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field max_players: VarInt =,
                field view_distance: VarInt =,
                field simulation_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field is_debug: bool =,
                field is_flat: bool =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &JoinGame_WorldNames_IsHard_SimDist| p.has_death_location),
                field death_location: Position = when(|p: &JoinGame_WorldNames_IsHard_SimDist| p.has_death_location),
            }
            /// 1.20 added the portal cooldown.
            packet JoinGame_Cooldown {
                field entity_id: i32 =,
                field is_hardcore: bool =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field world_names: LenPrefixed<VarInt, String> =,
                field dimension_codec: Option<nbt::NamedTag> =,
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field max_players: VarInt =,
                field view_distance: VarInt =,
                field simulation_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field is_debug: bool =,
                field is_flat: bool =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &JoinGame_Cooldown| p.has_death_location),
                field death_location: Position = when(|p: &JoinGame_Cooldown| p.has_death_location),
                field portal_cooldown: VarInt =,
            }
            /// 1.20.2 moved the registry codec into the configuration
            /// state and reordered the remaining fields.
            packet JoinGame_Config {
                field entity_id: i32 =,
                field is_hardcore: bool =,
                field world_names: LenPrefixed<VarInt, String> =,
                field max_players: VarInt =,
                field view_distance: VarInt =,
                field simulation_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field limited_crafting: bool =,
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &JoinGame_Config| p.has_death_location),
                field death_location: Position = when(|p: &JoinGame_Config| p.has_death_location),
                field portal_cooldown: VarInt =,
            }
            /// 1.20.5 references the dimension type by registry index and
            /// appends the secure chat flag.
            packet JoinGame_Config_VarIntDim {
                field entity_id: i32 =,
                field is_hardcore: bool =,
                field world_names: LenPrefixed<VarInt, String> =,
                field max_players: VarInt =,
                field view_distance: VarInt =,
                field simulation_distance: VarInt =,
                field reduced_debug_info: bool =,
                field enable_respawn_screen: bool =,
                field limited_crafting: bool =,
                field dimension: VarInt =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &JoinGame_Config_VarIntDim| p.has_death_location),
                field death_location: Position = when(|p: &JoinGame_Config_VarIntDim| p.has_death_location),
                field portal_cooldown: VarInt =,
                field enforces_secure_chat: bool =,
            }
            /// TeleportPlayer is sent to change the player's position. The
            /// client is expected to reply to the server with the same
            /// positions as contained in this packet otherwise will reject
            /// future packets.
            packet TeleportPlayer_WithConfirm {
                field x: f64 =,
                field y: f64 =,
                field z: f64 =,
                field yaw: f32 =,
                field pitch: f32 =,
                field flags: u8 =,
                field teleport_id: VarInt =,
            }
            /// 1.17 added the dismount flag, 1.19.4 removed it again.
            packet TeleportPlayer_WithDismount {
                field x: f64 =,
                field y: f64 =,
                field z: f64 =,
                field yaw: f32 =,
                field pitch: f32 =,
                field flags: u8 =,
                field teleport_id: VarInt =,
                field dismount: bool =,
            }
            /// Respawn is sent to respawn the player after death or when
            /// they move worlds.
            packet Respawn_i32 {
                field dimension: i32 =,
                field difficulty: u8 =,
                field gamemode: u8 =,
                field level_type: String =,
            }
            packet Respawn_Gamemode {
                field dimension: i32 =,
                field gamemode: u8 =,
                field level_type: String =,
            }
            packet Respawn_HashedSeed {
                field dimension: i32 =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field level_type: String =,
            }
            packet Respawn_WorldName {
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field copy_metadata: bool =,
            }
            /// 1.16.2 through 1.18.2 inline the dimension type as nbt.
            packet Respawn_NBT {
                field dimension: Option<nbt::NamedTag> =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field copy_metadata: bool =,
            }
            /// 1.19 went back to named dimension types and added the
            /// optional death location.
            packet Respawn_Death {
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field data_kept: u8 =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &Respawn_Death| p.has_death_location),
                field death_location: Position = when(|p: &Respawn_Death| p.has_death_location),
            }
            /// 1.20 appended the portal cooldown.
            packet Respawn_Cooldown {
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field data_kept: u8 =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &Respawn_Cooldown| p.has_death_location),
                field death_location: Position = when(|p: &Respawn_Cooldown| p.has_death_location),
                field portal_cooldown: VarInt =,
            }
            /// 1.20.2 moved the data kept flag to the end.
            packet Respawn_Config {
                field dimension: String =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &Respawn_Config| p.has_death_location),
                field death_location: Position = when(|p: &Respawn_Config| p.has_death_location),
                field portal_cooldown: VarInt =,
                field data_kept: u8 =,
            }
            /// 1.20.5 references the dimension type by registry index.
            packet Respawn_Config_VarIntDim {
                field dimension: VarInt =,
                field world_name: String =,
                field hashed_seed: i64 =,
                field gamemode: u8 =,
                field previous_gamemode: u8 =,
                field is_debug: bool =,
                field is_flat: bool =,
                field has_death_location: bool =,
                field death_dimension: String = when(|p: &Respawn_Config_VarIntDim| p.has_death_location),
                field death_location: Position = when(|p: &Respawn_Config_VarIntDim| p.has_death_location),
                field portal_cooldown: VarInt =,
                field data_kept: u8 =,
            }
            /// UpdateViewPosition is used to determine what chunks should
            /// be remain loaded on the client.
            packet UpdateViewPosition {
                field chunk_x: VarInt =,
                field chunk_z: VarInt =,
            }
            /// EntityMetadata updates the metadata for an entity.
            packet EntityMetadata {
                field entity_id: VarInt =,
                field metadata: types::Metadata =,
            }
            /// TimeUpdate is sent to sync the world's time to the client.
            packet TimeUpdate {
                field world_age: i64 =,
                field time_of_day: i64 =,
            }
        }
    }
);

#[derive(Debug, Default)]
pub struct LoginProperty {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

impl Serializable for LoginProperty {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        let name = String::read_from(buf)?;
        let value = String::read_from(buf)?;
        let signature = if bool::read_from(buf)? {
            Some(String::read_from(buf)?)
        } else {
            None
        };
        Ok(LoginProperty {
            name,
            value,
            signature,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        self.name.write_to(buf)?;
        self.value.write_to(buf)?;
        self.signature.is_some().write_to(buf)?;
        if let Some(ref sig) = self.signature {
            sig.write_to(buf)?;
        }
        Ok(())
    }
}

/// A typed block entity record as sent inside 1.18+ chunk data. The
/// x/z offsets within the chunk are packed into one byte.
#[derive(Debug, Default)]
pub struct ChunkBlockEntity {
    pub packed_xz: u8,
    pub y: i16,
    pub ty: VarInt,
    pub tag: Option<nbt::NamedTag>,
}

impl ChunkBlockEntity {
    pub fn x(&self) -> i32 {
        (self.packed_xz >> 4) as i32
    }

    pub fn z(&self) -> i32 {
        (self.packed_xz & 0xF) as i32
    }
}

impl Serializable for ChunkBlockEntity {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        Ok(ChunkBlockEntity {
            packed_xz: Serializable::read_from(buf)?,
            y: Serializable::read_from(buf)?,
            ty: Serializable::read_from(buf)?,
            tag: Serializable::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        self.packed_xz.write_to(buf)?;
        self.y.write_to(buf)?;
        self.ty.write_to(buf)?;
        self.tag.write_to(buf)
    }
}

/// The lighting payload shared by 1.17+ UpdateLight and 1.18+ chunk
/// data. All arrays are consumed so the frame stays aligned, the
/// client does not track lighting itself.
#[derive(Debug, Default)]
pub struct LightData {
    pub trust_edges: bool,
    pub sky_light_mask: LenPrefixed<VarInt, u64>,
    pub block_light_mask: LenPrefixed<VarInt, u64>,
    pub empty_sky_light_mask: LenPrefixed<VarInt, u64>,
    pub empty_block_light_mask: LenPrefixed<VarInt, u64>,
    pub sky_light_arrays: LenPrefixed<VarInt, LenPrefixedBytes<VarInt>>,
    pub block_light_arrays: LenPrefixed<VarInt, LenPrefixedBytes<VarInt>>,
}

impl Serializable for LightData {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        // 1.20 removed the trust edges flag
        let trust_edges = if current_protocol_version() <= 762 {
            bool::read_from(buf)?
        } else {
            true
        };
        Ok(LightData {
            trust_edges,
            sky_light_mask: Serializable::read_from(buf)?,
            block_light_mask: Serializable::read_from(buf)?,
            empty_sky_light_mask: Serializable::read_from(buf)?,
            empty_block_light_mask: Serializable::read_from(buf)?,
            sky_light_arrays: Serializable::read_from(buf)?,
            block_light_arrays: Serializable::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        if current_protocol_version() <= 762 {
            self.trust_edges.write_to(buf)?;
        }
        self.sky_light_mask.write_to(buf)?;
        self.block_light_mask.write_to(buf)?;
        self.empty_sky_light_mask.write_to(buf)?;
        self.empty_block_light_mask.write_to(buf)?;
        self.sky_light_arrays.write_to(buf)?;
        self.block_light_arrays.write_to(buf)?;
        Ok(())
    }
}

/// A single record in the pre-1.16.2 MultiBlockChange. The x/z offsets
/// within the chunk are packed into one byte.
#[derive(Debug, Default)]
pub struct BlockChangeRecord {
    pub xz: u8,
    pub y: u8,
    pub block_id: VarInt,
}

impl BlockChangeRecord {
    pub fn x(&self) -> i32 {
        (self.xz >> 4) as i32
    }

    pub fn z(&self) -> i32 {
        (self.xz & 0xF) as i32
    }
}

impl Serializable for BlockChangeRecord {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        Ok(BlockChangeRecord {
            xz: Serializable::read_from(buf)?,
            y: Serializable::read_from(buf)?,
            block_id: Serializable::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        self.xz.write_to(buf)?;
        self.y.write_to(buf)?;
        self.block_id.write_to(buf)
    }
}

/// One registry entry in the 1.20.5 per-registry sync. The payload is
/// omitted for entries the client is expected to know from its own
/// data packs.
#[derive(Debug, Default)]
pub struct RegistryEntry {
    pub id: String,
    pub data: Option<nbt::NamedTag>,
}

impl Serializable for RegistryEntry {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        let id = String::read_from(buf)?;
        let data = if bool::read_from(buf)? {
            Option::<nbt::NamedTag>::read_from(buf)?
        } else {
            None
        };
        Ok(RegistryEntry { id, data })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        self.id.write_to(buf)?;
        self.data.is_some().write_to(buf)?;
        if self.data.is_some() {
            self.data.write_to(buf)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

impl Serializable for KnownPack {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        Ok(KnownPack {
            namespace: Serializable::read_from(buf)?,
            id: Serializable::read_from(buf)?,
            version: Serializable::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        self.namespace.write_to(buf)?;
        self.id.write_to(buf)?;
        self.version.write_to(buf)
    }
}
