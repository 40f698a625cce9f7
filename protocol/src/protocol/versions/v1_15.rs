protocol_packet_ids!(
    handshake Handshaking {
        serverbound Serverbound {
            0x00 => Handshake
        }
        clientbound Clientbound {
        }
    }
    play Play {
        serverbound Serverbound {
            0x00 => TeleportConfirm
            0x03 => ChatMessage
            0x05 => ClientSettings
            0x0b => PluginMessageServerbound
            0x0f => KeepAliveServerbound_i64
            0x12 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x0c => BlockChange_VarInt
            0x10 => MultiBlockChange_VarInt
            0x19 => PluginMessageClientbound
            0x1b => Disconnect
            0x1e => ChunkUnload
            0x1f => ChangeGameState
            0x21 => KeepAliveClientbound_i64
            0x22 => ChunkData_Biomes3D
            0x25 => UpdateLight_Masks
            0x26 => JoinGame_HashedSeed_Respawn
            0x36 => TeleportPlayer_WithConfirm
            0x3b => Respawn_HashedSeed
            0x41 => UpdateViewPosition
            0x44 => EntityMetadata
            0x4f => TimeUpdate
        }
    }
    login Login {
        serverbound Serverbound {
            0x00 => LoginStart
            0x01 => EncryptionResponse
            0x02 => LoginPluginResponse
        }
        clientbound Clientbound {
            0x00 => LoginDisconnect
            0x01 => EncryptionRequest
            0x02 => LoginSuccess_String
            0x03 => SetInitialCompression
            0x04 => LoginPluginRequest
        }
    }
    status Status {
        serverbound Serverbound {
            0x00 => StatusRequest
            0x01 => StatusPing
        }
        clientbound Clientbound {
            0x00 => StatusResponse
            0x01 => StatusPong
        }
    }
);
