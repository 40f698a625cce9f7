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
            0x10 => KeepAliveServerbound_i64
            0x13 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x0b => BlockChange_VarInt
            0x17 => PluginMessageClientbound
            0x19 => Disconnect
            0x1c => ChunkUnload
            0x1d => ChangeGameState
            0x1f => KeepAliveClientbound_i64
            0x20 => ChunkData_Biomes3D_VarInt
            0x23 => UpdateLight_Masks
            0x24 => JoinGame_WorldNames_IsHard
            0x34 => TeleportPlayer_WithConfirm
            0x39 => Respawn_NBT
            0x3b => MultiBlockChange_Packed
            0x40 => UpdateViewPosition
            0x44 => EntityMetadata
            0x4e => TimeUpdate
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
            0x02 => LoginSuccess_UUID
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
