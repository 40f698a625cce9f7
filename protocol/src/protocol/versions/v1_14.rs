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
            0x0b => BlockChange_VarInt
            0x0f => MultiBlockChange_VarInt
            0x18 => PluginMessageClientbound
            0x1a => Disconnect
            0x1d => ChunkUnload
            0x1e => ChangeGameState
            0x20 => KeepAliveClientbound_i64
            0x21 => ChunkData_HeightMap
            0x24 => UpdateLight_Masks
            0x25 => JoinGame_ViewDistance
            0x35 => TeleportPlayer_WithConfirm
            0x3a => Respawn_Gamemode
            0x40 => UpdateViewPosition
            0x43 => EntityMetadata
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
