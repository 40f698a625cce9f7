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
            0x02 => ChatMessage
            0x04 => ClientSettings
            0x0a => PluginMessageServerbound
            0x0e => KeepAliveServerbound_i64
            0x11 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x0b => BlockChange_VarInt
            0x0f => MultiBlockChange_VarInt
            0x19 => PluginMessageClientbound
            0x1b => Disconnect
            0x1f => ChunkUnload
            0x20 => ChangeGameState
            0x21 => KeepAliveClientbound_i64
            0x22 => ChunkData
            0x25 => JoinGame_i32
            0x32 => TeleportPlayer_WithConfirm
            0x38 => Respawn_i32
            0x3f => EntityMetadata
            0x4a => TimeUpdate
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
