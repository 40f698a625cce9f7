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
            0x05 => ClientSettings_Listing
            0x0a => PluginMessageServerbound
            0x0f => KeepAliveServerbound_i64
            0x12 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x0c => BlockChange_VarInt
            0x18 => PluginMessageClientbound
            0x1a => Disconnect
            0x1d => ChunkUnload
            0x1e => ChangeGameState
            0x21 => KeepAliveClientbound_i64
            0x22 => ChunkData_AndLight
            0x25 => UpdateLight_Arrays
            0x26 => JoinGame_WorldNames_IsHard_SimDist_NBT
            0x38 => TeleportPlayer_WithDismount
            0x3d => Respawn_NBT
            0x3f => MultiBlockChange_Packed
            0x49 => UpdateViewPosition
            0x4d => EntityMetadata
            0x59 => TimeUpdate
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
