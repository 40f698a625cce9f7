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
            0x08 => ClientSettings_Listing
            0x0d => PluginMessageServerbound
            0x12 => KeepAliveServerbound_i64
            0x15 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x0a => BlockChange_VarInt
            0x17 => PluginMessageClientbound
            0x1a => Disconnect
            0x1e => ChunkUnload
            0x1f => ChangeGameState
            0x23 => KeepAliveClientbound_i64
            0x24 => ChunkData_AndLight
            0x27 => UpdateLight_Arrays
            0x28 => JoinGame_WorldNames_IsHard_SimDist
            0x3c => TeleportPlayer_WithConfirm
            0x41 => Respawn_Death
            0x43 => MultiBlockChange_Packed
            0x4e => UpdateViewPosition
            0x52 => EntityMetadata
            0x5e => TimeUpdate
        }
    }
    login Login {
        serverbound Serverbound {
            0x00 => LoginStart_UUID_Opt
            0x01 => EncryptionResponse
            0x02 => LoginPluginResponse
        }
        clientbound Clientbound {
            0x00 => LoginDisconnect
            0x01 => EncryptionRequest
            0x02 => LoginSuccess_Sig
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
