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
            0x07 => ClientSettings_Listing
            0x0c => PluginMessageServerbound
            0x11 => KeepAliveServerbound_i64
            0x14 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x09 => BlockChange_VarInt
            0x15 => PluginMessageClientbound
            0x17 => Disconnect
            0x1b => ChunkUnload
            0x1c => ChangeGameState
            0x1f => KeepAliveClientbound_i64
            0x20 => ChunkData_AndLight
            0x23 => UpdateLight_Arrays
            0x24 => JoinGame_WorldNames_IsHard_SimDist
            0x38 => TeleportPlayer_WithDismount
            0x3d => Respawn_Death
            0x3f => MultiBlockChange_Packed
            0x4a => UpdateViewPosition
            0x4e => EntityMetadata
            0x5a => TimeUpdate
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
