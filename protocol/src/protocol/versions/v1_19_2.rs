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
            0x09 => BlockChange_VarInt
            0x16 => PluginMessageClientbound
            0x19 => Disconnect
            0x1c => ChunkUnload
            0x1d => ChangeGameState
            0x20 => KeepAliveClientbound_i64
            0x21 => ChunkData_AndLight
            0x24 => UpdateLight_Arrays
            0x25 => JoinGame_WorldNames_IsHard_SimDist
            0x39 => TeleportPlayer_WithDismount
            0x3e => Respawn_Death
            0x40 => MultiBlockChange_Packed
            0x4b => UpdateViewPosition
            0x50 => EntityMetadata
            0x5c => TimeUpdate
        }
    }
    login Login {
        serverbound Serverbound {
            0x00 => LoginStart_Sig_UUID
            0x01 => EncryptionResponse_Sig
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
