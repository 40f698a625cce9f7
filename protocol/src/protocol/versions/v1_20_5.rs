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
            0x0a => ClientSettings_Listing
            0x12 => PluginMessageServerbound
            0x18 => KeepAliveServerbound_i64
            0x1b => PlayerPositionLook
        }
        clientbound Clientbound {
            0x09 => BlockChange_VarInt
            0x19 => PluginMessageClientbound
            0x1d => Disconnect
            0x21 => ChunkUnload_ZX
            0x22 => ChangeGameState
            0x26 => KeepAliveClientbound_i64
            0x27 => ChunkData_AndLight
            0x2a => UpdateLight_Arrays
            0x2b => JoinGame_Config_VarIntDim
            0x40 => TeleportPlayer_WithConfirm
            0x47 => Respawn_Config_VarIntDim
            0x49 => MultiBlockChange_Sections
            0x54 => UpdateViewPosition
            0x58 => EntityMetadata
            0x64 => TimeUpdate
        }
    }
    login Login {
        serverbound Serverbound {
            0x00 => LoginStart_UUID
            0x01 => EncryptionResponse
            0x02 => LoginPluginResponse
            0x03 => LoginAcknowledged
        }
        clientbound Clientbound {
            0x00 => LoginDisconnect
            0x01 => EncryptionRequest_Auth
            0x02 => LoginSuccess_Sig_Strict
            0x03 => SetInitialCompression
            0x04 => LoginPluginRequest
        }
    }
    configuration Configuration {
        serverbound Serverbound {
            0x00 => ConfigClientSettings
            0x02 => ConfigPluginMessageServerbound
            0x03 => FinishConfigurationAck
            0x04 => ConfigKeepAliveServerbound
            0x05 => ConfigPong
            0x07 => SelectKnownPacksResponse
        }
        clientbound Clientbound {
            0x01 => ConfigPluginMessage
            0x02 => ConfigDisconnect
            0x03 => FinishConfiguration
            0x04 => ConfigKeepAlive
            0x05 => ConfigPing
            0x07 => RegistryData_Entries
            0x0e => SelectKnownPacks
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
