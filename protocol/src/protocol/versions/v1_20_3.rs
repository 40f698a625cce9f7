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
            0x09 => ClientSettings_Listing
            0x10 => PluginMessageServerbound
            0x15 => KeepAliveServerbound_i64
            0x18 => PlayerPositionLook
        }
        clientbound Clientbound {
            0x09 => BlockChange_VarInt
            0x18 => PluginMessageClientbound
            0x1b => Disconnect
            0x1f => ChunkUnload_ZX
            0x20 => ChangeGameState
            0x24 => KeepAliveClientbound_i64
            0x25 => ChunkData_AndLight
            0x28 => UpdateLight_Arrays
            0x29 => JoinGame_Config
            0x3e => TeleportPlayer_WithConfirm
            0x45 => Respawn_Config
            0x47 => MultiBlockChange_Sections
            0x52 => UpdateViewPosition
            0x56 => EntityMetadata
            0x62 => TimeUpdate
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
            0x01 => EncryptionRequest
            0x02 => LoginSuccess_Sig
            0x03 => SetInitialCompression
            0x04 => LoginPluginRequest
        }
    }
    configuration Configuration {
        serverbound Serverbound {
            0x00 => ConfigClientSettings
            0x01 => ConfigPluginMessageServerbound
            0x02 => FinishConfigurationAck
            0x03 => ConfigKeepAliveServerbound
            0x04 => ConfigPong
        }
        clientbound Clientbound {
            0x00 => ConfigPluginMessage
            0x01 => ConfigDisconnect
            0x02 => FinishConfiguration
            0x03 => ConfigKeepAlive
            0x04 => ConfigPing
            0x05 => RegistryData
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
