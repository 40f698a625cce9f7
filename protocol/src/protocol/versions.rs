use crate::protocol::*;

mod v1_13;
mod v1_14;
mod v1_15;
mod v1_16_1;
mod v1_16_2;
mod v1_17;
mod v1_18;
mod v1_19;
mod v1_19_2;
mod v1_19_3;
mod v1_19_4;
mod v1_20;
mod v1_20_2;
mod v1_20_3;
mod v1_20_5;

/// Translates between external (wire) packet ids and the internal ids
/// used for dispatch. Returns -1 when the id has no mapping for the
/// given version, in which case an inbound frame is skipped and an
/// outbound write is refused.
pub fn translate_internal_packet_id_for_version(
    version: i32,
    state: State,
    dir: Direction,
    id: i32,
    to_internal: bool,
) -> i32 {
    match version {
        // https://wiki.vg/Protocol_version_numbers
        // 1.20.5/1.20.6
        766 => v1_20_5::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.20.3/1.20.4
        765 => v1_20_3::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.20.2
        764 => v1_20_2::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.20/1.20.1, same ids as 1.19.4 but a few packets grew fields
        763 => v1_20::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.19.4
        762 => v1_19_4::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.19.3
        761 => v1_19_3::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.19.1/1.19.2
        760 => v1_19_2::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.19
        759 => v1_19::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.18 through 1.18.2
        757 | 758 => v1_18::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.17/1.17.1
        755 | 756 => v1_17::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.16.2 through 1.16.5
        751 | 753 | 754 => v1_16_2::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.16/1.16.1
        735 | 736 => v1_16_1::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.15 through 1.15.2
        573 | 575 | 578 => v1_15::translate_internal_packet_id(state, dir, id, to_internal),

        // 1.14 through 1.14.4
        477 | 480 | 485 | 490 | 498 => {
            v1_14::translate_internal_packet_id(state, dir, id, to_internal)
        }

        // 1.13 through 1.13.2
        393 | 401 | 404 => v1_13::translate_internal_packet_id(state, dir, id, to_internal),

        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet;

    fn round_trip(version: i32, state: State, dir: Direction, external: i32) {
        let internal =
            translate_internal_packet_id_for_version(version, state, dir, external, true);
        assert_ne!(internal, -1, "0x{:02x} unmapped for {}", external, version);
        let back = translate_internal_packet_id_for_version(version, state, dir, internal, false);
        assert_eq!(
            back, external,
            "0x{:02x} did not survive for {}",
            external, version
        );
    }

    #[test]
    fn handshake_is_zero_everywhere() {
        for v in SUPPORTED_PROTOCOLS {
            assert_eq!(
                translate_internal_packet_id_for_version(
                    v,
                    State::Handshaking,
                    Direction::Serverbound,
                    packet::handshake::serverbound::internal_ids::Handshake,
                    false,
                ),
                0x00
            );
        }
    }

    #[test]
    fn chunk_data_ids_match_known_tables() {
        // spot checks against wiki.vg
        for (v, id) in [(393, 0x22), (477, 0x21), (735, 0x21), (755, 0x22)] {
            let internal = translate_internal_packet_id_for_version(
                v,
                State::Play,
                Direction::Clientbound,
                id,
                true,
            );
            assert_ne!(internal, -1, "chunk data unmapped for {}", v);
        }
        assert_eq!(
            translate_internal_packet_id_for_version(
                759,
                State::Play,
                Direction::Clientbound,
                packet::play::clientbound::internal_ids::ChunkData_AndLight,
                false,
            ),
            0x1f
        );
    }

    #[test]
    fn keep_alive_round_trips_everywhere() {
        for v in SUPPORTED_PROTOCOLS {
            let external = translate_internal_packet_id_for_version(
                v,
                State::Play,
                Direction::Clientbound,
                packet::play::clientbound::internal_ids::KeepAliveClientbound_i64,
                false,
            );
            assert_ne!(external, -1, "keep alive unmapped for {}", v);
            round_trip(v, State::Play, Direction::Clientbound, external);

            let external = translate_internal_packet_id_for_version(
                v,
                State::Play,
                Direction::Serverbound,
                packet::play::serverbound::internal_ids::KeepAliveServerbound_i64,
                false,
            );
            assert_ne!(external, -1, "serverbound keep alive unmapped for {}", v);
            round_trip(v, State::Play, Direction::Serverbound, external);
        }
    }

    #[test]
    fn unknown_external_id_is_unmapped() {
        assert_eq!(
            translate_internal_packet_id_for_version(
                759,
                State::Play,
                Direction::Clientbound,
                0x7f,
                true
            ),
            -1
        );
    }

    #[test]
    fn configuration_tables_only_exist_for_modern_versions() {
        assert_eq!(
            translate_internal_packet_id_for_version(
                759,
                State::Configuration,
                Direction::Clientbound,
                0x00,
                true
            ),
            -1
        );
        assert_ne!(
            translate_internal_packet_id_for_version(
                764,
                State::Configuration,
                Direction::Clientbound,
                0x00,
                true
            ),
            -1
        );
    }
}
