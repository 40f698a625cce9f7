// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Decodes paletted chunk payloads into dense sections.
//!
//! The wire layout moved a lot between 1.13 and 1.20.6. Three families
//! cover the supported range: bitmask-driven columns with at most sixteen
//! sections (1.13 through 1.16.5), the long-array strip bitmask of 1.17,
//! and the bitmask-free full columns of 1.18 onwards where every section
//! is present and emptiness rides on the single-valued palette.

use super::{Block, Chunk};
use byteorder::{BigEndian, ReadBytesExt};
use galena_protocol::protocol::{Error, LenPrefixed, Serializable, VarInt};
use log::debug;
use std::io::{Cursor, Read};

/// Packed long arrays stopped straddling word boundaries in 1.16.
const PADDED_PROTOCOL: i32 = 735;

/// One column's worth of decoded sections, bottom section first. `biomes`
/// is only filled by formats that embed biomes in the section payload.
pub struct DecodedColumn {
    pub sections: Vec<Option<Chunk>>,
    pub biomes: Option<Vec<i16>>,
}

/// Expands a packed long array into `count` entries of `bits` each.
///
/// The wire carries its own long count but the entry count is derived from
/// geometry, so a server that pads the array with garbage longs doesn't
/// shift the cursor. Running out of words mid-entry is `TruncatedData`.
fn extract_entries(data: &[u64], bits: u8, count: usize, padded: bool) -> Result<Vec<u32>, Error> {
    let mask = (1u64 << bits) - 1;
    let mut out = Vec::with_capacity(count);
    if padded {
        let per_long = (64 / bits) as usize;
        for i in 0..count {
            let word = i / per_long;
            let off = (i % per_long) as u64 * u64::from(bits);
            let long = *data.get(word).ok_or(Error::TruncatedData)?;
            out.push(((long >> off) & mask) as u32);
        }
    } else {
        for i in 0..count {
            let bit = i * bits as usize;
            let word = bit >> 6;
            let off = (bit & 0x3F) as u64;
            let long = *data.get(word).ok_or(Error::TruncatedData)?;
            let mut val = long >> off;
            if off + u64::from(bits) > 64 {
                let next = *data.get(word + 1).ok_or(Error::TruncatedData)?;
                val |= next << (64 - off);
            }
            out.push((val & mask) as u32);
        }
    }
    Ok(out)
}

/// Reads one block-state container and returns `None` for all-air sections.
fn read_block_container(cur: &mut Cursor<&[u8]>, protocol_version: i32) -> Result<Option<Chunk>, Error> {
    let mut bits = cur.read_u8()?;

    if bits == 0 {
        // Single-valued: one id covers the whole section.
        let value = VarInt::read_from(cur)?.0;
        let _ = LenPrefixed::<VarInt, u64>::read_from(cur)?;
        if value == 0 {
            return Ok(None);
        }
        let mut chunk = Chunk::new();
        for idx in 0..4096 {
            chunk.set(idx & 0xF, idx >> 8, (idx >> 4) & 0xF, Block(value as u16));
        }
        return Ok(Some(chunk));
    }

    if bits > 16 {
        return Err(Error::Err(format!("unusable bits-per-block {}", bits)));
    }
    if bits < 4 {
        bits = 4;
    }
    let palette = if bits <= 8 {
        let len = VarInt::read_from(cur)?.0 as usize;
        let mut palette = Vec::with_capacity(len.min(1 << bits));
        for _ in 0..len {
            palette.push(VarInt::read_from(cur)?.0 as u16);
        }
        Some(palette)
    } else {
        None
    };

    let data = LenPrefixed::<VarInt, u64>::read_from(cur)?.data;
    let padded = protocol_version >= PADDED_PROTOCOL;
    let entries = extract_entries(&data, bits, 4096, padded)?;

    let mut chunk = Chunk::new();
    let mut any_non_air = false;
    for (idx, entry) in entries.iter().enumerate() {
        let id = match palette {
            Some(ref palette) => {
                let i = *entry as usize;
                if i >= palette.len() {
                    return Err(Error::PaletteIndexOutOfRange {
                        index: *entry,
                        palette_len: palette.len(),
                        bits,
                    });
                }
                palette[i]
            }
            None => *entry as u16,
        };
        if id != 0 {
            any_non_air = true;
        }
        let idx = idx as i32;
        chunk.set(idx & 0xF, idx >> 8, (idx >> 4) & 0xF, Block(id));
    }
    Ok(if any_non_air { Some(chunk) } else { None })
}

/// Reads one 4x4x4 biome container (1.18+ sections).
fn read_biome_container(cur: &mut Cursor<&[u8]>) -> Result<Vec<i16>, Error> {
    let bits = cur.read_u8()?;
    if bits > 8 {
        return Err(Error::Err(format!("unusable bits-per-biome {}", bits)));
    }

    if bits == 0 {
        let value = VarInt::read_from(cur)?.0 as i16;
        let _ = LenPrefixed::<VarInt, u64>::read_from(cur)?;
        return Ok(vec![value; 64]);
    }

    let palette = if bits <= 3 {
        let len = VarInt::read_from(cur)?.0 as usize;
        let mut palette = Vec::with_capacity(len.min(1 << bits));
        for _ in 0..len {
            palette.push(VarInt::read_from(cur)?.0 as i16);
        }
        Some(palette)
    } else {
        None
    };

    let data = LenPrefixed::<VarInt, u64>::read_from(cur)?.data;
    let entries = extract_entries(&data, bits, 64, true)?;

    let mut out = Vec::with_capacity(64);
    for entry in entries {
        let id = match palette {
            Some(ref palette) => {
                let i = entry as usize;
                if i >= palette.len() {
                    return Err(Error::PaletteIndexOutOfRange {
                        index: entry,
                        palette_len: palette.len(),
                        bits,
                    });
                }
                palette[i]
            }
            None => entry as i16,
        };
        out.push(id);
    }
    Ok(out)
}

fn skip_remainder(cur: &Cursor<&[u8]>) {
    let left = cur.get_ref().len() as u64 - cur.position();
    if left > 0 {
        debug!("chunk payload has {} trailing bytes, skipping", left);
    }
}

/// Decodes a 1.13 through 1.16.5 column payload. Sections for set bitmask
/// bits only; light is inline before 1.14; full columns before 1.15 end in
/// a 256-int biome grid which is upsampled to the 4x4x4 layout.
pub fn decode_column_legacy(
    protocol_version: i32,
    new: bool,
    bitmask: u16,
    sky_light: bool,
    data: &[u8],
) -> Result<DecodedColumn, Error> {
    let mut cur = Cursor::new(data);
    let mut sections: Vec<Option<Chunk>> = (0..16).map(|_| None).collect();

    for (i, section) in sections.iter_mut().enumerate() {
        if bitmask & (1u16 << i) == 0 {
            continue;
        }
        if protocol_version >= 477 {
            let _non_air = cur.read_i16::<BigEndian>()?;
        }
        *section = read_block_container(&mut cur, protocol_version)?;
        if protocol_version < 477 {
            let mut light = [0u8; 2048];
            cur.read_exact(&mut light)?;
            if sky_light {
                cur.read_exact(&mut light)?;
            }
        }
    }

    let biomes = if new && protocol_version < 573 {
        let mut grid = [0i16; 256];
        for cell in grid.iter_mut() {
            *cell = cur.read_i32::<BigEndian>()? as i16;
        }
        Some(upsample_biome_grid(&grid))
    } else {
        None
    };

    skip_remainder(&cur);
    Ok(DecodedColumn { sections, biomes })
}

/// Spreads a 16x16 column-biome grid over the 4x4x4-per-section cells so
/// old columns attach through the same commit path as 1.15+ ones.
fn upsample_biome_grid(grid: &[i16; 256]) -> Vec<i16> {
    let mut out = Vec::with_capacity(16 * 64);
    for _section in 0..16 {
        for _y in 0..4 {
            for z in 0..4 {
                for x in 0..4 {
                    out.push(grid[(z * 4) * 16 + x * 4]);
                }
            }
        }
    }
    out
}

/// Decodes a 1.17 column driven by the long-array strip bitmask.
pub fn decode_column_strip(
    protocol_version: i32,
    bitmask: &[u64],
    section_count: usize,
    data: &[u8],
) -> Result<DecodedColumn, Error> {
    let mut cur = Cursor::new(data);
    let mut sections: Vec<Option<Chunk>> = (0..section_count).map(|_| None).collect();

    for (i, section) in sections.iter_mut().enumerate() {
        let set = bitmask
            .get(i >> 6)
            .map_or(false, |word| word & (1 << (i & 0x3F)) != 0);
        if !set {
            continue;
        }
        let _non_air = cur.read_i16::<BigEndian>()?;
        *section = read_block_container(&mut cur, protocol_version)?;
    }

    skip_remainder(&cur);
    Ok(DecodedColumn {
        sections,
        biomes: None,
    })
}

/// Decodes a 1.18+ column. No bitmask: the payload carries every section
/// in order, blocks then biomes, for the whole dimension height.
pub fn decode_column_full(
    protocol_version: i32,
    section_count: usize,
    data: &[u8],
) -> Result<DecodedColumn, Error> {
    let mut cur = Cursor::new(data);
    let mut sections = Vec::with_capacity(section_count);
    let mut biomes = Vec::with_capacity(section_count * 64);

    for _ in 0..section_count {
        let _non_air = cur.read_i16::<BigEndian>()?;
        sections.push(read_block_container(&mut cur, protocol_version)?);
        biomes.extend(read_biome_container(&mut cur)?);
    }

    skip_remainder(&cur);
    Ok(DecodedColumn {
        sections,
        biomes: Some(biomes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    /// Inverse of `extract_entries`, for building wire payloads.
    fn pack(entries: &[u32], bits: u8, padded: bool) -> Vec<u64> {
        let mut data = Vec::new();
        if padded {
            let per_long = (64 / bits) as usize;
            for (i, entry) in entries.iter().enumerate() {
                let word = i / per_long;
                let off = (i % per_long) as u64 * u64::from(bits);
                if word >= data.len() {
                    data.push(0);
                }
                data[word] |= u64::from(*entry) << off;
            }
        } else {
            for (i, entry) in entries.iter().enumerate() {
                let bit = i * bits as usize;
                let word = bit >> 6;
                let off = (bit & 0x3F) as u64;
                while word + 1 >= data.len() {
                    data.push(0);
                }
                data[word] |= u64::from(*entry) << off;
                if off + u64::from(bits) > 64 {
                    data[word + 1] |= u64::from(*entry) >> (64 - off);
                }
            }
        }
        data
    }

    fn write_varint(buf: &mut Vec<u8>, mut val: u32) {
        loop {
            let mut b = (val & 0x7F) as u8;
            val >>= 7;
            if val != 0 {
                b |= 0x80;
            }
            buf.push(b);
            if val == 0 {
                return;
            }
        }
    }

    fn write_longs(buf: &mut Vec<u8>, longs: &[u64]) {
        write_varint(buf, longs.len() as u32);
        for long in longs {
            buf.write_u64::<BigEndian>(*long).unwrap();
        }
    }

    /// A block container with an indirect palette.
    fn block_container(buf: &mut Vec<u8>, bits: u8, palette: &[u16], entries: &[u32], padded: bool) {
        buf.push(bits);
        write_varint(buf, palette.len() as u32);
        for id in palette {
            write_varint(buf, u32::from(*id));
        }
        write_longs(buf, &pack(entries, bits.max(4), padded));
    }

    fn single_valued_container(buf: &mut Vec<u8>, value: u32) {
        buf.push(0);
        write_varint(buf, value);
        write_varint(buf, 0);
    }

    #[test]
    fn single_valued_zero_is_an_absent_chunk() {
        let mut buf = Vec::new();
        buf.write_i16::<BigEndian>(0).unwrap();
        single_valued_container(&mut buf, 0);
        buf.push(0);
        write_varint(&mut buf, 1);
        write_varint(&mut buf, 0);

        let col = decode_column_full(766, 1, &buf).unwrap();
        assert!(col.sections[0].is_none());
        assert_eq!(col.biomes.unwrap(), vec![1; 64]);
    }

    #[test]
    fn single_valued_nonzero_fills_the_section() {
        let mut buf = Vec::new();
        buf.write_i16::<BigEndian>(4096).unwrap();
        single_valued_container(&mut buf, 9);
        single_valued_container(&mut buf, 0);

        let col = decode_column_full(766, 1, &buf).unwrap();
        let chunk = col.sections[0].as_ref().unwrap();
        assert_eq!(chunk.get(0, 0, 0), Block(9));
        assert_eq!(chunk.get(15, 15, 15), Block(9));
    }

    #[test]
    fn palette_indices_round_trip_at_every_width() {
        for bits in 4..=8u8 {
            let palette: Vec<u16> = (0..(1u16 << bits)).collect();
            let entries: Vec<u32> = (0..4096u32).map(|i| i % (1 << bits)).collect();
            let mut buf = Vec::new();
            buf.write_i16::<BigEndian>(4096).unwrap();
            block_container(&mut buf, bits, &palette, &entries, true);
            single_valued_container(&mut buf, 0);

            let col = decode_column_full(766, 1, &buf).unwrap();
            let chunk = col.sections[0].as_ref().unwrap();
            for idx in 0..4096i32 {
                let expect = (idx as u32 % (1 << bits)) as u16;
                assert_eq!(
                    chunk.get(idx & 0xF, idx >> 8, (idx >> 4) & 0xF),
                    Block(expect),
                    "bits={} idx={}",
                    bits,
                    idx
                );
            }
        }
    }

    #[test]
    fn straddled_entries_reassemble_before_the_padding_epoch() {
        // 5-bit entries straddle a word boundary every 64/5 entries.
        let entries: Vec<u32> = (0..4096u32).map(|i| i % 31 + 1).collect();
        let palette: Vec<u16> = (0..32u16).collect();
        let mut buf = Vec::new();
        block_container(&mut buf, 5, &palette, &entries, false);
        // Inline light for the pre-1.14 layout.
        buf.write_all(&[0u8; 2048]).unwrap();
        buf.write_all(&[0u8; 2048]).unwrap();

        let col = decode_column_legacy(404, false, 0b1, true, &buf).unwrap();
        let chunk = col.sections[0].as_ref().unwrap();
        for idx in 0..4096i32 {
            let expect = (idx as u32 % 31 + 1) as u16;
            assert_eq!(chunk.get(idx & 0xF, idx >> 8, (idx >> 4) & 0xF), Block(expect));
        }
    }

    #[test]
    fn padded_and_straddled_disagree_on_the_wire() {
        let entries: Vec<u32> = (0..128u32).map(|i| i % 32).collect();
        assert_ne!(pack(&entries, 5, true), pack(&entries, 5, false));
    }

    #[test]
    fn palette_overflow_aborts_the_packet() {
        let palette: Vec<u16> = vec![0, 1];
        let entries = vec![3u32; 4096];
        let mut buf = Vec::new();
        buf.write_i16::<BigEndian>(4096).unwrap();
        block_container(&mut buf, 4, &palette, &entries, true);
        single_valued_container(&mut buf, 0);

        match decode_column_full(766, 1, &buf) {
            Err(Error::PaletteIndexOutOfRange {
                index,
                palette_len,
                bits,
            }) => {
                assert_eq!(index, 3);
                assert_eq!(palette_len, 2);
                assert_eq!(bits, 4);
            }
            other => panic!("expected palette error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn truncated_payloads_abort_the_packet() {
        let mut buf = Vec::new();
        buf.write_i16::<BigEndian>(4096).unwrap();
        buf.push(4);
        write_varint(&mut buf, 1);
        write_varint(&mut buf, 5);
        // Declares longs it never provides.
        write_varint(&mut buf, 256);

        match decode_column_full(766, 1, &buf) {
            Err(Error::TruncatedData) => {}
            other => panic!("expected truncation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn strip_bitmask_addresses_tall_columns() {
        let palette: Vec<u16> = vec![0, 7];
        let entries = vec![1u32; 4096];
        let mut buf = Vec::new();
        // Sections 0 and 20 set out of 24.
        buf.write_i16::<BigEndian>(4096).unwrap();
        block_container(&mut buf, 4, &palette, &entries, true);
        buf.write_i16::<BigEndian>(4096).unwrap();
        block_container(&mut buf, 4, &palette, &entries, true);

        let col = decode_column_strip(755, &[(1 << 20) | 1], 24, &buf).unwrap();
        assert!(col.sections[0].is_some());
        assert!(col.sections[1].is_none());
        assert!(col.sections[20].is_some());
        assert_eq!(col.sections.len(), 24);
    }

    #[test]
    fn legacy_biome_tail_is_upsampled() {
        let mut buf = Vec::new();
        for i in 0..256u32 {
            buf.write_i32::<BigEndian>((i % 4) as i32).unwrap();
        }
        let col = decode_column_legacy(404, true, 0, true, &buf).unwrap();
        let biomes = col.biomes.unwrap();
        assert_eq!(biomes.len(), 16 * 64);
    }

    #[test]
    fn full_column_end_to_end() {
        let section_count = 24;
        let palette: Vec<u16> = (0..12u16).map(|i| i * 3).collect();
        let entries: Vec<u32> = (0..4096u32).map(|i| i % 12).collect();
        let mut buf = Vec::new();
        for section in 0..section_count {
            if section < 8 {
                buf.write_i16::<BigEndian>(4096).unwrap();
                block_container(&mut buf, 5, &palette, &entries, true);
            } else {
                buf.write_i16::<BigEndian>(0).unwrap();
                single_valued_container(&mut buf, 0);
            }
            single_valued_container(&mut buf, 2);
        }

        let col = decode_column_full(766, section_count, &buf).unwrap();
        assert_eq!(col.sections.len(), section_count);
        assert_eq!(col.sections.iter().filter(|s| s.is_some()).count(), 8);
        let chunk = col.sections[3].as_ref().unwrap();
        assert_eq!(chunk.get(5, 0, 0), Block(15));
        assert_eq!(col.biomes.unwrap(), vec![2i16; section_count * 64]);
    }
}
