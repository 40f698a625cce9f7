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

pub mod terrain;

use galena_protocol::nbt;
use galena_protocol::types::bit;
use galena_protocol::types::hash::FNVHash;
use log::warn;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// A block state id. Identity is the numeric id only; 0 is always air.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Block(pub u16);

impl Block {
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// A 16x16x16 volume of block states. Only built for sections that contain
/// at least one non-air block; all-air sections stay `None` in the column.
#[derive(Clone)]
pub struct Chunk {
    blocks: Vec<Block>,
}

impl Default for Chunk {
    fn default() -> Self {
        Chunk::new()
    }
}

impl Chunk {
    pub fn new() -> Chunk {
        Chunk {
            blocks: vec![Block(0); 16 * 16 * 16],
        }
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        self.blocks[((y << 8) | (z << 4) | x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, b: Block) {
        self.blocks[((y << 8) | (z << 4) | x) as usize] = b;
    }
}

/// Vertical bounds of the active dimension. Sections are indexed from
/// `min_y` upwards, 16 blocks per section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimension {
    pub min_y: i32,
    pub height: i32,
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension { min_y: 0, height: 256 }
    }
}

impl Dimension {
    pub fn section_count(&self) -> usize {
        (self.height >> 4) as usize
    }

    /// Reads `min_y`/`height` out of a dimension-type compound, falling back
    /// to overworld-classic bounds for fields the server leaves out.
    pub fn from_tag(tag: &nbt::Tag) -> Dimension {
        if !tag.is_compound() {
            return Dimension::default();
        }
        Dimension {
            min_y: tag.get("min_y").and_then(|v| v.as_int()).unwrap_or(0),
            height: tag.get("height").and_then(|v| v.as_int()).unwrap_or(256),
        }
    }
}

/// Dimension types by name, filled from the JoinGame codec (1.16-1.19) or
/// from configuration-phase registry data (1.20.2+).
#[derive(Default)]
pub struct DimensionRegistry {
    types: HashMap<String, Dimension>,
    // Registration order, for versions that reference dimension types by
    // registry index instead of name.
    order: Vec<String>,
}

impl DimensionRegistry {
    pub fn new() -> DimensionRegistry {
        DimensionRegistry::default()
    }

    pub fn get(&self, name: &str) -> Option<Dimension> {
        self.types.get(name).copied()
    }

    pub fn by_index(&self, index: i32) -> Option<Dimension> {
        self.order
            .get(usize::try_from(index).ok()?)
            .and_then(|name| self.types.get(name))
            .copied()
    }

    pub fn insert(&mut self, name: &str, dimension: Dimension) {
        if !self.types.contains_key(name) {
            self.order.push(name.to_owned());
        }
        self.types.insert(name.to_owned(), dimension);
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Loads every dimension type out of a registry codec. Accepts both the
    /// full codec (keyed by `minecraft:dimension_type`) and a bare
    /// dimension-type registry.
    pub fn load_codec(&mut self, codec: &nbt::Tag) {
        if !codec.is_compound() {
            return;
        }
        if let Some(registry) = codec.get("minecraft:dimension_type") {
            self.load_registry(registry);
        } else if codec.get("value").is_some() {
            self.load_registry(codec);
        }
    }

    fn load_registry(&mut self, registry: &nbt::Tag) {
        if !registry.is_compound() {
            return;
        }
        let entries = match registry.get("value").and_then(|v| v.as_list()) {
            Some(val) => val,
            None => return,
        };
        for entry in entries {
            if !entry.is_compound() {
                continue;
            }
            let name = match entry.get("name").and_then(|v| v.as_str()) {
                Some(val) => val.to_owned(),
                None => continue,
            };
            if let Some(element) = entry.get("element") {
                let dimension = Dimension::from_tag(element);
                self.insert(&name, dimension);
            }
        }
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct CPos(pub i32, pub i32);

/// A full vertical stack of sections at one (x, z). The mask and biome
/// array only mean anything once `fully_loaded` is set by the column commit.
pub struct ChunkColumn {
    sections: Vec<Option<Chunk>>,
    mask: bit::Set,
    biomes: Vec<i16>,
    fully_loaded: bool,
}

impl ChunkColumn {
    fn new(section_count: usize) -> ChunkColumn {
        ChunkColumn {
            sections: (0..section_count).map(|_| None).collect(),
            mask: bit::Set::new(section_count),
            biomes: Vec::new(),
            fully_loaded: false,
        }
    }

    pub fn section(&self, idx: usize) -> Option<&Chunk> {
        self.sections.get(idx).and_then(|v| v.as_ref())
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn mask(&self) -> &bit::Set {
        &self.mask
    }

    pub fn biomes(&self) -> &[i16] {
        &self.biomes
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.fully_loaded
    }
}

pub struct World {
    chunks: HashMap<CPos, ChunkColumn, BuildHasherDefault<FNVHash>>,
    pub dimension: Dimension,
}

impl World {
    pub fn new(dimension: Dimension) -> World {
        World {
            chunks: HashMap::with_hasher(BuildHasherDefault::default()),
            dimension,
        }
    }

    fn column_mut(&mut self, pos: CPos) -> &mut ChunkColumn {
        let count = self.dimension.section_count();
        self.chunks
            .entry(pos)
            .or_insert_with(|| ChunkColumn::new(count))
    }

    /// Places one decoded section into its column. `section_y` indexes from
    /// the bottom of the dimension. Passing `None` clears the slot.
    pub fn store_chunk(
        &mut self,
        x: i32,
        section_y: usize,
        z: i32,
        column_height: usize,
        chunk: Option<Chunk>,
    ) {
        let column = self.column_mut(CPos(x, z));
        if column.sections.len() != column_height {
            column.sections.resize_with(column_height, || None);
            column.mask = bit::Set::new(column_height);
        }
        if section_y >= column.sections.len() {
            return;
        }
        column.mask.set(section_y, chunk.is_some());
        column.sections[section_y] = chunk;
    }

    /// Attaches the column biome array. Rejected unless it covers exactly
    /// 64 cells per section.
    pub fn set_biomes(&mut self, x: i32, z: i32, biomes: Vec<i16>) {
        let column = self.column_mut(CPos(x, z));
        if biomes.len() == column.sections.len() * 64 {
            column.biomes = biomes;
        } else {
            warn!(
                "discarding biome array of {} entries for a {}-section column",
                biomes.len(),
                column.sections.len()
            );
        }
    }

    pub fn finish_chunk(&mut self, x: i32, z: i32) {
        self.column_mut(CPos(x, z)).fully_loaded = true;
    }

    pub fn unload_chunk(&mut self, x: i32, z: i32) {
        self.chunks.remove(&CPos(x, z));
    }

    pub fn chunk_column(&self, x: i32, z: i32) -> Option<&ChunkColumn> {
        self.chunks.get(&CPos(x, z))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, b: Block) {
        let sy = y - self.dimension.min_y;
        if sy < 0 || sy >= self.dimension.height {
            return;
        }
        let idx = (sy >> 4) as usize;
        let column = self.column_mut(CPos(x >> 4, z >> 4));
        if idx >= column.sections.len() {
            return;
        }
        if column.sections[idx].is_none() {
            if b.is_air() {
                return;
            }
            column.sections[idx] = Some(Chunk::new());
            column.mask.set(idx, true);
        }
        let section = column.sections[idx].as_mut().unwrap();
        section.set(x & 0xF, sy & 0xF, z & 0xF, b);
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        let sy = y - self.dimension.min_y;
        if sy < 0 || sy >= self.dimension.height {
            return Block(0);
        }
        match self
            .chunks
            .get(&CPos(x >> 4, z >> 4))
            .and_then(|column| column.section((sy >> 4) as usize))
        {
            Some(section) => section.get(x & 0xF, sy & 0xF, z & 0xF),
            None => Block(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_round_trip_through_the_column() {
        let mut world = World::new(Dimension::default());
        world.set_block(5, 70, -3, Block(42));
        assert_eq!(world.get_block(5, 70, -3), Block(42));
        assert_eq!(world.get_block(5, 71, -3), Block(0));
        let column = world.chunk_column(0, -1).unwrap();
        assert!(column.mask().get(4));
        assert!(!column.mask().get(5));
    }

    #[test]
    fn negative_floor_shifts_section_indexing() {
        let dim = Dimension { min_y: -64, height: 384 };
        let mut world = World::new(dim);
        world.set_block(0, -60, 0, Block(7));
        assert_eq!(world.get_block(0, -60, 0), Block(7));
        let column = world.chunk_column(0, 0).unwrap();
        assert!(column.mask().get(0));
        assert_eq!(column.section_count(), 24);
    }

    #[test]
    fn air_writes_never_materialize_sections() {
        let mut world = World::new(Dimension::default());
        world.set_block(0, 10, 0, Block(0));
        let column = world.chunk_column(0, 0).unwrap();
        assert!(column.section(0).is_none());
        assert!(!column.mask().get(0));
    }

    #[test]
    fn out_of_range_heights_are_ignored() {
        let mut world = World::new(Dimension::default());
        world.set_block(0, -1, 0, Block(1));
        world.set_block(0, 256, 0, Block(1));
        assert_eq!(world.get_block(0, -1, 0), Block(0));
        assert_eq!(world.get_block(0, 256, 0), Block(0));
    }

    #[test]
    fn biomes_must_cover_the_column() {
        let mut world = World::new(Dimension::default());
        world.store_chunk(1, 0, 2, 16, Some(Chunk::new()));
        world.set_biomes(1, 2, vec![0; 100]);
        assert!(world.chunk_column(1, 2).unwrap().biomes().is_empty());
        world.set_biomes(1, 2, vec![1; 16 * 64]);
        assert_eq!(world.chunk_column(1, 2).unwrap().biomes().len(), 1024);
    }

    #[test]
    fn dimension_registry_reads_codecs() {
        let mut element = nbt::Tag::new_compound();
        element.put("min_y", nbt::Tag::Int(-64));
        element.put("height", nbt::Tag::Int(384));
        let mut entry = nbt::Tag::new_compound();
        entry.put("name", nbt::Tag::String("minecraft:overworld".to_owned()));
        entry.put("element", element);
        let mut registry = nbt::Tag::new_compound();
        registry.put("type", nbt::Tag::String("minecraft:dimension_type".to_owned()));
        registry.put("value", nbt::Tag::List(vec![entry]));
        let mut codec = nbt::Tag::new_compound();
        codec.put("minecraft:dimension_type", registry.clone());

        let mut dims = DimensionRegistry::new();
        dims.load_codec(&codec);
        assert_eq!(
            dims.get("minecraft:overworld"),
            Some(Dimension { min_y: -64, height: 384 })
        );

        // A bare registry loads the same way.
        let mut dims = DimensionRegistry::new();
        dims.load_codec(&registry);
        assert!(dims.get("minecraft:overworld").is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_classic_bounds() {
        let tag = nbt::Tag::new_compound();
        assert_eq!(Dimension::from_tag(&tag), Dimension { min_y: 0, height: 256 });
    }
}
