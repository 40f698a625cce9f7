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

use crate::format;
use crate::item;
use crate::nbt;
use crate::protocol;
use crate::protocol::Serializable;
use crate::shared::Position;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::marker::PhantomData;

/// Semantic type of a single entity metadata entry. The wire id that
/// selects one of these shifts between protocol versions, so all reads
/// go through the per-version palette below.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataType {
    Byte,
    VarInt,
    VarLong,
    Float,
    String,
    Chat,
    OptChat,
    Slot,
    Boolean,
    Rotation,
    Position,
    OptPosition,
    Direction,
    OptUuid,
    BlockId,
    OptBlockId,
    Nbt,
    Particle,
    Particles,
    VillagerData,
    OptVarInt,
    Pose,
    CatVariant,
    WolfVariant,
    FrogVariant,
    OptGlobalPosition,
    PaintingVariant,
    SnifferState,
    ArmadilloState,
    Vector3,
    Quaternion,
}

// 1.13 through 1.19.2. Older versions in this band simply never send
// the higher ids.
const PALETTE_LEGACY: &[MetadataType] = &[
    MetadataType::Byte,
    MetadataType::VarInt,
    MetadataType::Float,
    MetadataType::String,
    MetadataType::Chat,
    MetadataType::OptChat,
    MetadataType::Slot,
    MetadataType::Boolean,
    MetadataType::Rotation,
    MetadataType::Position,
    MetadataType::OptPosition,
    MetadataType::Direction,
    MetadataType::OptUuid,
    MetadataType::OptBlockId,
    MetadataType::Nbt,
    MetadataType::Particle,
    MetadataType::VillagerData,
    MetadataType::OptVarInt,
    MetadataType::Pose,
    MetadataType::CatVariant,
    MetadataType::FrogVariant,
    MetadataType::OptGlobalPosition,
    MetadataType::PaintingVariant,
];

// 1.19.3 inserted VarLong at 2, shifting everything after it.
const PALETTE_1_19_3: &[MetadataType] = &[
    MetadataType::Byte,
    MetadataType::VarInt,
    MetadataType::VarLong,
    MetadataType::Float,
    MetadataType::String,
    MetadataType::Chat,
    MetadataType::OptChat,
    MetadataType::Slot,
    MetadataType::Boolean,
    MetadataType::Rotation,
    MetadataType::Position,
    MetadataType::OptPosition,
    MetadataType::Direction,
    MetadataType::OptUuid,
    MetadataType::OptBlockId,
    MetadataType::Nbt,
    MetadataType::Particle,
    MetadataType::VillagerData,
    MetadataType::OptVarInt,
    MetadataType::Pose,
    MetadataType::CatVariant,
    MetadataType::FrogVariant,
    MetadataType::OptGlobalPosition,
    MetadataType::PaintingVariant,
];

// 1.19.4 through 1.20.4.
const PALETTE_1_19_4: &[MetadataType] = &[
    MetadataType::Byte,
    MetadataType::VarInt,
    MetadataType::VarLong,
    MetadataType::Float,
    MetadataType::String,
    MetadataType::Chat,
    MetadataType::OptChat,
    MetadataType::Slot,
    MetadataType::Boolean,
    MetadataType::Rotation,
    MetadataType::Position,
    MetadataType::OptPosition,
    MetadataType::Direction,
    MetadataType::OptUuid,
    MetadataType::BlockId,
    MetadataType::OptBlockId,
    MetadataType::Nbt,
    MetadataType::Particle,
    MetadataType::VillagerData,
    MetadataType::OptVarInt,
    MetadataType::Pose,
    MetadataType::CatVariant,
    MetadataType::FrogVariant,
    MetadataType::OptGlobalPosition,
    MetadataType::PaintingVariant,
    MetadataType::SnifferState,
    MetadataType::Vector3,
    MetadataType::Quaternion,
];

// 1.20.5 and 1.20.6.
const PALETTE_1_20_5: &[MetadataType] = &[
    MetadataType::Byte,
    MetadataType::VarInt,
    MetadataType::VarLong,
    MetadataType::Float,
    MetadataType::String,
    MetadataType::Chat,
    MetadataType::OptChat,
    MetadataType::Slot,
    MetadataType::Boolean,
    MetadataType::Rotation,
    MetadataType::Position,
    MetadataType::OptPosition,
    MetadataType::Direction,
    MetadataType::OptUuid,
    MetadataType::BlockId,
    MetadataType::OptBlockId,
    MetadataType::Nbt,
    MetadataType::Particle,
    MetadataType::Particles,
    MetadataType::VillagerData,
    MetadataType::OptVarInt,
    MetadataType::Pose,
    MetadataType::CatVariant,
    MetadataType::WolfVariant,
    MetadataType::FrogVariant,
    MetadataType::OptGlobalPosition,
    MetadataType::PaintingVariant,
    MetadataType::SnifferState,
    MetadataType::ArmadilloState,
    MetadataType::Vector3,
    MetadataType::Quaternion,
];

fn palette(protocol_version: i32) -> &'static [MetadataType] {
    if protocol_version >= 766 {
        PALETTE_1_20_5
    } else if protocol_version >= 762 {
        PALETTE_1_19_4
    } else if protocol_version >= 761 {
        PALETTE_1_19_3
    } else {
        PALETTE_LEGACY
    }
}

pub fn metadata_type_for(
    protocol_version: i32,
    id: i32,
) -> Result<MetadataType, protocol::Error> {
    palette(protocol_version)
        .get(id as usize)
        .copied()
        .ok_or(protocol::Error::UnknownMetadataType(id))
}

fn metadata_id_for(protocol_version: i32, ty: MetadataType) -> Option<i32> {
    palette(protocol_version)
        .iter()
        .position(|t| *t == ty)
        .map(|i| i as i32)
}

pub struct MetadataKey<T: MetaValue> {
    index: i32,
    ty: PhantomData<T>,
}

impl<T: MetaValue> MetadataKey<T> {
    #[allow(dead_code)]
    fn new(index: i32) -> MetadataKey<T> {
        MetadataKey {
            index,
            ty: PhantomData,
        }
    }
}

pub struct Metadata {
    map: HashMap<i32, Value>,
}

impl Metadata {
    pub fn new() -> Metadata {
        Metadata {
            map: HashMap::new(),
        }
    }

    pub fn get<T: MetaValue>(&self, key: &MetadataKey<T>) -> Option<&T> {
        self.map.get(&key.index).map(T::unwrap)
    }

    pub fn put<T: MetaValue>(&mut self, key: &MetadataKey<T>, val: T) {
        self.map.insert(key.index, val.wrap());
    }

    fn put_raw<T: MetaValue>(&mut self, index: i32, val: T) {
        self.map.insert(index, val.wrap());
    }

    fn read_entry<R: io::Read>(
        &mut self,
        buf: &mut R,
        index: i32,
        ty: MetadataType,
    ) -> Result<(), protocol::Error> {
        match ty {
            MetadataType::Byte => self.put_raw(index, i8::read_from(buf)?),
            MetadataType::VarInt => {
                self.put_raw(index, protocol::VarInt::read_from(buf)?.0)
            }
            MetadataType::VarLong => {
                self.put_raw(index, protocol::VarLong::read_from(buf)?.0)
            }
            MetadataType::Float => self.put_raw(index, f32::read_from(buf)?),
            MetadataType::String => self.put_raw(index, String::read_from(buf)?),
            MetadataType::Chat => {
                self.put_raw(index, format::Component::read_from(buf)?)
            }
            MetadataType::OptChat => {
                let val = if bool::read_from(buf)? {
                    Some(format::Component::read_from(buf)?)
                } else {
                    None
                };
                self.put_raw(index, val);
            }
            MetadataType::Slot => {
                self.put_raw(index, Option::<item::Stack>::read_from(buf)?)
            }
            MetadataType::Boolean => self.put_raw(index, bool::read_from(buf)?),
            MetadataType::Rotation => self.put_raw(
                index,
                [
                    f32::read_from(buf)?,
                    f32::read_from(buf)?,
                    f32::read_from(buf)?,
                ],
            ),
            MetadataType::Position => self.put_raw(index, Position::read_from(buf)?),
            MetadataType::OptPosition => {
                let val = if bool::read_from(buf)? {
                    Some(Position::read_from(buf)?)
                } else {
                    None
                };
                self.put_raw(index, val);
            }
            MetadataType::Direction => {
                self.put_raw(index, protocol::VarInt::read_from(buf)?)
            }
            MetadataType::OptUuid => {
                let val = if bool::read_from(buf)? {
                    Some(protocol::UUID::read_from(buf)?)
                } else {
                    None
                };
                self.put_raw(index, val);
            }
            MetadataType::BlockId | MetadataType::OptBlockId => {
                self.put_raw(index, protocol::VarInt::read_from(buf)?.0 as u16)
            }
            MetadataType::Nbt => {
                self.map.insert(
                    index,
                    Value::Nbt(Option::<nbt::NamedTag>::read_from(buf)?),
                );
            }
            MetadataType::Particle => {
                self.put_raw(index, ParticleData::read_from(buf)?)
            }
            MetadataType::Particles => {
                let count = protocol::VarInt::read_from(buf)?.0;
                let mut particles = Vec::with_capacity(count.min(256) as usize);
                for _ in 0..count {
                    particles.push(ParticleData::read_from(buf)?);
                }
                self.map.insert(index, Value::Particles(particles));
            }
            MetadataType::VillagerData => {
                self.map.insert(
                    index,
                    Value::Villager {
                        kind: protocol::VarInt::read_from(buf)?.0,
                        profession: protocol::VarInt::read_from(buf)?.0,
                        level: protocol::VarInt::read_from(buf)?.0,
                    },
                );
            }
            MetadataType::OptVarInt => {
                // 0 means absent, anything else is the value plus one.
                let raw = protocol::VarInt::read_from(buf)?.0;
                let val = if raw == 0 { None } else { Some(raw - 1) };
                self.map.insert(index, Value::OptionalInt(val));
            }
            MetadataType::Pose => {
                self.map
                    .insert(index, Value::Pose(protocol::VarInt::read_from(buf)?.0));
            }
            MetadataType::CatVariant => {
                self.map.insert(
                    index,
                    Value::CatVariant(protocol::VarInt::read_from(buf)?.0),
                );
            }
            MetadataType::WolfVariant => {
                self.map.insert(
                    index,
                    Value::WolfVariant(protocol::VarInt::read_from(buf)?.0),
                );
            }
            MetadataType::FrogVariant => {
                self.map.insert(
                    index,
                    Value::FrogVariant(protocol::VarInt::read_from(buf)?.0),
                );
            }
            MetadataType::OptGlobalPosition => {
                let val = if bool::read_from(buf)? {
                    Some((String::read_from(buf)?, Position::read_from(buf)?))
                } else {
                    None
                };
                self.map.insert(index, Value::OptionalGlobalPosition(val));
            }
            MetadataType::PaintingVariant => {
                self.map.insert(
                    index,
                    Value::PaintingVariant(protocol::VarInt::read_from(buf)?.0),
                );
            }
            MetadataType::SnifferState => {
                self.map.insert(
                    index,
                    Value::SnifferState(protocol::VarInt::read_from(buf)?.0),
                );
            }
            MetadataType::ArmadilloState => {
                self.map.insert(
                    index,
                    Value::ArmadilloState(protocol::VarInt::read_from(buf)?.0),
                );
            }
            MetadataType::Vector3 => {
                self.map.insert(
                    index,
                    Value::Vector3([
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                    ]),
                );
            }
            MetadataType::Quaternion => {
                self.map.insert(
                    index,
                    Value::Quaternion([
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                    ]),
                );
            }
        }
        Ok(())
    }
}

impl Serializable for Metadata {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, protocol::Error> {
        let version = protocol::current_protocol_version();
        let mut m = Metadata::new();
        loop {
            let index = u8::read_from(buf)? as i32;
            if index == 0xFF {
                break;
            }
            let id = protocol::VarInt::read_from(buf)?.0;
            let ty = metadata_type_for(version, id)?;
            m.read_entry(buf, index, ty)?;
        }
        Ok(m)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        let version = protocol::current_protocol_version();
        for (k, v) in &self.map {
            let ty = v.metadata_type();
            let id = metadata_id_for(version, ty).ok_or_else(|| {
                protocol::Error::Err(format!(
                    "metadata type {:?} has no id in protocol {}",
                    ty, version
                ))
            })?;
            (*k as u8).write_to(buf)?;
            protocol::VarInt(id).write_to(buf)?;
            match *v {
                Value::Byte(ref val) => val.write_to(buf)?,
                Value::Int(ref val) => protocol::VarInt(*val).write_to(buf)?,
                Value::Long(ref val) => protocol::VarLong(*val).write_to(buf)?,
                Value::Float(ref val) => val.write_to(buf)?,
                Value::String(ref val) => val.write_to(buf)?,
                Value::FormatComponent(ref val) => val.write_to(buf)?,
                Value::OptionalFormatComponent(ref val) => {
                    val.is_some().write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::OptionalItemStack(ref val) => val.write_to(buf)?,
                Value::Bool(ref val) => val.write_to(buf)?,
                Value::Vector(ref val) | Value::Vector3(ref val) => {
                    val[0].write_to(buf)?;
                    val[1].write_to(buf)?;
                    val[2].write_to(buf)?;
                }
                Value::Position(ref val) => val.write_to(buf)?,
                Value::OptionalPosition(ref val) => {
                    val.is_some().write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::Direction(ref val) => val.write_to(buf)?,
                Value::OptionalUUID(ref val) => {
                    val.is_some().write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::Block(ref val) => {
                    protocol::VarInt(*val as i32).write_to(buf)?
                }
                Value::Nbt(ref val) => val.write_to(buf)?,
                Value::Particle(ref val) => val.write_to(buf)?,
                Value::Particles(ref val) => {
                    protocol::VarInt(val.len() as i32).write_to(buf)?;
                    for p in val {
                        p.write_to(buf)?;
                    }
                }
                Value::Villager {
                    kind,
                    profession,
                    level,
                } => {
                    protocol::VarInt(kind).write_to(buf)?;
                    protocol::VarInt(profession).write_to(buf)?;
                    protocol::VarInt(level).write_to(buf)?;
                }
                Value::OptionalInt(ref val) => {
                    protocol::VarInt(val.map_or(0, |v| v + 1)).write_to(buf)?;
                }
                Value::Pose(ref val)
                | Value::CatVariant(ref val)
                | Value::WolfVariant(ref val)
                | Value::FrogVariant(ref val)
                | Value::PaintingVariant(ref val)
                | Value::SnifferState(ref val)
                | Value::ArmadilloState(ref val) => {
                    protocol::VarInt(*val).write_to(buf)?
                }
                Value::OptionalGlobalPosition(ref val) => {
                    val.is_some().write_to(buf)?;
                    if let Some((ref world, ref pos)) = *val {
                        world.write_to(buf)?;
                        pos.write_to(buf)?;
                    }
                }
                Value::Quaternion(ref val) => {
                    val[0].write_to(buf)?;
                    val[1].write_to(buf)?;
                    val[2].write_to(buf)?;
                    val[3].write_to(buf)?;
                }
            }
        }
        u8::write_to(&0xFF, buf)?;
        Ok(())
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Metadata[ ")?;
        for (k, v) in &self.map {
            write!(f, "{:?}={:?}, ", k, v)?;
        }
        write!(f, "]")
    }
}

impl Default for Metadata {
    fn default() -> Metadata {
        Metadata::new()
    }
}

#[derive(Debug)]
pub enum Value {
    Byte(i8),
    Int(i32),
    Long(i64),
    Float(f32),
    String(String),
    FormatComponent(format::Component),
    OptionalFormatComponent(Option<format::Component>),
    OptionalItemStack(Option<item::Stack>),
    Bool(bool),
    Vector([f32; 3]),
    Position(Position),
    OptionalPosition(Option<Position>),
    Direction(protocol::VarInt),
    OptionalUUID(Option<protocol::UUID>),
    Block(u16),
    Nbt(Option<nbt::NamedTag>),
    Particle(ParticleData),
    Particles(Vec<ParticleData>),
    Villager {
        kind: i32,
        profession: i32,
        level: i32,
    },
    OptionalInt(Option<i32>),
    Pose(i32),
    CatVariant(i32),
    WolfVariant(i32),
    FrogVariant(i32),
    OptionalGlobalPosition(Option<(String, Position)>),
    PaintingVariant(i32),
    SnifferState(i32),
    ArmadilloState(i32),
    Vector3([f32; 3]),
    Quaternion([f32; 4]),
}

impl Value {
    fn metadata_type(&self) -> MetadataType {
        match *self {
            Value::Byte(_) => MetadataType::Byte,
            Value::Int(_) => MetadataType::VarInt,
            Value::Long(_) => MetadataType::VarLong,
            Value::Float(_) => MetadataType::Float,
            Value::String(_) => MetadataType::String,
            Value::FormatComponent(_) => MetadataType::Chat,
            Value::OptionalFormatComponent(_) => MetadataType::OptChat,
            Value::OptionalItemStack(_) => MetadataType::Slot,
            Value::Bool(_) => MetadataType::Boolean,
            Value::Vector(_) => MetadataType::Rotation,
            Value::Position(_) => MetadataType::Position,
            Value::OptionalPosition(_) => MetadataType::OptPosition,
            Value::Direction(_) => MetadataType::Direction,
            Value::OptionalUUID(_) => MetadataType::OptUuid,
            Value::Block(_) => MetadataType::OptBlockId,
            Value::Nbt(_) => MetadataType::Nbt,
            Value::Particle(_) => MetadataType::Particle,
            Value::Particles(_) => MetadataType::Particles,
            Value::Villager { .. } => MetadataType::VillagerData,
            Value::OptionalInt(_) => MetadataType::OptVarInt,
            Value::Pose(_) => MetadataType::Pose,
            Value::CatVariant(_) => MetadataType::CatVariant,
            Value::WolfVariant(_) => MetadataType::WolfVariant,
            Value::FrogVariant(_) => MetadataType::FrogVariant,
            Value::OptionalGlobalPosition(_) => MetadataType::OptGlobalPosition,
            Value::PaintingVariant(_) => MetadataType::PaintingVariant,
            Value::SnifferState(_) => MetadataType::SnifferState,
            Value::ArmadilloState(_) => MetadataType::ArmadilloState,
            Value::Vector3(_) => MetadataType::Vector3,
            Value::Quaternion(_) => MetadataType::Quaternion,
        }
    }
}

/// Particle reference carried inside metadata. Only the particle kinds
/// with extra payload are broken out, everything else keeps its raw id.
#[derive(Debug)]
pub enum ParticleData {
    Block {
        block_state: protocol::VarInt,
    },
    FallingDust {
        block_state: protocol::VarInt,
    },
    Dust {
        red: f32,
        green: f32,
        blue: f32,
        scale: f32,
    },
    Item {
        item: Option<item::Stack>,
    },
    Plain {
        id: i32,
    },
}

impl Serializable for ParticleData {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, protocol::Error> {
        let id = protocol::VarInt::read_from(buf)?.0;
        Ok(match id {
            3 => ParticleData::Block {
                block_state: Serializable::read_from(buf)?,
            },
            11 => ParticleData::Dust {
                red: Serializable::read_from(buf)?,
                green: Serializable::read_from(buf)?,
                blue: Serializable::read_from(buf)?,
                scale: Serializable::read_from(buf)?,
            },
            20 => ParticleData::FallingDust {
                block_state: Serializable::read_from(buf)?,
            },
            27 => ParticleData::Item {
                item: Serializable::read_from(buf)?,
            },
            _ => ParticleData::Plain { id },
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        match *self {
            ParticleData::Block { ref block_state } => {
                protocol::VarInt(3).write_to(buf)?;
                block_state.write_to(buf)?;
            }
            ParticleData::Dust {
                red,
                green,
                blue,
                scale,
            } => {
                protocol::VarInt(11).write_to(buf)?;
                red.write_to(buf)?;
                green.write_to(buf)?;
                blue.write_to(buf)?;
                scale.write_to(buf)?;
            }
            ParticleData::FallingDust { ref block_state } => {
                protocol::VarInt(20).write_to(buf)?;
                block_state.write_to(buf)?;
            }
            ParticleData::Item { ref item } => {
                protocol::VarInt(27).write_to(buf)?;
                item.write_to(buf)?;
            }
            ParticleData::Plain { id } => {
                protocol::VarInt(id).write_to(buf)?;
            }
        }
        Ok(())
    }
}

pub trait MetaValue {
    fn unwrap(_: &Value) -> &Self;
    fn wrap(self) -> Value;
}

impl MetaValue for i8 {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Byte(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Byte(self)
    }
}

impl MetaValue for i32 {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Int(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Int(self)
    }
}

impl MetaValue for i64 {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Long(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Long(self)
    }
}

impl MetaValue for f32 {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Float(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Float(self)
    }
}

impl MetaValue for String {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::String(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::String(self)
    }
}

impl MetaValue for format::Component {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::FormatComponent(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::FormatComponent(self)
    }
}

impl MetaValue for Option<format::Component> {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::OptionalFormatComponent(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::OptionalFormatComponent(self)
    }
}

impl MetaValue for Option<item::Stack> {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::OptionalItemStack(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::OptionalItemStack(self)
    }
}

impl MetaValue for bool {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Bool(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Bool(self)
    }
}

impl MetaValue for [f32; 3] {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Vector(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Vector(self)
    }
}

impl MetaValue for Position {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Position(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Position(self)
    }
}

impl MetaValue for Option<Position> {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::OptionalPosition(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::OptionalPosition(self)
    }
}

impl MetaValue for protocol::VarInt {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Direction(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Direction(self)
    }
}

impl MetaValue for Option<protocol::UUID> {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::OptionalUUID(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::OptionalUUID(self)
    }
}

impl MetaValue for u16 {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Block(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Block(self)
    }
}

impl MetaValue for ParticleData {
    fn unwrap(value: &Value) -> &Self {
        match *value {
            Value::Particle(ref val) => val,
            _ => panic!("incorrect key"),
        }
    }
    fn wrap(self) -> Value {
        Value::Particle(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::marker::PhantomData;

    const TEST: MetadataKey<String> = MetadataKey {
        index: 0,
        ty: PhantomData,
    };

    #[test]
    fn basic() {
        let mut m = Metadata::new();

        m.put(&TEST, "Hello world".to_owned());

        match m.get(&TEST) {
            Some(val) => {
                assert!(val == "Hello world");
            }
            None => panic!("failed"),
        }
    }

    #[test]
    fn palettes_are_total() {
        for (version, len) in [(754, 23), (761, 24), (762, 28), (765, 28), (766, 31)] {
            for id in 0..len {
                assert!(
                    metadata_type_for(version, id).is_ok(),
                    "gap at id {} in protocol {}",
                    id,
                    version
                );
            }
            match metadata_type_for(version, len) {
                Err(crate::protocol::Error::UnknownMetadataType(id)) => {
                    assert_eq!(id, len)
                }
                other => panic!("expected unknown type, got {:?}", other),
            }
        }
    }

    #[test]
    fn varlong_shifts_the_palette() {
        assert_eq!(metadata_type_for(760, 2).unwrap(), MetadataType::Float);
        assert_eq!(metadata_type_for(761, 2).unwrap(), MetadataType::VarLong);
        assert_eq!(metadata_type_for(761, 3).unwrap(), MetadataType::Float);
    }

    #[test]
    fn block_id_insertion() {
        assert_eq!(metadata_type_for(761, 14).unwrap(), MetadataType::OptBlockId);
        assert_eq!(metadata_type_for(762, 14).unwrap(), MetadataType::BlockId);
        assert_eq!(metadata_type_for(762, 15).unwrap(), MetadataType::OptBlockId);
    }

    #[test]
    fn particles_only_in_newest_band() {
        assert_eq!(metadata_type_for(766, 18).unwrap(), MetadataType::Particles);
        assert_eq!(
            metadata_type_for(765, 18).unwrap(),
            MetadataType::VillagerData
        );
    }
}
