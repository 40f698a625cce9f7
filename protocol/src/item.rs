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

use crate::nbt;
use crate::protocol::{self, Serializable};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io;

#[derive(Debug, Default)]
pub struct Stack {
    pub id: isize,
    pub count: isize,
    pub damage: Option<isize>,
    pub tag: Option<nbt::NamedTag>,
}

impl Stack {
    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }
}

impl Serializable for Option<Stack> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Option<Stack>, protocol::Error> {
        let protocol_version = protocol::current_protocol_version();
        if protocol_version >= 766 {
            // 1.20.5 interleaves "data components" after the id. An
            // empty component set is the common case for metadata
            // slots, anything else needs per-component tables we do
            // not carry, so bail before misreading the stream.
            let count = protocol::VarInt::read_from(buf)?.0 as isize;
            if count <= 0 {
                return Ok(None);
            }
            let id = protocol::VarInt::read_from(buf)?.0 as isize;
            let added = protocol::VarInt::read_from(buf)?.0;
            let removed = protocol::VarInt::read_from(buf)?.0;
            if added != 0 || removed != 0 {
                return Err(protocol::Error::Err(
                    "structured item components are not supported".to_owned(),
                ));
            }
            Ok(Some(Stack {
                id,
                count,
                damage: None,
                tag: None,
            }))
        } else if protocol_version >= 404 {
            let present = bool::read_from(buf)?;
            if !present {
                return Ok(None);
            }
            Ok(Some(Stack {
                id: protocol::VarInt::read_from(buf)?.0 as isize,
                count: buf.read_u8()? as isize,
                damage: None,
                tag: Serializable::read_from(buf)?,
            }))
        } else {
            let id = buf.read_i16::<BigEndian>()?;
            if id == -1 {
                return Ok(None);
            }
            Ok(Some(Stack {
                id: id as isize,
                count: buf.read_u8()? as isize,
                damage: Some(buf.read_i16::<BigEndian>()? as isize),
                tag: Serializable::read_from(buf)?,
            }))
        }
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        let protocol_version = protocol::current_protocol_version();
        if protocol_version >= 766 {
            match *self {
                Some(ref val) => {
                    protocol::VarInt(val.count as i32).write_to(buf)?;
                    protocol::VarInt(val.id as i32).write_to(buf)?;
                    protocol::VarInt(0).write_to(buf)?;
                    protocol::VarInt(0).write_to(buf)?;
                }
                None => protocol::VarInt(0).write_to(buf)?,
            }
        } else if protocol_version >= 404 {
            match *self {
                Some(ref val) => {
                    true.write_to(buf)?;
                    protocol::VarInt(val.id as i32).write_to(buf)?;
                    buf.write_u8(val.count as u8)?;
                    val.tag.write_to(buf)?;
                }
                None => false.write_to(buf)?,
            }
        } else {
            match *self {
                Some(ref val) => {
                    buf.write_i16::<BigEndian>(val.id as i16)?;
                    buf.write_u8(val.count as u8)?;
                    buf.write_i16::<BigEndian>(val.damage.unwrap_or(0) as i16)?;
                    val.tag.write_to(buf)?;
                }
                None => buf.write_i16::<BigEndian>(-1)?,
            }
        }
        Ok(())
    }
}
