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

use aes::Aes128;
use cfb8::cipher::{AsyncStreamCipher, NewCipher};
use cfb8::Cfb8;
use serde_json::Value;
use std::convert;
use std::default;
use std::fmt;
use std::io;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::{Duration, Instant, UNIX_EPOCH};

use crate::format;
use crate::nbt;
use crate::shared::Position;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use log::{debug, warn};

pub mod forge;
pub mod microsoft;
pub mod mojang;
pub mod srv;
pub mod timeout;

pub const SUPPORTED_PROTOCOLS: [i32; 28] = [
    766, 765, 764, 763, 762, 761, 760, 759, 758, 757, 756, 755, 754, 753, 751, 736, 735, 578, 575,
    573, 498, 490, 485, 480, 477, 404, 401, 393,
];

static CURRENT_PROTOCOL_VERSION: AtomicI32 = AtomicI32::new(SUPPORTED_PROTOCOLS[0]);
static NETWORK_DEBUG: AtomicBool = AtomicBool::new(false);

pub fn current_protocol_version() -> i32 {
    CURRENT_PROTOCOL_VERSION.load(Ordering::Relaxed)
}

pub fn set_current_protocol_version(version: i32) {
    CURRENT_PROTOCOL_VERSION.store(version, Ordering::Relaxed);
}

pub fn enable_network_debug() {
    NETWORK_DEBUG.store(true, Ordering::Relaxed);
}

pub fn is_network_debug() -> bool {
    NETWORK_DEBUG.load(Ordering::Relaxed)
}

/// The release name a protocol number is known under. Several releases
/// share a protocol number when the wire format did not change between
/// them.
pub fn protocol_name_by_version(version: i32) -> &'static str {
    match version {
        393 => "1.13",
        401 => "1.13.1",
        404 => "1.13.2",
        477 => "1.14",
        480 => "1.14.1",
        485 => "1.14.2",
        490 => "1.14.3",
        498 => "1.14.4",
        573 => "1.15",
        575 => "1.15.1",
        578 => "1.15.2",
        735 => "1.16",
        736 => "1.16.1",
        751 => "1.16.2",
        753 => "1.16.3",
        754 => "1.16.5",
        755 => "1.17",
        756 => "1.17.1",
        757 => "1.18.1",
        758 => "1.18.2",
        759 => "1.19",
        760 => "1.19.2",
        761 => "1.19.3",
        762 => "1.19.4",
        763 => "1.20.1",
        764 => "1.20.2",
        765 => "1.20.4",
        766 => "1.20.6",
        _ => "unknown",
    }
}

/// Maps a release name onto its protocol number, or 0 when the name is
/// not recognised.
pub fn protocol_version_by_name(name: &str) -> i32 {
    match name {
        "1.13" => 393,
        "1.13.1" => 401,
        "1.13.2" => 404,
        "1.14" => 477,
        "1.14.1" => 480,
        "1.14.2" => 485,
        "1.14.3" => 490,
        "1.14.4" => 498,
        "1.15" => 573,
        "1.15.1" => 575,
        "1.15.2" => 578,
        "1.16" => 735,
        "1.16.1" => 736,
        "1.16.2" => 751,
        "1.16.3" => 753,
        "1.16.4" | "1.16.5" => 754,
        "1.17" => 755,
        "1.17.1" => 756,
        "1.18" | "1.18.1" => 757,
        "1.18.2" => 758,
        "1.19" => 759,
        "1.19.1" | "1.19.2" => 760,
        "1.19.3" => 761,
        "1.19.4" => 762,
        "1.20" | "1.20.1" => 763,
        "1.20.2" => 764,
        "1.20.3" | "1.20.4" => 765,
        "1.20.5" | "1.20.6" => 766,
        _ => 0,
    }
}

pub fn is_supported(version: i32) -> bool {
    SUPPORTED_PROTOCOLS.contains(&version)
}

/// Helps with the generation of packet definitions.
///
/// Defines the packet fields and the conditions under which versioned
/// fields exist, one module per state and direction.
#[macro_export]
macro_rules! state_packets {
     ($($state:ident $stateName:ident {
        $($dir:ident $dirName:ident {
            $(
                $(#[$attr:meta])*
                packet $name:ident {
                    $($(#[$fattr:meta])* field $field:ident: $field_type:ty = $(when ($cond:expr))*, )*
                }
            )*
        })+
    })+) => {
        use crate::protocol::*;
        use std::io;

        #[derive(Debug)]
        pub enum Packet {
        $(
            $(
                $(
                    $name($state::$dir::$name),
                )*
            )+
        )+
        }

        $(
        pub mod $state {

            $(
            pub mod $dir {
                #![allow(unused_imports)]
                use crate::format;
                use crate::item;
                use crate::nbt;
                use crate::protocol::*;
                use crate::shared::Position;
                use crate::types;
                use std::io;

                #[allow(non_upper_case_globals)]
                pub mod internal_ids {
                    create_ids!(i32, $($name),*);
                }

                $(
                    #[derive(Default, Debug)]
                    $(#[$attr])* pub struct $name {
                        $($(#[$fattr])* pub $field: $field_type),*,
                    }

                    impl PacketType for $name {

                        fn packet_id(&self, version: i32) -> i32 {
                            crate::protocol::versions::translate_internal_packet_id_for_version(
                                version,
                                State::$stateName,
                                Direction::$dirName,
                                internal_ids::$name,
                                false,
                            )
                        }

                        fn write<W: io::Write>(self, buf: &mut W) -> Result<(), Error> {
                            $(
                                if true $(&& ($cond(&self)))* {
                                    self.$field.write_to(buf)?;
                                }
                            )*

                            Result::Ok(())
                        }
                    }
                )*
            }
            )+
        }
        )+

        /// Decodes a packet for the given state, direction and external
        /// id. Ids the active version table does not map decode to `None`.
        pub fn packet_by_id<R: io::Read>(
            version: i32,
            state: State,
            dir: Direction,
            id: i32,
            mut buf: &mut R,
        ) -> Result<Option<Packet>, Error> {
            match state {
                $(
                    State::$stateName => {
                        match dir {
                            $(
                                Direction::$dirName => {
                                    let internal_id = crate::protocol::versions::translate_internal_packet_id_for_version(version, state, dir, id, true);
                                    match internal_id {
                                    $(
                                        self::$state::$dir::internal_ids::$name => {
                                            use self::$state::$dir::$name;
                                            let mut packet : $name = $name::default();
                                            $(
                                                if true $(&& ($cond(&packet)))* {
                                                    packet.$field = Serializable::read_from(&mut buf)?;
                                                }
                                            )*
                                            Result::Ok(Option::Some(Packet::$name(packet)))
                                        },
                                    )*
                                        _ => Result::Ok(Option::None)
                                    }
                                }
                            )+
                        }
                    }
                )+
            }
        }
    }
}

#[macro_export]
macro_rules! protocol_packet_ids {
    ($($state:ident $stateName:ident {
        $($dir:ident $dirName:ident {
            $(
                $(#[$attr:meta])*
                $id:expr => $name:ident
            )*
        })*
    })+) => {
        pub fn translate_internal_packet_id(
            state: crate::protocol::State,
            dir: crate::protocol::Direction,
            id: i32,
            to_internal: bool,
        ) -> i32 {
            match state {
                $(
                    crate::protocol::State::$stateName => {
                        match dir {
                            $(
                                crate::protocol::Direction::$dirName => {
                                    if to_internal {
                                        match id {
                                            $(
                                                $(#[$attr])*
                                                $id => crate::protocol::packet::$state::$dir::internal_ids::$name,
                                            )*
                                            _ => -1,
                                        }
                                    } else {
                                        match id {
                                            $(
                                                $(#[$attr])*
                                                crate::protocol::packet::$state::$dir::internal_ids::$name => $id,
                                            )*
                                            _ => -1,
                                        }
                                    }
                                }
                            )*
                            #[allow(unreachable_patterns)]
                            _ => -1,
                        }
                    }
                )+
                #[allow(unreachable_patterns)]
                _ => -1,
            }
        }
    }
}

pub mod packet;
pub mod versions;

pub trait Serializable: Sized {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error>;
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error>;
}

impl Serializable for Vec<u8> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Vec<u8>, Error> {
        let mut v = Vec::new();
        buf.read_to_end(&mut v)?;
        Ok(v)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_all(&self[..]).map_err(|v| v.into())
    }
}

impl Serializable for Option<nbt::NamedTag> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Option<nbt::NamedTag>, Error> {
        let ty = buf.read_u8()?;
        if ty == 0 {
            Result::Ok(None)
        } else if current_protocol_version() >= 764 {
            // 1.20.2 dropped the root name from network nbt
            let tag = nbt::Tag::read_type(ty, buf)?;
            Result::Ok(Some(nbt::NamedTag(String::new(), tag)))
        } else {
            let name = nbt::read_string(buf)?;
            let tag = nbt::Tag::read_type(ty, buf)?;
            Result::Ok(Some(nbt::NamedTag(name, tag)))
        }
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        match *self {
            Some(ref val) => {
                buf.write_u8(10)?;
                if current_protocol_version() < 764 {
                    nbt::write_string(buf, &val.0)?;
                }
                val.1.write_to(buf)?;
            }
            None => buf.write_u8(0)?,
        }
        Result::Ok(())
    }
}

impl<T> Serializable for Option<T>
where
    T: Serializable,
{
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Option<T>, Error> {
        Result::Ok(Some(T::read_from(buf)?))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        if self.is_some() {
            self.as_ref().unwrap().write_to(buf)?;
        }
        Result::Ok(())
    }
}

impl Serializable for String {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<String, Error> {
        let len = VarInt::read_from(buf)?.0;
        if len < 0 || len > 1 << 18 {
            return Err(Error::Err(format!("bad string length: {}", len)));
        }
        let mut bytes = Vec::<u8>::with_capacity(len as usize);
        buf.take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len as usize {
            return Err(Error::TruncatedData);
        }
        String::from_utf8(bytes).map_err(|_| Error::Err("invalid utf8 in string".to_owned()))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let bytes = self.as_bytes();
        VarInt(bytes.len() as i32).write_to(buf)?;
        buf.write_all(bytes)?;
        Result::Ok(())
    }
}

impl Serializable for format::Component {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error> {
        if current_protocol_version() >= 765 {
            // 1.20.3 moved chat components from json strings to nbt
            let tag = match Option::<nbt::NamedTag>::read_from(buf)? {
                Some(nbt::NamedTag(_, tag)) => tag,
                None => nbt::Tag::String(String::new()),
            };
            Result::Ok(format::Component::from_nbt(&tag))
        } else {
            let string = String::read_from(buf)?;
            Result::Ok(format::Component::from_string(&string))
        }
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        if current_protocol_version() >= 765 {
            Some(nbt::NamedTag(String::new(), self.to_nbt())).write_to(buf)
        } else {
            serde_json::to_string(&self.to_value())?.write_to(buf)
        }
    }
}

impl Serializable for Position {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Position, Error> {
        let pos = buf.read_u64::<BigEndian>()?;
        if current_protocol_version() >= 477 {
            // 1.14 moved y to the low 12 bits
            Result::Ok(Position::new(
                ((pos as i64) >> 38) as i32,
                ((pos as i64) << 52 >> 52) as i32,
                ((pos as i64) << 26 >> 38) as i32,
            ))
        } else {
            Result::Ok(Position::new(
                ((pos as i64) >> 38) as i32,
                ((pos as i64) << 26 >> 52) as i32,
                ((pos as i64) << 38 >> 38) as i32,
            ))
        }
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let pos = if current_protocol_version() >= 477 {
            (((self.x as u64) & 0x3FFFFFF) << 38)
                | (((self.z as u64) & 0x3FFFFFF) << 12)
                | ((self.y as u64) & 0xFFF)
        } else {
            (((self.x as u64) & 0x3FFFFFF) << 38)
                | (((self.y as u64) & 0xFFF) << 26)
                | ((self.z as u64) & 0x3FFFFFF)
        };
        pos.write_to(buf)
    }
}

impl Serializable for () {
    fn read_from<R: io::Read>(_: &mut R) -> Result<(), Error> {
        Result::Ok(())
    }
    fn write_to<W: io::Write>(&self, _: &mut W) -> Result<(), Error> {
        Result::Ok(())
    }
}

impl Serializable for bool {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<bool, Error> {
        Result::Ok(buf.read_u8()? != 0)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u8(u8::from(*self))?;
        Result::Ok(())
    }
}

impl Serializable for i8 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i8, Error> {
        Result::Ok(buf.read_i8()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i8(*self)?;
        Result::Ok(())
    }
}

impl Serializable for i16 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i16, Error> {
        Result::Ok(buf.read_i16::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i16::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for i32 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i32, Error> {
        Result::Ok(buf.read_i32::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i32::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for i64 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i64, Error> {
        Result::Ok(buf.read_i64::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i64::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u8 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u8, Error> {
        Result::Ok(buf.read_u8()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u8(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u16 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u16, Error> {
        Result::Ok(buf.read_u16::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u16::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u64 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u64, Error> {
        Result::Ok(buf.read_u64::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u64::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for f32 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<f32, Error> {
        Result::Ok(buf.read_f32::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_f32::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for f64 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<f64, Error> {
        Result::Ok(buf.read_f64::<BigEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_f64::<BigEndian>(*self)?;
        Result::Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UUID(pub u64, pub u64);

impl UUID {
    pub fn from_str(s: &str) -> Result<UUID, Error> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return Err(Error::Err(format!("invalid uuid: {}", s)));
        }
        let high = u64::from_str_radix(&hex[..16], 16)
            .map_err(|_| Error::Err(format!("invalid uuid: {}", s)))?;
        let low = u64::from_str_radix(&hex[16..], 16)
            .map_err(|_| Error::Err(format!("invalid uuid: {}", s)))?;
        Ok(UUID(high, low))
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.0, self.1)
    }
}

impl fmt::Debug for UUID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serializable for UUID {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<UUID, Error> {
        Result::Ok(UUID(
            buf.read_u64::<BigEndian>()?,
            buf.read_u64::<BigEndian>()?,
        ))
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u64::<BigEndian>(self.0)?;
        buf.write_u64::<BigEndian>(self.1)?;
        Result::Ok(())
    }
}

pub trait Lengthable: Serializable + Copy + Default {
    fn into_len(self) -> usize;
    fn from_len(_: usize) -> Self;
}

impl Lengthable for bool {
    fn into_len(self) -> usize {
        usize::from(self)
    }

    fn from_len(u: usize) -> bool {
        u != 0
    }
}

impl Lengthable for u8 {
    fn into_len(self) -> usize {
        self as usize
    }

    fn from_len(u: usize) -> u8 {
        u as u8
    }
}

impl Lengthable for i16 {
    fn into_len(self) -> usize {
        self as usize
    }

    fn from_len(u: usize) -> i16 {
        u as i16
    }
}

impl Lengthable for i32 {
    fn into_len(self) -> usize {
        self as usize
    }

    fn from_len(u: usize) -> i32 {
        u as i32
    }
}

pub struct LenPrefixed<L: Lengthable, V> {
    len: L,
    pub data: Vec<V>,
}

impl<L: Lengthable, V: Default> LenPrefixed<L, V> {
    pub fn new(data: Vec<V>) -> LenPrefixed<L, V> {
        LenPrefixed {
            len: Default::default(),
            data,
        }
    }
}

impl<L: Lengthable, V: Serializable> Serializable for LenPrefixed<L, V> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<LenPrefixed<L, V>, Error> {
        let len_data: L = Serializable::read_from(buf)?;
        let len = len_data.into_len();
        let mut data: Vec<V> = Vec::with_capacity(len.min(65536));
        for _ in 0..len {
            data.push(Serializable::read_from(buf)?);
        }
        Result::Ok(LenPrefixed {
            len: len_data,
            data,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let len_data: L = L::from_len(self.data.len());
        len_data.write_to(buf)?;
        for val in &self.data {
            val.write_to(buf)?;
        }
        Result::Ok(())
    }
}

impl<L: Lengthable, V: Default> Default for LenPrefixed<L, V> {
    fn default() -> Self {
        LenPrefixed {
            len: default::Default::default(),
            data: Vec::new(),
        }
    }
}

impl<L: Lengthable, V: fmt::Debug> fmt::Debug for LenPrefixed<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.data.fmt(f)
    }
}

// Avoids the per-element overhead of LenPrefixed for raw byte blobs
pub struct LenPrefixedBytes<L: Lengthable> {
    len: L,
    pub data: Vec<u8>,
}

impl<L: Lengthable> LenPrefixedBytes<L> {
    pub fn new(data: Vec<u8>) -> LenPrefixedBytes<L> {
        LenPrefixedBytes {
            len: Default::default(),
            data,
        }
    }
}

impl<L: Lengthable> Serializable for LenPrefixedBytes<L> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<LenPrefixedBytes<L>, Error> {
        let len_data: L = Serializable::read_from(buf)?;
        let len = len_data.into_len();
        let mut data: Vec<u8> = Vec::with_capacity(len.min(1 << 20));
        buf.take(len as u64).read_to_end(&mut data)?;
        if data.len() != len {
            return Err(Error::TruncatedData);
        }
        Result::Ok(LenPrefixedBytes {
            len: len_data,
            data,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let len_data: L = L::from_len(self.data.len());
        len_data.write_to(buf)?;
        buf.write_all(&self.data[..])?;
        Result::Ok(())
    }
}

impl<L: Lengthable> Default for LenPrefixedBytes<L> {
    fn default() -> Self {
        LenPrefixedBytes {
            len: default::Default::default(),
            data: Vec::new(),
        }
    }
}

impl<L: Lengthable> fmt::Debug for LenPrefixedBytes<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.data.fmt(f)
    }
}

/// `VarInt` have a variable size (between 1 and 5 bytes) when encoded
/// based on the size of the number
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub i32);

impl Lengthable for VarInt {
    fn into_len(self) -> usize {
        self.0 as usize
    }

    fn from_len(u: usize) -> VarInt {
        VarInt(u as i32)
    }
}

impl Serializable for VarInt {
    /// Decodes a `VarInt` from the Reader
    fn read_from<R: io::Read>(buf: &mut R) -> Result<VarInt, Error> {
        const PART: u32 = 0x7F;
        let mut size = 0;
        let mut val = 0u32;
        loop {
            let b = buf.read_u8()? as u32;
            if size >= 5 {
                return Result::Err(Error::Err("VarInt too big".to_owned()));
            }
            val |= (b & PART) << (size * 7);
            size += 1;
            if (b & 0x80) == 0 {
                break;
            }
        }

        Result::Ok(VarInt(val as i32))
    }

    /// Encodes a `VarInt` into the Writer
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        const PART: u32 = 0x7F;
        let mut val = self.0 as u32;
        loop {
            if (val & !PART) == 0 {
                buf.write_u8(val as u8)?;
                return Result::Ok(());
            }
            buf.write_u8(((val & PART) | 0x80) as u8)?;
            val >>= 7;
        }
    }
}

impl default::Default for VarInt {
    fn default() -> VarInt {
        VarInt(0)
    }
}

impl fmt::Debug for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// `VarLong` have a variable size (between 1 and 10 bytes) when encoded
/// based on the size of the number
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VarLong(pub i64);

impl Lengthable for VarLong {
    fn into_len(self) -> usize {
        self.0 as usize
    }

    fn from_len(u: usize) -> VarLong {
        VarLong(u as i64)
    }
}

impl Serializable for VarLong {
    /// Decodes a `VarLong` from the Reader
    fn read_from<R: io::Read>(buf: &mut R) -> Result<VarLong, Error> {
        const PART: u64 = 0x7F;
        let mut size = 0;
        let mut val = 0u64;
        loop {
            let b = buf.read_u8()? as u64;
            if size >= 10 {
                return Result::Err(Error::Err("VarLong too big".to_owned()));
            }
            val |= (b & PART) << (size * 7);
            size += 1;
            if (b & 0x80) == 0 {
                break;
            }
        }

        Result::Ok(VarLong(val as i64))
    }

    /// Encodes a `VarLong` into the Writer
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        const PART: u64 = 0x7F;
        let mut val = self.0 as u64;
        loop {
            if (val & !PART) == 0 {
                buf.write_u8(val as u8)?;
                return Result::Ok(());
            }
            buf.write_u8(((val & PART) | 0x80) as u8)?;
            val >>= 7;
        }
    }
}

impl default::Default for VarLong {
    fn default() -> VarLong {
        VarLong(0)
    }
}

impl fmt::Debug for VarLong {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The fixed 4x4x4 biome cube grid carried by 1.15 and 1.16/1.16.1
/// chunk data for a full column (64 cells per section slot, 1024
/// total).
pub struct Biomes3D {
    pub data: Vec<i32>,
}

impl fmt::Debug for Biomes3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Biomes3D(len={})", self.data.len())
    }
}

impl Default for Biomes3D {
    fn default() -> Self {
        Biomes3D { data: Vec::new() }
    }
}

impl Serializable for Biomes3D {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Biomes3D, Error> {
        let mut data = Vec::with_capacity(1024);
        for _ in 0..1024 {
            data.push(buf.read_i32::<BigEndian>()?);
        }
        Result::Ok(Biomes3D { data })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        for b in &self.data {
            buf.write_i32::<BigEndian>(*b)?;
        }
        Result::Ok(())
    }
}

#[derive(Debug)]
pub enum Error {
    Err(String),
    Disconnect(format::Component),
    IOError(io::Error),
    Json(serde_json::Error),
    Reqwest(reqwest::Error),
    /// The stream ended while more input was required.
    TruncatedData,
    /// An nbt tag id outside the known range.
    MalformedTag(u8),
    /// A packed container index resolved outside its palette. The rest
    /// of the stream cannot be trusted once this happens.
    PaletteIndexOutOfRange {
        index: u32,
        palette_len: usize,
        bits: u8,
    },
    /// An entity metadata type id the current palette does not know.
    UnknownMetadataType(i32),
}

impl convert::From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::TruncatedData
        } else {
            Error::IOError(e)
        }
    }
}

impl convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl convert::From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Reqwest(e)
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Err(ref val) => write!(f, "protocol error: {}", val),
            Error::Disconnect(ref val) => write!(f, "{}", val),
            Error::IOError(ref err) => err.fmt(f),
            Error::Json(ref err) => err.fmt(f),
            Error::Reqwest(ref err) => err.fmt(f),
            Error::TruncatedData => write!(f, "data ended earlier than expected"),
            Error::MalformedTag(id) => write!(f, "malformed nbt tag id {}", id),
            Error::PaletteIndexOutOfRange {
                index,
                palette_len,
                bits,
            } => write!(
                f,
                "palette index {} out of range (palette has {} entries at {} bits)",
                index, palette_len, bits
            ),
            Error::UnknownMetadataType(id) => write!(f, "unknown entity metadata type {}", id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Handshaking,
    Status,
    Login,
    /// The registry/settings sync phase 1.20.2 inserted between login
    /// and play.
    Configuration,
    Play,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Serverbound,
    Clientbound,
}

/// A connection to a server. The cipher and compression state are kept
/// private so every read and write goes through the framing logic.
pub struct Conn {
    stream: TcpStream,
    pub host: String,
    pub port: u16,
    direction: Direction,
    pub protocol_version: i32,
    pub state: State,
    // Each direction keeps its own feedback register.
    read_cipher: Option<Cfb8<Aes128>>,
    write_cipher: Option<Cfb8<Aes128>>,
    compression_threshold: i32,
}

impl Conn {
    /// Opens a tcp connection to the given address. `hostname:port` and
    /// a bare `hostname` (default port 25565) are both accepted.
    pub fn new(target: &str, protocol_version: i32) -> Result<Conn, Error> {
        let mut parts = target.split(':').collect::<Vec<&str>>();
        if parts.len() == 1 {
            parts.push("25565");
        }
        let address = format!("{}:{}", parts[0], parts[1]);
        let stream = TcpStream::connect(&*address)?;
        Result::Ok(Conn {
            stream,
            host: parts[0].to_owned(),
            port: parts[1].parse().unwrap_or(25565),
            direction: Direction::Serverbound,
            protocol_version,
            state: State::Handshaking,
            read_cipher: Option::None,
            write_cipher: Option::None,
            compression_threshold: -1,
        })
    }

    pub fn write_packet<T: PacketType>(&mut self, packet: T) -> Result<(), Error> {
        let mut buf = Vec::new();
        let id = packet.packet_id(self.protocol_version);
        if id < 0 {
            return Err(Error::Err(format!(
                "packet has no id for protocol {}",
                self.protocol_version
            )));
        }
        VarInt(id).write_to(&mut buf)?;
        packet.write(&mut buf)?;

        let mut extra = i32::from(self.compression_threshold >= 0);
        if self.compression_threshold >= 0 && buf.len() as i32 > self.compression_threshold {
            extra = 0;
            let uncompressed_size = buf.len();
            let mut new = Vec::new();
            VarInt(uncompressed_size as i32).write_to(&mut new)?;
            let mut read = ZlibEncoder::new(io::Cursor::new(buf), Compression::default());
            read.read_to_end(&mut new)?;
            if is_network_debug() {
                debug!(
                    "compressed outgoing packet from {} to {} bytes",
                    uncompressed_size,
                    new.len()
                );
            }
            buf = new;
        }

        VarInt(buf.len() as i32 + extra).write_to(self)?;
        if extra == 1 {
            VarInt(0).write_to(self)?;
        }
        self.write_all(&buf)?;

        Result::Ok(())
    }

    pub fn read_packet(&mut self) -> Result<Option<packet::Packet>, Error> {
        let len = VarInt::read_from(self)?.0 as usize;
        let mut ibuf = vec![0; len];
        self.read_exact(&mut ibuf)?;

        let mut buf = io::Cursor::new(ibuf);

        if self.compression_threshold >= 0 {
            let uncompressed_size = VarInt::read_from(&mut buf)?.0;
            if uncompressed_size != 0 {
                let mut new = Vec::with_capacity(uncompressed_size as usize);
                {
                    let mut reader = ZlibDecoder::new(buf);
                    reader.read_to_end(&mut new)?;
                }
                if is_network_debug() {
                    debug!(
                        "decompressed incoming packet from {} to {} bytes",
                        len,
                        new.len()
                    );
                }
                buf = io::Cursor::new(new);
            }
        }
        let id = VarInt::read_from(&mut buf)?.0;

        let dir = match self.direction {
            Direction::Clientbound => Direction::Serverbound,
            Direction::Serverbound => Direction::Clientbound,
        };

        if is_network_debug() {
            debug!(
                "about to parse id={:x}, state={:?} dir={:?} version={}",
                id, self.state, dir, self.protocol_version
            );
        }

        let packet = match packet::packet_by_id(self.protocol_version, self.state, dir, id, &mut buf)
        {
            Ok(val) => val,
            // The frame was read whole, so a metadata id this version
            // doesn't know costs only this one entity update.
            Err(Error::UnknownMetadataType(ty)) => {
                warn!(
                    "dropping packet 0x{:X} with unknown metadata type {}",
                    id, ty
                );
                return Result::Ok(None);
            }
            Err(err) => return Result::Err(err),
        };

        match packet {
            Some(val) => {
                let pos = buf.position() as usize;
                let ibuf = buf.into_inner();
                if ibuf.len() != pos {
                    return Result::Err(Error::Err(format!(
                        "failed to read all of packet 0x{:X}, had {} bytes left",
                        id,
                        ibuf.len() - pos
                    )));
                }
                Result::Ok(Some(val))
            }
            // Unmapped external ids are skipped. The frame was consumed
            // whole so the stream stays aligned.
            None => {
                if is_network_debug() {
                    debug!(
                        "skipping unknown packet id 0x{:X} in {:?} {:?}",
                        id, self.state, dir
                    );
                }
                Result::Ok(None)
            }
        }
    }

    /// Turns on AES-128 CFB-8 in both directions. The shared secret is
    /// used as both key and initialisation vector.
    pub fn enable_encryption(&mut self, key: &[u8]) -> Result<(), Error> {
        let bad_key = || Error::Err("invalid cipher key length".to_owned());
        self.read_cipher = Option::Some(Cfb8::new_from_slices(key, key).map_err(|_| bad_key())?);
        self.write_cipher = Option::Some(Cfb8::new_from_slices(key, key).map_err(|_| bad_key())?);
        Ok(())
    }

    pub fn set_compression(&mut self, threshold: i32) {
        self.compression_threshold = threshold;
    }

    /// Sends the handshake and a status request over this connection,
    /// returning the decoded status along with the measured ping round
    /// trip time.
    pub fn do_status(mut self) -> Result<(Status, Duration), Error> {
        use self::packet::handshake::serverbound::Handshake;
        use self::packet::status::serverbound;
        let host = self.host.clone();
        let port = self.port;
        self.write_packet(Handshake {
            protocol_version: VarInt(self.protocol_version),
            host,
            port,
            next: VarInt(1),
        })?;
        self.state = State::Status;

        self.write_packet(serverbound::StatusRequest { empty: () })?;

        let status = loop {
            match self.read_packet()? {
                Some(packet::Packet::StatusResponse(res)) => break res.status,
                Some(_) => return Err(Error::Err("wrong packet".to_owned())),
                None => continue,
            }
        };

        let start = Instant::now();
        self.write_packet(serverbound::StatusPing { ping: 42 })?;

        loop {
            match self.read_packet()? {
                Some(packet::Packet::StatusPong(_)) => break,
                Some(_) => return Err(Error::Err("wrong packet".to_owned())),
                None => continue,
            }
        }

        let ping = start.elapsed();

        let val: Value = serde_json::from_str(&status)?;

        let invalid_status = || Error::Err("invalid status".to_owned());

        let version = val.get("version").ok_or_else(invalid_status)?;
        let players = val.get("players").ok_or_else(invalid_status)?;

        Ok((
            Status {
                version: StatusVersion {
                    name: version
                        .get("name")
                        .and_then(Value::as_str)
                        .ok_or_else(invalid_status)?
                        .to_owned(),
                    protocol: version
                        .get("protocol")
                        .and_then(Value::as_i64)
                        .ok_or_else(invalid_status)? as i32,
                },
                players: StatusPlayers {
                    max: players
                        .get("max")
                        .and_then(Value::as_i64)
                        .ok_or_else(invalid_status)? as i32,
                    online: players
                        .get("online")
                        .and_then(Value::as_i64)
                        .ok_or_else(invalid_status)? as i32,
                },
                description: format::Component::from_value(
                    val.get("description").ok_or_else(invalid_status)?,
                ),
                favicon: val
                    .get("favicon")
                    .and_then(Value::as_str)
                    .map(|v| v.to_owned()),
                forge_mods: forge::ForgeInfo::from_status(&val),
            },
            ping,
        ))
    }
}

#[derive(Debug)]
pub struct Status {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: format::Component,
    pub favicon: Option<String>,
    pub forge_mods: Option<forge::ForgeInfo>,
}

#[derive(Debug)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
}

/// Pings a server within a hard time limit. `None` means the server did
/// not answer in time.
pub fn probe_server(
    address: &str,
    protocol_version: i32,
    limit: Duration,
) -> Option<Result<(Status, Duration), Error>> {
    let address = address.to_owned();
    timeout::perform(
        move || Conn::new(&address, protocol_version).and_then(|conn| conn.do_status()),
        limit,
    )
}

pub fn unix_time_millis() -> i64 {
    match std::time::SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(dur) => dur.as_millis() as i64,
        Err(_) => 0,
    }
}

impl Read for Conn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_cipher.as_mut() {
            Option::None => self.stream.read(buf),
            Option::Some(cipher) => {
                let ret = self.stream.read(buf)?;
                cipher.decrypt(&mut buf[..ret]);

                Ok(ret)
            }
        }
    }
}

impl Write for Conn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.write_cipher.as_mut() {
            Option::None => self.stream.write(buf),
            Option::Some(cipher) => {
                let mut data = buf.to_vec();
                cipher.encrypt(&mut data);

                self.stream.write_all(&data)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

// Splitting a connection into a read half and a write half. Each half
// only ever advances the cipher state for its own direction.
impl Clone for Conn {
    fn clone(&self) -> Self {
        Conn {
            stream: self.stream.try_clone().expect("failed to clone tcp stream"),
            host: self.host.clone(),
            port: self.port,
            direction: self.direction,
            protocol_version: self.protocol_version,
            state: self.state,
            read_cipher: Option::None,
            write_cipher: Option::None,
            compression_threshold: self.compression_threshold,
        }
    }
}

pub trait PacketType: Sized {
    fn packet_id(&self, protocol_version: i32) -> i32;

    fn write<W: io::Write>(self, buf: &mut W) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Serializable>(val: &T) -> Vec<u8> {
        let mut buf = Vec::new();
        val.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn varint_round_trip() {
        for v in [
            0i32,
            1,
            127,
            128,
            255,
            300,
            25565,
            2097151,
            2147483647,
            -1,
            -2147483648,
        ] {
            let buf = round_trip(&VarInt(v));
            let out = VarInt::read_from(&mut io::Cursor::new(&buf)).unwrap();
            assert_eq!(out.0, v, "value {} did not survive", v);
        }
    }

    #[test]
    fn varint_negative_one_is_five_bytes() {
        let buf = round_trip(&VarInt(-1));
        assert_eq!(buf, [0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn varint_short_encodings() {
        assert_eq!(round_trip(&VarInt(0)), [0x00]);
        assert_eq!(round_trip(&VarInt(127)), [0x7f]);
        assert_eq!(round_trip(&VarInt(128)), [0x80, 0x01]);
    }

    #[test]
    fn varint_overlong_rejected() {
        // a sixth byte can never be part of a valid VarInt
        let buf = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(VarInt::read_from(&mut io::Cursor::new(&buf[..])).is_err());
    }

    #[test]
    fn varint_truncated() {
        let buf = [0x80u8, 0x80];
        match VarInt::read_from(&mut io::Cursor::new(&buf[..])) {
            Err(Error::TruncatedData) => {}
            other => panic!("expected TruncatedData, got {:?}", other.map(|v| v.0)),
        }
    }

    #[test]
    fn varlong_round_trip() {
        for v in [0i64, 1, 127, 128, i64::MAX, -1, i64::MIN] {
            let buf = round_trip(&VarLong(v));
            let out = VarLong::read_from(&mut io::Cursor::new(&buf)).unwrap();
            assert_eq!(out.0, v);
        }
    }

    #[test]
    fn varlong_overlong_rejected() {
        // an eleventh byte can never be part of a valid VarLong
        let mut buf = [0x80u8; 11];
        buf[10] = 0x01;
        assert!(VarLong::read_from(&mut io::Cursor::new(&buf[..])).is_err());
    }

    #[test]
    fn position_packing() {
        // both eras in one test as the protocol version is process-wide
        set_current_protocol_version(759);
        let pos = Position::new(18357644, 831, -20882616);
        let buf = round_trip(&pos);
        assert_eq!(buf.len(), 8);
        let out = Position::read_from(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(out, pos);

        // 1.13 keeps y in the middle 12 bits
        set_current_protocol_version(404);
        let pos = Position::new(-1000, 64, 1000);
        let buf = round_trip(&pos);
        let out = Position::read_from(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(out, pos);
        set_current_protocol_version(SUPPORTED_PROTOCOLS[0]);
    }

    #[test]
    fn string_round_trip() {
        let s = "hello world ß".to_owned();
        let buf = round_trip(&s);
        let out = String::read_from(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(out, s);
    }

    #[test]
    fn uuid_hex_round_trip() {
        let uuid = UUID::from_str("af74a02d-19cb-445b-b07f-6866a861f783").unwrap();
        assert_eq!(uuid.to_hex(), "af74a02d19cb445bb07f6866a861f783");
        let buf = round_trip(&uuid);
        let out = UUID::read_from(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(out, uuid);
    }

    #[test]
    fn version_names_cover_supported_protocols() {
        for v in SUPPORTED_PROTOCOLS {
            let name = protocol_name_by_version(v);
            assert_ne!(name, "unknown", "protocol {} has no name", v);
            assert_eq!(protocol_version_by_name(name), v);
        }
        assert_eq!(protocol_version_by_name("0.30"), 0);
    }

    #[test]
    fn cloned_connections_start_without_ciphers() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = std::thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut buf = [0u8; 10];
            sock.read_exact(&mut buf).unwrap();
            buf
        });

        let mut conn = Conn::new(&format!("127.0.0.1:{}", addr.port()), 404).unwrap();
        conn.enable_encryption(&[7u8; 16]).unwrap();
        let mut half = conn.clone();
        // the cipher stays with the original, the fresh half writes plain
        half.write_all(b"0123456789").unwrap();
        half.flush().unwrap();
        assert_eq!(&accept.join().unwrap(), b"0123456789");
    }

    #[test]
    fn unknown_metadata_type_drops_the_frame_only() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let metadata_id = versions::translate_internal_packet_id_for_version(
            477,
            State::Play,
            Direction::Clientbound,
            packet::play::clientbound::internal_ids::EntityMetadata,
            false,
        );
        let keep_alive_id = versions::translate_internal_packet_id_for_version(
            477,
            State::Play,
            Direction::Clientbound,
            packet::play::clientbound::internal_ids::KeepAliveClientbound_i64,
            false,
        );

        let server = std::thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            // metadata type 200 exists in no palette band
            let mut body = Vec::new();
            VarInt(metadata_id).write_to(&mut body).unwrap();
            VarInt(7).write_to(&mut body).unwrap();
            body.push(0);
            VarInt(200).write_to(&mut body).unwrap();

            let mut keep = Vec::new();
            VarInt(keep_alive_id).write_to(&mut keep).unwrap();
            keep.extend_from_slice(&42i64.to_be_bytes());

            let mut frames = Vec::new();
            VarInt(body.len() as i32).write_to(&mut frames).unwrap();
            frames.extend(body);
            VarInt(keep.len() as i32).write_to(&mut frames).unwrap();
            frames.extend(keep);
            sock.write_all(&frames).unwrap();
        });

        let mut conn = Conn::new(&format!("127.0.0.1:{}", addr.port()), 477).unwrap();
        conn.state = State::Play;
        // the bad entity update is skipped, not fatal
        assert!(matches!(conn.read_packet(), Ok(None)));
        // and the stream stays aligned for the next frame
        match conn.read_packet() {
            Ok(Some(packet::Packet::KeepAliveClientbound_i64(val))) => assert_eq!(val.id, 42),
            other => panic!("expected a keep alive, got {:?}", other),
        }
        server.join().unwrap();
    }
}
