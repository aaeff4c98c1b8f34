use std::{
    collections::BTreeMap,
    io::{Read, Seek, Write},
};

use wcodec_util::{varint, ReadExt as _};

use super::{tag::NBTTag, NBTError, NBTList, NBT};

/// Lists and compounds nested deeper than this are rejected while reading.
pub const MAX_DEPTH: usize = 512;

/// Byte layout of an NBT stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NBTEncoding {
    /// Java edition layout, every number big endian.
    BigEndian,
    /// Bedrock storage layout, every number little endian.
    LittleEndian,
    /// Bedrock network layout: ints, longs and lengths are varints, the rest little endian.
    #[default]
    NetworkLittleEndian,
}

macro_rules! read_fixed {
    ($encoding:expr, $data:expr, $type:ty) => {
        match $encoding {
            NBTEncoding::BigEndian => <$type>::from_be_bytes($data.read_const()?),
            _ => <$type>::from_le_bytes($data.read_const()?),
        }
    };
}

macro_rules! write_fixed {
    ($encoding:expr, $data:expr, $value:expr) => {
        match $encoding {
            NBTEncoding::BigEndian => $data.write_all(&$value.to_be_bytes())?,
            _ => $data.write_all(&$value.to_le_bytes())?,
        }
    };
}

impl NBTEncoding {
    fn read_int(self, data: &mut impl Read) -> Result<i32, NBTError> {
        Ok(match self {
            NBTEncoding::NetworkLittleEndian => varint::read_varint(data)?,
            _ => read_fixed!(self, data, i32),
        })
    }

    fn read_long(self, data: &mut impl Read) -> Result<i64, NBTError> {
        Ok(match self {
            NBTEncoding::NetworkLittleEndian => varint::read_varlong(data)?,
            _ => read_fixed!(self, data, i64),
        })
    }

    /// Array and list lengths are stored signed.
    fn read_length(self, data: &mut impl Read) -> Result<usize, NBTError> {
        let length = self.read_int(data)?;
        usize::try_from(length).map_err(|_| NBTError::NegativeLength(length))
    }

    fn read_string(self, data: &mut impl Read) -> Result<String, NBTError> {
        let length = match self {
            NBTEncoding::NetworkLittleEndian => varint::read_varuint(&mut *data)? as usize,
            _ => read_fixed!(self, data, u16) as usize,
        };
        let bytes = data.read_up_to(length)?;
        if bytes.len() != length {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        Ok(String::from_utf8(bytes.into_vec())?)
    }

    fn write_int(self, data: &mut impl Write, value: i32) -> Result<(), NBTError> {
        match self {
            NBTEncoding::NetworkLittleEndian => varint::write_varint(data, value)?,
            _ => write_fixed!(self, data, value),
        }
        Ok(())
    }

    fn write_long(self, data: &mut impl Write, value: i64) -> Result<(), NBTError> {
        match self {
            NBTEncoding::NetworkLittleEndian => varint::write_varlong(data, value)?,
            _ => write_fixed!(self, data, value),
        }
        Ok(())
    }

    fn write_length(self, data: &mut impl Write, length: usize) -> Result<(), NBTError> {
        self.write_int(data, length as i32)
    }

    fn write_string(self, data: &mut impl Write, string: &str) -> Result<(), NBTError> {
        match self {
            NBTEncoding::NetworkLittleEndian => {
                let length = u32::try_from(string.len())
                    .map_err(|_| NBTError::StringTooLong(string.len()))?;
                varint::write_varuint(&mut *data, length)?;
            }
            _ => {
                let length = u16::try_from(string.len())
                    .map_err(|_| NBTError::StringTooLong(string.len()))?;
                write_fixed!(self, data, length);
            }
        }
        data.write_all(string.as_bytes())?;
        Ok(())
    }
}

impl NBT {
    fn read_tag(
        data: &mut impl Read,
        tag: NBTTag,
        encoding: NBTEncoding,
        depth: usize,
    ) -> Result<Self, NBTError> {
        if depth > MAX_DEPTH {
            return Err(NBTError::TooDeep(MAX_DEPTH));
        }
        match tag {
            NBTTag::End => Err(NBTError::UnexpectedEnd),
            NBTTag::Byte => Ok(NBT::Byte(i8::from_le_bytes(data.read_const()?))),
            NBTTag::Short => Ok(NBT::Short(read_fixed!(encoding, data, i16))),
            NBTTag::Int => Ok(NBT::Int(encoding.read_int(data)?)),
            NBTTag::Long => Ok(NBT::Long(encoding.read_long(data)?)),
            NBTTag::Float => Ok(NBT::Float(read_fixed!(encoding, data, f32))),
            NBTTag::Double => Ok(NBT::Double(read_fixed!(encoding, data, f64))),
            NBTTag::String => Ok(NBT::String(encoding.read_string(data)?)),
            NBTTag::ByteArray => {
                let length = encoding.read_length(data)?;
                let bytes = data.read_up_to(length)?;
                if bytes.len() != length {
                    return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
                }
                Ok(NBT::ByteArray(bytes.iter().map(|b| *b as i8).collect()))
            }
            NBTTag::List => {
                let tag = NBTTag::try_from(u8::from_le_bytes(data.read_const()?))?;
                let length = encoding.read_length(data)?;
                if tag == NBTTag::End && length == 0 {
                    return Ok(NBT::List(NBTList::new()));
                }
                let mut list = NBTList::new_with_tag(tag);
                (0..length).try_for_each(|_| list.push(NBT::read_tag(data, tag, encoding, depth + 1)?))?;
                Ok(NBT::List(list))
            }
            NBTTag::Compound => {
                let mut compound = BTreeMap::new();
                loop {
                    let tag = NBTTag::try_from(u8::from_le_bytes(data.read_const()?))?;
                    if tag == NBTTag::End {
                        break;
                    }
                    let name = encoding.read_string(data)?;
                    compound.insert(name, NBT::read_tag(data, tag, encoding, depth + 1)?);
                }
                Ok(NBT::Compound(compound))
            }
            NBTTag::IntArray => Ok(NBT::IntArray(
                (0..encoding.read_length(data)?)
                    .map(|_| encoding.read_int(data))
                    .collect::<Result<_, _>>()?,
            )),
            NBTTag::LongArray => Ok(NBT::LongArray(
                (0..encoding.read_length(data)?)
                    .map(|_| encoding.read_long(data))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }

    /// Reads a named root tag.
    pub fn read(mut data: impl Read, encoding: NBTEncoding) -> Result<(String, NBT), NBTError> {
        let tag = NBTTag::try_from(u8::from_le_bytes(data.read_const()?))?;
        if tag == NBTTag::End {
            return Err(NBTError::UnexpectedEnd);
        }
        let name = encoding.read_string(&mut data)?;
        Ok((name, NBT::read_tag(&mut data, tag, encoding, 0)?))
    }

    /// Reads a named root tag that may be gzip compressed, returning whether it was.
    pub fn read_maybe_compressed(
        mut data: impl Read + Seek,
        encoding: NBTEncoding,
    ) -> Result<(bool, (String, NBT)), NBTError> {
        let ident: [u8; 2] = data.read_const()?;
        data.seek_relative(-2)?;
        if ident == [0x1F, 0x8B] {
            Ok((true, NBT::read(flate2::read::GzDecoder::new(data), encoding)?))
        } else {
            Ok((false, NBT::read(data, encoding)?))
        }
    }

    fn write_tag(&self, data: &mut impl Write, encoding: NBTEncoding) -> Result<(), NBTError> {
        match self {
            NBT::Byte(byte) => data.write_all(&byte.to_le_bytes())?,
            NBT::Short(short) => write_fixed!(encoding, data, short),
            NBT::Int(int) => encoding.write_int(data, *int)?,
            NBT::Long(long) => encoding.write_long(data, *long)?,
            NBT::Float(float) => write_fixed!(encoding, data, float),
            NBT::Double(double) => write_fixed!(encoding, data, double),
            NBT::String(string) => encoding.write_string(data, string)?,
            NBT::List(list) => {
                data.write_all(&[u8::from(list.tag().unwrap_or(NBTTag::End))])?;
                encoding.write_length(data, list.len())?;
                list.iter().try_for_each(|item| item.write_tag(data, encoding))?;
            }
            NBT::Compound(compound) => {
                for (key, value) in compound {
                    data.write_all(&[u8::from(value.tag())])?;
                    encoding.write_string(data, key)?;
                    value.write_tag(data, encoding)?;
                }
                data.write_all(&[u8::from(NBTTag::End)])?;
            }
            NBT::ByteArray(bytes) => {
                encoding.write_length(data, bytes.len())?;
                data.write_all(&bytes.iter().map(|b| *b as u8).collect::<Vec<_>>())?;
            }
            NBT::IntArray(ints) => {
                encoding.write_length(data, ints.len())?;
                ints.iter().try_for_each(|i| encoding.write_int(data, *i))?;
            }
            NBT::LongArray(longs) => {
                encoding.write_length(data, longs.len())?;
                longs.iter().try_for_each(|l| encoding.write_long(data, *l))?;
            }
        }
        Ok(())
    }

    /// Writes this value as a named root tag.
    pub fn write(
        &self,
        name: &str,
        mut data: impl Write,
        encoding: NBTEncoding,
    ) -> Result<(), NBTError> {
        data.write_all(&[u8::from(self.tag())])?;
        encoding.write_string(&mut data, name)?;
        self.write_tag(&mut data, encoding)
    }

    pub fn write_compressed(
        &self,
        name: &str,
        data: impl Write,
        encoding: NBTEncoding,
    ) -> Result<(), NBTError> {
        let mut encoder = flate2::write::GzEncoder::new(data, flate2::Compression::best());
        self.write(name, &mut encoder, encoding)?;
        encoder.finish()?;
        Ok(())
    }
}
