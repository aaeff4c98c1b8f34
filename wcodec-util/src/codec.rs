use std::io::{Read, Write};

use crate::{varint, ReadExt};

pub trait WireEncodable {
    fn wire_encode(self, writer: impl Write) -> std::io::Result<()>;
}

pub trait WireDecodable
where
    Self: Sized,
{
    fn wire_decode(reader: impl Read) -> std::io::Result<Self>;
}

pub trait WireEncoder {
    fn encode<V: WireEncodable>(&mut self, value: V) -> std::io::Result<()>;
}

impl<W: Write> WireEncoder for W {
    fn encode<V: WireEncodable>(&mut self, value: V) -> std::io::Result<()> {
        value.wire_encode(self)
    }
}

pub trait WireDecoder {
    fn decode<V: WireDecodable>(&mut self) -> std::io::Result<V>;
}

impl<R: Read> WireDecoder for R {
    fn decode<V: WireDecodable>(&mut self) -> std::io::Result<V> {
        V::wire_decode(self)
    }
}

/// Zig-zag encoded 32-bit varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub i32);

/// Unsigned 32-bit varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarUInt(pub u32);

/// Zig-zag encoded 64-bit varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarLong(pub i64);

impl WireEncodable for u8 {
    fn wire_encode(self, mut writer: impl Write) -> std::io::Result<()> {
        writer.write_all(&[self])
    }
}

impl WireDecodable for u8 {
    fn wire_decode(mut reader: impl Read) -> std::io::Result<Self> {
        Ok(u8::from_le_bytes(reader.read_const()?))
    }
}

impl WireEncodable for i8 {
    fn wire_encode(self, mut writer: impl Write) -> std::io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }
}

impl WireDecodable for i8 {
    fn wire_decode(mut reader: impl Read) -> std::io::Result<Self> {
        Ok(i8::from_le_bytes(reader.read_const()?))
    }
}

// Fixed width integers on this wire are little endian.

impl WireEncodable for u32 {
    fn wire_encode(self, mut writer: impl Write) -> std::io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }
}

impl WireDecodable for u32 {
    fn wire_decode(mut reader: impl Read) -> std::io::Result<Self> {
        Ok(u32::from_le_bytes(reader.read_const()?))
    }
}

impl WireEncodable for VarInt {
    fn wire_encode(self, writer: impl Write) -> std::io::Result<()> {
        varint::write_varint(writer, self.0)
    }
}

impl WireDecodable for VarInt {
    fn wire_decode(reader: impl Read) -> std::io::Result<Self> {
        varint::read_varint(reader).map(VarInt)
    }
}

impl WireEncodable for VarUInt {
    fn wire_encode(self, writer: impl Write) -> std::io::Result<()> {
        varint::write_varuint(writer, self.0)
    }
}

impl WireDecodable for VarUInt {
    fn wire_decode(reader: impl Read) -> std::io::Result<Self> {
        varint::read_varuint(reader).map(VarUInt)
    }
}

impl WireEncodable for VarLong {
    fn wire_encode(self, writer: impl Write) -> std::io::Result<()> {
        varint::write_varlong(writer, self.0)
    }
}

impl WireDecodable for VarLong {
    fn wire_decode(reader: impl Read) -> std::io::Result<Self> {
        varint::read_varlong(reader).map(VarLong)
    }
}

#[cfg(test)]
mod test {
    use crate::{VarInt, WireDecoder as _, WireEncoder as _};

    #[test]
    fn mixed_values() -> std::io::Result<()> {
        let mut writer = Vec::new();
        writer.encode(9u8)?;
        writer.encode(-4i8)?;
        writer.encode(VarInt(-3))?;
        writer.encode(0x0403_0201u32)?;
        assert_eq!(writer, [9, 0xfc, 0x05, 0x01, 0x02, 0x03, 0x04]);

        let mut reader = std::io::Cursor::new(writer);
        assert_eq!(reader.decode::<u8>()?, 9);
        assert_eq!(reader.decode::<i8>()?, -4);
        assert_eq!(reader.decode::<VarInt>()?, VarInt(-3));
        assert_eq!(reader.decode::<u32>()?, 0x0403_0201);
        Ok(())
    }
}
