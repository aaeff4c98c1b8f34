//! Variable length integers, 7 bits per byte, least significant group first.
//! Signed variants are zig-zag encoded so small negative numbers stay short.

use std::io::{Read, Write};

use crate::ReadExt as _;

const MAX_VARINT_BYTES: usize = 5;
const MAX_VARLONG_BYTES: usize = 10;

fn overflow(kind: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{} overflows integer", kind),
    )
}

pub fn write_varuint(mut writer: impl Write, mut value: u32) -> std::io::Result<()> {
    loop {
        let mut byte = value as u8 & 0x7F;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte])?;
        if value == 0 {
            break;
        }
    }
    Ok(())
}

pub fn read_varuint(mut reader: impl Read) -> std::io::Result<u32> {
    let mut value = 0u32;
    for i in 0..MAX_VARINT_BYTES {
        let [byte] = reader.read_const::<1>()?;
        value |= ((byte & 0x7F) as u32) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(overflow("varuint32"))
}

pub fn write_varint(writer: impl Write, value: i32) -> std::io::Result<()> {
    write_varuint(writer, ((value << 1) ^ (value >> 31)) as u32)
}

pub fn read_varint(reader: impl Read) -> std::io::Result<i32> {
    let value = read_varuint(reader)?;
    Ok(((value >> 1) as i32) ^ -((value & 1) as i32))
}

pub fn write_varlong(mut writer: impl Write, value: i64) -> std::io::Result<()> {
    let mut value = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let mut byte = value as u8 & 0x7F;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte])?;
        if value == 0 {
            break;
        }
    }
    Ok(())
}

pub fn read_varlong(mut reader: impl Read) -> std::io::Result<i64> {
    let mut value = 0u64;
    for i in 0..MAX_VARLONG_BYTES {
        let [byte] = reader.read_const::<1>()?;
        value |= ((byte & 0x7F) as u64) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok(((value >> 1) as i64) ^ -((value & 1) as i64));
        }
    }
    Err(overflow("varint64"))
}

#[cfg(test)]
mod test {
    use super::{read_varint, read_varlong, read_varuint, write_varint, write_varlong};

    #[test]
    #[rustfmt::skip]
    fn reader() -> std::io::Result<()> {
        assert_eq!(read_varint(std::io::Cursor::new(&[0x00]))?, 0);
        assert_eq!(read_varint(std::io::Cursor::new(&[0x01]))?, -1);
        assert_eq!(read_varint(std::io::Cursor::new(&[0x02]))?, 1);
        assert_eq!(read_varint(std::io::Cursor::new(&[0x03]))?, -2);
        assert_eq!(read_varint(std::io::Cursor::new(&[0x7f]))?, -64);
        assert_eq!(read_varint(std::io::Cursor::new(&[0x80, 0x01]))?, 64);
        assert_eq!(read_varint(std::io::Cursor::new(&[0xba, 0x8f, 0x03]))?, 25565);
        assert_eq!(read_varint(std::io::Cursor::new(&[0xfe, 0xff, 0xff, 0xff, 0x0f]))?, 2147483647);
        assert_eq!(read_varint(std::io::Cursor::new(&[0xff, 0xff, 0xff, 0xff, 0x0f]))?, -2147483648);
        assert_eq!(read_varuint(std::io::Cursor::new(&[0xff, 0x01]))?, 255);
        assert_eq!(read_varlong(std::io::Cursor::new(&[0x03]))?, -2);

        Ok(())
    }

    fn writer_var_int(value: i32) -> std::io::Result<Vec<u8>> {
        let mut writer = Vec::new();
        write_varint(&mut writer, value)?;
        Ok(writer)
    }

    #[test]
    #[rustfmt::skip]
    fn writer() -> std::io::Result<()> {
        assert_eq!(writer_var_int(0)?, &[0x00]);
        assert_eq!(writer_var_int(-1)?, &[0x01]);
        assert_eq!(writer_var_int(1)?, &[0x02]);
        assert_eq!(writer_var_int(64)?, &[0x80, 0x01]);
        assert_eq!(writer_var_int(25565)?, &[0xba, 0x8f, 0x03]);
        assert_eq!(writer_var_int(2147483647)?, &[0xfe, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(writer_var_int(-2147483648)?, &[0xff, 0xff, 0xff, 0xff, 0x0f]);

        let mut long = Vec::new();
        write_varlong(&mut long, i64::MIN)?;
        assert_eq!(read_varlong(std::io::Cursor::new(&long))?, i64::MIN);

        Ok(())
    }

    #[test]
    fn overflow_is_an_error() {
        let err = read_varint(std::io::Cursor::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_is_eof() {
        let err = read_varint(std::io::Cursor::new(&[0x80])).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
