use std::io::Read;

pub trait ReadExt {
    fn read_const<const N: usize>(&mut self) -> std::io::Result<[u8; N]>;
    fn read_var(&mut self, size: usize) -> std::io::Result<Box<[u8]>>;
    /// Reads at most `size` bytes, returning fewer only if the reader ran out.
    fn read_up_to(&mut self, size: usize) -> std::io::Result<Box<[u8]>>;
    fn read_all(&mut self) -> std::io::Result<Box<[u8]>>;
}

impl<T: Read> ReadExt for T {
    fn read_const<const N: usize>(&mut self) -> std::io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_var(&mut self, size: usize) -> std::io::Result<Box<[u8]>> {
        let mut buf = vec![0u8; size].into_boxed_slice();
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_up_to(&mut self, size: usize) -> std::io::Result<Box<[u8]>> {
        let mut data = Vec::new();
        self.by_ref().take(size as u64).read_to_end(&mut data)?;
        Ok(data.into_boxed_slice())
    }

    fn read_all(&mut self) -> std::io::Result<Box<[u8]>> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        Ok(data.into_boxed_slice())
    }
}

#[cfg(test)]
mod test {
    use crate::ReadExt as _;

    #[test]
    fn read_up_to_stops_at_end() -> std::io::Result<()> {
        let mut reader = std::io::Cursor::new([1u8, 2, 3]);
        assert_eq!(reader.read_up_to(2)?.as_ref(), [1, 2]);
        assert_eq!(reader.read_up_to(4)?.as_ref(), [3]);
        assert!(reader.read_up_to(4)?.is_empty());
        Ok(())
    }
}
