use wcodec_util::PackedArray;

use crate::{ChunkError, SUB_CHUNK_VOLUME};

const SIZES: [u8; 9] = [0, 1, 2, 3, 4, 5, 6, 8, 16];

/// Bits used per palette index. Only the widths in [`PaletteSize::ALL`] exist on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteSize(u8);

impl PaletteSize {
    pub const ZERO: PaletteSize = PaletteSize(0);
    pub const ALL: [PaletteSize; 9] = {
        let mut all = [PaletteSize(0); 9];
        let mut i = 0;
        while i < SIZES.len() {
            all[i] = PaletteSize(SIZES[i]);
            i += 1;
        }
        all
    };

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Number of values a palette of this size can index.
    pub const fn capacity(self) -> usize {
        1 << self.0
    }

    /// Number of 32 bit words holding the indices of one sub chunk.
    pub const fn word_count(self) -> usize {
        PackedArray::packed_size(self.0, SUB_CHUNK_VOLUME)
    }

    /// Smallest size able to index `len` values.
    pub fn for_len(len: usize) -> PaletteSize {
        Self::ALL
            .into_iter()
            .find(|size| size.capacity() >= len)
            .unwrap_or(PaletteSize(16))
    }

    pub fn next(self) -> Option<PaletteSize> {
        Self::ALL.into_iter().find(|size| *size > self)
    }

    /// Storage header byte, the size shifted left with the flag in the lowest bit.
    pub const fn header(self, flag: u8) -> u8 {
        (self.0 << 1) | (flag & 1)
    }
}

impl TryFrom<u8> for PaletteSize {
    type Error = ChunkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if SIZES.contains(&value) {
            Ok(PaletteSize(value))
        } else {
            Err(ChunkError::InvalidPaletteSize(value))
        }
    }
}

/// Values referenced by the indices of a [`crate::PalettedStorage`], in index order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    size: PaletteSize,
    values: Vec<u32>,
}

impl Palette {
    pub fn new(size: PaletteSize, values: Vec<u32>) -> Self {
        Self { size, values }
    }

    pub fn size(&self) -> PaletteSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    pub fn index(&self, value: u32) -> Option<usize> {
        self.values.iter().position(|v| *v == value)
    }

    /// Returns the index of `value`, appending it if missing. The second value is true when
    /// the palette had to grow to a larger size to fit it.
    pub fn add(&mut self, value: u32) -> (usize, bool) {
        if let Some(index) = self.index(value) {
            return (index, false);
        }
        self.values.push(value);
        let index = self.values.len() - 1;
        if self.values.len() > self.size.capacity() {
            self.size = PaletteSize::for_len(self.values.len());
            return (index, true);
        }
        (index, false)
    }
}
