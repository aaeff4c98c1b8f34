use wcodec_util::PackedArray;

use crate::{block_index, ChunkError, Palette, PaletteSize, SUB_CHUNK_VOLUME};

/// A 16x16x16 grid of values, stored as bit packed indices into a [`Palette`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalettedStorage {
    indices: PackedArray,
    palette: Palette,
}

impl PalettedStorage {
    /// Every index starts out pointing at the first palette entry.
    pub fn new(palette: Palette) -> Self {
        Self {
            indices: PackedArray::new(palette.size().bits(), SUB_CHUNK_VOLUME),
            palette,
        }
    }

    /// Storage holding `value` everywhere.
    pub fn uniform(value: u32) -> Self {
        Self::new(Palette::new(PaletteSize::ZERO, vec![value]))
    }

    /// Wraps decoded words, checking their count and that every index has a palette entry.
    pub fn from_words(words: Box<[u32]>, palette: Palette) -> Result<Self, ChunkError> {
        let indices = PackedArray::from_inner(words, palette.size().bits(), SUB_CHUNK_VOLUME)?;
        if let Some(index) = indices.iter().max() {
            if index as usize >= palette.len() {
                return Err(ChunkError::PaletteIndexOutOfRange {
                    index,
                    len: palette.len(),
                });
            }
        }
        Ok(Self { indices, palette })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn words(&self) -> &[u32] {
        self.indices.words()
    }

    pub fn palette_index(&self, x: u8, y: u8, z: u8) -> usize {
        self.indices.get(block_index(x, y, z)).unwrap_or_default() as usize
    }

    /// Value at the position. A storage that is still being filled from an empty palette
    /// reads as 0.
    pub fn at(&self, x: u8, y: u8, z: u8) -> u32 {
        self.palette
            .value(self.palette_index(x, y, z))
            .unwrap_or_default()
    }

    pub fn set(&mut self, x: u8, y: u8, z: u8, value: u32) {
        let (index, resized) = self.palette.add(value);
        if resized {
            self.resize(self.palette.size());
        }
        self.indices.set(block_index(x, y, z), index as u32);
    }

    /// True if every position holds `value`.
    pub fn is_uniform(&self, value: u32) -> bool {
        self.palette.values() == [value]
    }

    fn resize(&mut self, size: PaletteSize) {
        let mut indices = PackedArray::new(size.bits(), SUB_CHUNK_VOLUME);
        self.indices
            .iter()
            .enumerate()
            .for_each(|(i, index)| indices.set(i, index));
        self.indices = indices;
    }

    /// Drops palette entries no position refers to and shrinks to the smallest size that
    /// still fits. Remaining entries keep their order.
    pub fn compact(&mut self) {
        let mut used = vec![false; self.palette.len()];
        self.indices.iter().for_each(|index| {
            if let Some(used) = used.get_mut(index as usize) {
                *used = true;
            }
        });

        let mut remap = vec![0u32; self.palette.len()];
        let mut values = Vec::new();
        for (index, value) in self.palette.values().iter().enumerate() {
            if used[index] {
                remap[index] = values.len() as u32;
                values.push(*value);
            }
        }
        if values.is_empty() {
            return;
        }

        let size = PaletteSize::for_len(values.len());
        let mut indices = PackedArray::new(size.bits(), SUB_CHUNK_VOLUME);
        self.indices
            .iter()
            .enumerate()
            .for_each(|(i, index)| indices.set(i, remap[index as usize]));
        self.indices = indices;
        self.palette = Palette::new(size, values);
    }
}
