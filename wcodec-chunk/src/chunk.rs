use std::sync::Arc;

use wcodec_defs::VerticalRange;

use crate::{PalettedStorage, SubChunk};

/// A full column of sub chunks with one biome storage per sub chunk.
///
/// Biome storages are shared between sub chunks when the data says they are the same, and
/// copied on the first write through [`Chunk::set_biome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    air: u32,
    range: VerticalRange,
    sub_chunks: Vec<SubChunk>,
    biomes: Vec<Arc<PalettedStorage>>,
}

impl Chunk {
    pub fn new(air: u32, range: VerticalRange) -> Self {
        let count = range.sub_chunk_count();
        let biome = Arc::new(PalettedStorage::uniform(0));
        Self {
            air,
            range,
            sub_chunks: (0..count).map(|_| SubChunk::new(air)).collect(),
            biomes: vec![biome; count],
        }
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    pub fn range(&self) -> VerticalRange {
        self.range
    }

    pub fn sub_chunks(&self) -> &[SubChunk] {
        &self.sub_chunks
    }

    pub fn sub_chunk(&self, index: usize) -> Option<&SubChunk> {
        self.sub_chunks.get(index)
    }

    pub fn sub_chunk_mut(&mut self, index: usize) -> Option<&mut SubChunk> {
        self.sub_chunks.get_mut(index)
    }

    pub(crate) fn replace_sub_chunk(&mut self, index: usize, sub: SubChunk) {
        if let Some(slot) = self.sub_chunks.get_mut(index) {
            *slot = sub;
        }
    }

    pub fn biomes(&self) -> &[Arc<PalettedStorage>] {
        &self.biomes
    }

    pub(crate) fn replace_biome(&mut self, index: usize, biome: Arc<PalettedStorage>) {
        if let Some(slot) = self.biomes.get_mut(index) {
            *slot = biome;
        }
    }

    /// Index of the sub chunk holding block height `y`, if it is in range.
    pub fn sub_index(&self, y: i32) -> Option<usize> {
        self.range
            .contains(y)
            .then(|| ((y - self.range.min) >> 4) as usize)
    }

    /// Absolute block height of the bottom of a sub chunk.
    pub fn sub_y(&self, index: usize) -> i32 {
        (index as i32 + self.range.min_sub_index()) << 4
    }

    fn local_y(&self, y: i32) -> u8 {
        ((y - self.range.min) & 15) as u8
    }

    /// Runtime id at the position, air for heights out of range or missing layers.
    pub fn block(&self, x: u8, y: i32, z: u8, layer: usize) -> u32 {
        match self.sub_index(y) {
            Some(index) => self.sub_chunks[index].block(x, self.local_y(y), z, layer),
            None => self.air,
        }
    }

    /// Heights out of range are ignored.
    pub fn set_block(&mut self, x: u8, y: i32, z: u8, layer: usize, value: u32) {
        let local_y = self.local_y(y);
        if let Some(index) = self.sub_index(y) {
            self.sub_chunks[index].set_block(x, local_y, z, layer, value);
        }
    }

    /// Biome id at the position, 0 for heights out of range.
    pub fn biome(&self, x: u8, y: i32, z: u8) -> u32 {
        self.sub_index(y)
            .map_or(0, |index| self.biomes[index].at(x, self.local_y(y), z))
    }

    /// Heights out of range are ignored.
    pub fn set_biome(&mut self, x: u8, y: i32, z: u8, biome: u32) {
        let local_y = self.local_y(y);
        if let Some(index) = self.sub_index(y) {
            Arc::make_mut(&mut self.biomes[index]).set(x, local_y, z, biome);
        }
    }

    /// Height of the topmost non-air block of layer 0 in the column, or the bottom of the
    /// range if the column is all air.
    pub fn highest_block(&self, x: u8, z: u8) -> i32 {
        for (index, sub) in self.sub_chunks.iter().enumerate().rev() {
            if sub.is_empty() {
                continue;
            }
            if let Some(y) = (0..16u8).rev().find(|y| sub.block(x, *y, z, 0) != self.air) {
                return self.sub_y(index) + y as i32;
            }
        }
        self.range.min
    }

    /// Index of the highest sub chunk holding anything but air.
    pub fn highest_filled_sub_chunk(&self) -> Option<usize> {
        self.sub_chunks.iter().rposition(|sub| !sub.is_empty())
    }

    pub fn compact(&mut self) {
        self.sub_chunks.iter_mut().for_each(SubChunk::compact);
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use wcodec_defs::{Dimension, VerticalRange};

    use crate::Chunk;

    #[test]
    fn blocks() {
        let mut chunk = Chunk::new(0, Dimension::Overworld.range());
        assert_eq!(chunk.sub_chunks().len(), 24);
        assert_eq!(chunk.highest_block(3, 4), -64);
        assert_eq!(chunk.highest_filled_sub_chunk(), None);

        chunk.set_block(3, 70, 4, 0, 9);
        chunk.set_block(3, -64, 4, 0, 9);
        chunk.set_block(3, 400, 4, 0, 9);
        assert_eq!(chunk.block(3, 70, 4, 0), 9);
        assert_eq!(chunk.block(3, 71, 4, 0), 0);
        assert_eq!(chunk.block(3, 400, 4, 0), 0);
        assert_eq!(chunk.highest_block(3, 4), 70);
        assert_eq!(chunk.highest_block(4, 3), -64);
        assert_eq!(chunk.sub_index(70), Some(8));
        assert_eq!(chunk.sub_y(8), 64);
        assert_eq!(chunk.highest_filled_sub_chunk(), Some(8));

        chunk.set_block(3, 70, 4, 0, 0);
        chunk.compact();
        assert!(chunk.sub_chunk(8).is_some_and(|sub| sub.layers().is_empty()));
    }

    #[test]
    fn biomes_copy_on_write() {
        let mut chunk = Chunk::new(0, VerticalRange::new(0, 47));
        assert!(Arc::ptr_eq(&chunk.biomes()[0], &chunk.biomes()[2]));

        chunk.set_biome(1, 20, 1, 7);
        assert_eq!(chunk.biome(1, 20, 1), 7);
        assert_eq!(chunk.biome(1, 4, 1), 0);
        assert_eq!(chunk.biome(1, 36, 1), 0);
        assert!(!Arc::ptr_eq(&chunk.biomes()[0], &chunk.biomes()[1]));
        assert!(Arc::ptr_eq(&chunk.biomes()[0], &chunk.biomes()[2]));
    }
}
