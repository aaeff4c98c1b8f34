use crate::{ChunkError, PalettedStorage};

/// Layout of a serialised sub chunk, chosen by its leading version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubChunkFormat {
    /// Version 0: raw legacy ids and nibble metadata, converted while decoding.
    Legacy,
    /// Version 8: a layer count followed by that many storages.
    Layered,
    /// Version 9: like version 8 with the absolute sub chunk index after the count.
    Indexed,
}

impl SubChunkFormat {
    pub const fn version(self) -> u8 {
        match self {
            SubChunkFormat::Legacy => 0,
            SubChunkFormat::Layered => 8,
            SubChunkFormat::Indexed => 9,
        }
    }
}

impl TryFrom<u8> for SubChunkFormat {
    type Error = ChunkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SubChunkFormat::Legacy),
            8 => Ok(SubChunkFormat::Layered),
            9 => Ok(SubChunkFormat::Indexed),
            _ => Err(ChunkError::UnknownSubChunkVersion(value)),
        }
    }
}

/// A 16 block tall section of a chunk. Layer 0 holds the main blocks, further layers hold
/// blocks sharing a position with them, such as water in a fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubChunk {
    air: u32,
    storages: Vec<PalettedStorage>,
}

impl SubChunk {
    pub fn new(air: u32) -> Self {
        Self {
            air,
            storages: Vec::new(),
        }
    }

    pub(crate) fn with_storages(air: u32, storages: Vec<PalettedStorage>) -> Self {
        Self { air, storages }
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    /// True if there are no layers or every layer is only air.
    pub fn is_empty(&self) -> bool {
        self.storages.iter().all(|storage| storage.is_uniform(self.air))
    }

    pub fn layers(&self) -> &[PalettedStorage] {
        &self.storages
    }

    /// The layer at `layer`, adding air filled layers below it as needed.
    pub fn layer(&mut self, layer: usize) -> &mut PalettedStorage {
        while self.storages.len() <= layer {
            self.storages.push(PalettedStorage::uniform(self.air));
        }
        &mut self.storages[layer]
    }

    pub fn block(&self, x: u8, y: u8, z: u8, layer: usize) -> u32 {
        self.storages
            .get(layer)
            .map_or(self.air, |storage| storage.at(x, y, z))
    }

    /// Setting air on a layer that does not exist yet leaves the sub chunk alone.
    pub fn set_block(&mut self, x: u8, y: u8, z: u8, layer: usize, value: u32) {
        if layer >= self.storages.len() && value == self.air {
            return;
        }
        self.layer(layer).set(x, y, z, value);
    }

    /// Compacts every layer and drops layers that hold only air.
    pub fn compact(&mut self) {
        let air = self.air;
        self.storages.iter_mut().for_each(PalettedStorage::compact);
        self.storages.retain(|storage| !storage.is_uniform(air));
    }
}

#[cfg(test)]
mod test {
    use crate::{ChunkError, SubChunk, SubChunkFormat};

    #[test]
    fn versions() {
        assert_eq!(SubChunkFormat::try_from(9).ok(), Some(SubChunkFormat::Indexed));
        assert_eq!(SubChunkFormat::Layered.version(), 8);
        assert!(matches!(
            SubChunkFormat::try_from(1),
            Err(ChunkError::UnknownSubChunkVersion(1))
        ));
    }

    #[test]
    fn layers() {
        let mut sub = SubChunk::new(0);
        assert!(sub.is_empty());
        sub.set_block(1, 2, 3, 1, 0);
        assert!(sub.layers().is_empty());

        sub.set_block(1, 2, 3, 1, 5);
        assert_eq!(sub.layers().len(), 2);
        assert_eq!(sub.block(1, 2, 3, 1), 5);
        assert_eq!(sub.block(1, 2, 3, 0), 0);
        assert_eq!(sub.block(1, 2, 3, 4), 0);
        assert!(!sub.is_empty());

        sub.set_block(1, 2, 3, 1, 0);
        sub.compact();
        assert!(sub.layers().is_empty());
        assert!(sub.is_empty());
    }
}
