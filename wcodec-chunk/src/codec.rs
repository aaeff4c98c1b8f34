use wcodec_defs::{LegacyConversionTable, StateRegistry};

use crate::PalettedStorage;

/// Storage size announcing that the previous storage is reused.
pub(crate) const INHERIT_MARKER: u8 = 0x7f;

/// Decodes and encodes chunks, resolving block states through a registry supplied by the
/// caller. Holds only references, so one codec can be shared between threads.
pub struct ChunkCodec<'a, R: StateRegistry + ?Sized> {
    pub(crate) registry: &'a R,
    pub(crate) legacy: &'a LegacyConversionTable,
}

impl<R: StateRegistry + ?Sized> Clone for ChunkCodec<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: StateRegistry + ?Sized> Copy for ChunkCodec<'_, R> {}

impl<'a, R: StateRegistry + ?Sized> ChunkCodec<'a, R> {
    pub fn new(registry: &'a R, legacy: &'a LegacyConversionTable) -> Self {
        Self { registry, legacy }
    }

    pub fn registry(&self) -> &'a R {
        self.registry
    }
}

/// A chunk as stored on disk: one blob per sub chunk, empty for sub chunks that were never
/// written, plus all biome storages in one blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerialisedData {
    pub sub_chunks: Vec<Vec<u8>>,
    pub biomes: Vec<u8>,
}

/// A decoded paletted storage, or the marker telling to reuse the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiomeStorage {
    Fresh(PalettedStorage),
    InheritPrevious,
}
