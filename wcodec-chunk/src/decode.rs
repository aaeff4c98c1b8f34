use std::{
    io::{Cursor, Read},
    sync::Arc,
};

use itertools::iproduct;
use tracing::{debug, trace};
use wcodec_defs::{BlockState, StateRegistry, VerticalRange};
use wcodec_util::ReadExt as _;

use crate::{
    block_index, codec::INHERIT_MARKER, BiomeStorage, Chunk, ChunkCodec, ChunkError, Encoding,
    Palette, PaletteEncoding, PaletteSize, PalettedStorage, SerialisedData, SubChunk,
    SubChunkFormat, SUB_CHUNK_VOLUME,
};

const LEGACY_BIOMES: usize = 256;

fn read_exactly(
    mut reader: impl Read,
    what: &'static str,
    expected: usize,
) -> Result<Box<[u8]>, ChunkError> {
    let data = reader.read_up_to(expected)?;
    if data.len() != expected {
        return Err(ChunkError::Truncated {
            what,
            expected,
            got: data.len(),
        });
    }
    Ok(data)
}

impl<R: StateRegistry + ?Sized> ChunkCodec<'_, R> {
    /// Decodes the payload of a level chunk packet holding `count` sub chunks followed by
    /// biomes, either 256 bytes of 2D biomes or one 3D storage per sub chunk.
    pub fn network_decode(
        &self,
        air: u32,
        data: &[u8],
        count: usize,
        old_biomes: bool,
        range: VerticalRange,
    ) -> Result<Chunk, ChunkError> {
        let mut chunk = Chunk::new(air, range);
        let mut reader = Cursor::new(data);
        for i in 0..count {
            let (index, sub) = self.decode_sub_chunk(&mut reader, &chunk, i, Encoding::Network)?;
            chunk.replace_sub_chunk(index, sub);
        }

        if old_biomes {
            let biomes = read_exactly(&mut reader, "legacy biomes", LEGACY_BIOMES)?;
            for (x, z) in iproduct!(0..16u8, 0..16u8) {
                let biome = biomes[(x as usize) | (z as usize) << 4] as u32;
                for y in range.min..=range.max {
                    chunk.set_biome(x, y, z, biome);
                }
            }
        } else {
            self.decode_biomes(&mut reader, &mut chunk, Encoding::Network)?;
        }

        debug!(
            sub_chunks = count,
            old_biomes,
            bytes = data.len(),
            "decoded network chunk"
        );
        Ok(chunk)
    }

    /// Decodes a chunk read from disk. Empty sub chunk blobs are left as empty sub chunks and
    /// an empty biome blob leaves the default biomes.
    pub fn disk_decode(
        &self,
        data: &SerialisedData,
        range: VerticalRange,
    ) -> Result<Chunk, ChunkError> {
        let air_state = BlockState::air();
        let air = self
            .registry
            .resolve(&air_state.name, &air_state.properties)
            .ok_or_else(|| ChunkError::UnknownBlockState(air_state.to_string()))?;

        let mut chunk = Chunk::new(air, range);
        if !data.biomes.is_empty() {
            self.decode_biomes(Cursor::new(&data.biomes), &mut chunk, Encoding::Disk)?;
        }
        for (i, sub) in data.sub_chunks.iter().enumerate() {
            if sub.is_empty() {
                continue;
            }
            let (index, sub) = self.decode_sub_chunk(Cursor::new(sub), &chunk, i, Encoding::Disk)?;
            chunk.replace_sub_chunk(index, sub);
        }

        debug!(sub_chunks = data.sub_chunks.len(), "decoded disk chunk");
        Ok(chunk)
    }

    /// Decodes one sub chunk assumed to sit at `index`. Returns the index it actually belongs
    /// at, which version 9 data stores itself.
    pub fn decode_sub_chunk(
        &self,
        mut reader: impl Read,
        chunk: &Chunk,
        index: usize,
        encoding: Encoding,
    ) -> Result<(usize, SubChunk), ChunkError> {
        let [version] = reader.read_const::<1>()?;
        let format = SubChunkFormat::try_from(version)?;
        let count = chunk.sub_chunks().len();

        let (index, sub) = match format {
            SubChunkFormat::Legacy => (index, self.decode_legacy(&mut reader, chunk.air())?),
            SubChunkFormat::Layered => {
                let [layers] = reader.read_const::<1>()?;
                let sub = self.decode_layers(&mut reader, layers, chunk.air(), encoding)?;
                (index, sub)
            }
            SubChunkFormat::Indexed => {
                let [layers, cube] = reader.read_const::<2>()?;
                let slot = cube as i8 as i32 - chunk.range().min_sub_index();
                let index = usize::try_from(slot)
                    .map_err(|_| ChunkError::SubChunkIndexOutOfRange { index: slot, count })?;
                let sub = self.decode_layers(&mut reader, layers, chunk.air(), encoding)?;
                (index, sub)
            }
        };
        if index >= count {
            return Err(ChunkError::SubChunkIndexOutOfRange {
                index: index as i32,
                count,
            });
        }

        debug!(version, index, layers = sub.layers().len(), "decoded sub chunk");
        Ok((index, sub))
    }

    fn decode_layers(
        &self,
        mut reader: impl Read,
        layers: u8,
        air: u32,
        encoding: Encoding,
    ) -> Result<SubChunk, ChunkError> {
        let storages = (0..layers)
            .map(|_| {
                match self.decode_paletted_storage(&mut reader, encoding, PaletteEncoding::Block)? {
                    BiomeStorage::Fresh(storage) => Ok(storage),
                    BiomeStorage::InheritPrevious => Err(ChunkError::UnexpectedInherit),
                }
            })
            .collect::<Result<Vec<_>, ChunkError>>()?;
        Ok(SubChunk::with_storages(air, storages))
    }

    fn decode_legacy(&self, mut reader: impl Read, air: u32) -> Result<SubChunk, ChunkError> {
        let ids = read_exactly(&mut reader, "legacy block ids", SUB_CHUNK_VOLUME)?;
        let metadata = read_exactly(&mut reader, "legacy block metadata", SUB_CHUNK_VOLUME / 2)?;

        let mut storage = PalettedStorage::new(Palette::new(PaletteSize::for_len(16), Vec::new()));
        for (x, z, y) in iproduct!(0..16u8, 0..16u8, (0..16u8).step_by(2)) {
            let i = block_index(x, y, z);
            let meta = metadata[i >> 1];
            self.set_block_data(&mut storage, ids[i], meta & 0xf, x, y, z)?;
            self.set_block_data(&mut storage, ids[i | 1], meta >> 4, x, y + 1, z)?;
        }
        Ok(SubChunk::with_storages(air, vec![storage]))
    }

    fn set_block_data(
        &self,
        storage: &mut PalettedStorage,
        id: u8,
        metadata: u8,
        x: u8,
        y: u8,
        z: u8,
    ) -> Result<(), ChunkError> {
        let state = self
            .legacy
            .lookup(id, metadata)
            .ok_or(ChunkError::UnknownLegacyBlock { id, metadata })?;
        let runtime_id = self
            .registry
            .resolve(&state.name, &state.properties)
            .ok_or_else(|| ChunkError::UnknownBlockState(state.to_string()))?;
        storage.set(x, y, z, runtime_id);
        Ok(())
    }

    /// Reads one biome storage per sub chunk. The first one must not refer to a previous one.
    fn decode_biomes(
        &self,
        mut reader: impl Read,
        chunk: &mut Chunk,
        encoding: Encoding,
    ) -> Result<(), ChunkError> {
        let mut last: Option<Arc<PalettedStorage>> = None;
        for i in 0..chunk.biomes().len() {
            let biome =
                match self.decode_paletted_storage(&mut reader, encoding, PaletteEncoding::Biome)? {
                    BiomeStorage::Fresh(storage) => {
                        let storage = Arc::new(storage);
                        last = Some(Arc::clone(&storage));
                        storage
                    }
                    BiomeStorage::InheritPrevious => {
                        last.clone().ok_or(ChunkError::FirstBiomeInherits)?
                    }
                };
            chunk.replace_biome(i, biome);
        }
        Ok(())
    }

    /// Reads a storage header, its index words and its palette.
    pub fn decode_paletted_storage(
        &self,
        mut reader: impl Read,
        encoding: Encoding,
        palette_encoding: PaletteEncoding,
    ) -> Result<BiomeStorage, ChunkError> {
        let [header] = reader.read_const::<1>()?;
        let encoding = encoding.for_header(header);
        if header >> 1 == INHERIT_MARKER {
            return Ok(BiomeStorage::InheritPrevious);
        }

        let size = PaletteSize::try_from(header >> 1)?;
        let words = read_exactly(&mut reader, "paletted storage", size.word_count() * 4)?
            .chunks_exact(4)
            .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
            .collect();
        let palette = encoding.decode_palette(&mut reader, size, palette_encoding, self.registry)?;

        trace!(
            bits = size.bits(),
            palette = palette.len(),
            ?encoding,
            ?palette_encoding,
            "decoded paletted storage"
        );
        Ok(BiomeStorage::Fresh(PalettedStorage::from_words(words, palette)?))
    }
}
