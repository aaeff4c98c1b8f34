use std::io::Write;

use tracing::debug;
use wcodec_defs::StateRegistry;
use wcodec_util::WireEncoder as _;

use crate::{
    codec::INHERIT_MARKER, Chunk, ChunkCodec, ChunkError, Encoding, PaletteEncoding,
    PalettedStorage, SerialisedData, SubChunkFormat,
};

impl<R: StateRegistry + ?Sized> ChunkCodec<'_, R> {
    /// Writes a storage header, its index words and its palette. A storage equal to
    /// `previous` is written as a single marker byte instead.
    pub fn encode_paletted_storage(
        &self,
        mut writer: impl Write,
        storage: &PalettedStorage,
        previous: Option<&PalettedStorage>,
        encoding: Encoding,
        palette_encoding: PaletteEncoding,
    ) -> Result<(), ChunkError> {
        if previous == Some(storage) {
            writer.write_all(&[INHERIT_MARKER << 1 | encoding.network_flag()])?;
            return Ok(());
        }
        writer.write_all(&[storage.palette().size().header(encoding.network_flag())])?;
        storage
            .words()
            .iter()
            .try_for_each(|word| writer.encode(*word))?;
        encoding.encode_palette(&mut writer, storage.palette(), palette_encoding, self.registry)
    }

    /// Serialises the sub chunk at `index` in the version 9 format.
    pub fn encode_sub_chunk(
        &self,
        chunk: &Chunk,
        index: usize,
        encoding: Encoding,
    ) -> Result<Vec<u8>, ChunkError> {
        let sub = chunk
            .sub_chunk(index)
            .ok_or(ChunkError::SubChunkIndexOutOfRange {
                index: index as i32,
                count: chunk.sub_chunks().len(),
            })?;
        let layers = u8::try_from(sub.layers().len())
            .map_err(|_| ChunkError::TooManyLayers(sub.layers().len()))?;
        let cube = index as i32 + chunk.range().min_sub_index();
        let mut buf = vec![SubChunkFormat::Indexed.version(), layers, cube as i8 as u8];
        for storage in sub.layers() {
            self.encode_paletted_storage(&mut buf, storage, None, encoding, PaletteEncoding::Block)?;
        }
        Ok(buf)
    }

    /// Serialises the biome storage of every sub chunk, reusing the previous one where equal.
    pub fn encode_biomes(&self, chunk: &Chunk, encoding: Encoding) -> Result<Vec<u8>, ChunkError> {
        let mut buf = Vec::new();
        let mut previous = None;
        for biome in chunk.biomes() {
            self.encode_paletted_storage(
                &mut buf,
                biome,
                previous,
                encoding,
                PaletteEncoding::Biome,
            )?;
            previous = Some(biome.as_ref());
        }
        Ok(buf)
    }

    pub fn encode(&self, chunk: &Chunk, encoding: Encoding) -> Result<SerialisedData, ChunkError> {
        let sub_chunks = (0..chunk.sub_chunks().len())
            .map(|index| self.encode_sub_chunk(chunk, index, encoding))
            .collect::<Result<Vec<_>, _>>()?;
        let biomes = self.encode_biomes(chunk, encoding)?;
        debug!(sub_chunks = sub_chunks.len(), ?encoding, "encoded chunk");
        Ok(SerialisedData { sub_chunks, biomes })
    }

    /// Builds a level chunk payload: every sub chunk up to the highest one holding blocks,
    /// followed by the 3D biomes. Returns the payload and the number of sub chunks in it.
    pub fn network_encode(&self, chunk: &Chunk) -> Result<(Vec<u8>, usize), ChunkError> {
        let count = chunk.highest_filled_sub_chunk().map_or(0, |index| index + 1);
        let mut buf = Vec::new();
        for index in 0..count {
            buf.extend(self.encode_sub_chunk(chunk, index, Encoding::Network)?);
        }
        buf.extend(self.encode_biomes(chunk, Encoding::Network)?);
        debug!(sub_chunks = count, bytes = buf.len(), "encoded network chunk");
        Ok((buf, count))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use itertools::iproduct;
    use wcodec_defs::{
        BlockState, BlockStateRegistry, Dimension, LegacyConversionTable, VerticalRange,
    };

    use crate::{
        BiomeStorage, Chunk, ChunkCodec, ChunkError, Encoding, PaletteEncoding, PaletteSize,
        PalettedStorage,
    };

    /// Air plus enough states to need 16 bit palettes.
    fn registry() -> BlockStateRegistry {
        BlockStateRegistry::from_states(
            std::iter::once(BlockState::air())
                .chain((0..300).map(|i| BlockState::new_p("minecraft:test", [("n", i)]))),
        )
        .unwrap()
    }

    /// A storage whose palette needs exactly `size` bits, with values starting at 1.
    fn storage_of_size(size: PaletteSize) -> PalettedStorage {
        let values = match size.bits() {
            0 => 1,
            16 => 300,
            bits => 1 << bits,
        };
        let mut storage = PalettedStorage::uniform(1);
        iproduct!(0..16u8, 0..16u8, 0..16u8)
            .enumerate()
            .for_each(|(i, (x, y, z))| storage.set(x, y, z, (i % values) as u32 + 1));
        assert_eq!(storage.palette().size(), size);
        storage
    }

    #[test]
    fn storage_round_trip_every_size() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        for (size, encoding, palette_encoding) in iproduct!(
            PaletteSize::ALL,
            [Encoding::Disk, Encoding::Network, Encoding::NetworkPersistent],
            [PaletteEncoding::Block, PaletteEncoding::Biome]
        ) {
            let storage = storage_of_size(size);
            let mut buf = Vec::new();
            codec.encode_paletted_storage(&mut buf, &storage, None, encoding, palette_encoding)?;
            assert_eq!(buf[0], size.header(encoding.network_flag()));

            let mut reader = std::io::Cursor::new(&buf);
            let decoded = codec.decode_paletted_storage(&mut reader, encoding, palette_encoding)?;
            assert_eq!(reader.position() as usize, buf.len());
            assert_eq!(decoded, BiomeStorage::Fresh(storage), "{:?} {:?}", size, encoding);
        }
        Ok(())
    }

    #[test]
    fn words_are_little_endian() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);

        let mut storage = PalettedStorage::uniform(0);
        storage.set(0, 1, 0, 7);
        let mut buf = Vec::new();
        codec.encode_paletted_storage(
            &mut buf,
            &storage,
            None,
            Encoding::Network,
            PaletteEncoding::Biome,
        )?;
        // Size 1, 128 words, index 1 at bit 1 of the first word, palette [0, 7].
        assert_eq!(buf.len(), 1 + 128 * 4 + 3);
        assert_eq!(buf[..5], [0x03, 0x02, 0x00, 0x00, 0x00]);
        assert_eq!(buf[513..], [0x04, 0x00, 0x0e]);
        Ok(())
    }

    fn sample_chunk(air: u32, range: VerticalRange) -> Chunk {
        let mut chunk = Chunk::new(air, range);
        for (x, z) in iproduct!(0..16u8, 0..16u8) {
            let top = range.min + 20 + (x as i32 + z as i32);
            for y in range.min..=top {
                chunk.set_block(x, y, z, 0, 1 + (y - range.min) as u32 % 5);
            }
            chunk.set_block(x, top, z, 1, 250);
            chunk.set_biome(x, range.min + 40, z, 3);
        }
        chunk
    }

    #[test]
    fn disk_round_trip() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let range = Dimension::Nether.range();
        let chunk = sample_chunk(0, range);

        let data = codec.encode(&chunk, Encoding::Disk)?;
        assert_eq!(data.sub_chunks.len(), 8);
        assert_eq!(data.sub_chunks[7], [9, 0, 7]);
        let decoded = codec.disk_decode(&data, range)?;
        assert_eq!(decoded, chunk);
        assert_eq!(decoded.highest_block(15, 15), range.min + 50);
        Ok(())
    }

    #[test]
    fn network_round_trip() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let range = Dimension::Overworld.range();
        let chunk = sample_chunk(0, range);

        let (payload, count) = codec.network_encode(&chunk)?;
        assert_eq!(count, 4);
        let decoded = codec.network_decode(0, &payload, count, false, range)?;
        assert_eq!(decoded, chunk);
        // Storages above the changed one are written as references to it.
        assert!(Arc::ptr_eq(&decoded.biomes()[3], &decoded.biomes()[23]));
        Ok(())
    }

    #[test]
    fn biome_markers() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let chunk = Chunk::new(0, VerticalRange::new(0, 47));

        assert_eq!(codec.encode_biomes(&chunk, Encoding::Disk)?, [0x00, 0, 0, 0, 0, 0xfe, 0xfe]);
        assert_eq!(codec.encode_biomes(&chunk, Encoding::Network)?, [0x01, 0x00, 0xff, 0xff]);
        Ok(())
    }

    #[test]
    fn persistent_layers_inside_network_stream() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let range = VerticalRange::new(0, 47);
        let chunk = sample_chunk(0, range);

        let mut payload = codec.encode_sub_chunk(&chunk, 1, Encoding::NetworkPersistent)?;
        assert_eq!(payload[3] & 1, 0);
        payload.extend(codec.encode_biomes(&chunk, Encoding::Network)?);

        let decoded = codec.network_decode(0, &payload, 1, false, range)?;
        assert_eq!(decoded.sub_chunk(1), chunk.sub_chunk(1));
        assert!(decoded.sub_chunk(0).is_some_and(|sub| sub.is_empty()));
        Ok(())
    }

    #[test]
    fn out_of_range_index() {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let chunk = Chunk::new(0, VerticalRange::new(0, 47));
        assert!(matches!(
            codec.encode_sub_chunk(&chunk, 3, Encoding::Disk),
            Err(ChunkError::SubChunkIndexOutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn layer_count_fits_a_byte() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let range = VerticalRange::new(0, 47);
        let mut chunk = Chunk::new(0, range);

        chunk.set_block(0, 0, 0, 254, 1);
        let data = codec.encode(&chunk, Encoding::Disk)?;
        assert_eq!(data.sub_chunks[0][..3], [9, 255, 0]);
        assert_eq!(codec.disk_decode(&data, range)?, chunk);

        chunk.set_block(0, 0, 0, 256, 1);
        assert!(matches!(
            codec.encode(&chunk, Encoding::Disk),
            Err(ChunkError::TooManyLayers(257))
        ));
        assert!(matches!(
            codec.network_encode(&chunk),
            Err(ChunkError::TooManyLayers(257))
        ));
        Ok(())
    }

    #[test]
    fn shared_between_threads() -> Result<(), ChunkError> {
        let registry = registry();
        let legacy = LegacyConversionTable::new();
        let codec = ChunkCodec::new(&registry, &legacy);
        let range = Dimension::End.range();
        let chunk = sample_chunk(0, range);
        let (payload, count) = codec.network_encode(&chunk)?;

        std::thread::scope(|scope| -> Result<(), ChunkError> {
            let handles = (0..4)
                .map(|_| scope.spawn(|| codec.network_decode(0, &payload, count, false, range)))
                .collect::<Vec<_>>();
            for handle in handles {
                assert_eq!(handle.join().unwrap()?, chunk);
            }
            Ok(())
        })
    }
}
