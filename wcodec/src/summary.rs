use itertools::{iproduct, Itertools as _, MinMaxResult};
use serde::Serialize;
use wcodec_chunk::{Chunk, PalettedStorage, SubChunk};
use wcodec_defs::StateRegistry;

#[derive(Serialize, Debug)]
pub struct LayerSummary {
    pub bits: u8,
    pub palette: Vec<String>,
}

impl LayerSummary {
    fn new<R: StateRegistry + ?Sized>(storage: &PalettedStorage, registry: &R) -> Self {
        Self {
            bits: storage.palette().size().bits(),
            palette: storage
                .palette()
                .values()
                .iter()
                .map(|id| match registry.reverse(*id) {
                    Some(state) => state.to_string(),
                    None => format!("#{}", id),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SubChunkSummary {
    pub index: usize,
    pub y: i32,
    pub layers: Vec<LayerSummary>,
}

impl SubChunkSummary {
    pub fn new<R: StateRegistry + ?Sized>(
        index: usize,
        y: i32,
        sub: &SubChunk,
        registry: &R,
    ) -> Self {
        Self {
            index,
            y,
            layers: sub
                .layers()
                .iter()
                .map(|storage| LayerSummary::new(storage, registry))
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChunkSummary {
    pub dimension: &'static str,
    pub sub_chunks: Vec<SubChunkSummary>,
    /// Lowest and highest top block over all columns.
    pub height: (i32, i32),
    /// Distinct biome ids, sorted.
    pub biomes: Vec<u32>,
}

impl ChunkSummary {
    /// Sub chunks holding only air are left out.
    pub fn new<R: StateRegistry + ?Sized>(dimension: &'static str, chunk: &Chunk, registry: &R) -> Self {
        let sub_chunks = chunk
            .sub_chunks()
            .iter()
            .enumerate()
            .filter(|(_, sub)| !sub.is_empty())
            .map(|(index, sub)| SubChunkSummary::new(index, chunk.sub_y(index), sub, registry))
            .collect();
        let height = match iproduct!(0..16u8, 0..16u8)
            .map(|(x, z)| chunk.highest_block(x, z))
            .minmax()
        {
            MinMaxResult::MinMax(min, max) => (min, max),
            MinMaxResult::OneElement(y) => (y, y),
            MinMaxResult::NoElements => (chunk.range().min, chunk.range().min),
        };
        let biomes = chunk
            .biomes()
            .iter()
            .unique_by(|storage| std::sync::Arc::as_ptr(storage))
            .flat_map(|storage| storage.palette().values().iter().copied())
            .sorted()
            .dedup()
            .collect();
        Self {
            dimension,
            sub_chunks,
            height,
            biomes,
        }
    }
}

#[cfg(test)]
mod test {
    use wcodec_chunk::Chunk;
    use wcodec_defs::{BlockStateRegistry, Dimension};

    use super::ChunkSummary;

    #[test]
    fn summary() {
        let registry = BlockStateRegistry::embedded().unwrap();
        let mut chunk = Chunk::new(0, Dimension::Nether.range());
        chunk.set_block(1, 17, 1, 0, 1);
        chunk.set_biome(0, 100, 0, 8);

        let summary = ChunkSummary::new("nether", &chunk, &registry);
        assert_eq!(summary.sub_chunks.len(), 1);
        assert_eq!(summary.sub_chunks[0].index, 1);
        assert_eq!(summary.sub_chunks[0].y, 16);
        assert_eq!(
            summary.sub_chunks[0].layers[0].palette,
            ["minecraft:air", "minecraft:stone[stone_type=stone]"]
        );
        assert_eq!(summary.height, (0, 17));
        assert_eq!(summary.biomes, [0, 8]);
    }
}
