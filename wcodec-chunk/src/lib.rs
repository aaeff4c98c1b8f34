mod chunk;
mod codec;
mod decode;
mod encode;
mod encoding;
mod palette;
mod paletted_storage;
mod sub_chunk;

pub use chunk::Chunk;
pub use codec::{BiomeStorage, ChunkCodec, SerialisedData};
pub use encoding::{Encoding, PaletteEncoding};
pub use palette::{Palette, PaletteSize};
pub use paletted_storage::PalettedStorage;
pub use sub_chunk::{SubChunk, SubChunkFormat};

use thiserror::Error;
use wcodec_defs::RegistryError;
use wcodec_nbt::NBTError;
use wcodec_util::PackedArrayError;

/// Blocks along one axis of a sub chunk.
pub const SUB_CHUNK_WIDTH: usize = 16;
/// Blocks in one sub chunk.
pub const SUB_CHUNK_VOLUME: usize = SUB_CHUNK_WIDTH * SUB_CHUNK_WIDTH * SUB_CHUNK_WIDTH;

#[derive(Error, Debug)]
pub enum ChunkError {
    #[error(transparent)]
    IoError(std::io::Error),
    #[error(transparent)]
    NBTError(NBTError),
    #[error(transparent)]
    RegistryError(#[from] RegistryError),
    #[error(transparent)]
    PackedArrayError(#[from] PackedArrayError),
    #[error("{what} truncated: expected {expected} bytes, got {got}")]
    Truncated {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("unexpected end of chunk data")]
    UnexpectedEnd,
    #[error("unknown sub chunk version {0}")]
    UnknownSubChunkVersion(u8),
    #[error("invalid palette entry count {0}")]
    InvalidPaletteCount(i64),
    #[error("invalid palette size {0}")]
    InvalidPaletteSize(u8),
    #[error("no block state for legacy id {id} metadata {metadata}")]
    UnknownLegacyBlock { id: u8, metadata: u8 },
    #[error("no runtime id for block state {0}")]
    UnknownBlockState(String),
    #[error("no block state for runtime id {0}")]
    UnknownRuntimeId(u32),
    #[error("first biome storage refers to a previous one")]
    FirstBiomeInherits,
    #[error("block storage refers to a previous one")]
    UnexpectedInherit,
    #[error("palette index {index} out of range for palette of {len}")]
    PaletteIndexOutOfRange { index: u32, len: usize },
    #[error("sub chunk index {index} out of range for {count} sub chunks")]
    SubChunkIndexOutOfRange { index: i32, count: usize },
    #[error("sub chunk has {0} layers, at most 255 fit")]
    TooManyLayers(usize),
}

impl From<std::io::Error> for ChunkError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => ChunkError::UnexpectedEnd,
            _ => ChunkError::IoError(err),
        }
    }
}

impl From<NBTError> for ChunkError {
    fn from(err: NBTError) -> Self {
        match err {
            NBTError::IoError(err) => err.into(),
            err => ChunkError::NBTError(err),
        }
    }
}

/// Index of a block inside a sub chunk, x major then z then y.
pub(crate) const fn block_index(x: u8, y: u8, z: u8) -> usize {
    ((x as usize & 15) << 8) | ((z as usize & 15) << 4) | (y as usize & 15)
}
