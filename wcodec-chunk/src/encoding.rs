use std::io::{Read, Write};

use wcodec_defs::{BlockState, StateRegistry};
use wcodec_nbt::{NBTEncoding, NBT};
use wcodec_util::{VarInt, WireDecoder as _, WireEncoder as _};

use crate::{ChunkError, Palette, PaletteSize};

/// Prefix stripped from block names in the network persistent format.
const NAMESPACE: &str = "minecraft:";

/// How palettes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Little endian counts, block states as little endian NBT, biomes as raw u32.
    Disk,
    /// Varint counts and runtime ids.
    Network,
    /// Varint counts, block states as network NBT.
    NetworkPersistent,
}

/// What the values of a palette are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteEncoding {
    Block,
    Biome,
}

impl Encoding {
    /// Lowest bit of the storage header byte.
    pub const fn network_flag(self) -> u8 {
        match self {
            Encoding::Network => 1,
            Encoding::Disk | Encoding::NetworkPersistent => 0,
        }
    }

    /// Storages with the flag cleared inside a network stream carry block state NBT.
    pub(crate) fn for_header(self, header: u8) -> Encoding {
        match self {
            Encoding::Network if header & 1 != 1 => Encoding::NetworkPersistent,
            encoding => encoding,
        }
    }

    pub(crate) fn decode_palette<R: StateRegistry + ?Sized>(
        self,
        mut reader: impl Read,
        size: PaletteSize,
        palette_encoding: PaletteEncoding,
        registry: &R,
    ) -> Result<Palette, ChunkError> {
        let count = if size == PaletteSize::ZERO {
            1
        } else {
            match self {
                Encoding::Disk => {
                    let count = reader.decode::<u32>()?;
                    if count == 0 {
                        return Err(ChunkError::InvalidPaletteCount(0));
                    }
                    count as usize
                }
                Encoding::Network | Encoding::NetworkPersistent => {
                    let VarInt(count) = reader.decode()?;
                    if count <= 0 {
                        return Err(ChunkError::InvalidPaletteCount(count as i64));
                    }
                    count as usize
                }
            }
        };

        let values = (0..count)
            .map(|_| match (self, palette_encoding) {
                (Encoding::Disk, PaletteEncoding::Biome) => Ok(reader.decode::<u32>()?),
                (Encoding::Disk, PaletteEncoding::Block) => {
                    let (_, nbt) = NBT::read(&mut reader, NBTEncoding::LittleEndian)?;
                    resolve(registry, BlockState::from_nbt(&nbt)?)
                }
                (Encoding::Network, _) => Ok(reader.decode::<VarInt>()?.0 as u32),
                (Encoding::NetworkPersistent, _) => {
                    let (_, nbt) = NBT::read(&mut reader, NBTEncoding::NetworkLittleEndian)?;
                    let mut state = BlockState::from_nbt(&nbt)?;
                    state.name.insert_str(0, NAMESPACE);
                    resolve(registry, state)
                }
            })
            .collect::<Result<Vec<_>, ChunkError>>()?;
        Ok(Palette::new(size, values))
    }

    pub(crate) fn encode_palette<R: StateRegistry + ?Sized>(
        self,
        mut writer: impl Write,
        palette: &Palette,
        palette_encoding: PaletteEncoding,
        registry: &R,
    ) -> Result<(), ChunkError> {
        if palette.size() != PaletteSize::ZERO {
            match self {
                Encoding::Disk => writer.encode(palette.len() as u32)?,
                Encoding::Network | Encoding::NetworkPersistent => {
                    writer.encode(VarInt(palette.len() as i32))?
                }
            }
        }

        for value in palette.values() {
            match (self, palette_encoding) {
                (Encoding::Disk, PaletteEncoding::Biome) => writer.encode(*value)?,
                (Encoding::Disk, PaletteEncoding::Block) => reverse(registry, *value)?
                    .to_nbt()
                    .write("", &mut writer, NBTEncoding::LittleEndian)?,
                (Encoding::Network, _) => writer.encode(VarInt(*value as i32))?,
                // The name goes out without its namespace and the header flag stays 0, which
                // is what decode_palette expects back.
                (Encoding::NetworkPersistent, _) => {
                    let mut state = reverse(registry, *value)?.clone();
                    if let Some(name) = state.name.strip_prefix(NAMESPACE) {
                        state.name = name.to_owned();
                    }
                    state
                        .to_nbt()
                        .write("", &mut writer, NBTEncoding::NetworkLittleEndian)?;
                }
            }
        }
        Ok(())
    }
}

fn resolve<R: StateRegistry + ?Sized>(registry: &R, state: BlockState) -> Result<u32, ChunkError> {
    registry
        .resolve(&state.name, &state.properties)
        .ok_or_else(|| ChunkError::UnknownBlockState(state.to_string()))
}

fn reverse<R: StateRegistry + ?Sized>(registry: &R, value: u32) -> Result<&BlockState, ChunkError> {
    registry
        .reverse(value)
        .ok_or(ChunkError::UnknownRuntimeId(value))
}
