use std::{collections::HashMap, io::Read};

use thiserror::Error;
use wcodec_nbt::{NBTEncoding, NBTError, NBTTag, NBT};

use crate::{BlockProperties, BlockState};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    NBTError(#[from] NBTError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("block state {0} registered twice")]
    DuplicateState(String),
    #[error("invalid block property type {tag:?} for property {key}")]
    InvalidPropertyType { key: String, tag: NBTTag },
    #[error("block state entry is missing field {0}")]
    MissingField(&'static str),
    #[error("expected block state compound, got {0:?}")]
    NotACompound(NBTTag),
}

/// Two way mapping between block states and the runtime ids stored in palettes.
pub trait StateRegistry {
    fn resolve(&self, name: &str, properties: &BlockProperties) -> Option<u32>;
    fn reverse(&self, runtime_id: u32) -> Option<&BlockState>;
}

/// Runtime ids are handed out in registration order.
#[derive(Debug, Clone, Default)]
pub struct BlockStateRegistry {
    states: Vec<BlockState>,
    ids: HashMap<String, HashMap<BlockProperties, u32>>,
}

impl BlockStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (u32, &BlockState)> {
        self.states.iter().enumerate().map(|(i, s)| (i as u32, s))
    }

    pub fn register(&mut self, state: BlockState) -> Result<u32, RegistryError> {
        let runtime_id = self.states.len() as u32;
        let variants = self.ids.entry(state.name.clone()).or_default();
        if variants.contains_key(&state.properties) {
            return Err(RegistryError::DuplicateState(state.to_string()));
        }
        variants.insert(state.properties.clone(), runtime_id);
        self.states.push(state);
        Ok(runtime_id)
    }

    pub fn from_states(states: impl IntoIterator<Item = BlockState>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        states
            .into_iter()
            .try_for_each(|state| registry.register(state).map(|_| ()))?;
        Ok(registry)
    }

    /// Parses a JSON array of `{"name": .., "states": {..}}` objects.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Self::from_states(serde_json::from_str::<Vec<BlockState>>(json)?)
    }

    /// Reads consecutive root compounds until the data runs out. Gzip compressed dumps are
    /// accepted too.
    pub fn from_nbt(data: &[u8], encoding: NBTEncoding) -> Result<Self, RegistryError> {
        let data = if data.starts_with(&[0x1F, 0x8B]) {
            let mut inflated = Vec::new();
            flate2::read::MultiGzDecoder::new(data).read_to_end(&mut inflated)?;
            std::borrow::Cow::Owned(inflated)
        } else {
            std::borrow::Cow::Borrowed(data)
        };

        let mut registry = Self::new();
        let mut reader = std::io::Cursor::new(&data[..]);
        while (reader.position() as usize) < data.len() {
            let (_, nbt) = NBT::read(&mut reader, encoding)?;
            registry.register(BlockState::from_nbt(&nbt)?)?;
        }
        tracing::debug!(states = registry.len(), "loaded block states from nbt");
        Ok(registry)
    }

    /// The block states shipped with this crate.
    pub fn embedded() -> Result<Self, RegistryError> {
        Self::from_json(include_str!("../assets/block_states.json"))
    }
}

impl StateRegistry for BlockStateRegistry {
    fn resolve(&self, name: &str, properties: &BlockProperties) -> Option<u32> {
        self.ids.get(name)?.get(properties).copied()
    }

    fn reverse(&self, runtime_id: u32) -> Option<&BlockState> {
        self.states.get(runtime_id as usize)
    }
}

#[cfg(test)]
mod test {
    use wcodec_nbt::NBTEncoding;

    use crate::{BlockProperties, BlockState, BlockStateRegistry, RegistryError, StateRegistry};

    #[test]
    fn embedded() -> Result<(), RegistryError> {
        let registry = BlockStateRegistry::embedded()?;
        assert_eq!(registry.resolve("minecraft:air", &BlockProperties::new()), Some(0));
        let stone = registry
            .resolve(
                "minecraft:stone",
                &BlockProperties::from([("stone_type", "stone")]),
            )
            .unwrap();
        assert_eq!(registry.reverse(stone).unwrap().name, "minecraft:stone");
        assert!(registry.reverse(registry.len() as u32).is_none());
        Ok(())
    }

    #[test]
    fn duplicate() {
        let state = BlockState::new_p("minecraft:dirt", [("dirt_type", "normal")]);
        assert!(matches!(
            BlockStateRegistry::from_states([state.clone(), state]),
            Err(RegistryError::DuplicateState(name)) if name == "minecraft:dirt[dirt_type=normal]"
        ));
    }

    #[test]
    fn nbt_stream() -> Result<(), RegistryError> {
        let states = [
            BlockState::air(),
            BlockState::new_p("minecraft:water", [("liquid_depth", 0)]),
            BlockState::new_p("minecraft:water", [("liquid_depth", 1)]),
        ];
        for compressed in [false, true] {
            let mut buf = Vec::new();
            for state in &states {
                if compressed {
                    state.to_nbt().write_compressed("", &mut buf, NBTEncoding::LittleEndian)?;
                } else {
                    state.to_nbt().write("", &mut buf, NBTEncoding::LittleEndian)?;
                }
            }
            let registry = BlockStateRegistry::from_nbt(&buf, NBTEncoding::LittleEndian)?;
            assert_eq!(registry.len(), 3);
            assert_eq!(
                registry.resolve(
                    "minecraft:water",
                    &BlockProperties::from([("liquid_depth", 1)])
                ),
                Some(2)
            );
        }
        Ok(())
    }
}
