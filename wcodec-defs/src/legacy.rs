use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::{BlockProperties, BlockState};

#[derive(Error, Debug)]
pub enum LegacyTableError {
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error("legacy block {0:?} mapped twice")]
    Duplicate(LegacyBlock),
}

/// Numeric block id from the pre-palette format. A `metadata` of `None` matches any metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyBlock {
    pub id: u8,
    pub metadata: Option<u8>,
}

impl LegacyBlock {
    pub fn new(id: u8, metadata: u8) -> Self {
        Self {
            id,
            metadata: Some(metadata),
        }
    }

    pub fn any(id: u8) -> Self {
        Self { id, metadata: None }
    }
}

#[derive(Deserialize)]
struct LegacyEntry {
    id: u8,
    #[serde(default)]
    meta: Option<u8>,
    name: String,
    #[serde(default)]
    states: BlockProperties,
}

/// Maps legacy `(id, metadata)` pairs to named block states.
#[derive(Debug, Clone, Default)]
pub struct LegacyConversionTable {
    entries: HashMap<LegacyBlock, BlockState>,
}

impl LegacyConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, block: LegacyBlock, state: BlockState) -> Result<(), LegacyTableError> {
        if self.entries.contains_key(&block) {
            return Err(LegacyTableError::Duplicate(block));
        }
        self.entries.insert(block, state);
        Ok(())
    }

    /// Exact match first, then the entry for the id that ignores metadata.
    pub fn lookup(&self, id: u8, metadata: u8) -> Option<&BlockState> {
        self.entries
            .get(&LegacyBlock::new(id, metadata))
            .or_else(|| self.entries.get(&LegacyBlock::any(id)))
    }

    /// Parses a JSON array of `{"id": .., "meta": .., "name": .., "states": {..}}` objects,
    /// `meta` may be left out.
    pub fn from_json(json: &str) -> Result<Self, LegacyTableError> {
        let mut table = Self::new();
        serde_json::from_str::<Vec<LegacyEntry>>(json)?
            .into_iter()
            .try_for_each(|entry| {
                table.insert(
                    LegacyBlock {
                        id: entry.id,
                        metadata: entry.meta,
                    },
                    BlockState::new_p(entry.name, entry.states),
                )
            })?;
        Ok(table)
    }

    pub fn embedded() -> Result<Self, LegacyTableError> {
        Self::from_json(include_str!("../assets/legacy_blocks.json"))
    }
}

#[cfg(test)]
mod test {
    use crate::{BlockState, LegacyBlock, LegacyConversionTable, LegacyTableError};

    #[test]
    fn fallback() -> Result<(), LegacyTableError> {
        let mut table = LegacyConversionTable::new();
        table.insert(
            LegacyBlock::new(1, 1),
            BlockState::new_p("minecraft:stone", [("stone_type", "granite")]),
        )?;
        table.insert(
            LegacyBlock::any(1),
            BlockState::new_p("minecraft:stone", [("stone_type", "stone")]),
        )?;
        assert_eq!(
            table.lookup(1, 1).unwrap().to_string(),
            "minecraft:stone[stone_type=granite]"
        );
        assert_eq!(
            table.lookup(1, 9).unwrap().to_string(),
            "minecraft:stone[stone_type=stone]"
        );
        assert!(table.lookup(250, 0).is_none());
        assert!(matches!(
            table.insert(LegacyBlock::any(1), BlockState::air()),
            Err(LegacyTableError::Duplicate(_))
        ));
        Ok(())
    }

    #[test]
    fn embedded() -> Result<(), LegacyTableError> {
        let table = LegacyConversionTable::embedded()?;
        assert_eq!(table.lookup(0, 0), Some(&BlockState::air()));
        assert_eq!(table.lookup(0, 15), Some(&BlockState::air()));
        assert_eq!(table.lookup(3, 0).unwrap().name, "minecraft:dirt");
        Ok(())
    }
}
