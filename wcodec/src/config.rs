use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;
use wcodec_defs::{BlockStateRegistry, Dimension, LegacyConversionTable};
use wcodec_nbt::NBTEncoding;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub dimension: Dimension,
    /// NBT dump of block states, in runtime id order. The embedded list is used otherwise.
    #[serde(default)]
    pub block_states: Option<PathBuf>,
    #[serde(default)]
    pub block_states_encoding: NBTEncoding,
    /// JSON legacy id table. The embedded table is used otherwise.
    #[serde(default)]
    pub legacy_blocks: Option<PathBuf>,
}

impl Config {
    /// First file that is found is loaded as config, defaults if there is none.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Config> {
        for path in paths {
            match std::fs::read_to_string(path) {
                Ok(str) => {
                    return toml::from_str(&str)
                        .with_context(|| format!("invalid config {}", path.as_ref().display()));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Config::default())
    }

    pub fn registry(&self) -> Result<BlockStateRegistry> {
        Ok(match &self.block_states {
            Some(path) => {
                let data = std::fs::read(path)
                    .with_context(|| format!("reading block states {}", path.display()))?;
                BlockStateRegistry::from_nbt(&data, self.block_states_encoding)?
            }
            None => BlockStateRegistry::embedded()?,
        })
    }

    pub fn legacy(&self) -> Result<LegacyConversionTable> {
        Ok(match &self.legacy_blocks {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading legacy blocks {}", path.display()))?;
                LegacyConversionTable::from_json(&json)?
            }
            None => LegacyConversionTable::embedded()?,
        })
    }
}

#[cfg(test)]
mod test {
    use wcodec_defs::Dimension;
    use wcodec_nbt::NBTEncoding;

    use super::Config;

    #[test]
    fn parse() {
        let config: Config = toml::from_str(
            r#"
dimension = "nether"
block-states = "states.nbt"
block-states-encoding = "little-endian"
"#,
        )
        .unwrap();
        assert_eq!(config.dimension, Dimension::Nether);
        assert_eq!(config.block_states_encoding, NBTEncoding::LittleEndian);
        assert!(config.legacy_blocks.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let config = Config::load(&["this/file/does/not/exist.toml"]).unwrap();
        assert_eq!(config.dimension, Dimension::Overworld);
        assert!(config.block_states.is_none());
        assert!(config.registry().unwrap().len() > 1);
    }
}
