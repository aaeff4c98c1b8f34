use std::collections::BTreeMap;

use serde::Deserialize;
use wcodec_nbt::NBT;

use crate::RegistryError;

/// Block state version written next to every state stored on disk.
pub const CURRENT_BLOCK_VERSION: i32 = 17959425;

/// A single block state property. Booleans are stored as bytes.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "JsonProperty")]
pub enum PropertyValue {
    Byte(u8),
    Int(i32),
    String(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonProperty {
    Bool(bool),
    Int(i32),
    String(String),
}

impl From<JsonProperty> for PropertyValue {
    fn from(value: JsonProperty) -> Self {
        match value {
            JsonProperty::Bool(bool) => PropertyValue::Byte(bool as u8),
            JsonProperty::Int(int) => PropertyValue::Int(int),
            JsonProperty::String(string) => PropertyValue::String(string),
        }
    }
}

impl PropertyValue {
    pub fn from_nbt(key: &str, value: &NBT) -> Result<Self, RegistryError> {
        match value {
            NBT::Byte(byte) => Ok(PropertyValue::Byte(*byte as u8)),
            NBT::Int(int) => Ok(PropertyValue::Int(*int)),
            NBT::String(string) => Ok(PropertyValue::String(string.clone())),
            other => Err(RegistryError::InvalidPropertyType {
                key: key.to_owned(),
                tag: other.tag(),
            }),
        }
    }

    pub fn to_nbt(&self) -> NBT {
        match self {
            PropertyValue::Byte(byte) => NBT::Byte(*byte as i8),
            PropertyValue::Int(int) => NBT::Int(*int),
            PropertyValue::String(string) => NBT::String(string.clone()),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Byte(byte) => write!(f, "{}", byte),
            PropertyValue::Int(int) => write!(f, "{}", int),
            PropertyValue::String(string) => f.write_str(string),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Byte(value as u8)
    }
}

impl From<u8> for PropertyValue {
    fn from(value: u8) -> Self {
        PropertyValue::Byte(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct BlockProperties(BTreeMap<String, PropertyValue>);

impl BlockProperties {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&PropertyValue> {
        self.0.get(key.as_ref())
    }

    pub fn insert<K: ToString, V: Into<PropertyValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<PropertyValue> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads a `states` compound.
    pub fn from_nbt(compound: &BTreeMap<String, NBT>) -> Result<Self, RegistryError> {
        compound
            .iter()
            .map(|(key, value)| Ok((key.clone(), PropertyValue::from_nbt(key, value)?)))
            .collect::<Result<BTreeMap<_, _>, RegistryError>>()
            .map(BlockProperties)
    }

    pub fn to_nbt(&self) -> NBT {
        NBT::Compound(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_nbt()))
                .collect(),
        )
    }
}

impl<K: ToString, V: Into<PropertyValue>, I: IntoIterator<Item = (K, V)>> From<I>
    for BlockProperties
{
    fn from(value: I) -> Self {
        BlockProperties(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

/// A named block state, e.g. `minecraft:stone[stone_type=granite]`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockState {
    pub name: String,
    #[serde(rename = "states", default)]
    pub properties: BlockProperties,
}

impl BlockState {
    pub fn new_p<N: ToString, P: Into<BlockProperties>>(name: N, properties: P) -> Self {
        Self {
            name: name.to_string(),
            properties: properties.into(),
        }
    }

    pub fn new<N: ToString>(name: N) -> Self {
        Self::new_p(name, BlockProperties::new())
    }

    pub fn air() -> Self {
        Self::new("minecraft:air")
    }

    /// Reads a `{name, states, version}` compound. The version is not checked.
    pub fn from_nbt(nbt: &NBT) -> Result<Self, RegistryError> {
        let compound = nbt.as_compound().ok_or(RegistryError::NotACompound(nbt.tag()))?;
        let name = compound
            .get("name")
            .and_then(NBT::as_str)
            .ok_or(RegistryError::MissingField("name"))?;
        let properties = match compound.get("states") {
            Some(NBT::Compound(states)) => BlockProperties::from_nbt(states)?,
            Some(other) => {
                return Err(RegistryError::InvalidPropertyType {
                    key: "states".to_owned(),
                    tag: other.tag(),
                });
            }
            None => BlockProperties::new(),
        };
        Ok(Self {
            name: name.to_owned(),
            properties,
        })
    }

    pub fn to_nbt(&self) -> NBT {
        wcodec_nbt::nbt_compound! {
            "name" => self.name.as_str(),
            "states" => self.properties.to_nbt(),
            "version" => CURRENT_BLOCK_VERSION,
        }
    }
}

impl std::fmt::Display for BlockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.properties.is_empty() {
            f.write_str("[")?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
