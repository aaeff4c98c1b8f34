mod bin;
mod tag;

use std::collections::BTreeMap;

pub use bin::{NBTEncoding, MAX_DEPTH};
pub use tag::NBTTag;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NBTError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    FromUtf8Error(#[from] std::string::FromUtf8Error),
    #[error("NBT invalid tag value {0}")]
    InvalidTagValue(u8),
    #[error("NBT unexpected end tag")]
    UnexpectedEnd,
    #[error("NBT negative length {0}")]
    NegativeLength(i32),
    #[error("NBT list tag mismatch {expected:?} {got:?}")]
    ListTagMismatch { expected: NBTTag, got: NBTTag },
    #[error("NBT string of {0} bytes is too long for its length prefix")]
    StringTooLong(usize),
    #[error("NBT nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Clone, Default)]
/// NBTList contains NBT values that MUST be the same type.
/// The list initially doesn't have a type, pushing to an empty list will set its type and any
/// subsequent new items will be required to be the same type.
pub struct NBTList {
    tag: Option<NBTTag>,
    list: Vec<NBT>,
}

impl PartialEq for NBTList {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag() && self.list == other.list
    }
}

impl std::fmt::Debug for NBTList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.list).finish()
    }
}

impl NBTList {
    fn tag(&self) -> Option<NBTTag> {
        self.tag
            .or_else(|| self.list.first().map(|item| item.tag()))
    }

    pub fn new() -> Self {
        Self::default()
    }

    fn new_with_tag(tag: NBTTag) -> Self {
        Self {
            tag: Some(tag),
            list: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns error if new item has mismatching type from already containing items.
    pub fn push(&mut self, v: NBT) -> Result<(), NBTError> {
        if let Some(tag) = self.tag() {
            if tag != v.tag() {
                return Err(NBTError::ListTagMismatch {
                    expected: tag,
                    got: v.tag(),
                });
            }
        }
        self.list.push(v);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&NBT> {
        self.list.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NBT> {
        self.list.iter()
    }
}

impl IntoIterator for NBTList {
    type Item = NBT;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl TryFrom<Vec<NBT>> for NBTList {
    type Error = NBTError;

    fn try_from(value: Vec<NBT>) -> Result<Self, Self::Error> {
        let mut list = Self::new();
        value.into_iter().try_for_each(|v| list.push(v))?;
        Ok(list)
    }
}

/// Compounds keep their keys sorted, so writing the same value twice gives the same bytes.
#[derive(Clone, PartialEq)]
pub enum NBT {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(NBTList),
    Compound(BTreeMap<String, NBT>),
    ByteArray(Box<[i8]>),
    IntArray(Box<[i32]>),
    LongArray(Box<[i64]>),
}

impl std::fmt::Debug for NBT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Byte(byte) => write!(f, "{}b", byte),
            Self::Short(short) => write!(f, "{}s", short),
            Self::Int(int) => write!(f, "{}i", int),
            Self::Long(long) => write!(f, "{}l", long),
            Self::Float(float) => write!(f, "{}f", float),
            Self::Double(double) => write!(f, "{}d", double),
            Self::String(string) => write!(f, "\"{}\"", string),
            Self::List(list) => write!(f, "{:?}", list),
            Self::Compound(compound) => write!(f, "{:?}", compound),
            Self::ByteArray(byte_array) => write!(f, "{:?}", byte_array),
            Self::IntArray(int_array) => write!(f, "{:?}", int_array),
            Self::LongArray(long_array) => write!(f, "{:?}", long_array),
        }
    }
}

macro_rules! from_nbt_simple {
    ($type:ty, $ident:ident) => {
        impl From<$type> for NBT {
            fn from(value: $type) -> Self {
                Self::$ident(value)
            }
        }
    };
}

from_nbt_simple!(i8, Byte);
from_nbt_simple!(i16, Short);
from_nbt_simple!(i32, Int);
from_nbt_simple!(i64, Long);
from_nbt_simple!(f32, Float);
from_nbt_simple!(f64, Double);
from_nbt_simple!(String, String);
from_nbt_simple!(NBTList, List);
from_nbt_simple!(BTreeMap<String, NBT>, Compound);

impl From<&str> for NBT {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl NBT {
    pub fn tag(&self) -> NBTTag {
        match self {
            NBT::Byte(..) => NBTTag::Byte,
            NBT::Short(..) => NBTTag::Short,
            NBT::Int(..) => NBTTag::Int,
            NBT::Long(..) => NBTTag::Long,
            NBT::Float(..) => NBTTag::Float,
            NBT::Double(..) => NBTTag::Double,
            NBT::String(..) => NBTTag::String,
            NBT::List(..) => NBTTag::List,
            NBT::Compound(..) => NBTTag::Compound,
            NBT::ByteArray(..) => NBTTag::ByteArray,
            NBT::IntArray(..) => NBTTag::IntArray,
            NBT::LongArray(..) => NBTTag::LongArray,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NBT::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&BTreeMap<String, NBT>> {
        match self {
            NBT::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}

/// Builds an [`NBT::Compound`] from `key => value` pairs.
#[macro_export]
macro_rules! nbt_compound {
    () => {
        $crate::NBT::Compound(::std::collections::BTreeMap::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::NBT::Compound(::std::collections::BTreeMap::from([
            $((::std::string::String::from($key), $crate::NBT::from($value))),+
        ]))
    };
}
