use super::NBTError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NBTTag {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

const TAGS: [NBTTag; 13] = [
    NBTTag::End,
    NBTTag::Byte,
    NBTTag::Short,
    NBTTag::Int,
    NBTTag::Long,
    NBTTag::Float,
    NBTTag::Double,
    NBTTag::ByteArray,
    NBTTag::String,
    NBTTag::List,
    NBTTag::Compound,
    NBTTag::IntArray,
    NBTTag::LongArray,
];

impl TryFrom<u8> for NBTTag {
    type Error = NBTError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        TAGS.get(value as usize)
            .copied()
            .ok_or(NBTError::InvalidTagValue(value))
    }
}

impl From<NBTTag> for u8 {
    fn from(val: NBTTag) -> Self {
        val as u8
    }
}
