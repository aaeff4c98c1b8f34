pub mod codec;
pub mod packed_array;
pub mod read_ext;
pub mod varint;

pub use codec::{VarInt, VarLong, VarUInt, WireDecodable, WireDecoder, WireEncodable, WireEncoder};
pub use packed_array::{PackedArray, PackedArrayError};
pub use read_ext::ReadExt;
