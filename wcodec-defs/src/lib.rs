pub mod block;
pub mod dimension;
pub mod legacy;
pub mod registry;

pub use block::{BlockProperties, BlockState, PropertyValue, CURRENT_BLOCK_VERSION};
pub use dimension::{Dimension, VerticalRange};
pub use legacy::{LegacyBlock, LegacyConversionTable, LegacyTableError};
pub use registry::{BlockStateRegistry, RegistryError, StateRegistry};
