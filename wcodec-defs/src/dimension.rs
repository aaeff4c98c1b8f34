use serde::Deserialize;

/// Inclusive vertical extent of a world in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerticalRange {
    pub min: i32,
    pub max: i32,
}

impl VerticalRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn height(&self) -> i32 {
        self.max - self.min
    }

    /// Number of 16 block tall sub chunks covering the range.
    pub const fn sub_chunk_count(&self) -> usize {
        ((self.height() >> 4) + 1) as usize
    }

    /// Absolute cube index of the lowest sub chunk.
    pub const fn min_sub_index(&self) -> i32 {
        self.min >> 4
    }

    pub const fn contains(&self, y: i32) -> bool {
        y >= self.min && y <= self.max
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Overworld => "minecraft:overworld",
            Dimension::Nether => "minecraft:nether",
            Dimension::End => "minecraft:the_end",
        }
    }

    pub fn range(&self) -> VerticalRange {
        match self {
            Dimension::Overworld => VerticalRange::new(-64, 319),
            Dimension::Nether => VerticalRange::new(0, 127),
            Dimension::End => VerticalRange::new(0, 255),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{Dimension, VerticalRange};

    #[test]
    fn sub_chunk_counts() {
        assert_eq!(Dimension::Overworld.range().sub_chunk_count(), 24);
        assert_eq!(Dimension::Overworld.range().min_sub_index(), -4);
        assert_eq!(Dimension::Nether.range().sub_chunk_count(), 8);
        assert_eq!(Dimension::End.range().sub_chunk_count(), 16);
        assert_eq!(VerticalRange::new(0, 47).sub_chunk_count(), 3);
        assert!(VerticalRange::new(0, 47).contains(47));
        assert!(!VerticalRange::new(0, 47).contains(48));
    }
}
