use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackedArrayError {
    #[error("Packed array bits per entry {0} does not fit in a word")]
    InvalidBitsPerEntry(u8),
    #[error("Packed array of {num_entries} entries needs {expected} words, got {got}")]
    InvalidLength {
        num_entries: usize,
        expected: usize,
        got: usize,
    },
}

/// Fixed-width entries packed into 32-bit words, lowest bits first.
/// Entries never straddle two words, leftover high bits of a word are padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArray {
    bits_per_entry: u8,
    num_entries: usize,
    entries_per_word: u8,
    entry_mask: u32,
    packed: Box<[u32]>,
}

impl PackedArray {
    /// Zero bits per entry packs into zero words.
    pub const fn packed_size(bits_per_entry: u8, num_entries: usize) -> usize {
        if bits_per_entry == 0 {
            return 0;
        }
        num_entries.div_ceil((u32::BITS / bits_per_entry as u32) as usize)
    }
}

impl PackedArray {
    const fn entries_per_word(bits_per_entry: u8) -> u8 {
        if bits_per_entry == 0 {
            0
        } else {
            (u32::BITS / bits_per_entry as u32) as u8
        }
    }

    pub fn from_inner(
        packed: Box<[u32]>,
        bits_per_entry: u8,
        num_entries: usize,
    ) -> Result<Self, PackedArrayError> {
        if bits_per_entry as u32 >= u32::BITS {
            return Err(PackedArrayError::InvalidBitsPerEntry(bits_per_entry));
        }
        let expected = PackedArray::packed_size(bits_per_entry, num_entries);
        if packed.len() != expected {
            return Err(PackedArrayError::InvalidLength {
                num_entries,
                expected,
                got: packed.len(),
            });
        }
        Ok(Self {
            bits_per_entry,
            num_entries,
            entries_per_word: Self::entries_per_word(bits_per_entry),
            entry_mask: (1 << bits_per_entry) - 1,
            packed,
        })
    }

    /// Zeroed array. Panics if an entry does not fit in a word.
    pub fn new(bits_per_entry: u8, num_entries: usize) -> Self {
        assert!(
            (bits_per_entry as u32) < u32::BITS,
            "PackedArray bits per entry {} does not fit in a word",
            bits_per_entry
        );
        Self {
            bits_per_entry,
            num_entries,
            entries_per_word: Self::entries_per_word(bits_per_entry),
            entry_mask: (1 << bits_per_entry) - 1,
            packed: vec![0; PackedArray::packed_size(bits_per_entry, num_entries)]
                .into_boxed_slice(),
        }
    }

    pub fn into_inner(self) -> Box<[u32]> {
        self.packed
    }

    pub fn words(&self) -> &[u32] {
        &self.packed
    }

    pub fn bits_per_entry(&self) -> u8 {
        self.bits_per_entry
    }

    pub fn len(&self) -> usize {
        self.num_entries
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    fn index_offset(&self, index: usize) -> (usize, u32) {
        (
            index / (self.entries_per_word as usize),
            ((index % (self.entries_per_word as usize)) as u32) * (self.bits_per_entry as u32),
        )
    }

    /// Out of range indices and values wider than an entry are ignored.
    pub fn set(&mut self, index: usize, value: u32) {
        if self.bits_per_entry == 0 || index >= self.num_entries || value > self.entry_mask {
            return;
        }
        let (index, offset) = self.index_offset(index);
        let word = &mut self.packed[index];
        *word = (*word & !(self.entry_mask << offset)) | (value << offset);
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        if index >= self.num_entries {
            return None;
        }
        if self.bits_per_entry == 0 {
            return Some(0);
        }
        let (index, offset) = self.index_offset(index);
        Some((self.packed[index] >> offset) & self.entry_mask)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.num_entries).map(|index| self.get(index).unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use crate::{PackedArray, PackedArrayError};

    #[test]
    fn packed_array_test() {
        let test_data = [
            1, 2, 2, 3, 4, 4, 5, 6, 6, 4, 8, 0, 7, 4, 3, 13, 15, 16, 9, 14, 10, 12, 0, 2,
        ];
        let mut data = PackedArray::new(5, 24);
        test_data
            .iter()
            .enumerate()
            .for_each(|(i, v)| data.set(i, *v));
        test_data.iter().enumerate().for_each(|(i, v)| {
            assert_eq!(data.get(i), Some(*v));
        });
        assert_eq!(
            &data.into_inner().to_vec(),
            &[0x08418841, 0x008218C5, 0x20F68C87, 0x040629C9]
        );
    }

    #[test]
    fn overwrite_clears_previous_bits() {
        let mut data = PackedArray::new(4, 16);
        data.set(3, 0b1111);
        data.set(3, 0b0101);
        assert_eq!(data.get(3), Some(0b0101));
        assert_eq!(data.get(2), Some(0));
        assert_eq!(data.get(4), Some(0));
    }

    #[test]
    fn packed_sizes() {
        assert_eq!(PackedArray::packed_size(0, 4096), 0);
        assert_eq!(PackedArray::packed_size(1, 4096), 128);
        assert_eq!(PackedArray::packed_size(3, 4096), 410);
        assert_eq!(PackedArray::packed_size(5, 4096), 683);
        assert_eq!(PackedArray::packed_size(6, 4096), 820);
        assert_eq!(PackedArray::packed_size(16, 4096), 2048);
    }

    #[test]
    fn zero_bits_reads_zero() {
        let data = PackedArray::new(0, 4096);
        assert!(data.words().is_empty());
        assert_eq!(data.get(4095), Some(0));
        assert_eq!(data.get(4096), None);
    }

    #[test]
    fn from_inner_rejects_wrong_length() {
        assert_eq!(
            PackedArray::from_inner(vec![0; 100].into_boxed_slice(), 5, 4096),
            Err(PackedArrayError::InvalidLength {
                num_entries: 4096,
                expected: 683,
                got: 100,
            })
        );
    }
}
