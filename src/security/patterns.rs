//! Gutmann pattern table
//!
//! The first eleven passes are fixed bit patterns; the remaining passes are
//! drawn from the injected random source when the table is built. No I/O.

use rand::RngCore;

/// Total number of overwrite passes
pub const PATTERN_COUNT: usize = 35;

/// Default overwrite block size (64 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Fixed repeating units for the deterministic prefix, in pass order
const FIXED_UNITS: [&[u8]; 11] = [
    &[0x00],
    &[0xFF],
    &[0x55],
    &[0xAA],
    &[0x92, 0x49, 0x24],
    &[0x49, 0x24, 0x92],
    &[0x24, 0x92, 0x49],
    &[0x00],
    &[0xFF],
    &[0x55],
    &[0xAA],
];

/// Number of deterministic passes at the head of the table
pub const FIXED_PASSES: usize = FIXED_UNITS.len();

/// Repeating unit for a fixed pass, `None` for random passes
pub fn fixed_unit(index: usize) -> Option<&'static [u8]> {
    FIXED_UNITS.get(index).copied()
}

/// Tile `unit` into a block of exactly `size` bytes
pub fn tile(unit: &[u8], size: usize) -> Vec<u8> {
    unit.iter().copied().cycle().take(size).collect()
}

/// Ordered table of `PATTERN_COUNT` blocks, all `block_size` long
#[derive(Debug, Clone)]
pub struct WipePatterns {
    block_size: usize,
    blocks: Vec<Vec<u8>>,
}

impl WipePatterns {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.blocks.iter().map(Vec::as_slice)
    }
}

/// Build the full 35-entry table
pub fn generate_patterns<R: RngCore + ?Sized>(block_size: usize, rng: &mut R) -> WipePatterns {
    let mut blocks = Vec::with_capacity(PATTERN_COUNT);

    for index in 0..PATTERN_COUNT {
        let block = match fixed_unit(index) {
            Some(unit) => tile(unit, block_size),
            None => {
                let mut block = vec![0u8; block_size];
                rng.fill_bytes(&mut block);
                block
            }
        };
        blocks.push(block);
    }

    WipePatterns { block_size, blocks }
}
