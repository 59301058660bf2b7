//! FITS record geometry: the 2880-byte block, the 80-byte card, and the
//! padding rules that round every header and data unit up to a whole block.

/// Bytes per FITS logical record.
pub const BLOCK_SIZE: usize = 2880;

/// Bytes per header card.
pub const CARD_SIZE: usize = 80;

/// Cards per logical record, 36.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Headers pad their final block with ASCII spaces.
pub const HEADER_PAD_BYTE: u8 = 0x20;

/// Data units pad their final block with zeros.
pub const DATA_PAD_BYTE: u8 = 0x00;

/// Ceiling division of `num_bytes` by the block size. An empty payload
/// occupies no blocks at all rather than one padded block.
pub const fn blocks_needed(num_bytes: usize) -> usize {
    if num_bytes == 0 {
        return 0;
    }
    num_bytes.div_ceil(BLOCK_SIZE)
}

/// `num_bytes` rounded up to the next whole-block byte length.
pub const fn padded_byte_len(num_bytes: usize) -> usize {
    blocks_needed(num_bytes) * BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_count_boundaries() {
        assert_eq!(blocks_needed(0), 0);
        assert_eq!(blocks_needed(1), 1);
        assert_eq!(blocks_needed(BLOCK_SIZE - 1), 1);
        assert_eq!(blocks_needed(BLOCK_SIZE), 1);
        assert_eq!(blocks_needed(BLOCK_SIZE + 1), 2);
        assert_eq!(blocks_needed(2 * BLOCK_SIZE), 2);
    }

    #[test]
    fn padded_length_is_whole_blocks() {
        assert_eq!(padded_byte_len(0), 0);
        assert_eq!(padded_byte_len(1), BLOCK_SIZE);
        assert_eq!(padded_byte_len(BLOCK_SIZE), BLOCK_SIZE);
        assert_eq!(padded_byte_len(BLOCK_SIZE + 1), 2 * BLOCK_SIZE);
        assert_eq!(padded_byte_len(2 * BLOCK_SIZE), 2 * BLOCK_SIZE);
    }

    #[test]
    fn card_and_block_sizes_agree() {
        assert_eq!(BLOCK_SIZE, 2880);
        assert_eq!(CARD_SIZE, 80);
        assert_eq!(CARDS_PER_BLOCK, 36);
        assert_eq!(CARDS_PER_BLOCK * CARD_SIZE, BLOCK_SIZE);
    }
}
