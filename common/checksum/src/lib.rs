// Licensed under the Apache-2.0 license
#![cfg_attr(not(test), no_std)]

//! Checksums used to detect corruption in firmware images and persisted
//! configuration records: a 64-bit region checksum that skips its own storage
//! location so it can be stamped and verified in place, and a seedable 32-bit
//! running checksum for payloads streamed in segments.

use log::debug;
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::FromBytes;

/// Width in bytes of the checksum field embedded in a checksummed region.
pub const CHECKSUM_FIELD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumError {
    /// The region length or the checksum field offset is not 32-bit aligned,
    /// or the field does not lie entirely inside the region.
    Misaligned,
    /// The stored checksum disagrees with the value computed over the region.
    Mismatch { stored: u64, computed: u64 },
}

impl core::fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Misaligned => {
                write!(
                    f,
                    "The region length and checksum offset must be 32-bit aligned \
                     and the checksum field must lie inside the region."
                )
            }
            Self::Mismatch { stored, computed } => {
                write!(
                    f,
                    "The stored checksum {stored:#018x} does not match the computed \
                     checksum {computed:#018x}."
                )
            }
        }
    }
}

impl core::error::Error for ChecksumError {}

/// Computes the region checksum over `buffer` and writes it little-endian
/// into the 8-byte field at `checksum_offset`, returning the value written.
///
/// The buffer length and `checksum_offset` must both be multiples of 4 and
/// the field must lie inside the buffer; the bytes currently stored in the
/// field do not contribute to the computed value, so a region can be stamped
/// without zeroing the field first.
pub fn insert_region_checksum(
    buffer: &mut [u8],
    checksum_offset: usize,
) -> Result<u64, ChecksumError> {
    let checksum = compute_region_checksum(buffer, checksum_offset)?;
    buffer[checksum_offset..checksum_offset + CHECKSUM_FIELD_SIZE]
        .copy_from_slice(&checksum.to_le_bytes());
    Ok(checksum)
}

/// Recomputes the region checksum over `buffer` and compares it with the
/// 8-byte value stored at `checksum_offset`.
///
/// A [`ChecksumError::Mismatch`] is an expected outcome for a corrupted
/// region, not a usage error; [`ChecksumError::Misaligned`] reports the same
/// structural preconditions as [`insert_region_checksum`].
pub fn verify_region_checksum(buffer: &[u8], checksum_offset: usize) -> Result<(), ChecksumError> {
    let computed = compute_region_checksum(buffer, checksum_offset)?;
    let field = &buffer[checksum_offset..checksum_offset + CHECKSUM_FIELD_SIZE];
    let stored = u64::from_le_bytes(field.try_into().map_err(|_| ChecksumError::Misaligned)?);
    if stored != computed {
        debug!("Region checksum mismatch: stored {stored:#x}, computed {computed:#x}");
        return Err(ChecksumError::Mismatch { stored, computed });
    }
    Ok(())
}

fn compute_region_checksum(buffer: &[u8], checksum_offset: usize) -> Result<u64, ChecksumError> {
    if checksum_offset % 4 != 0
        || checksum_offset
            .checked_add(CHECKSUM_FIELD_SIZE)
            .is_none_or(|end| end > buffer.len())
    {
        debug!("Checksum field at {checksum_offset} is misaligned or outside the region");
        return Err(ChecksumError::Misaligned);
    }
    // U32<LittleEndian> is unaligned, so this only fails on a non-integral
    // number of 32-bit words.
    let words = <[U32<LittleEndian>]>::ref_from_bytes(buffer).map_err(|_| {
        debug!("Region length {} is not 32-bit aligned", buffer.len());
        ChecksumError::Misaligned
    })?;

    let field_word = checksum_offset / 4;
    let mut lo: u32 = 0;
    let mut hi: u32 = 0;
    for (index, word) in words.iter().enumerate() {
        // The two words holding the stored checksum contribute zero, but
        // still advance `hi` to keep the weighting position-dependent.
        if index != field_word && index != field_word + 1 {
            lo = lo.wrapping_add(word.get());
        }
        hi = hi.wrapping_add(lo);
    }
    Ok((u64::from(hi) << 32) | u64::from(lo))
}

/// Running checksum over an arbitrary byte payload.
///
/// Each byte contributes at the bit position given by its index modulo 4, so
/// a word-multiple payload sums as little-endian 32-bit words without any
/// alignment requirement on the input. The seed is negated before
/// accumulation and the sum negated again on return, which lets callers
/// checksum a payload in segments by feeding each return value to the next
/// call. The index phase restarts at every call, so chained results equal
/// the single-pass value only when segment boundaries fall on 4-byte
/// multiples of the overall payload.
pub fn running_checksum(buffer: &[u8], seed: u32) -> u32 {
    buffer
        .iter()
        .enumerate()
        .fold(seed.wrapping_neg(), |csum, (index, byte)| {
            csum.wrapping_add(u32::from(*byte) << (8 * (index % 4)))
        })
        .wrapping_neg()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned() -> [u8; 64] {
        let mut buffer = [0u8; 64];
        for (index, byte) in buffer.iter_mut().enumerate() {
            *byte = (index as u8).wrapping_mul(37).wrapping_add(11);
        }
        buffer
    }

    #[test]
    fn insert_then_verify_matches() {
        for offset in [0, 4, 16, 56] {
            let mut buffer = patterned();
            insert_region_checksum(&mut buffer, offset).unwrap();
            verify_region_checksum(&buffer, offset).unwrap();
        }
    }

    #[test]
    fn corrupting_any_byte_outside_the_field_mismatches() {
        let mut buffer = patterned();
        insert_region_checksum(&mut buffer, 24).unwrap();
        for index in 0..buffer.len() {
            if (24..32).contains(&index) {
                continue;
            }
            buffer[index] ^= 0x01;
            assert!(matches!(
                verify_region_checksum(&buffer, 24),
                Err(ChecksumError::Mismatch { .. })
            ));
            buffer[index] ^= 0x01;
        }
        verify_region_checksum(&buffer, 24).unwrap();
    }

    #[test]
    fn field_contents_do_not_affect_the_computed_value() {
        let mut stale = patterned();
        let stale = &mut stale[..32];
        stale[8..16].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0xde, 0xad, 0xbe, 0xef]);
        let mut zeroed = patterned();
        let zeroed = &mut zeroed[..32];
        zeroed[8..16].fill(0);
        assert_eq!(
            insert_region_checksum(stale, 8).unwrap(),
            insert_region_checksum(zeroed, 8).unwrap()
        );
    }

    #[test]
    fn known_region_value() {
        // Words 1, 1, then the excluded field: lo ends at 2, hi walks
        // 1, 3, 5, 7.
        let mut buffer = [0u8; 16];
        buffer[0] = 1;
        buffer[4] = 1;
        let checksum = insert_region_checksum(&mut buffer, 8).unwrap();
        assert_eq!(checksum, (7u64 << 32) | 2);
        assert_eq!(&buffer[8..16], &[2, 0, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn all_zero_region_checksums_to_zero() {
        let mut buffer = [0u8; 24];
        assert_eq!(insert_region_checksum(&mut buffer, 16).unwrap(), 0);
        verify_region_checksum(&buffer, 16).unwrap();
    }

    #[test]
    fn swapping_words_changes_the_checksum() {
        let mut first = [0u8; 16];
        first[0] = 1;
        first[4] = 2;
        let mut second = [0u8; 16];
        second[0] = 2;
        second[4] = 1;
        assert_ne!(
            insert_region_checksum(&mut first, 8).unwrap(),
            insert_region_checksum(&mut second, 8).unwrap()
        );
    }

    #[test]
    fn rejects_misaligned_regions() {
        let mut buffer = [0u8; 30];
        assert_eq!(
            insert_region_checksum(&mut buffer[..], 8),
            Err(ChecksumError::Misaligned)
        );
        let mut buffer = [0u8; 32];
        assert_eq!(
            insert_region_checksum(&mut buffer, 6),
            Err(ChecksumError::Misaligned)
        );
        assert_eq!(
            insert_region_checksum(&mut buffer, 28),
            Err(ChecksumError::Misaligned)
        );
        assert_eq!(
            verify_region_checksum(&[0u8; 4], 0),
            Err(ChecksumError::Misaligned)
        );
    }

    #[test]
    fn running_checksum_known_values() {
        // Negated little-endian word sum: -(0x04030201).
        assert_eq!(running_checksum(&[1, 2, 3, 4], 0), 0xfbfc_fdff);
        assert_eq!(running_checksum(&[1, 2, 3, 4, 5], 0), 0xfbfc_fdfa);
        assert_eq!(running_checksum(&[], 0), 0);
    }

    #[test]
    fn running_checksum_seed_adds_linearly() {
        let data = patterned();
        let base = running_checksum(&data, 0);
        assert_eq!(running_checksum(&data, 77), base.wrapping_add(77));
    }

    #[test]
    fn running_checksum_chains_across_word_boundaries() {
        let data = patterned();
        let whole = running_checksum(&data, 0);
        for split in [4, 16, 32, 60] {
            let first = running_checksum(&data[..split], 0);
            assert_eq!(running_checksum(&data[split..], first), whole);
        }
    }
}
