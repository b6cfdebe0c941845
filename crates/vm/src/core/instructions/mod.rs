//! Opcode execute functions, grouped by family.
//!
//! Every function has the uniform [`ExecuteFn`](crate::core::table::ExecuteFn)
//! shape consumed by the dispatch loop: operate on the machine and the
//! current frame, return how the loop should proceed. Stack depth and gas
//! are already validated by the time these run; memory the operation
//! declared through its memory-size function is already allocated.

pub mod arithmetic;
pub mod bitwise;
pub mod block;
pub mod comparison;
pub mod control;
pub mod crypto;
pub mod environment;
pub mod logging;
pub mod memory;
pub mod stack;
pub mod storage;
pub mod system;

use alloy::primitives::{Address, B256, U256};

/// Truncate a stack word to an address (the low 20 bytes).
#[inline]
pub(crate) fn to_address(word: U256) -> Address {
    Address::from_word(B256::from(word))
}

/// Widen an address to a stack word.
#[inline]
pub(crate) fn address_to_word(address: Address) -> U256 {
    U256::from_be_bytes(address.into_word().0)
}

/// Convert a stack word to usize, saturating out-of-range values. Only used
/// where the interpreter has already bounded the range through the
/// memory-size functions, or where the source is zero-padded anyway.
#[inline]
pub(crate) fn as_usize_saturated(word: U256) -> usize {
    usize::try_from(word).unwrap_or(usize::MAX)
}

/// Read `size` bytes at `offset` from `data`, zero-padding reads past the
/// end. CALLDATALOAD/COPY and CODECOPY read arbitrary user offsets, so this
/// never faults.
pub(crate) fn get_data(data: &[u8], offset: U256, size: usize) -> Vec<u8> {
    let offset = as_usize_saturated(offset).min(data.len());
    let end = offset.saturating_add(size).min(data.len());

    let mut value = data[offset..end].to_vec();
    value.resize(size, 0u8);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_address_truncates_high_bytes() {
        let word = U256::MAX;
        assert_eq!(to_address(word), Address::repeat_byte(0xff));
    }

    #[test]
    fn test_address_word_round_trip() {
        let address = Address::repeat_byte(0xab);
        assert_eq!(to_address(address_to_word(address)), address);
    }

    #[test]
    fn test_get_data_pads() {
        let data = [1u8, 2, 3];
        assert_eq!(get_data(&data, U256::ZERO, 5), vec![1, 2, 3, 0, 0]);
        assert_eq!(get_data(&data, U256::from(2u8), 2), vec![3, 0]);
        assert_eq!(get_data(&data, U256::from(10u8), 3), vec![0, 0, 0]);
        assert_eq!(get_data(&data, U256::MAX, 2), vec![0, 0]);
    }
}
