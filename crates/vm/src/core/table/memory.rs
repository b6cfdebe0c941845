//! Memory-size functions.
//!
//! Each returns the byte size an operation needs its frame memory grown to,
//! computed from the operation's stack operands, plus an overflow flag the
//! dispatch loop converts to a gas fault. Absence of a function on a record
//! means the opcode cannot grow memory.

use alloy::primitives::U256;

use super::super::stack::Stack;

// Byte size of the range [offset, offset+length), or overflow when either
// operand or their sum escapes u64. A zero length never grows memory,
// whatever the offset.
fn calc_mem_size(offset: U256, length: U256) -> (u64, bool) {
    if length.is_zero() {
        return (0, false);
    }
    let Ok(length) = u64::try_from(length) else {
        return (0, true);
    };
    let Ok(offset) = u64::try_from(offset) else {
        return (0, true);
    };
    match offset.checked_add(length) {
        Some(size) => (size, false),
        None => (0, true),
    }
}

fn mem_size_at(stack: &Stack, offset_index: usize, length_index: usize) -> (u64, bool) {
    let (Ok(offset), Ok(length)) = (stack.peek(offset_index), stack.peek(length_index)) else {
        return (0, false);
    };
    calc_mem_size(offset, length)
}

fn mem_size_fixed(stack: &Stack, offset_index: usize, length: u64) -> (u64, bool) {
    let Ok(offset) = stack.peek(offset_index) else {
        return (0, false);
    };
    calc_mem_size(offset, U256::from(length))
}

/// KECCAK256: hashes memory[offset..offset+size].
pub fn memory_keccak256(stack: &Stack) -> (u64, bool) {
    mem_size_at(stack, 0, 1)
}

/// CALLDATACOPY, CODECOPY and RETURNDATACOPY write at the destination given
/// on top of the stack.
pub fn memory_copy(stack: &Stack) -> (u64, bool) {
    mem_size_at(stack, 0, 2)
}

/// EXTCODECOPY: the destination sits below the account address.
pub fn memory_ext_code_copy(stack: &Stack) -> (u64, bool) {
    mem_size_at(stack, 1, 3)
}

/// MLOAD reads a full word.
pub fn memory_mload(stack: &Stack) -> (u64, bool) {
    mem_size_fixed(stack, 0, 32)
}

/// MSTORE writes a full word.
pub fn memory_mstore(stack: &Stack) -> (u64, bool) {
    mem_size_fixed(stack, 0, 32)
}

/// MSTORE8 writes a single byte.
pub fn memory_mstore8(stack: &Stack) -> (u64, bool) {
    mem_size_fixed(stack, 0, 1)
}

/// CREATE and CREATE2 read the init code from memory.
pub fn memory_create(stack: &Stack) -> (u64, bool) {
    mem_size_at(stack, 1, 2)
}

/// CALL and CALLCODE read arguments and write return data; the larger of the
/// two ranges wins.
pub fn memory_call(stack: &Stack) -> (u64, bool) {
    let (args, overflow) = mem_size_at(stack, 3, 4);
    if overflow {
        return (0, true);
    }
    let (ret, overflow) = mem_size_at(stack, 5, 6);
    if overflow {
        return (0, true);
    }
    (args.max(ret), false)
}

/// DELEGATECALL and STATICCALL carry no value operand, shifting the ranges
/// up by one.
pub fn memory_thin_call(stack: &Stack) -> (u64, bool) {
    let (args, overflow) = mem_size_at(stack, 2, 3);
    if overflow {
        return (0, true);
    }
    let (ret, overflow) = mem_size_at(stack, 4, 5);
    if overflow {
        return (0, true);
    }
    (args.max(ret), false)
}

/// RETURN and REVERT read their payload from memory.
pub fn memory_return(stack: &Stack) -> (u64, bool) {
    mem_size_at(stack, 0, 1)
}

/// LOG0-LOG4 read their payload from memory.
pub fn memory_log(stack: &Stack) -> (u64, bool) {
    mem_size_at(stack, 0, 1)
}
