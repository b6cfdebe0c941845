//! Gas cost constants and the shared pricing math.
//!
//! The per-opcode dynamic cost functions live in [`dynamic`]; this module
//! holds the named constants the tables reference plus the two formulas used
//! everywhere: quadratic memory expansion and the 63/64 call-gas rule.

pub mod dynamic;

use alloy::primitives::U256;

use super::{error::VmError, fork::Fork, memory::Memory};

/// Gas of the cheapest tier of opcodes (ADDRESS, CALLER, POP, ...).
pub const QUICK_STEP: u64 = 2;
/// Gas of the arithmetic/bitwise tier (ADD, SUB, LT, AND, PUSH, DUP, ...).
pub const FASTEST_STEP: u64 = 3;
/// Gas of the multiplication tier (MUL, DIV, MOD, ...).
pub const FAST_STEP: u64 = 5;
/// Gas of the modular-arithmetic tier (ADDMOD, MULMOD, JUMP).
pub const MID_STEP: u64 = 8;
/// Gas of JUMPI.
pub const SLOW_STEP: u64 = 10;
/// Gas of BLOCKHASH.
pub const EXT_STEP: u64 = 20;
/// Gas of the JUMPDEST marker.
pub const JUMPDEST_GAS: u64 = 1;

/// Base gas of KECCAK256.
pub const KECCAK256_GAS: u64 = 30;
/// Gas per 32-byte word hashed by KECCAK256 (and CREATE2).
pub const KECCAK256_WORD_GAS: u64 = 6;
/// Gas per 32-byte word copied by the COPY family.
pub const COPY_GAS: u64 = 3;

/// Base gas of LOGn, and gas per topic.
pub const LOG_GAS: u64 = 375;
/// Gas per topic of LOGn.
pub const LOG_TOPIC_GAS: u64 = 375;
/// Gas per byte of LOGn payload.
pub const LOG_DATA_GAS: u64 = 8;

/// Base gas of EXP.
pub const EXP_GAS: u64 = 10;
/// Gas per byte of EXP exponent before Spurious Dragon.
pub const EXP_BYTE_FRONTIER: u64 = 10;
/// Gas per byte of EXP exponent from Spurious Dragon on (EIP-160).
pub const EXP_BYTE_EIP160: u64 = 50;

/// Gas of SLOAD at Frontier.
pub const SLOAD_GAS_FRONTIER: u64 = 50;
/// Gas of SLOAD from Tangerine Whistle (EIP-150).
pub const SLOAD_GAS_EIP150: u64 = 200;
/// Gas of SLOAD from Istanbul (EIP-1884 / EIP-2200).
pub const SLOAD_GAS_EIP2200: u64 = 800;

/// Gas of BALANCE at Frontier.
pub const BALANCE_GAS_FRONTIER: u64 = 20;
/// Gas of BALANCE from Tangerine Whistle (EIP-150).
pub const BALANCE_GAS_EIP150: u64 = 400;
/// Gas of BALANCE from Istanbul (EIP-1884).
pub const BALANCE_GAS_EIP1884: u64 = 700;

/// Gas of EXTCODESIZE at Frontier.
pub const EXTCODE_SIZE_GAS_FRONTIER: u64 = 20;
/// Gas of EXTCODESIZE from Tangerine Whistle (EIP-150).
pub const EXTCODE_SIZE_GAS_EIP150: u64 = 700;
/// Base gas of EXTCODECOPY at Frontier.
pub const EXTCODE_COPY_GAS_FRONTIER: u64 = 20;
/// Base gas of EXTCODECOPY from Tangerine Whistle (EIP-150).
pub const EXTCODE_COPY_GAS_EIP150: u64 = 700;
/// Gas of EXTCODEHASH at Constantinople (EIP-1052).
pub const EXTCODE_HASH_GAS_CONSTANTINOPLE: u64 = 400;
/// Gas of EXTCODEHASH from Istanbul (EIP-1884).
pub const EXTCODE_HASH_GAS_EIP1884: u64 = 700;

/// Base gas of the CALL family at Frontier.
pub const CALL_GAS_FRONTIER: u64 = 40;
/// Base gas of the CALL family from Tangerine Whistle (EIP-150).
pub const CALL_GAS_EIP150: u64 = 700;
/// Surcharge for a CALL that transfers value.
pub const CALL_VALUE_TRANSFER_GAS: u64 = 9000;
/// Surcharge for a CALL that brings a new account into existence.
pub const CALL_NEW_ACCOUNT_GAS: u64 = 25000;
/// Free gas handed to the callee of a value-transferring CALL.
pub const CALL_STIPEND: u64 = 2300;

/// Gas of SSTORE setting a slot from zero to non-zero.
pub const SSTORE_SET_GAS: u64 = 20000;
/// Gas of SSTORE updating a non-zero slot.
pub const SSTORE_RESET_GAS: u64 = 5000;
/// Gas of SSTORE clearing a slot to zero.
pub const SSTORE_CLEAR_GAS: u64 = 5000;
/// Refund for clearing a slot to zero, before EIP-3529.
pub const SSTORE_REFUND_GAS: u64 = 15000;

/// Minimum frame gas required to attempt a net-metered SSTORE (EIP-2200).
pub const SSTORE_SENTRY_GAS_EIP2200: u64 = 2300;
/// Refund for clearing a slot under net metering, before EIP-3529.
pub const SSTORE_CLEARS_SCHEDULE_EIP2200: u64 = 15000;
/// Refund for clearing a slot from London on (EIP-3529).
pub const SSTORE_CLEARS_SCHEDULE_EIP3529: u64 = 4800;

/// Gas of a cold account access (EIP-2929).
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
/// Gas of a cold storage-slot access (EIP-2929).
pub const COLD_SLOAD_COST: u64 = 2100;
/// Gas of a warm storage or account access (EIP-2929).
pub const WARM_STORAGE_READ_COST: u64 = 100;

/// Base gas of CREATE and CREATE2.
pub const CREATE_GAS: u64 = 32000;
/// Gas per byte of deployed contract code.
pub const CREATE_DATA_GAS: u64 = 200;
/// Maximum size of deployed contract code from Spurious Dragon (EIP-170).
pub const MAX_CODE_SIZE: usize = 24576;

/// Gas of SELFDESTRUCT from Tangerine Whistle (EIP-150).
pub const SELFDESTRUCT_GAS_EIP150: u64 = 5000;
/// Refund for SELFDESTRUCT, removed by EIP-3529.
pub const SELFDESTRUCT_REFUND_GAS: u64 = 24000;

/// Linear coefficient of the memory cost formula.
pub const MEMORY_GAS: u64 = 3;
/// Divisor of the quadratic term of the memory cost formula.
pub const QUAD_COEFF_DIV: u64 = 512;

// The largest memory size whose cost fits in u64; beyond it the quadratic
// term overflows, so requests are rejected as GasUintOverflow first.
const MAX_MEMORY_SIZE: u64 = 0x1FFFFFFFE0;

/// Round a byte count up to a count of 32-byte words.
#[inline]
pub const fn to_word_size(size: u64) -> u64 {
    size.div_ceil(32)
}

/// Convert a 256-bit word to u64, flagging overflow as [`VmError::GasUintOverflow`].
#[inline]
pub fn u64_or_overflow(value: U256) -> Result<u64, VmError> {
    u64::try_from(value).map_err(|_| VmError::GasUintOverflow)
}

fn memory_cost(words: u64) -> u64 {
    words * words / QUAD_COEFF_DIV + MEMORY_GAS * words
}

/// Cost of growing `memory` to `new_size` bytes: the difference between the
/// quadratic cost `3w + w²/512` at the new and current word counts. Zero when
/// the memory is already large enough.
pub fn memory_gas_cost(memory: &Memory, new_size: u64) -> Result<u64, VmError> {
    if new_size == 0 {
        return Ok(0);
    }
    if new_size > MAX_MEMORY_SIZE {
        return Err(VmError::GasUintOverflow);
    }
    if new_size <= memory.len() as u64 {
        return Ok(0);
    }

    let new_cost = memory_cost(to_word_size(new_size));
    let current_cost = memory_cost(to_word_size(memory.len() as u64));
    Ok(new_cost - current_cost)
}

/// Gas forwarded to a sub-call: the requested amount, capped from Tangerine
/// Whistle on (EIP-150) at all-but-one-64th of the gas left after the call's
/// own costs.
pub fn call_gas(
    fork: Fork,
    available_gas: u64,
    base_cost: u64,
    requested: U256,
) -> Result<u64, VmError> {
    if fork.is_active(Fork::TangerineWhistle) {
        let available = available_gas.saturating_sub(base_cost);
        let gas = available - available / 64;
        if U256::from(gas) < requested {
            return Ok(gas);
        }
    }
    u64_or_overflow(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_word_size() {
        assert_eq!(to_word_size(0), 0);
        assert_eq!(to_word_size(1), 1);
        assert_eq!(to_word_size(32), 1);
        assert_eq!(to_word_size(33), 2);
        assert_eq!(to_word_size(1024), 32);
    }

    #[test]
    fn test_memory_gas_cost() {
        let memory = Memory::new();
        assert_eq!(memory_gas_cost(&memory, 0), Ok(0));
        assert_eq!(memory_gas_cost(&memory, 32), Ok(3));
        assert_eq!(memory_gas_cost(&memory, 64), Ok(6));
        // 33 words: 33*33/512 + 3*33 = 2 + 99
        assert_eq!(memory_gas_cost(&memory, 32 * 33), Ok(101));
    }

    #[test]
    fn test_memory_gas_cost_is_a_delta() {
        let mut memory = Memory::new();
        memory.resize(32);
        assert_eq!(memory_gas_cost(&memory, 32), Ok(0));
        assert_eq!(memory_gas_cost(&memory, 64), Ok(3));
        assert_eq!(memory_gas_cost(&memory, 16), Ok(0));
    }

    #[test]
    fn test_memory_gas_cost_overflow() {
        let memory = Memory::new();
        assert_eq!(memory_gas_cost(&memory, u64::MAX), Err(VmError::GasUintOverflow));
    }

    #[test]
    fn test_call_gas_eip150_cap() {
        // remaining 6400 after base cost: forwarded at most 6400 - 100
        let requested = U256::from(1_000_000u64);
        assert_eq!(call_gas(Fork::London, 6400, 0, requested), Ok(6300));
        // requests below the cap are granted exactly
        assert_eq!(call_gas(Fork::London, 6400, 0, U256::from(1000u64)), Ok(1000));
        // base cost is subtracted before the 64th is computed
        assert_eq!(call_gas(Fork::TangerineWhistle, 6500, 100, requested), Ok(6300));
    }

    #[test]
    fn test_call_gas_frontier_grants_request() {
        assert_eq!(call_gas(Fork::Frontier, 6400, 0, U256::from(1_000_000u64)), Ok(1_000_000));
        assert_eq!(
            call_gas(Fork::Homestead, 0, 0, U256::MAX),
            Err(VmError::GasUintOverflow)
        );
    }
}
