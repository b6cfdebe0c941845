//! Per-opcode dynamic gas functions.
//!
//! Each function computes the variable part of one opcode's cost from the
//! operands and state, on top of the constant gas already deducted by the
//! dispatch loop. `mem_size` is the word-rounded byte size the operation
//! requires, pre-computed from the jump table's memory-size function; every
//! function that can grow memory folds the quadratic expansion delta into its
//! result. The fork tables swap these functions per EIP, so none of them
//! inspect fork rules beyond what [`call_gas`] encodes.

use super::{
    call_gas, memory_gas_cost, to_word_size, u64_or_overflow, CALL_NEW_ACCOUNT_GAS,
    CALL_VALUE_TRANSFER_GAS, COLD_ACCOUNT_ACCESS_COST, COLD_SLOAD_COST, COPY_GAS, EXP_BYTE_EIP160,
    EXP_BYTE_FRONTIER, EXP_GAS, KECCAK256_WORD_GAS, LOG_DATA_GAS, LOG_GAS, LOG_TOPIC_GAS,
    SELFDESTRUCT_GAS_EIP150, SELFDESTRUCT_REFUND_GAS, SLOAD_GAS_EIP2200,
    SSTORE_CLEARS_SCHEDULE_EIP2200, SSTORE_CLEARS_SCHEDULE_EIP3529, SSTORE_CLEAR_GAS,
    SSTORE_REFUND_GAS, SSTORE_RESET_GAS, SSTORE_SENTRY_GAS_EIP2200, SSTORE_SET_GAS,
    WARM_STORAGE_READ_COST,
};
use crate::core::{
    error::VmError,
    evm::Evm,
    instructions::to_address,
    interpreter::Frame,
    opcodes,
    table::DynamicGasFn,
};

#[inline]
fn checked_add(a: u64, b: u64) -> Result<u64, VmError> {
    a.checked_add(b).ok_or(VmError::GasUintOverflow)
}

#[inline]
fn checked_mul(a: u64, b: u64) -> Result<u64, VmError> {
    a.checked_mul(b).ok_or(VmError::GasUintOverflow)
}

/// Memory expansion only: MLOAD, MSTORE, MSTORE8, CREATE, RETURN, REVERT.
pub fn gas_memory_expansion(
    _evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    memory_gas_cost(&frame.memory, mem_size)
}

/// KECCAK256: expansion plus 6 gas per hashed word.
pub fn gas_keccak256(
    _evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    let gas = memory_gas_cost(&frame.memory, mem_size)?;
    let words = to_word_size(u64_or_overflow(frame.stack.peek(1)?)?);
    checked_add(gas, checked_mul(words, KECCAK256_WORD_GAS)?)
}

fn copy_gas(frame: &Frame, mem_size: u64, length_index: usize) -> Result<u64, VmError> {
    let gas = memory_gas_cost(&frame.memory, mem_size)?;
    let words = to_word_size(u64_or_overflow(frame.stack.peek(length_index)?)?);
    checked_add(gas, checked_mul(words, COPY_GAS)?)
}

/// CALLDATACOPY, CODECOPY and RETURNDATACOPY: expansion plus 3 gas per
/// copied word.
pub fn gas_copy(_evm: &mut Evm<'_>, frame: &mut Frame, mem_size: u64) -> Result<u64, VmError> {
    copy_gas(frame, mem_size, 2)
}

/// EXTCODECOPY: expansion plus 3 gas per copied word (the length sits one
/// slot deeper than on the other copies).
pub fn gas_ext_code_copy(
    _evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    copy_gas(frame, mem_size, 3)
}

/// LOG0-LOG4: expansion plus 375 base, 375 per topic and 8 per payload byte.
pub fn gas_log(_evm: &mut Evm<'_>, frame: &mut Frame, mem_size: u64) -> Result<u64, VmError> {
    let topics = (frame.contract.code[frame.pc as usize] - opcodes::LOG0) as u64;
    let size = u64_or_overflow(frame.stack.peek(1)?)?;

    let mut gas = memory_gas_cost(&frame.memory, mem_size)?;
    gas = checked_add(gas, LOG_GAS)?;
    gas = checked_add(gas, checked_mul(topics, LOG_TOPIC_GAS)?)?;
    checked_add(gas, checked_mul(size, LOG_DATA_GAS)?)
}

fn exp_gas(frame: &Frame, per_byte: u64) -> Result<u64, VmError> {
    let exponent = frame.stack.peek(1)?;
    let byte_len = (exponent.bit_len() as u64).div_ceil(8);
    checked_add(EXP_GAS, checked_mul(byte_len, per_byte)?)
}

/// EXP before Spurious Dragon: 10 gas per exponent byte.
pub fn gas_exp_frontier(
    _evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    exp_gas(frame, EXP_BYTE_FRONTIER)
}

/// EXP from Spurious Dragon on (EIP-160): 50 gas per exponent byte.
pub fn gas_exp_eip160(
    _evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    exp_gas(frame, EXP_BYTE_EIP160)
}

/// SSTORE before net metering: 20000 to fill a slot, 5000 otherwise, with a
/// 15000 refund for clearing.
pub fn gas_sstore_legacy(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    let key = frame.stack.peek(0)?;
    let new = frame.stack.peek(1)?;
    let current = evm.state.storage(frame.contract.address, key);

    if current.is_zero() && !new.is_zero() {
        Ok(SSTORE_SET_GAS)
    } else if !current.is_zero() && new.is_zero() {
        evm.state.add_refund(SSTORE_REFUND_GAS);
        Ok(SSTORE_CLEAR_GAS)
    } else {
        Ok(SSTORE_RESET_GAS)
    }
}

/// SSTORE under EIP-2200 net metering (Istanbul).
///
/// Pricing is a ladder over (original, current, new): no-op writes cost a
/// warm read, clean writes cost set/reset, and dirty writes cost a warm read
/// while adjusting the refund counter so the net charge matches the net
/// state change of the transaction.
pub fn gas_sstore_eip2200(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    // EIP-2200 sentry: leave headroom so a re-entrant call observing the
    // half-applied state cannot run anything
    if frame.gas <= SSTORE_SENTRY_GAS_EIP2200 {
        return Err(VmError::OutOfGas);
    }

    let address = frame.contract.address;
    let key = frame.stack.peek(0)?;
    let new = frame.stack.peek(1)?;
    let current = evm.state.storage(address, key);

    if current == new {
        return Ok(SLOAD_GAS_EIP2200);
    }

    let original = evm.state.committed_storage(address, key);
    if original == current {
        if original.is_zero() {
            return Ok(SSTORE_SET_GAS);
        }
        if new.is_zero() {
            evm.state.add_refund(SSTORE_CLEARS_SCHEDULE_EIP2200);
        }
        return Ok(SSTORE_RESET_GAS);
    }

    if !original.is_zero() {
        if current.is_zero() {
            evm.state.sub_refund(SSTORE_CLEARS_SCHEDULE_EIP2200);
        } else if new.is_zero() {
            evm.state.add_refund(SSTORE_CLEARS_SCHEDULE_EIP2200);
        }
    }
    if original == new {
        if original.is_zero() {
            evm.state.add_refund(SSTORE_SET_GAS - SLOAD_GAS_EIP2200);
        } else {
            evm.state.add_refund(SSTORE_RESET_GAS - SLOAD_GAS_EIP2200);
        }
    }
    Ok(SLOAD_GAS_EIP2200)
}

fn sstore_eip2929(
    evm: &mut Evm<'_>,
    frame: &Frame,
    clearing_refund: u64,
) -> Result<u64, VmError> {
    if frame.gas <= SSTORE_SENTRY_GAS_EIP2200 {
        return Err(VmError::OutOfGas);
    }

    let address = frame.contract.address;
    let key = frame.stack.peek(0)?;
    let new = frame.stack.peek(1)?;

    let mut cost = 0;
    if !evm.state.slot_in_access_list(address, key) {
        evm.state.add_slot_to_access_list(address, key);
        cost = COLD_SLOAD_COST;
    }

    let current = evm.state.storage(address, key);
    if current == new {
        return Ok(cost + WARM_STORAGE_READ_COST);
    }

    let original = evm.state.committed_storage(address, key);
    if original == current {
        if original.is_zero() {
            return Ok(cost + SSTORE_SET_GAS);
        }
        if new.is_zero() {
            evm.state.add_refund(clearing_refund);
        }
        return Ok(cost + (SSTORE_RESET_GAS - COLD_SLOAD_COST));
    }

    if !original.is_zero() {
        if current.is_zero() {
            evm.state.sub_refund(clearing_refund);
        } else if new.is_zero() {
            evm.state.add_refund(clearing_refund);
        }
    }
    if original == new {
        if original.is_zero() {
            evm.state.add_refund(SSTORE_SET_GAS - WARM_STORAGE_READ_COST);
        } else {
            evm.state
                .add_refund((SSTORE_RESET_GAS - COLD_SLOAD_COST) - WARM_STORAGE_READ_COST);
        }
    }
    Ok(cost + WARM_STORAGE_READ_COST)
}

/// SSTORE under EIP-2929 access lists (Berlin): the EIP-2200 ladder with a
/// cold-slot surcharge.
pub fn gas_sstore_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    sstore_eip2929(evm, frame, SSTORE_CLEARS_SCHEDULE_EIP2200)
}

/// SSTORE from London on (EIP-3529): the Berlin ladder with the clearing
/// refund cut to 4800.
pub fn gas_sstore_eip3529(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    sstore_eip2929(evm, frame, SSTORE_CLEARS_SCHEDULE_EIP3529)
}

/// SLOAD under EIP-2929: 2100 for the first touch of a slot in this
/// transaction, 100 after.
pub fn gas_sload_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    let address = frame.contract.address;
    let key = frame.stack.peek(0)?;

    if !evm.state.slot_in_access_list(address, key) {
        evm.state.add_slot_to_access_list(address, key);
        Ok(COLD_SLOAD_COST)
    } else {
        Ok(WARM_STORAGE_READ_COST)
    }
}

/// BALANCE, EXTCODESIZE and EXTCODEHASH under EIP-2929: the warm cost is the
/// repriced constant gas, so only the cold surcharge appears here.
pub fn gas_account_access_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    let address = to_address(frame.stack.peek(0)?);

    if !evm.state.address_in_access_list(address) {
        evm.state.add_address_to_access_list(address);
        Ok(COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST)
    } else {
        Ok(0)
    }
}

/// EXTCODECOPY under EIP-2929: the copy cost plus the cold surcharge.
pub fn gas_ext_code_copy_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    let gas = copy_gas(frame, mem_size, 3)?;
    let address = to_address(frame.stack.peek(0)?);

    if !evm.state.address_in_access_list(address) {
        evm.state.add_address_to_access_list(address);
        checked_add(gas, COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST)
    } else {
        Ok(gas)
    }
}

/// CREATE2: expansion plus 6 gas per word of init code hashed for the
/// address derivation.
pub fn gas_create2(_evm: &mut Evm<'_>, frame: &mut Frame, mem_size: u64) -> Result<u64, VmError> {
    let gas = memory_gas_cost(&frame.memory, mem_size)?;
    let words = to_word_size(u64_or_overflow(frame.stack.peek(2)?)?);
    checked_add(gas, checked_mul(words, KECCAK256_WORD_GAS)?)
}

/// CALL before Spurious Dragon: 9000 for a value transfer, 25000 when the
/// callee account does not exist yet, plus expansion and the forwarded gas.
pub fn gas_call_frontier(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    let address = to_address(frame.stack.peek(1)?);
    let value = frame.stack.peek(2)?;

    let mut gas = memory_gas_cost(&frame.memory, mem_size)?;
    if !value.is_zero() {
        gas = checked_add(gas, CALL_VALUE_TRANSFER_GAS)?;
    }
    if !evm.state.exists(address) {
        gas = checked_add(gas, CALL_NEW_ACCOUNT_GAS)?;
    }

    evm.call_gas_temp = call_gas(evm.fork, frame.gas, gas, frame.stack.peek(0)?)?;
    checked_add(gas, evm.call_gas_temp)
}

/// CALL from Spurious Dragon on (EIP-158): the new-account surcharge only
/// applies when value flows into an account that is dead.
pub fn gas_call_eip158(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    let address = to_address(frame.stack.peek(1)?);
    let value = frame.stack.peek(2)?;

    let mut gas = memory_gas_cost(&frame.memory, mem_size)?;
    if !value.is_zero() {
        gas = checked_add(gas, CALL_VALUE_TRANSFER_GAS)?;
        if evm.state.is_empty(address) {
            gas = checked_add(gas, CALL_NEW_ACCOUNT_GAS)?;
        }
    }

    evm.call_gas_temp = call_gas(evm.fork, frame.gas, gas, frame.stack.peek(0)?)?;
    checked_add(gas, evm.call_gas_temp)
}

/// CALLCODE: value stipend pricing without the new-account surcharge, since
/// the callee account is the caller itself.
pub fn gas_call_code(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    let value = frame.stack.peek(2)?;

    let mut gas = memory_gas_cost(&frame.memory, mem_size)?;
    if !value.is_zero() {
        gas = checked_add(gas, CALL_VALUE_TRANSFER_GAS)?;
    }

    evm.call_gas_temp = call_gas(evm.fork, frame.gas, gas, frame.stack.peek(0)?)?;
    checked_add(gas, evm.call_gas_temp)
}

/// DELEGATECALL and STATICCALL: expansion plus the forwarded gas.
pub fn gas_thin_call(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    let gas = memory_gas_cost(&frame.memory, mem_size)?;
    evm.call_gas_temp = call_gas(evm.fork, frame.gas, gas, frame.stack.peek(0)?)?;
    checked_add(gas, evm.call_gas_temp)
}

fn call_variant_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
    base: DynamicGasFn,
) -> Result<u64, VmError> {
    let address = to_address(frame.stack.peek(1)?);
    if evm.state.address_in_access_list(address) {
        return base(evm, frame, mem_size);
    }

    evm.state.add_address_to_access_list(address);
    let cold_cost = COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST;

    // Deduct the cold surcharge before the 63/64 computation sees the
    // remaining gas, then hand it back so the loop deducts the total once.
    if !frame.use_gas(cold_cost) {
        return Err(VmError::OutOfGas);
    }
    let gas = base(evm, frame, mem_size)?;
    frame.gas += cold_cost;
    checked_add(gas, cold_cost)
}

/// CALL under EIP-2929: cold-account surcharge on top of the EIP-158 rules.
pub fn gas_call_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    call_variant_eip2929(evm, frame, mem_size, gas_call_eip158)
}

/// CALLCODE under EIP-2929.
pub fn gas_call_code_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    call_variant_eip2929(evm, frame, mem_size, gas_call_code)
}

/// DELEGATECALL and STATICCALL under EIP-2929.
pub fn gas_thin_call_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    mem_size: u64,
) -> Result<u64, VmError> {
    call_variant_eip2929(evm, frame, mem_size, gas_thin_call)
}

fn selfdestruct_gas(
    evm: &mut Evm<'_>,
    frame: &Frame,
    eip158: bool,
    refund: bool,
) -> Result<u64, VmError> {
    let beneficiary = to_address(frame.stack.peek(0)?);

    let mut gas = SELFDESTRUCT_GAS_EIP150;
    if eip158 {
        if evm.state.is_empty(beneficiary) && !evm.state.balance(frame.contract.address).is_zero()
        {
            gas += CALL_NEW_ACCOUNT_GAS;
        }
    } else if !evm.state.exists(beneficiary) {
        gas += CALL_NEW_ACCOUNT_GAS;
    }

    if refund && !evm.state.has_self_destructed(frame.contract.address) {
        evm.state.add_refund(SELFDESTRUCT_REFUND_GAS);
    }
    Ok(gas)
}

/// SELFDESTRUCT at Frontier: free, refund only.
pub fn gas_selfdestruct_frontier(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    if !evm.state.has_self_destructed(frame.contract.address) {
        evm.state.add_refund(SELFDESTRUCT_REFUND_GAS);
    }
    Ok(0)
}

/// SELFDESTRUCT from Tangerine Whistle (EIP-150): 5000 plus 25000 when the
/// beneficiary does not exist.
pub fn gas_selfdestruct_eip150(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    selfdestruct_gas(evm, frame, false, true)
}

/// SELFDESTRUCT from Spurious Dragon (EIP-158): the new-account surcharge
/// only applies when the dying contract still has balance to move into a
/// dead beneficiary.
pub fn gas_selfdestruct_eip158(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    selfdestruct_gas(evm, frame, true, true)
}

fn selfdestruct_cold_surcharge(evm: &mut Evm<'_>, frame: &Frame) -> u64 {
    let beneficiary = to_address(match frame.stack.peek(0) {
        Ok(word) => word,
        Err(_) => return 0,
    });
    if !evm.state.address_in_access_list(beneficiary) {
        evm.state.add_address_to_access_list(beneficiary);
        COLD_ACCOUNT_ACCESS_COST
    } else {
        0
    }
}

/// SELFDESTRUCT under EIP-2929 (Berlin): cold-beneficiary surcharge on top
/// of the EIP-158 rules.
pub fn gas_selfdestruct_eip2929(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    let cold = selfdestruct_cold_surcharge(evm, frame);
    Ok(cold + selfdestruct_gas(evm, frame, true, true)?)
}

/// SELFDESTRUCT from London (EIP-3529): the Berlin pricing with the 24000
/// refund removed.
pub fn gas_selfdestruct_eip3529(
    evm: &mut Evm<'_>,
    frame: &mut Frame,
    _mem_size: u64,
) -> Result<u64, VmError> {
    let cold = selfdestruct_cold_surcharge(evm, frame);
    Ok(cold + selfdestruct_gas(evm, frame, true, false)?)
}
