use alloy::primitives::U256;

use super::{as_usize_saturated, to_address};
use crate::core::{
    error::VmError,
    evm::{CallResult, Evm},
    fork::Fork,
    gas::CALL_STIPEND,
    interpreter::Frame,
    table::Outcome,
};

// Write the sub-call result back into the frame: unused gas, the bounded
// return-data copy into memory, the return-data buffer and the success flag.
fn finish_call(frame: &mut Frame, result: CallResult, ret_offset: usize, ret_size: usize) {
    frame.gas += result.gas_left;

    let ok = result.error.is_none();
    if ok || result.error == Some(VmError::ExecutionReverted) {
        let n = result.return_data.len().min(ret_size);
        frame.memory.set(ret_offset, &result.return_data[..n]);
    }
    frame.return_data = result.return_data;
    frame.stack.push(if ok { U256::from(1u8) } else { U256::ZERO });
}

/// CALL - Message-call into an account
pub fn call(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    // the forwarded amount was resolved into call_gas_temp by the gas pass
    frame.stack.pop()?;
    let address = to_address(frame.stack.pop()?);
    let value = frame.stack.pop()?;
    let args_offset = as_usize_saturated(frame.stack.pop()?);
    let args_size = as_usize_saturated(frame.stack.pop()?);
    let ret_offset = as_usize_saturated(frame.stack.pop()?);
    let ret_size = as_usize_saturated(frame.stack.pop()?);

    if evm.is_read_only() && !value.is_zero() {
        return Err(VmError::WriteProtection);
    }

    let mut gas = evm.call_gas_temp;
    if !value.is_zero() {
        gas += CALL_STIPEND;
    }

    let args = frame.memory.get_copy(args_offset, args_size);
    let result = evm.call(frame.contract.address, address, args, gas, value);
    finish_call(frame, result, ret_offset, ret_size);
    Ok(Outcome::Continue)
}

/// CALLCODE - Message-call into this account with another account's code
pub fn callcode(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.pop()?;
    let address = to_address(frame.stack.pop()?);
    let value = frame.stack.pop()?;
    let args_offset = as_usize_saturated(frame.stack.pop()?);
    let args_size = as_usize_saturated(frame.stack.pop()?);
    let ret_offset = as_usize_saturated(frame.stack.pop()?);
    let ret_size = as_usize_saturated(frame.stack.pop()?);

    let mut gas = evm.call_gas_temp;
    if !value.is_zero() {
        gas += CALL_STIPEND;
    }

    let args = frame.memory.get_copy(args_offset, args_size);
    let result = evm.call_code(frame.contract.address, address, args, gas, value);
    finish_call(frame, result, ret_offset, ret_size);
    Ok(Outcome::Continue)
}

/// DELEGATECALL - Message-call into this account with another account's
/// code, keeping the parent's caller and value
pub fn delegatecall(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.pop()?;
    let address = to_address(frame.stack.pop()?);
    let args_offset = as_usize_saturated(frame.stack.pop()?);
    let args_size = as_usize_saturated(frame.stack.pop()?);
    let ret_offset = as_usize_saturated(frame.stack.pop()?);
    let ret_size = as_usize_saturated(frame.stack.pop()?);

    let gas = evm.call_gas_temp;
    let args = frame.memory.get_copy(args_offset, args_size);
    let result = evm.delegate_call(
        frame.contract.caller,
        frame.contract.address,
        address,
        frame.contract.value,
        args,
        gas,
    );
    finish_call(frame, result, ret_offset, ret_size);
    Ok(Outcome::Continue)
}

/// STATICCALL - Message-call into an account with state mutation forbidden
pub fn staticcall(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.pop()?;
    let address = to_address(frame.stack.pop()?);
    let args_offset = as_usize_saturated(frame.stack.pop()?);
    let args_size = as_usize_saturated(frame.stack.pop()?);
    let ret_offset = as_usize_saturated(frame.stack.pop()?);
    let ret_size = as_usize_saturated(frame.stack.pop()?);

    let gas = evm.call_gas_temp;
    let args = frame.memory.get_copy(args_offset, args_size);
    let result = evm.static_call(frame.contract.address, address, args, gas);
    finish_call(frame, result, ret_offset, ret_size);
    Ok(Outcome::Continue)
}

// All remaining gas is forwarded to the init frame, less one 64th from
// Tangerine Whistle on.
fn create_gas(evm: &Evm<'_>, frame: &mut Frame) -> u64 {
    let mut gas = frame.gas;
    if evm.fork.is_active(Fork::TangerineWhistle) {
        gas -= gas / 64;
    }
    frame.use_gas(gas);
    gas
}

/// CREATE - Create a new account with code from memory
pub fn create(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    if evm.is_read_only() {
        return Err(VmError::WriteProtection);
    }

    let value = frame.stack.pop()?;
    let offset = as_usize_saturated(frame.stack.pop()?);
    let size = as_usize_saturated(frame.stack.pop()?);

    let init_code = frame.memory.get_copy(offset, size);
    let gas = create_gas(evm, frame);
    let result = evm.create(frame.contract.address, init_code, gas, value);

    frame.gas += result.gas_left;
    if result.error.is_none() {
        frame.stack.push(super::address_to_word(result.address));
    } else {
        frame.stack.push(U256::ZERO);
    }
    // only REVERT hands data back to the creator
    if result.error == Some(VmError::ExecutionReverted) {
        frame.return_data = result.return_data;
    } else {
        frame.return_data.clear();
    }
    Ok(Outcome::Continue)
}

/// CREATE2 - Create a new account at an address derived from the init code
/// and a salt
pub fn create2(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    if evm.is_read_only() {
        return Err(VmError::WriteProtection);
    }

    let value = frame.stack.pop()?;
    let offset = as_usize_saturated(frame.stack.pop()?);
    let size = as_usize_saturated(frame.stack.pop()?);
    let salt = frame.stack.pop()?;

    let init_code = frame.memory.get_copy(offset, size);
    let gas = create_gas(evm, frame);
    let result = evm.create2(frame.contract.address, init_code, gas, value, salt);

    frame.gas += result.gas_left;
    if result.error.is_none() {
        frame.stack.push(super::address_to_word(result.address));
    } else {
        frame.stack.push(U256::ZERO);
    }
    if result.error == Some(VmError::ExecutionReverted) {
        frame.return_data = result.return_data;
    } else {
        frame.return_data.clear();
    }
    Ok(Outcome::Continue)
}

/// RETURN - Halt execution returning data from memory
pub fn ret(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = as_usize_saturated(frame.stack.pop()?);
    let size = as_usize_saturated(frame.stack.pop()?);
    Ok(Outcome::Return(frame.memory.get_copy(offset, size)))
}

/// REVERT - Halt execution reverting state changes, returning data and the
/// remaining gas
pub fn revert(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = as_usize_saturated(frame.stack.pop()?);
    let size = as_usize_saturated(frame.stack.pop()?);
    Ok(Outcome::Revert(frame.memory.get_copy(offset, size)))
}

/// SELFDESTRUCT - Halt execution, moving the account's balance to the
/// beneficiary and scheduling the account for destruction
pub fn selfdestruct(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    if evm.is_read_only() {
        return Err(VmError::WriteProtection);
    }

    let beneficiary = to_address(frame.stack.pop()?);
    let balance = evm.state.balance(frame.contract.address);
    evm.state.add_balance(beneficiary, balance);
    evm.state.self_destruct(frame.contract.address);
    Ok(Outcome::Stop)
}
