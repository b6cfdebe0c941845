use alloy::primitives::U256;

use super::{address_to_word, as_usize_saturated, get_data, to_address};
use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// ADDRESS - Get the address of the executing account
pub fn address(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(address_to_word(frame.contract.address));
    Ok(Outcome::Continue)
}

/// BALANCE - Get the balance of an account
pub fn balance(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let account = to_address(frame.stack.pop()?);
    frame.stack.push(evm.state.balance(account));
    Ok(Outcome::Continue)
}

/// ORIGIN - Get the transaction origination address
pub fn origin(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(address_to_word(evm.tx.origin));
    Ok(Outcome::Continue)
}

/// CALLER - Get the caller address
pub fn caller(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(address_to_word(frame.contract.caller));
    Ok(Outcome::Continue)
}

/// CALLVALUE - Get the deposited value of this call
pub fn callvalue(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(frame.contract.value);
    Ok(Outcome::Continue)
}

/// CALLDATALOAD - Load a word of input data
pub fn calldataload(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = frame.stack.pop()?;
    let word = get_data(&frame.contract.input, offset, 32);
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&word);
    frame.stack.push(U256::from_be_bytes(buf));
    Ok(Outcome::Continue)
}

/// CALLDATASIZE - Get the size of the input data
pub fn calldatasize(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(frame.contract.input.len()));
    Ok(Outcome::Continue)
}

/// CALLDATACOPY - Copy input data to memory
pub fn calldatacopy(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let mem_offset = as_usize_saturated(frame.stack.pop()?);
    let data_offset = frame.stack.pop()?;
    let size = as_usize_saturated(frame.stack.pop()?);

    let data = get_data(&frame.contract.input, data_offset, size);
    frame.memory.set(mem_offset, &data);
    Ok(Outcome::Continue)
}

/// CODESIZE - Get the size of the executing code
pub fn codesize(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(frame.contract.code.len()));
    Ok(Outcome::Continue)
}

/// CODECOPY - Copy executing code to memory
pub fn codecopy(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let mem_offset = as_usize_saturated(frame.stack.pop()?);
    let code_offset = frame.stack.pop()?;
    let size = as_usize_saturated(frame.stack.pop()?);

    let data = get_data(&frame.contract.code, code_offset, size);
    frame.memory.set(mem_offset, &data);
    Ok(Outcome::Continue)
}

/// GASPRICE - Get the gas price of the transaction
pub fn gasprice(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(evm.tx.gas_price);
    Ok(Outcome::Continue)
}

/// EXTCODESIZE - Get the code size of an account
pub fn extcodesize(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let account = to_address(frame.stack.pop()?);
    frame.stack.push(U256::from(evm.state.code_size(account)));
    Ok(Outcome::Continue)
}

/// EXTCODECOPY - Copy an account's code to memory
pub fn extcodecopy(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let account = to_address(frame.stack.pop()?);
    let mem_offset = as_usize_saturated(frame.stack.pop()?);
    let code_offset = frame.stack.pop()?;
    let size = as_usize_saturated(frame.stack.pop()?);

    let data = get_data(&evm.state.code(account), code_offset, size);
    frame.memory.set(mem_offset, &data);
    Ok(Outcome::Continue)
}

/// RETURNDATASIZE - Get the size of the last sub-call's return data
pub fn returndatasize(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(frame.return_data.len()));
    Ok(Outcome::Continue)
}

/// RETURNDATACOPY - Copy the last sub-call's return data to memory; faults
/// on out-of-range reads
pub fn returndatacopy(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let mem_offset = as_usize_saturated(frame.stack.pop()?);
    let data_offset = frame.stack.pop()?;
    let size = frame.stack.pop()?;

    let data_offset = u64::try_from(data_offset).map_err(|_| VmError::ReturnDataOutOfBounds)?;
    let size = u64::try_from(size).map_err(|_| VmError::ReturnDataOutOfBounds)?;
    let end = data_offset.checked_add(size).ok_or(VmError::ReturnDataOutOfBounds)?;
    if end > frame.return_data.len() as u64 {
        return Err(VmError::ReturnDataOutOfBounds);
    }

    let data = frame.return_data[data_offset as usize..end as usize].to_vec();
    frame.memory.set(mem_offset, &data);
    Ok(Outcome::Continue)
}

/// EXTCODEHASH - Get the code hash of an account, or zero for empty accounts
pub fn extcodehash(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let account = to_address(frame.stack.pop()?);
    frame.stack.push(U256::from_be_bytes(evm.state.code_hash(account).0));
    Ok(Outcome::Continue)
}

/// SELFBALANCE - Get the balance of the executing account
pub fn selfbalance(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(evm.state.balance(frame.contract.address));
    Ok(Outcome::Continue)
}
