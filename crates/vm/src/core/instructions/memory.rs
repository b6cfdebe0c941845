use alloy::primitives::U256;

use super::as_usize_saturated;
use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// MLOAD - Load a word from memory
pub fn mload(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = as_usize_saturated(frame.stack.pop()?);
    frame.stack.push(frame.memory.get_word(offset));
    Ok(Outcome::Continue)
}

/// MSTORE - Store a word to memory
pub fn mstore(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = as_usize_saturated(frame.stack.pop()?);
    let value = frame.stack.pop()?;
    frame.memory.set_word(offset, value);
    Ok(Outcome::Continue)
}

/// MSTORE8 - Store a single byte to memory
pub fn mstore8(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = as_usize_saturated(frame.stack.pop()?);
    let value = frame.stack.pop()?;
    frame.memory.set_byte(offset, value);
    Ok(Outcome::Continue)
}

/// MSIZE - Get the size of active memory in bytes
pub fn msize(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(frame.memory.len()));
    Ok(Outcome::Continue)
}
