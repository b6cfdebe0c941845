use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// SLOAD - Load a word from storage
pub fn sload(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let key = frame.stack.pop()?;
    frame.stack.push(evm.state.storage(frame.contract.address, key));
    Ok(Outcome::Continue)
}

/// SSTORE - Store a word to storage
pub fn sstore(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    if evm.is_read_only() {
        return Err(VmError::WriteProtection);
    }
    let key = frame.stack.pop()?;
    let value = frame.stack.pop()?;
    evm.state.set_storage(frame.contract.address, key, value);
    Ok(Outcome::Continue)
}
