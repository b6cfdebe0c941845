use alloy::primitives::U256;

use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// STOP - Halt execution
pub fn stop(_evm: &mut Evm<'_>, _frame: &mut Frame) -> Result<Outcome, VmError> {
    Ok(Outcome::Stop)
}

/// JUMP - Unconditionally alter the program counter; the target must be a
/// JUMPDEST outside PUSH data
pub fn jump(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let dest = frame.stack.pop()?;
    if !frame.contract.valid_jumpdest(dest) {
        return Err(VmError::InvalidJump);
    }
    Ok(Outcome::Jump(u64::try_from(dest).map_err(|_| VmError::InvalidJump)?))
}

/// JUMPI - Conditionally alter the program counter
pub fn jumpi(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let dest = frame.stack.pop()?;
    let condition = frame.stack.pop()?;

    if condition.is_zero() {
        return Ok(Outcome::Continue);
    }
    if !frame.contract.valid_jumpdest(dest) {
        return Err(VmError::InvalidJump);
    }
    Ok(Outcome::Jump(u64::try_from(dest).map_err(|_| VmError::InvalidJump)?))
}

/// JUMPDEST - Mark a valid jump destination (no-op)
pub fn jumpdest(_evm: &mut Evm<'_>, _frame: &mut Frame) -> Result<Outcome, VmError> {
    Ok(Outcome::Continue)
}

/// PC - Get the program counter of this instruction
pub fn pc(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(frame.pc));
    Ok(Outcome::Continue)
}

/// GAS - Get the gas remaining after paying for this instruction
pub fn gas(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(frame.gas));
    Ok(Outcome::Continue)
}
