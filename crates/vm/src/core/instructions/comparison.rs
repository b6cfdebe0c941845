use alloy::primitives::{I256, U256};

use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

#[inline]
fn push_bool(frame: &mut Frame, condition: bool) {
    frame.stack.push(if condition { U256::from(1u8) } else { U256::ZERO });
}

/// LT - Unsigned less-than comparison
pub fn lt(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    push_bool(frame, a < b);
    Ok(Outcome::Continue)
}

/// GT - Unsigned greater-than comparison
pub fn gt(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    push_bool(frame, a > b);
    Ok(Outcome::Continue)
}

/// SLT - Signed less-than comparison
pub fn slt(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = I256::from_raw(frame.stack.pop()?);
    let b = I256::from_raw(frame.stack.pop()?);
    push_bool(frame, a < b);
    Ok(Outcome::Continue)
}

/// SGT - Signed greater-than comparison
pub fn sgt(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = I256::from_raw(frame.stack.pop()?);
    let b = I256::from_raw(frame.stack.pop()?);
    push_bool(frame, a > b);
    Ok(Outcome::Continue)
}

/// EQ - Equality comparison
pub fn eq(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    push_bool(frame, a == b);
    Ok(Outcome::Continue)
}

/// ISZERO - Zero test
pub fn iszero(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    push_bool(frame, a.is_zero());
    Ok(Outcome::Continue)
}
