use alloy::primitives::{I256, U256};

use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// AND - Bitwise AND operation
pub fn and(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a & b);
    Ok(Outcome::Continue)
}

/// OR - Bitwise OR operation
pub fn or(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a | b);
    Ok(Outcome::Continue)
}

/// XOR - Bitwise XOR operation
pub fn xor(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a ^ b);
    Ok(Outcome::Continue)
}

/// NOT - Bitwise NOT operation
pub fn not(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    frame.stack.push(!a);
    Ok(Outcome::Continue)
}

/// BYTE - Retrieve the ith byte of a word, counting from the most
/// significant
pub fn byte(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let i = frame.stack.pop()?;
    let x = frame.stack.pop()?;

    let result = if i < U256::from(32u8) {
        let index = usize::try_from(i).unwrap_or_default();
        U256::from(x.byte(31 - index))
    } else {
        U256::ZERO
    };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}

/// SHL - Shift left; shifts of 256 or more yield zero
pub fn shl(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let shift = frame.stack.pop()?;
    let value = frame.stack.pop()?;

    let result = if shift < U256::from(256u16) {
        value << usize::try_from(shift).unwrap_or_default()
    } else {
        U256::ZERO
    };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}

/// SHR - Logical shift right; shifts of 256 or more yield zero
pub fn shr(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let shift = frame.stack.pop()?;
    let value = frame.stack.pop()?;

    let result = if shift < U256::from(256u16) {
        value >> usize::try_from(shift).unwrap_or_default()
    } else {
        U256::ZERO
    };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}

/// SAR - Arithmetic shift right; saturates to zero or all-ones for shifts of
/// 256 or more
pub fn sar(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let shift = frame.stack.pop()?;
    let value = I256::from_raw(frame.stack.pop()?);

    let result = if shift < U256::from(256u16) {
        value.asr(usize::try_from(shift).unwrap_or_default())
    } else if value.is_negative() {
        I256::MINUS_ONE
    } else {
        I256::ZERO
    };
    frame.stack.push(result.into_raw());
    Ok(Outcome::Continue)
}
