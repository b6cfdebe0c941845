use alloy::primitives::{I256, U256};

use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// ADD - Addition operation
pub fn add(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a.wrapping_add(b));
    Ok(Outcome::Continue)
}

/// MUL - Multiplication operation
pub fn mul(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a.wrapping_mul(b));
    Ok(Outcome::Continue)
}

/// SUB - Subtraction operation
pub fn sub(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a.wrapping_sub(b));
    Ok(Outcome::Continue)
}

/// DIV - Integer division operation; division by zero yields zero
pub fn div(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let numerator = frame.stack.pop()?;
    let denominator = frame.stack.pop()?;
    frame.stack.push(numerator.checked_div(denominator).unwrap_or_default());
    Ok(Outcome::Continue)
}

/// SDIV - Signed integer division operation (two's complement)
pub fn sdiv(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let numerator = I256::from_raw(frame.stack.pop()?);
    let denominator = I256::from_raw(frame.stack.pop()?);
    let result = if denominator.is_zero() {
        I256::ZERO
    } else {
        // MIN / -1 wraps back to MIN
        numerator.wrapping_div(denominator)
    };
    frame.stack.push(result.into_raw());
    Ok(Outcome::Continue)
}

/// MOD - Modulo remainder operation; modulo zero yields zero
pub fn modulo(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let modulus = frame.stack.pop()?;
    frame.stack.push(a.checked_rem(modulus).unwrap_or_default());
    Ok(Outcome::Continue)
}

/// SMOD - Signed modulo remainder operation
pub fn smod(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = I256::from_raw(frame.stack.pop()?);
    let modulus = I256::from_raw(frame.stack.pop()?);
    let result = if modulus.is_zero() { I256::ZERO } else { a.wrapping_rem(modulus) };
    frame.stack.push(result.into_raw());
    Ok(Outcome::Continue)
}

/// ADDMOD - Unsigned addition modulo n, intermediate not truncated to 256 bits
pub fn addmod(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let modulus = frame.stack.pop()?;
    let result = if modulus.is_zero() { U256::ZERO } else { a.add_mod(b, modulus) };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}

/// MULMOD - Unsigned multiplication modulo n, intermediate not truncated
pub fn mulmod(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let modulus = frame.stack.pop()?;
    let result = if modulus.is_zero() { U256::ZERO } else { a.mul_mod(b, modulus) };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}

/// EXP - Exponentiation modulo 2^256
pub fn exp(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let base = frame.stack.pop()?;
    let exponent = frame.stack.pop()?;
    frame.stack.push(base.overflowing_pow(exponent).0);
    Ok(Outcome::Continue)
}

/// SIGNEXTEND - Extend the sign of a (b+1)-byte two's complement number to
/// the full word
pub fn signextend(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let back = frame.stack.pop()?;
    let num = frame.stack.pop()?;

    let result = if back < U256::from(31u8) {
        let bit = usize::try_from(back).unwrap_or_default() * 8 + 7;
        if num.bit(bit) {
            num | (U256::MAX << (bit + 1))
        } else {
            num & ((U256::from(1u8) << (bit + 1)) - U256::from(1u8))
        }
    } else {
        num
    };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}
