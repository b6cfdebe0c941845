use alloy::primitives::{keccak256 as keccak, U256};

use super::as_usize_saturated;
use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// KECCAK256 - Hash a memory slice
pub fn keccak256(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let offset = as_usize_saturated(frame.stack.pop()?);
    let size = as_usize_saturated(frame.stack.pop()?);

    let data = frame.memory.get_copy(offset, size);
    frame.stack.push(U256::from_be_bytes(keccak(&data).0));
    Ok(Outcome::Continue)
}
