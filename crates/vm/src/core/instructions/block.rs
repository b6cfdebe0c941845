use alloy::primitives::U256;

use super::address_to_word;
use crate::core::{error::VmError, evm::Evm, interpreter::Frame, table::Outcome};

/// BLOCKHASH - Get the hash of one of the 256 most recent blocks, or zero
/// outside that window
pub fn blockhash(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let requested = frame.stack.pop()?;

    let upper = evm.block.number;
    let lower = upper.saturating_sub(256);
    let result = match u64::try_from(requested) {
        Ok(number) if number >= lower && number < upper => {
            U256::from_be_bytes((evm.block.block_hash)(number).0)
        }
        _ => U256::ZERO,
    };
    frame.stack.push(result);
    Ok(Outcome::Continue)
}

/// COINBASE - Get the block's beneficiary address
pub fn coinbase(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(address_to_word(evm.block.coinbase));
    Ok(Outcome::Continue)
}

/// TIMESTAMP - Get the block's timestamp
pub fn timestamp(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(evm.block.timestamp));
    Ok(Outcome::Continue)
}

/// NUMBER - Get the block's number
pub fn number(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(evm.block.number));
    Ok(Outcome::Continue)
}

/// DIFFICULTY - Get the block's difficulty
pub fn difficulty(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(evm.block.difficulty);
    Ok(Outcome::Continue)
}

/// GASLIMIT - Get the block's gas limit
pub fn gaslimit(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(evm.block.gas_limit));
    Ok(Outcome::Continue)
}

/// CHAINID - Get the chain id
pub fn chainid(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(U256::from(evm.block.chain_id));
    Ok(Outcome::Continue)
}

/// BASEFEE - Get the block's base fee
pub fn basefee(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.push(evm.block.base_fee);
    Ok(Outcome::Continue)
}
