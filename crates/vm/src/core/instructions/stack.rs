use alloy::primitives::U256;

use crate::core::{error::VmError, evm::Evm, interpreter::Frame, opcodes, table::Outcome};

/// POP - Remove the top stack item
pub fn pop(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    frame.stack.pop()?;
    Ok(Outcome::Continue)
}

/// PUSH1-PUSH32 - Push the N bytes following the opcode, left-padded to a
/// word; bytes past the end of the code read as zero
pub fn push_n(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let code = &frame.contract.code;
    let opcode = code[frame.pc as usize];
    let n = (opcode - opcodes::PUSH1 + 1) as usize;

    let start = (frame.pc as usize + 1).min(code.len());
    let end = (start + n).min(code.len());

    let mut word = [0u8; 32];
    word[32 - n..32 - n + (end - start)].copy_from_slice(&code[start..end]);
    frame.stack.push(U256::from_be_bytes(word));

    // skip the data bytes; the loop advances past the opcode itself
    frame.pc += n as u64;
    Ok(Outcome::Continue)
}

/// DUP1-DUP16 - Duplicate the Nth stack item
pub fn dup_n(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let opcode = frame.contract.code[frame.pc as usize];
    let n = (opcode - opcodes::DUP1 + 1) as usize;
    frame.stack.dup(n)?;
    Ok(Outcome::Continue)
}

/// SWAP1-SWAP16 - Exchange the top and the (N+1)th stack items
pub fn swap_n(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let opcode = frame.contract.code[frame.pc as usize];
    let n = (opcode - opcodes::SWAP1 + 1) as usize;
    frame.stack.swap(n)?;
    Ok(Outcome::Continue)
}
