use super::as_usize_saturated;
use crate::core::{error::VmError, evm::Evm, interpreter::Frame, opcodes, state::Log, table::Outcome};

/// LOG0-LOG4 - Append an event record with N topics
pub fn log_n(evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    if evm.is_read_only() {
        return Err(VmError::WriteProtection);
    }

    let opcode = frame.contract.code[frame.pc as usize];
    let topic_count = (opcode - opcodes::LOG0) as usize;

    let offset = as_usize_saturated(frame.stack.pop()?);
    let size = as_usize_saturated(frame.stack.pop()?);
    let mut topics = Vec::with_capacity(topic_count);
    for _ in 0..topic_count {
        topics.push(frame.stack.pop()?);
    }

    let data = frame.memory.get_copy(offset, size);
    evm.state.add_log(Log { address: frame.contract.address, topics, data });
    Ok(Outcome::Continue)
}
