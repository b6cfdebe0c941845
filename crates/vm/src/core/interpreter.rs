use super::{contract::Contract, error::VmError, evm::Evm, gas, memory::Memory, stack::Stack};

#[cfg(feature = "step-tracing")]
use super::opcodes;
#[cfg(feature = "step-tracing")]
use tracing::trace;

use super::table::Outcome;

/// The [`Frame`] struct is the mutable execution state of one call: stack,
/// memory, program counter, remaining gas and the return-data buffer of the
/// most recent sub-call. It is owned by exactly one interpreter run at a
/// time; nothing here is shared.
#[derive(Clone, Debug)]
pub struct Frame {
    /// The code view of this call.
    pub contract: Contract,

    /// The operand stack.
    pub stack: Stack,

    /// The frame memory.
    pub memory: Memory,

    /// The program counter.
    pub pc: u64,

    /// The gas remaining for execution.
    pub gas: u64,

    /// The return data of the most recent sub-call.
    pub return_data: Vec<u8>,
}

impl Frame {
    /// Creates a new [`Frame`] over `contract` with `gas` to spend.
    pub fn new(contract: Contract, gas: u64) -> Frame {
        Frame {
            contract,
            stack: Stack::new(),
            memory: Memory::new(),
            pc: 0,
            gas,
            return_data: Vec::new(),
        }
    }

    /// Deduct `amount` gas, reporting whether the frame could afford it.
    #[inline]
    pub fn use_gas(&mut self, amount: u64) -> bool {
        if self.gas < amount {
            return false;
        }
        self.gas -= amount;
        true
    }
}

/// The terminal state of a frame run: the returned bytes, and the error that
/// halted it, if any. Remaining gas stays on the frame; the machine decides
/// at the call boundary whether the caller gets it back.
#[derive(Clone, Debug)]
pub struct FrameResult {
    /// Bytes returned by RETURN or REVERT; empty for STOP and faults.
    pub output: Vec<u8>,

    /// `None` for a normal halt, [`VmError::ExecutionReverted`] for REVERT,
    /// any other variant for a fault.
    pub error: Option<VmError>,
}

impl FrameResult {
    fn halted(output: Vec<u8>) -> FrameResult {
        FrameResult { output, error: None }
    }

    fn failed(error: VmError) -> FrameResult {
        FrameResult { output: Vec::new(), error: Some(error) }
    }
}

/// Run `frame` to completion against the machine's jump table.
///
/// Per instruction: fetch the record, check the stack thresholds, compute
/// the required memory size, deduct constant then dynamic gas, grow memory,
/// execute, and advance the program counter unless the opcode jumped or
/// halted. Running past the end of the code halts like STOP.
pub fn run(evm: &mut Evm<'_>, frame: &mut Frame) -> FrameResult {
    loop {
        let opcode =
            frame.contract.code.get(frame.pc as usize).copied().unwrap_or(super::opcodes::STOP);
        let op = evm.operation(opcode);

        let depth = frame.stack.len();
        if depth < op.min_stack {
            return FrameResult::failed(VmError::StackUnderflow);
        }
        if depth > op.max_stack {
            return FrameResult::failed(VmError::StackOverflow);
        }

        #[cfg(feature = "step-tracing")]
        trace!(
            pc = frame.pc,
            opcode = opcodes::opcode_name(opcode),
            gas = frame.gas,
            stack = depth,
            "executing opcode"
        );

        // the raw size is word-rounded before charging, and both steps can
        // overflow independently
        let mut mem_size = 0u64;
        if let Some(memory_size) = op.memory_size {
            let (size, overflow) = memory_size(&frame.stack);
            if overflow {
                return FrameResult::failed(VmError::GasUintOverflow);
            }
            match gas::to_word_size(size).checked_mul(32) {
                Some(size) => mem_size = size,
                None => return FrameResult::failed(VmError::GasUintOverflow),
            }
        }

        if !frame.use_gas(op.constant_gas) {
            return FrameResult::failed(VmError::OutOfGas);
        }
        if let Some(dynamic_gas) = op.dynamic_gas {
            let cost = match dynamic_gas(evm, frame, mem_size) {
                Ok(cost) => cost,
                Err(error) => return FrameResult::failed(error),
            };
            if !frame.use_gas(cost) {
                return FrameResult::failed(VmError::OutOfGas);
            }
        }
        if mem_size > 0 {
            frame.memory.resize(mem_size);
        }

        match (op.execute)(evm, frame) {
            Ok(Outcome::Continue) => frame.pc += 1,
            Ok(Outcome::Jump(dest)) => frame.pc = dest,
            Ok(Outcome::Stop) => return FrameResult::halted(Vec::new()),
            Ok(Outcome::Return(output)) => return FrameResult::halted(output),
            Ok(Outcome::Revert(output)) => {
                return FrameResult { output, error: Some(VmError::ExecutionReverted) }
            }
            Err(error) => return FrameResult::failed(error),
        }
    }
}
