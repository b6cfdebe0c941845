//! The per-fork instruction tables.
//!
//! A [`JumpTable`] maps every one of the 256 opcode bytes to an immutable
//! [`Operation`] record: the execute function, the constant gas, the optional
//! dynamic-gas and memory-size functions, and the stack thresholds the
//! dispatch loop checks before executing. Unassigned bytes hold a shared
//! "undefined" record whose execute function fails with
//! [`VmError::InvalidOpcode`], so the fault surfaces through execution rather
//! than a spurious stack check.

pub mod forks;
pub mod memory;

use super::{error::VmError, evm::Evm, fork::Fork, interpreter::Frame, stack::Stack};

pub use forks::Patch;

/// Executes one opcode against the machine and the current frame.
pub type ExecuteFn = fn(&mut Evm<'_>, &mut Frame) -> Result<Outcome, VmError>;

/// Computes the dynamic gas of one opcode. `mem_size` is the word-rounded
/// byte size the operation requires, already validated against u64 overflow.
pub type DynamicGasFn = fn(&mut Evm<'_>, &mut Frame, u64) -> Result<u64, VmError>;

/// Computes the memory size in bytes an operation touches, from its stack
/// operands. The second element flags 64-bit overflow, which the dispatch
/// loop converts to [`VmError::GasUintOverflow`].
pub type MemorySizeFn = fn(&Stack) -> (u64, bool);

/// How an executed opcode directs the dispatch loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Advance the program counter past this instruction.
    Continue,
    /// Set the program counter to the given position.
    Jump(u64),
    /// Halt the frame with no return data (STOP, SELFDESTRUCT).
    Stop,
    /// Halt the frame returning data.
    Return(Vec<u8>),
    /// Halt the frame, revert its state changes and return data, leaving the
    /// remaining gas to the caller.
    Revert(Vec<u8>),
}

/// The hard stack depth limit shared by every threshold below.
pub const STACK_LIMIT: usize = super::stack::STACK_LIMIT;

/// Minimum stack depth required by an operation popping `pops` items.
#[inline]
pub const fn min_stack(pops: usize, _pushes: usize) -> usize {
    pops
}

/// Maximum stack depth tolerated before an operation popping `pops` and
/// pushing `pushes` items, such that the depth after cannot exceed the limit.
#[inline]
pub const fn max_stack(pops: usize, pushes: usize) -> usize {
    STACK_LIMIT + pops - pushes
}

/// Minimum stack depth for DUP-n.
#[inline]
pub const fn min_dup_stack(n: usize) -> usize {
    min_stack(n, n + 1)
}

/// Maximum stack depth for DUP-n.
#[inline]
pub const fn max_dup_stack(n: usize) -> usize {
    max_stack(n, n + 1)
}

/// Minimum stack depth for SWAP-n, which touches n + 1 items.
#[inline]
pub const fn min_swap_stack(n: usize) -> usize {
    min_stack(n + 1, n + 1)
}

/// Maximum stack depth for SWAP-n.
#[inline]
pub const fn max_swap_stack(n: usize) -> usize {
    max_stack(n + 1, n + 1)
}

/// The immutable per-opcode record consumed by the dispatch loop.
///
/// `memory_size` present implies `dynamic_gas` present: the loop feeds the
/// computed size straight into the dynamic-gas function, and the validator
/// rejects tables that would leave that path dangling.
#[derive(Clone, Copy, Debug)]
pub struct Operation {
    /// Realizes the opcode's semantics.
    pub execute: ExecuteFn,
    /// Base gas charged unconditionally; zero means no constant component.
    pub constant_gas: u64,
    /// The variable part of the cost, absent for statically-priced opcodes.
    pub dynamic_gas: Option<DynamicGasFn>,
    /// The memory range the opcode touches, absent when it cannot grow
    /// memory.
    pub memory_size: Option<MemorySizeFn>,
    /// Minimum stack depth before execution.
    pub min_stack: usize,
    /// Maximum stack depth before execution.
    pub max_stack: usize,
}

impl Operation {
    /// A statically-priced operation popping `pops` and pushing `pushes`.
    pub const fn new(execute: ExecuteFn, constant_gas: u64, pops: usize, pushes: usize) -> Self {
        Operation {
            execute,
            constant_gas,
            dynamic_gas: None,
            memory_size: None,
            min_stack: min_stack(pops, pushes),
            max_stack: max_stack(pops, pushes),
        }
    }

    /// Attach a dynamic-gas function.
    pub const fn with_dynamic_gas(mut self, dynamic_gas: DynamicGasFn) -> Self {
        self.dynamic_gas = Some(dynamic_gas);
        self
    }

    /// Attach a memory-size function.
    pub const fn with_memory_size(mut self, memory_size: MemorySizeFn) -> Self {
        self.memory_size = Some(memory_size);
        self
    }

    /// Override the stack thresholds (DUP/SWAP).
    pub const fn with_stack(mut self, min: usize, max: usize) -> Self {
        self.min_stack = min;
        self.max_stack = max;
        self
    }

    /// Returns true if this slot holds the shared undefined record.
    pub fn is_undefined(&self) -> bool {
        self.execute as usize == undefined as usize
    }
}

/// Execute function of the shared undefined record: always faults with the
/// opcode byte that reached it.
pub fn undefined(_evm: &mut Evm<'_>, frame: &mut Frame) -> Result<Outcome, VmError> {
    let opcode = frame.contract.code.get(frame.pc as usize).copied().unwrap_or_default();
    Err(VmError::InvalidOpcode(opcode))
}

/// The single record installed at every unassigned slot.
pub const UNDEFINED: Operation = Operation::new(undefined, 0, 0, 0);

/// A 256-entry instruction table for one hard fork.
///
/// Built once at process start and shared read-only by every machine
/// selecting that fork; see [`JumpTable::for_fork`].
#[derive(Clone)]
pub struct JumpTable(pub(crate) Box<[Operation; 256]>);

impl JumpTable {
    /// A table with every slot undefined.
    pub fn new_undefined() -> JumpTable {
        JumpTable(Box::new([UNDEFINED; 256]))
    }

    /// The operation record for an opcode byte.
    #[inline]
    pub fn get(&self, opcode: u8) -> &Operation {
        &self.0[opcode as usize]
    }

    /// Install a record at an opcode byte.
    pub fn set(&mut self, opcode: u8, operation: Operation) {
        self.0[opcode as usize] = operation;
    }

    /// The shared table for a fork.
    pub fn for_fork(fork: Fork) -> &'static JumpTable {
        forks::table_for(fork)
    }

    /// Assert the table invariants, panicking on violation.
    ///
    /// Runs once per table at process start: a malformed table is a
    /// consensus bug, and a loud init-time crash beats silent misbehavior on
    /// live chains.
    pub fn validate(&self) -> &JumpTable {
        for (opcode, op) in self.0.iter().enumerate() {
            assert!(
                op.memory_size.is_none() || op.dynamic_gas.is_some(),
                "opcode 0x{opcode:02x}: memory size function without dynamic gas function",
            );
            assert!(
                op.min_stack <= op.max_stack && op.max_stack <= STACK_LIMIT,
                "opcode 0x{opcode:02x}: invalid stack thresholds {}..{}",
                op.min_stack,
                op.max_stack,
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_thresholds() {
        // a binary operation: pops 2, pushes 1
        assert_eq!(min_stack(2, 1), 2);
        assert_eq!(max_stack(2, 1), 1025);
        // a pure producer may not run on a full stack
        assert_eq!(max_stack(0, 1), 1023);
        // DUP1 needs one item and one free slot
        assert_eq!(min_dup_stack(1), 1);
        assert_eq!(max_dup_stack(1), 1023);
        // SWAP16 touches 17 items and frees none
        assert_eq!(min_swap_stack(16), 17);
        assert_eq!(max_swap_stack(16), 1024);
    }

    #[test]
    fn test_undefined_record_thresholds() {
        // the fault must surface via execute, not a spurious stack check
        assert_eq!(UNDEFINED.min_stack, 0);
        assert_eq!(UNDEFINED.max_stack, STACK_LIMIT);
        assert_eq!(UNDEFINED.constant_gas, 0);
        assert!(UNDEFINED.is_undefined());
    }

    #[test]
    #[should_panic(expected = "memory size function without dynamic gas function")]
    fn test_validate_rejects_uncoupled_memory_size() {
        let mut table = JumpTable::new_undefined();
        let mut op = Operation::new(undefined, 3, 2, 0);
        op.memory_size = Some(memory::memory_mstore);
        table.set(0x52, op);
        table.validate();
    }

    #[test]
    #[should_panic(expected = "invalid stack thresholds")]
    fn test_validate_rejects_inverted_thresholds() {
        let mut table = JumpTable::new_undefined();
        let op = Operation::new(undefined, 0, 0, 0).with_stack(5, 2);
        table.set(0x01, op);
        table.validate();
    }
}
