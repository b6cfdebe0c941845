/// JUMPDEST analysis of code blobs
pub mod analysis;

/// Block and transaction environment values
pub mod context;

/// The per-frame code view
pub mod contract;

/// Frame-fatal execution errors
pub mod error;

/// The machine: call/create semantics over a state database
pub mod evm;

/// Hard fork identifiers
pub mod fork;

/// Gas constants, pricing math and the dynamic cost functions
pub mod gas;

/// Opcode execute functions
pub mod instructions;

/// The dispatch loop and call frames
pub mod interpreter;

/// Frame memory
pub mod memory;

/// Opcode bytes and names
pub mod opcodes;

/// The operand stack
pub mod stack;

/// The state-database interface and an in-memory implementation
pub mod state;

/// Operation records and the per-fork jump tables
pub mod table;
