//! embervm - a hard-forkable EVM instruction dispatch and gas-metering
//! engine.
//!
//! The heart of the crate is the per-fork jump table: 256 operation records,
//! each declaring an execute function, constant gas, an optional dynamic-gas
//! function, an optional memory-size function and the stack thresholds the
//! dispatch loop checks before executing. Nine fork tables (Frontier through
//! London) are derived by layering per-EIP patches, validated at process
//! start, and shared immutably by every machine.

/// Core engine: opcodes, the fork tables, gas metering, the interpreter
/// loop, and the machine realizing the call/create semantics.
pub mod core;
