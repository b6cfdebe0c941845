/// Errors raised while executing a call frame.
///
/// Every variant is fatal to the current frame, never to the process. The
/// interpreter catches these at the frame boundary: [`VmError::ExecutionReverted`]
/// leaves the frame's remaining gas to the caller, every other variant
/// consumes it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// A gas deduction would underflow the remaining gas.
    #[error("out of gas")]
    OutOfGas,
    /// The stack holds fewer items than the operation pops.
    #[error("stack underflow")]
    StackUnderflow,
    /// Executing the operation would push the stack beyond 1024 items.
    #[error("stack overflow")]
    StackOverflow,
    /// A 64-bit gas computation overflowed.
    #[error("gas uint64 overflow")]
    GasUintOverflow,
    /// An undefined opcode was executed.
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),
    /// A JUMP/JUMPI target is not a JUMPDEST in the current code.
    #[error("invalid jump destination")]
    InvalidJump,
    /// A state mutation was attempted inside a STATICCALL frame.
    #[error("write protection")]
    WriteProtection,
    /// A RETURNDATACOPY range exceeds the return buffer.
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,
    /// A created contract's code exceeds the EIP-170 limit.
    #[error("max code size exceeded")]
    MaxCodeSizeExceeded,
    /// Insufficient gas to pay the code deposit of a created contract.
    #[error("contract creation code storage out of gas")]
    CodeStoreOutOfGas,
    /// The call depth limit of 1024 frames was reached.
    #[error("max call depth exceeded")]
    Depth,
    /// The caller cannot afford the value transfer.
    #[error("insufficient balance for transfer")]
    InsufficientBalance,
    /// CREATE/CREATE2 targeted an address that already holds a contract.
    #[error("contract address collision")]
    ContractAddressCollision,
    /// The creator's nonce cannot be incremented any further.
    #[error("nonce uint64 overflow")]
    NonceOverflow,
    /// The frame halted via REVERT. Remaining gas is returned to the caller
    /// together with the revert payload.
    #[error("execution reverted")]
    ExecutionReverted,
}
