use alloy::primitives::{Address, B256, U256};

/// Hash lookup for the BLOCKHASH opcode. Plain function pointer so contexts
/// stay `Copy`; hosts that track real ancestry supply their own.
pub type BlockHashFn = fn(u64) -> B256;

fn no_block_hashes(_number: u64) -> B256 {
    B256::ZERO
}

/// Per-block values supplied by the environment, read by the block-level
/// opcodes (COINBASE, TIMESTAMP, NUMBER, DIFFICULTY, GASLIMIT, CHAINID,
/// BASEFEE, BLOCKHASH).
#[derive(Clone, Copy, Debug)]
pub struct BlockContext {
    /// The address receiving the block reward.
    pub coinbase: Address,

    /// The block timestamp in seconds.
    pub timestamp: u64,

    /// The block number.
    pub number: u64,

    /// The block difficulty (PREVRANDAO after the merge; opaque here).
    pub difficulty: U256,

    /// The block gas limit.
    pub gas_limit: u64,

    /// The chain id committed to by replay-protected transactions.
    pub chain_id: u64,

    /// The EIP-1559 base fee, zero before London.
    pub base_fee: U256,

    /// Hash lookup for the 256 most recent blocks.
    pub block_hash: BlockHashFn,
}

impl Default for BlockContext {
    fn default() -> Self {
        BlockContext {
            coinbase: Address::ZERO,
            timestamp: 0,
            number: 0,
            difficulty: U256::ZERO,
            gas_limit: 30_000_000,
            chain_id: 1,
            base_fee: U256::ZERO,
            block_hash: no_block_hashes,
        }
    }
}

/// Per-transaction values supplied by the outer pipeline, read by ORIGIN and
/// GASPRICE.
#[derive(Clone, Copy, Debug, Default)]
pub struct TxContext {
    /// The externally-owned account that signed the transaction.
    pub origin: Address,

    /// The effective gas price paid by the transaction.
    pub gas_price: U256,
}
