use alloy::primitives::{keccak256, Address, B256, U256};

use super::{
    context::{BlockContext, TxContext},
    contract::Contract,
    error::VmError,
    fork::Fork,
    gas,
    interpreter::{self, Frame},
    state::{StateDb, EMPTY_CODE_HASH},
    table::{JumpTable, Operation},
};

/// The call depth limit shared by the CALL and CREATE families.
pub const CALL_CREATE_DEPTH: usize = 1024;

/// Result of a call through the machine.
#[derive(Clone, Debug)]
pub struct CallResult {
    /// The bytes returned by the callee.
    pub return_data: Vec<u8>,

    /// Gas handed back to the caller. Zero after a fault; the unspent
    /// remainder after success or revert.
    pub gas_left: u64,

    /// `None` on success, [`VmError::ExecutionReverted`] after REVERT, any
    /// other variant after a fault.
    pub error: Option<VmError>,
}

impl CallResult {
    fn failed(error: VmError, gas_left: u64) -> CallResult {
        CallResult { return_data: Vec::new(), gas_left, error: Some(error) }
    }
}

/// Result of a contract creation.
#[derive(Clone, Debug)]
pub struct CreateResult {
    /// The address of the created contract, meaningful on success.
    pub address: Address,

    /// The revert payload of the init code, empty otherwise.
    pub return_data: Vec<u8>,

    /// Gas handed back to the creator.
    pub gas_left: u64,

    /// `None` on success; see [`CallResult::error`].
    pub error: Option<VmError>,
}

impl CreateResult {
    fn failed(error: VmError, gas_left: u64) -> CreateResult {
        CreateResult {
            address: Address::ZERO,
            return_data: Vec::new(),
            gas_left,
            error: Some(error),
        }
    }
}

/// The [`Evm`] struct ties one fork's jump table to a state database and the
/// block/transaction context, and realizes the sub-frame semantics of the
/// system opcodes: snapshot and revert around every sub-call, value
/// transfer, gas forwarding and the contract-creation rules.
///
/// One machine executes one transaction at a time; the per-fork tables it
/// reads are process-wide immutable constants shared by any number of
/// machines.
pub struct Evm<'a> {
    /// The state database backing this execution.
    pub state: &'a mut dyn StateDb,

    /// Per-block environment values.
    pub block: BlockContext,

    /// Per-transaction environment values.
    pub tx: TxContext,

    /// The fork whose rules govern this execution.
    pub fork: Fork,

    table: &'static JumpTable,
    depth: usize,
    read_only: bool,
    // gas resolved for the pending sub-call by the CALL-family gas functions
    pub(crate) call_gas_temp: u64,
}

impl<'a> Evm<'a> {
    /// Creates a new machine for `fork` over the given state and context.
    pub fn new(
        state: &'a mut dyn StateDb,
        block: BlockContext,
        tx: TxContext,
        fork: Fork,
    ) -> Evm<'a> {
        Evm {
            state,
            block,
            tx,
            fork,
            table: JumpTable::for_fork(fork),
            depth: 0,
            read_only: false,
            call_gas_temp: 0,
        }
    }

    /// The operation record for an opcode byte in this machine's table.
    #[inline]
    pub fn operation(&self, opcode: u8) -> &'static Operation {
        &self.table.0[opcode as usize]
    }

    /// Returns true inside a STATICCALL frame, where state mutation faults.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The current call depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) {
        self.state.sub_balance(from, value);
        self.state.add_balance(to, value);
    }

    fn run_frame(&mut self, contract: Contract, gas: u64) -> (Vec<u8>, u64, Option<VmError>) {
        self.depth += 1;
        let mut frame = Frame::new(contract, gas);
        let result = interpreter::run(self, &mut frame);
        self.depth -= 1;
        (result.output, frame.gas, result.error)
    }

    // Frame-boundary gas and journal policy: a fault unwinds the snapshot
    // and consumes the forwarded gas, a revert unwinds but refunds, success
    // keeps both.
    fn seal(
        &mut self,
        snapshot: usize,
        return_data: Vec<u8>,
        gas_left: u64,
        error: Option<VmError>,
    ) -> CallResult {
        match error {
            None => CallResult { return_data, gas_left, error: None },
            Some(VmError::ExecutionReverted) => {
                self.state.revert_to_snapshot(snapshot);
                CallResult { return_data, gas_left, error: Some(VmError::ExecutionReverted) }
            }
            Some(error) => {
                self.state.revert_to_snapshot(snapshot);
                CallResult { return_data: Vec::new(), gas_left: 0, error: Some(error) }
            }
        }
    }

    /// Message-call `address` with the given input, gas and value.
    pub fn call(
        &mut self,
        caller: Address,
        address: Address,
        input: Vec<u8>,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if self.depth > CALL_CREATE_DEPTH {
            return CallResult::failed(VmError::Depth, gas);
        }
        if self.state.balance(caller) < value {
            return CallResult::failed(VmError::InsufficientBalance, gas);
        }

        let snapshot = self.state.snapshot();
        if !self.state.exists(address) {
            // EIP-158: zero-value calls to nonexistent accounts leave no
            // account behind
            if !(self.fork.is_active(Fork::SpuriousDragon) && value.is_zero()) {
                self.state.create_account(address);
            }
        }
        self.transfer(caller, address, value);

        let code = self.state.code(address);
        if code.is_empty() {
            return CallResult { return_data: Vec::new(), gas_left: gas, error: None };
        }

        let contract = Contract::new(address, caller, value, code).with_input(input);
        let (return_data, gas_left, error) = self.run_frame(contract, gas);
        self.seal(snapshot, return_data, gas_left, error)
    }

    /// Run `code_address`'s code against the caller's own storage and
    /// balance.
    pub fn call_code(
        &mut self,
        caller: Address,
        code_address: Address,
        input: Vec<u8>,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if self.depth > CALL_CREATE_DEPTH {
            return CallResult::failed(VmError::Depth, gas);
        }
        if self.state.balance(caller) < value {
            return CallResult::failed(VmError::InsufficientBalance, gas);
        }

        let snapshot = self.state.snapshot();
        let contract =
            Contract::new(caller, caller, value, self.state.code(code_address)).with_input(input);
        let (return_data, gas_left, error) = self.run_frame(contract, gas);
        self.seal(snapshot, return_data, gas_left, error)
    }

    /// Run `code_address`'s code in the current frame's context, keeping the
    /// original caller and value.
    pub fn delegate_call(
        &mut self,
        original_caller: Address,
        address: Address,
        code_address: Address,
        value: U256,
        input: Vec<u8>,
        gas: u64,
    ) -> CallResult {
        if self.depth > CALL_CREATE_DEPTH {
            return CallResult::failed(VmError::Depth, gas);
        }

        let snapshot = self.state.snapshot();
        let contract = Contract::new(address, original_caller, value, self.state.code(code_address))
            .with_input(input);
        let (return_data, gas_left, error) = self.run_frame(contract, gas);
        self.seal(snapshot, return_data, gas_left, error)
    }

    /// Message-call `address` with state mutation forbidden for the whole
    /// sub-tree.
    pub fn static_call(
        &mut self,
        caller: Address,
        address: Address,
        input: Vec<u8>,
        gas: u64,
    ) -> CallResult {
        if self.depth > CALL_CREATE_DEPTH {
            return CallResult::failed(VmError::Depth, gas);
        }

        let snapshot = self.state.snapshot();
        let code = self.state.code(address);
        if code.is_empty() {
            return CallResult { return_data: Vec::new(), gas_left: gas, error: None };
        }

        let contract = Contract::new(address, caller, U256::ZERO, code).with_input(input);
        let previous = self.read_only;
        self.read_only = true;
        let (return_data, gas_left, error) = self.run_frame(contract, gas);
        self.read_only = previous;
        self.seal(snapshot, return_data, gas_left, error)
    }

    /// Create a contract at the address derived from the creator's nonce.
    pub fn create(
        &mut self,
        caller: Address,
        init_code: Vec<u8>,
        gas: u64,
        value: U256,
    ) -> CreateResult {
        let address = caller.create(self.state.nonce(caller));
        self.create_at(caller, address, init_code, gas, value)
    }

    /// Create a contract at the address derived from the init code hash and
    /// a salt (CREATE2).
    pub fn create2(
        &mut self,
        caller: Address,
        init_code: Vec<u8>,
        gas: u64,
        value: U256,
        salt: U256,
    ) -> CreateResult {
        let address = caller.create2(B256::from(salt), keccak256(&init_code));
        self.create_at(caller, address, init_code, gas, value)
    }

    fn create_at(
        &mut self,
        caller: Address,
        address: Address,
        init_code: Vec<u8>,
        gas: u64,
        value: U256,
    ) -> CreateResult {
        if self.depth > CALL_CREATE_DEPTH {
            return CreateResult::failed(VmError::Depth, gas);
        }
        if self.state.balance(caller) < value {
            return CreateResult::failed(VmError::InsufficientBalance, gas);
        }
        let nonce = self.state.nonce(caller);
        if nonce == u64::MAX {
            return CreateResult::failed(VmError::NonceOverflow, gas);
        }
        self.state.set_nonce(caller, nonce + 1);

        if self.fork.is_active(Fork::Berlin) {
            self.state.add_address_to_access_list(address);
        }

        // an account with a nonce or code at the target address means a
        // collision, which burns the forwarded gas
        let code_hash = self.state.code_hash(address);
        if self.state.nonce(address) != 0
            || !(code_hash == B256::ZERO || code_hash == EMPTY_CODE_HASH)
        {
            return CreateResult::failed(VmError::ContractAddressCollision, 0);
        }

        let snapshot = self.state.snapshot();
        self.state.create_account(address);
        if self.fork.is_active(Fork::SpuriousDragon) {
            self.state.set_nonce(address, 1);
        }
        self.transfer(caller, address, value);

        let contract = Contract::new(address, caller, value, init_code);
        let (output, mut gas_left, mut error) = self.run_frame(contract, gas);

        if error.is_none() {
            if self.fork.is_active(Fork::SpuriousDragon) && output.len() > gas::MAX_CODE_SIZE {
                error = Some(VmError::MaxCodeSizeExceeded);
            } else {
                let deposit = output.len() as u64 * gas::CREATE_DATA_GAS;
                if gas_left >= deposit {
                    gas_left -= deposit;
                    self.state.set_code(address, output.clone());
                } else if self.fork.is_active(Fork::Homestead) {
                    error = Some(VmError::CodeStoreOutOfGas);
                }
                // Frontier: an unaffordable deposit leaves the account
                // without code but the creation succeeds
            }
        }

        let sealed = self.seal(snapshot, output, gas_left, error);
        CreateResult {
            address,
            return_data: sealed.return_data,
            gas_left: sealed.gas_left,
            error: sealed.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::InMemoryState;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_call_to_empty_code_succeeds() {
        let mut state = InMemoryState::new();
        state.add_balance(addr(1), U256::from(100u8));
        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);

        let result = evm.call(addr(1), addr(2), Vec::new(), 50_000, U256::from(10u8));
        assert!(result.error.is_none());
        assert_eq!(result.gas_left, 50_000);
        assert_eq!(evm.state.balance(addr(2)), U256::from(10u8));
        assert_eq!(evm.state.balance(addr(1)), U256::from(90u8));
    }

    #[test]
    fn test_call_insufficient_balance_returns_gas() {
        let mut state = InMemoryState::new();
        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);

        let result = evm.call(addr(1), addr(2), Vec::new(), 50_000, U256::from(10u8));
        assert_eq!(result.error, Some(VmError::InsufficientBalance));
        assert_eq!(result.gas_left, 50_000);
    }

    #[test]
    fn test_zero_value_call_leaves_no_account_post_eip158() {
        let mut state = InMemoryState::new();
        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);
        evm.call(addr(1), addr(2), Vec::new(), 50_000, U256::ZERO);
        assert!(!state.exists(addr(2)));

        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::Homestead);
        evm.call(addr(1), addr(2), Vec::new(), 50_000, U256::ZERO);
        assert!(state.exists(addr(2)));
    }

    #[test]
    fn test_create_deploys_runtime_code() {
        // init: PUSH1 0x01 PUSH1 0x00 MSTORE8 PUSH1 0x01 PUSH1 0x00 RETURN
        // deploys the single byte 0x01
        let init = vec![0x60, 0x01, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xf3];
        let mut state = InMemoryState::new();
        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);

        let result = evm.create(addr(1), init, 100_000, U256::ZERO);
        assert!(result.error.is_none(), "create failed: {:?}", result.error);
        assert_eq!(evm.state.code(result.address), vec![0x01]);
        assert_eq!(evm.state.nonce(result.address), 1);
        assert_eq!(evm.state.nonce(addr(1)), 1);
    }

    #[test]
    fn test_create_rejects_oversized_code() {
        // init code returning 24577 zero bytes: PUSH3 len PUSH1 0 RETURN
        let init = vec![0x62, 0x00, 0x60, 0x01, 0x60, 0x00, 0xf3];
        let mut state = InMemoryState::new();
        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);

        let result = evm.create(addr(1), init, 10_000_000, U256::ZERO);
        assert_eq!(result.error, Some(VmError::MaxCodeSizeExceeded));
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_create2_address_is_deterministic() {
        // init: RETURN empty
        let init = vec![0x60, 0x00, 0x60, 0x00, 0xf3];
        let expected = addr(1).create2(B256::from(U256::from(7u8)), keccak256(&init));

        let mut state = InMemoryState::new();
        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);
        let result = evm.create2(addr(1), init, 100_000, U256::ZERO, U256::from(7u8));

        assert!(result.error.is_none());
        assert_eq!(result.address, expected);
    }

    #[test]
    fn test_create_collision_burns_gas() {
        let mut state = InMemoryState::new();
        let target = addr(1).create(0);
        state.set_nonce(target, 1);

        let mut evm =
            Evm::new(&mut state, BlockContext::default(), TxContext::default(), Fork::London);
        let result = evm.create(addr(1), vec![0x00], 100_000, U256::ZERO);
        assert_eq!(result.error, Some(VmError::ContractAddressCollision));
        assert_eq!(result.gas_left, 0);
    }
}
