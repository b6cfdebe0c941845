use alloy::primitives::{keccak256, Address, B256, U256};
use hashbrown::{HashMap, HashSet};

/// Hash of the empty code blob, reported for existing accounts without code.
pub const EMPTY_CODE_HASH: B256 = B256::new([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03,
    0xc0, 0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85,
    0xa4, 0x70,
]);

/// The [`Log`] struct represents an event record appended by a `LOG0-LOG4`
/// opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// The contract that emitted the event.
    pub address: Address,

    /// The log topics (up to 4 for LOG0-LOG4).
    pub topics: Vec<U256>,

    /// The raw data contained in the log.
    pub data: Vec<u8>,
}

/// The narrow state-database interface consumed by the engine.
///
/// Everything the opcodes and gas functions touch outside the frame goes
/// through these capabilities: account fields, storage, the per-transaction
/// access list and refund counter, logs, the self-destruct set, and
/// journaling. The engine snapshots before every sub-call or create and
/// reverts the snapshot when the sub-frame fails.
pub trait StateDb {
    /// Create an empty account. Existing balance at the address survives.
    fn create_account(&mut self, address: Address);

    /// Returns true if the account exists, even if empty.
    fn exists(&self, address: Address) -> bool;

    /// Returns true if the account is missing or empty per EIP-161
    /// (zero nonce, zero balance, no code).
    fn is_empty(&self, address: Address) -> bool;

    /// The account's balance in wei.
    fn balance(&self, address: Address) -> U256;

    /// Credit the account, creating it implicitly.
    fn add_balance(&mut self, address: Address, amount: U256);

    /// Debit the account. The caller checks affordability first.
    fn sub_balance(&mut self, address: Address, amount: U256);

    /// The account's nonce.
    fn nonce(&self, address: Address) -> u64;

    /// Set the account's nonce, creating it implicitly.
    fn set_nonce(&mut self, address: Address, nonce: u64);

    /// The account's code.
    fn code(&self, address: Address) -> Vec<u8>;

    /// The size of the account's code in bytes.
    fn code_size(&self, address: Address) -> usize;

    /// The keccak256 hash of the account's code, or zero for accounts that
    /// do not exist or are empty per EIP-161.
    fn code_hash(&self, address: Address) -> B256;

    /// Install code on the account.
    fn set_code(&mut self, address: Address, code: Vec<u8>);

    /// The current value of a storage slot.
    fn storage(&self, address: Address, key: U256) -> U256;

    /// The value the slot held when the current transaction started.
    fn committed_storage(&self, address: Address, key: U256) -> U256;

    /// Write a storage slot.
    fn set_storage(&mut self, address: Address, key: U256, value: U256);

    /// The current value of a transient storage slot (EIP-1153 lifetime:
    /// cleared between transactions).
    fn transient_storage(&self, address: Address, key: U256) -> U256;

    /// Write a transient storage slot.
    fn set_transient_storage(&mut self, address: Address, key: U256, value: U256);

    /// Schedule the account for destruction at the end of the transaction
    /// and zero its balance.
    fn self_destruct(&mut self, address: Address);

    /// Returns true if the account is already scheduled for destruction.
    fn has_self_destructed(&self, address: Address) -> bool;

    /// Append an event record.
    fn add_log(&mut self, log: Log);

    /// Add to the transaction's refund counter.
    fn add_refund(&mut self, gas: u64);

    /// Subtract from the transaction's refund counter.
    fn sub_refund(&mut self, gas: u64);

    /// The transaction's accumulated refund.
    fn refund(&self) -> u64;

    /// Returns true if the address is warm per EIP-2929.
    fn address_in_access_list(&self, address: Address) -> bool;

    /// Returns true if the (address, slot) pair is warm per EIP-2929.
    fn slot_in_access_list(&self, address: Address, key: U256) -> bool;

    /// Mark the address warm.
    fn add_address_to_access_list(&mut self, address: Address);

    /// Mark the (address, slot) pair warm.
    fn add_slot_to_access_list(&mut self, address: Address, key: U256);

    /// Take a revertible snapshot of the current state.
    fn snapshot(&mut self) -> usize;

    /// Roll every change made since `id` back, including logs, refunds and
    /// access-list additions.
    fn revert_to_snapshot(&mut self, id: usize);
}

#[derive(Clone, Debug, Default)]
struct Account {
    balance: U256,
    nonce: u64,
    code: Vec<u8>,
    storage: HashMap<U256, U256>,
}

#[derive(Clone, Debug, Default)]
struct StateData {
    accounts: HashMap<Address, Account>,
    // per-transaction slot values as of the last commit, recorded lazily on
    // first write
    original_storage: HashMap<(Address, U256), U256>,
    transient: HashMap<(Address, U256), U256>,
    access_addresses: HashSet<Address>,
    access_slots: HashSet<(Address, U256)>,
    self_destructs: HashSet<Address>,
    logs: Vec<Log>,
    refund: u64,
}

/// An in-memory [`StateDb`] backed by hash maps.
///
/// Snapshots are whole-state clones, which keeps the journal trivially
/// correct for every capability at test scale.
///
/// ```
/// use embervm::core::state::{InMemoryState, StateDb};
/// use alloy::primitives::{Address, U256};
///
/// let mut state = InMemoryState::default();
/// let addr = Address::repeat_byte(0x01);
/// state.add_balance(addr, U256::from(100u8));
///
/// let snapshot = state.snapshot();
/// state.sub_balance(addr, U256::from(40u8));
/// state.revert_to_snapshot(snapshot);
/// assert_eq!(state.balance(addr), U256::from(100u8));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryState {
    data: StateData,
    snapshots: Vec<StateData>,
}

impl InMemoryState {
    /// Creates an empty state.
    pub fn new() -> InMemoryState {
        InMemoryState::default()
    }

    /// Install an account with the given balance and code, the way a test
    /// fixture or genesis would.
    pub fn insert_account(&mut self, address: Address, balance: U256, code: Vec<u8>) {
        let account = self.data.accounts.entry(address).or_default();
        account.balance = balance;
        account.code = code;
    }

    /// The logs appended so far.
    pub fn logs(&self) -> &[Log] {
        &self.data.logs
    }

    /// End the current transaction: seal storage originals, drop transient
    /// storage, the access list, the refund counter and the snapshot stack,
    /// and delete self-destructed accounts.
    pub fn commit(&mut self) {
        for address in core::mem::take(&mut self.data.self_destructs) {
            self.data.accounts.remove(&address);
        }
        self.data.original_storage.clear();
        self.data.transient.clear();
        self.data.access_addresses.clear();
        self.data.access_slots.clear();
        self.data.refund = 0;
        self.snapshots.clear();
    }

    fn account_mut(&mut self, address: Address) -> &mut Account {
        self.data.accounts.entry(address).or_default()
    }

    fn record_original(&mut self, address: Address, key: U256) {
        let current = self.storage(address, key);
        self.data.original_storage.entry((address, key)).or_insert(current);
    }
}

impl StateDb for InMemoryState {
    fn create_account(&mut self, address: Address) {
        let balance = self.balance(address);
        self.data.accounts.insert(address, Account { balance, ..Account::default() });
    }

    fn exists(&self, address: Address) -> bool {
        self.data.accounts.contains_key(&address)
    }

    fn is_empty(&self, address: Address) -> bool {
        match self.data.accounts.get(&address) {
            Some(account) => {
                account.nonce == 0 && account.balance.is_zero() && account.code.is_empty()
            }
            None => true,
        }
    }

    fn balance(&self, address: Address) -> U256 {
        self.data.accounts.get(&address).map(|a| a.balance).unwrap_or_default()
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_add(amount);
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_sub(amount);
    }

    fn nonce(&self, address: Address) -> u64 {
        self.data.accounts.get(&address).map(|a| a.nonce).unwrap_or_default()
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.account_mut(address).nonce = nonce;
    }

    fn code(&self, address: Address) -> Vec<u8> {
        self.data.accounts.get(&address).map(|a| a.code.clone()).unwrap_or_default()
    }

    fn code_size(&self, address: Address) -> usize {
        self.data.accounts.get(&address).map(|a| a.code.len()).unwrap_or_default()
    }

    fn code_hash(&self, address: Address) -> B256 {
        if self.is_empty(address) {
            return B256::ZERO;
        }
        match self.data.accounts.get(&address) {
            Some(account) if !account.code.is_empty() => keccak256(&account.code),
            Some(_) => EMPTY_CODE_HASH,
            None => B256::ZERO,
        }
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) {
        self.account_mut(address).code = code;
    }

    fn storage(&self, address: Address, key: U256) -> U256 {
        self.data
            .accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key).copied())
            .unwrap_or_default()
    }

    fn committed_storage(&self, address: Address, key: U256) -> U256 {
        match self.data.original_storage.get(&(address, key)) {
            Some(value) => *value,
            None => self.storage(address, key),
        }
    }

    fn set_storage(&mut self, address: Address, key: U256, value: U256) {
        self.record_original(address, key);
        self.account_mut(address).storage.insert(key, value);
    }

    fn transient_storage(&self, address: Address, key: U256) -> U256 {
        self.data.transient.get(&(address, key)).copied().unwrap_or_default()
    }

    fn set_transient_storage(&mut self, address: Address, key: U256, value: U256) {
        self.data.transient.insert((address, key), value);
    }

    fn self_destruct(&mut self, address: Address) {
        self.data.self_destructs.insert(address);
        self.account_mut(address).balance = U256::ZERO;
    }

    fn has_self_destructed(&self, address: Address) -> bool {
        self.data.self_destructs.contains(&address)
    }

    fn add_log(&mut self, log: Log) {
        self.data.logs.push(log);
    }

    fn add_refund(&mut self, gas: u64) {
        self.data.refund += gas;
    }

    fn sub_refund(&mut self, gas: u64) {
        assert!(gas <= self.data.refund, "refund counter below zero");
        self.data.refund -= gas;
    }

    fn refund(&self) -> u64 {
        self.data.refund
    }

    fn address_in_access_list(&self, address: Address) -> bool {
        self.data.access_addresses.contains(&address)
    }

    fn slot_in_access_list(&self, address: Address, key: U256) -> bool {
        self.data.access_slots.contains(&(address, key))
    }

    fn add_address_to_access_list(&mut self, address: Address) {
        self.data.access_addresses.insert(address);
    }

    fn add_slot_to_access_list(&mut self, address: Address, key: U256) {
        self.data.access_slots.insert((address, key));
    }

    fn snapshot(&mut self) -> usize {
        self.snapshots.push(self.data.clone());
        self.snapshots.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: usize) {
        assert!(id < self.snapshots.len(), "unknown snapshot id");
        self.data = self.snapshots[id].clone();
        self.snapshots.truncate(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_storage_round_trip() {
        let mut state = InMemoryState::new();
        state.set_storage(addr(1), U256::from(1u8), U256::from(42u8));

        assert_eq!(state.storage(addr(1), U256::from(1u8)), U256::from(42u8));
        assert_eq!(state.storage(addr(1), U256::from(2u8)), U256::ZERO);
        assert_eq!(state.storage(addr(2), U256::from(1u8)), U256::ZERO);
    }

    #[test]
    fn test_committed_storage_survives_writes() {
        let mut state = InMemoryState::new();
        state.set_storage(addr(1), U256::from(1u8), U256::from(10u8));
        state.commit();

        state.set_storage(addr(1), U256::from(1u8), U256::from(20u8));
        state.set_storage(addr(1), U256::from(1u8), U256::from(30u8));

        assert_eq!(state.storage(addr(1), U256::from(1u8)), U256::from(30u8));
        assert_eq!(state.committed_storage(addr(1), U256::from(1u8)), U256::from(10u8));
    }

    #[test]
    fn test_snapshot_revert_rolls_back_everything() {
        let mut state = InMemoryState::new();
        state.add_balance(addr(1), U256::from(100u8));

        let snapshot = state.snapshot();
        state.sub_balance(addr(1), U256::from(60u8));
        state.set_storage(addr(1), U256::from(1u8), U256::from(1u8));
        state.add_log(Log { address: addr(1), topics: vec![], data: vec![] });
        state.add_refund(4800);
        state.add_address_to_access_list(addr(9));

        state.revert_to_snapshot(snapshot);
        assert_eq!(state.balance(addr(1)), U256::from(100u8));
        assert_eq!(state.storage(addr(1), U256::from(1u8)), U256::ZERO);
        assert!(state.logs().is_empty());
        assert_eq!(state.refund(), 0);
        assert!(!state.address_in_access_list(addr(9)));
    }

    #[test]
    fn test_empty_per_eip161() {
        let mut state = InMemoryState::new();
        assert!(state.is_empty(addr(1)));

        state.create_account(addr(1));
        assert!(state.exists(addr(1)));
        assert!(state.is_empty(addr(1)));

        state.set_nonce(addr(1), 1);
        assert!(!state.is_empty(addr(1)));
    }

    #[test]
    fn test_code_hash() {
        let mut state = InMemoryState::new();
        assert_eq!(state.code_hash(addr(1)), B256::ZERO);

        state.add_balance(addr(1), U256::from(1u8));
        assert_eq!(state.code_hash(addr(1)), EMPTY_CODE_HASH);

        state.set_code(addr(1), vec![0x00]);
        assert_eq!(state.code_hash(addr(1)), keccak256([0x00]));
    }

    #[test]
    fn test_transient_storage_cleared_on_commit() {
        let mut state = InMemoryState::new();
        state.set_transient_storage(addr(1), U256::from(1u8), U256::from(7u8));
        assert_eq!(state.transient_storage(addr(1), U256::from(1u8)), U256::from(7u8));

        state.commit();
        assert_eq!(state.transient_storage(addr(1), U256::from(1u8)), U256::ZERO);
    }

    #[test]
    fn test_self_destruct_zeroes_balance() {
        let mut state = InMemoryState::new();
        state.add_balance(addr(1), U256::from(5u8));
        state.self_destruct(addr(1));

        assert!(state.has_self_destructed(addr(1)));
        assert_eq!(state.balance(addr(1)), U256::ZERO);

        state.commit();
        assert!(!state.exists(addr(1)));
    }
}
