//! Per-fork table construction.
//!
//! Each fork's table is derived by cloning the previous fork's and applying
//! an ordered list of [`Patch`]es, one list per fork, each patch tied to one
//! EIP. The nine tables are built once behind `lazy_static`, validated, and
//! shared read-only by every machine thereafter.

use lazy_static::lazy_static;

use crate::core::{
    fork::Fork,
    gas::{self, dynamic},
    instructions::{
        arithmetic, bitwise, block, comparison, control, crypto, environment, logging,
        memory as memory_ops, stack as stack_ops, storage, system,
    },
    opcodes,
};

use super::{
    max_dup_stack, max_swap_stack, memory, min_dup_stack, min_swap_stack, DynamicGasFn,
    JumpTable, Operation,
};

/// A single table amendment, tied to one EIP.
///
/// Patches are data rather than code so the full fork schedule stays
/// inspectable: tests walk these lists to check that opcodes are only ever
/// added, never removed.
#[derive(Clone, Copy)]
pub enum Patch {
    /// Define a previously undefined opcode.
    Add {
        /// The opcode byte to define.
        opcode: u8,
        /// The record to install.
        operation: Operation,
    },
    /// Change the constant gas of an existing opcode.
    Reprice {
        /// The opcode byte to reprice.
        opcode: u8,
        /// The new constant gas.
        constant_gas: u64,
    },
    /// Install or swap the dynamic-gas function of an existing opcode.
    ReplaceDynGas {
        /// The opcode byte to change.
        opcode: u8,
        /// The new dynamic-gas function.
        dynamic_gas: DynamicGasFn,
    },
}

fn apply(table: &mut JumpTable, patches: &[Patch]) {
    for patch in patches {
        match *patch {
            Patch::Add { opcode, operation } => {
                assert!(
                    table.get(opcode).is_undefined(),
                    "patch adds opcode 0x{opcode:02x} twice"
                );
                table.set(opcode, operation);
            }
            Patch::Reprice { opcode, constant_gas } => {
                assert!(
                    !table.get(opcode).is_undefined(),
                    "patch reprices undefined opcode 0x{opcode:02x}"
                );
                table.0[opcode as usize].constant_gas = constant_gas;
            }
            Patch::ReplaceDynGas { opcode, dynamic_gas } => {
                assert!(
                    !table.get(opcode).is_undefined(),
                    "patch changes gas of undefined opcode 0x{opcode:02x}"
                );
                table.0[opcode as usize].dynamic_gas = Some(dynamic_gas);
            }
        }
    }
}

/// The ordered patch list layered onto the previous fork's table.
/// Frontier is the base table and has no patches.
pub fn patches(fork: Fork) -> Vec<Patch> {
    match fork {
        Fork::Frontier => vec![],

        // EIP-7: DELEGATECALL
        Fork::Homestead => vec![Patch::Add {
            opcode: opcodes::DELEGATECALL,
            operation: Operation::new(system::delegatecall, gas::CALL_GAS_FRONTIER, 6, 1)
                .with_dynamic_gas(dynamic::gas_thin_call)
                .with_memory_size(memory::memory_thin_call),
        }],

        // EIP-150: IO-heavy opcode repricing; the 63/64 forwarding rule is
        // keyed off the fork inside the call-gas math
        Fork::TangerineWhistle => vec![
            Patch::Reprice { opcode: opcodes::BALANCE, constant_gas: gas::BALANCE_GAS_EIP150 },
            Patch::Reprice {
                opcode: opcodes::EXTCODESIZE,
                constant_gas: gas::EXTCODE_SIZE_GAS_EIP150,
            },
            Patch::Reprice {
                opcode: opcodes::EXTCODECOPY,
                constant_gas: gas::EXTCODE_COPY_GAS_EIP150,
            },
            Patch::Reprice { opcode: opcodes::SLOAD, constant_gas: gas::SLOAD_GAS_EIP150 },
            Patch::Reprice { opcode: opcodes::CALL, constant_gas: gas::CALL_GAS_EIP150 },
            Patch::Reprice { opcode: opcodes::CALLCODE, constant_gas: gas::CALL_GAS_EIP150 },
            Patch::Reprice { opcode: opcodes::DELEGATECALL, constant_gas: gas::CALL_GAS_EIP150 },
            Patch::ReplaceDynGas {
                opcode: opcodes::SELFDESTRUCT,
                dynamic_gas: dynamic::gas_selfdestruct_eip150,
            },
        ],

        // EIP-160: EXP repricing; EIP-158: dead-account rules for the
        // new-account surcharges
        Fork::SpuriousDragon => vec![
            Patch::ReplaceDynGas { opcode: opcodes::EXP, dynamic_gas: dynamic::gas_exp_eip160 },
            Patch::ReplaceDynGas { opcode: opcodes::CALL, dynamic_gas: dynamic::gas_call_eip158 },
            Patch::ReplaceDynGas {
                opcode: opcodes::SELFDESTRUCT,
                dynamic_gas: dynamic::gas_selfdestruct_eip158,
            },
        ],

        // EIP-214: STATICCALL; EIP-211: return-data buffer; EIP-140: REVERT
        Fork::Byzantium => vec![
            Patch::Add {
                opcode: opcodes::STATICCALL,
                operation: Operation::new(system::staticcall, gas::CALL_GAS_EIP150, 6, 1)
                    .with_dynamic_gas(dynamic::gas_thin_call)
                    .with_memory_size(memory::memory_thin_call),
            },
            Patch::Add {
                opcode: opcodes::RETURNDATASIZE,
                operation: Operation::new(environment::returndatasize, gas::QUICK_STEP, 0, 1),
            },
            Patch::Add {
                opcode: opcodes::RETURNDATACOPY,
                operation: Operation::new(environment::returndatacopy, gas::FASTEST_STEP, 3, 0)
                    .with_dynamic_gas(dynamic::gas_copy)
                    .with_memory_size(memory::memory_copy),
            },
            Patch::Add {
                opcode: opcodes::REVERT,
                operation: Operation::new(system::revert, 0, 2, 0)
                    .with_dynamic_gas(dynamic::gas_memory_expansion)
                    .with_memory_size(memory::memory_return),
            },
        ],

        // EIP-145: shifts; EIP-1052: EXTCODEHASH; EIP-1014: CREATE2
        Fork::Constantinople => vec![
            Patch::Add {
                opcode: opcodes::SHL,
                operation: Operation::new(bitwise::shl, gas::FASTEST_STEP, 2, 1),
            },
            Patch::Add {
                opcode: opcodes::SHR,
                operation: Operation::new(bitwise::shr, gas::FASTEST_STEP, 2, 1),
            },
            Patch::Add {
                opcode: opcodes::SAR,
                operation: Operation::new(bitwise::sar, gas::FASTEST_STEP, 2, 1),
            },
            Patch::Add {
                opcode: opcodes::EXTCODEHASH,
                operation: Operation::new(
                    environment::extcodehash,
                    gas::EXTCODE_HASH_GAS_CONSTANTINOPLE,
                    1,
                    1,
                ),
            },
            Patch::Add {
                opcode: opcodes::CREATE2,
                operation: Operation::new(system::create2, gas::CREATE_GAS, 4, 1)
                    .with_dynamic_gas(dynamic::gas_create2)
                    .with_memory_size(memory::memory_create),
            },
        ],

        // EIP-1344: CHAINID; EIP-1884: repricing; EIP-2200: net-metered
        // SSTORE and SELFBALANCE
        Fork::Istanbul => vec![
            Patch::Add {
                opcode: opcodes::CHAINID,
                operation: Operation::new(block::chainid, gas::QUICK_STEP, 0, 1),
            },
            Patch::Add {
                opcode: opcodes::SELFBALANCE,
                operation: Operation::new(environment::selfbalance, gas::FAST_STEP, 0, 1),
            },
            Patch::Reprice { opcode: opcodes::BALANCE, constant_gas: gas::BALANCE_GAS_EIP1884 },
            Patch::Reprice {
                opcode: opcodes::EXTCODEHASH,
                constant_gas: gas::EXTCODE_HASH_GAS_EIP1884,
            },
            Patch::Reprice { opcode: opcodes::SLOAD, constant_gas: gas::SLOAD_GAS_EIP2200 },
            Patch::ReplaceDynGas {
                opcode: opcodes::SSTORE,
                dynamic_gas: dynamic::gas_sstore_eip2200,
            },
        ],

        // EIP-2929: cold/warm access-list pricing. The warm cost becomes the
        // constant gas of the account opcodes; the dynamic functions add the
        // cold surcharge and maintain the access list.
        Fork::Berlin => vec![
            Patch::Reprice { opcode: opcodes::SLOAD, constant_gas: 0 },
            Patch::ReplaceDynGas {
                opcode: opcodes::SLOAD,
                dynamic_gas: dynamic::gas_sload_eip2929,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::SSTORE,
                dynamic_gas: dynamic::gas_sstore_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::BALANCE,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::BALANCE,
                dynamic_gas: dynamic::gas_account_access_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::EXTCODESIZE,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::EXTCODESIZE,
                dynamic_gas: dynamic::gas_account_access_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::EXTCODEHASH,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::EXTCODEHASH,
                dynamic_gas: dynamic::gas_account_access_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::EXTCODECOPY,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::EXTCODECOPY,
                dynamic_gas: dynamic::gas_ext_code_copy_eip2929,
            },
            Patch::Reprice { opcode: opcodes::CALL, constant_gas: gas::WARM_STORAGE_READ_COST },
            Patch::ReplaceDynGas {
                opcode: opcodes::CALL,
                dynamic_gas: dynamic::gas_call_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::CALLCODE,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::CALLCODE,
                dynamic_gas: dynamic::gas_call_code_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::DELEGATECALL,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::DELEGATECALL,
                dynamic_gas: dynamic::gas_thin_call_eip2929,
            },
            Patch::Reprice {
                opcode: opcodes::STATICCALL,
                constant_gas: gas::WARM_STORAGE_READ_COST,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::STATICCALL,
                dynamic_gas: dynamic::gas_thin_call_eip2929,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::SELFDESTRUCT,
                dynamic_gas: dynamic::gas_selfdestruct_eip2929,
            },
        ],

        // EIP-3198: BASEFEE; EIP-3529: refund reduction
        Fork::London => vec![
            Patch::Add {
                opcode: opcodes::BASEFEE,
                operation: Operation::new(block::basefee, gas::QUICK_STEP, 0, 1),
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::SSTORE,
                dynamic_gas: dynamic::gas_sstore_eip3529,
            },
            Patch::ReplaceDynGas {
                opcode: opcodes::SELFDESTRUCT,
                dynamic_gas: dynamic::gas_selfdestruct_eip3529,
            },
        ],
    }
}

/// The Frontier base table, from which every later fork is derived.
fn new_frontier_table() -> JumpTable {
    let mut t = JumpTable::new_undefined();

    t.set(opcodes::STOP, Operation::new(control::stop, 0, 0, 0));
    t.set(opcodes::ADD, Operation::new(arithmetic::add, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::MUL, Operation::new(arithmetic::mul, gas::FAST_STEP, 2, 1));
    t.set(opcodes::SUB, Operation::new(arithmetic::sub, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::DIV, Operation::new(arithmetic::div, gas::FAST_STEP, 2, 1));
    t.set(opcodes::SDIV, Operation::new(arithmetic::sdiv, gas::FAST_STEP, 2, 1));
    t.set(opcodes::MOD, Operation::new(arithmetic::modulo, gas::FAST_STEP, 2, 1));
    t.set(opcodes::SMOD, Operation::new(arithmetic::smod, gas::FAST_STEP, 2, 1));
    t.set(opcodes::ADDMOD, Operation::new(arithmetic::addmod, gas::MID_STEP, 3, 1));
    t.set(opcodes::MULMOD, Operation::new(arithmetic::mulmod, gas::MID_STEP, 3, 1));
    t.set(
        opcodes::EXP,
        Operation::new(arithmetic::exp, 0, 2, 1).with_dynamic_gas(dynamic::gas_exp_frontier),
    );
    t.set(opcodes::SIGNEXTEND, Operation::new(arithmetic::signextend, gas::FAST_STEP, 2, 1));

    t.set(opcodes::LT, Operation::new(comparison::lt, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::GT, Operation::new(comparison::gt, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::SLT, Operation::new(comparison::slt, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::SGT, Operation::new(comparison::sgt, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::EQ, Operation::new(comparison::eq, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::ISZERO, Operation::new(comparison::iszero, gas::FASTEST_STEP, 1, 1));
    t.set(opcodes::AND, Operation::new(bitwise::and, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::OR, Operation::new(bitwise::or, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::XOR, Operation::new(bitwise::xor, gas::FASTEST_STEP, 2, 1));
    t.set(opcodes::NOT, Operation::new(bitwise::not, gas::FASTEST_STEP, 1, 1));
    t.set(opcodes::BYTE, Operation::new(bitwise::byte, gas::FASTEST_STEP, 2, 1));

    t.set(
        opcodes::KECCAK256,
        Operation::new(crypto::keccak256, gas::KECCAK256_GAS, 2, 1)
            .with_dynamic_gas(dynamic::gas_keccak256)
            .with_memory_size(memory::memory_keccak256),
    );

    t.set(opcodes::ADDRESS, Operation::new(environment::address, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::BALANCE, Operation::new(environment::balance, gas::BALANCE_GAS_FRONTIER, 1, 1));
    t.set(opcodes::ORIGIN, Operation::new(environment::origin, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::CALLER, Operation::new(environment::caller, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::CALLVALUE, Operation::new(environment::callvalue, gas::QUICK_STEP, 0, 1));
    t.set(
        opcodes::CALLDATALOAD,
        Operation::new(environment::calldataload, gas::FASTEST_STEP, 1, 1),
    );
    t.set(opcodes::CALLDATASIZE, Operation::new(environment::calldatasize, gas::QUICK_STEP, 0, 1));
    t.set(
        opcodes::CALLDATACOPY,
        Operation::new(environment::calldatacopy, gas::FASTEST_STEP, 3, 0)
            .with_dynamic_gas(dynamic::gas_copy)
            .with_memory_size(memory::memory_copy),
    );
    t.set(opcodes::CODESIZE, Operation::new(environment::codesize, gas::QUICK_STEP, 0, 1));
    t.set(
        opcodes::CODECOPY,
        Operation::new(environment::codecopy, gas::FASTEST_STEP, 3, 0)
            .with_dynamic_gas(dynamic::gas_copy)
            .with_memory_size(memory::memory_copy),
    );
    t.set(opcodes::GASPRICE, Operation::new(environment::gasprice, gas::QUICK_STEP, 0, 1));
    t.set(
        opcodes::EXTCODESIZE,
        Operation::new(environment::extcodesize, gas::EXTCODE_SIZE_GAS_FRONTIER, 1, 1),
    );
    t.set(
        opcodes::EXTCODECOPY,
        Operation::new(environment::extcodecopy, gas::EXTCODE_COPY_GAS_FRONTIER, 4, 0)
            .with_dynamic_gas(dynamic::gas_ext_code_copy)
            .with_memory_size(memory::memory_ext_code_copy),
    );

    t.set(opcodes::BLOCKHASH, Operation::new(block::blockhash, gas::EXT_STEP, 1, 1));
    t.set(opcodes::COINBASE, Operation::new(block::coinbase, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::TIMESTAMP, Operation::new(block::timestamp, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::NUMBER, Operation::new(block::number, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::DIFFICULTY, Operation::new(block::difficulty, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::GASLIMIT, Operation::new(block::gaslimit, gas::QUICK_STEP, 0, 1));

    t.set(opcodes::POP, Operation::new(stack_ops::pop, gas::QUICK_STEP, 1, 0));
    t.set(
        opcodes::MLOAD,
        Operation::new(memory_ops::mload, gas::FASTEST_STEP, 1, 1)
            .with_dynamic_gas(dynamic::gas_memory_expansion)
            .with_memory_size(memory::memory_mload),
    );
    t.set(
        opcodes::MSTORE,
        Operation::new(memory_ops::mstore, gas::FASTEST_STEP, 2, 0)
            .with_dynamic_gas(dynamic::gas_memory_expansion)
            .with_memory_size(memory::memory_mstore),
    );
    t.set(
        opcodes::MSTORE8,
        Operation::new(memory_ops::mstore8, gas::FASTEST_STEP, 2, 0)
            .with_dynamic_gas(dynamic::gas_memory_expansion)
            .with_memory_size(memory::memory_mstore8),
    );
    t.set(opcodes::SLOAD, Operation::new(storage::sload, gas::SLOAD_GAS_FRONTIER, 1, 1));
    t.set(
        opcodes::SSTORE,
        Operation::new(storage::sstore, 0, 2, 0).with_dynamic_gas(dynamic::gas_sstore_legacy),
    );
    t.set(opcodes::JUMP, Operation::new(control::jump, gas::MID_STEP, 1, 0));
    t.set(opcodes::JUMPI, Operation::new(control::jumpi, gas::SLOW_STEP, 2, 0));
    t.set(opcodes::PC, Operation::new(control::pc, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::MSIZE, Operation::new(memory_ops::msize, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::GAS, Operation::new(control::gas, gas::QUICK_STEP, 0, 1));
    t.set(opcodes::JUMPDEST, Operation::new(control::jumpdest, gas::JUMPDEST_GAS, 0, 0));

    for opcode in opcodes::PUSH1..=opcodes::PUSH32 {
        t.set(opcode, Operation::new(stack_ops::push_n, gas::FASTEST_STEP, 0, 1));
    }
    for (i, opcode) in (opcodes::DUP1..=opcodes::DUP16).enumerate() {
        let n = i + 1;
        t.set(
            opcode,
            Operation::new(stack_ops::dup_n, gas::FASTEST_STEP, 0, 0)
                .with_stack(min_dup_stack(n), max_dup_stack(n)),
        );
    }
    for (i, opcode) in (opcodes::SWAP1..=opcodes::SWAP16).enumerate() {
        let n = i + 1;
        t.set(
            opcode,
            Operation::new(stack_ops::swap_n, gas::FASTEST_STEP, 0, 0)
                .with_stack(min_swap_stack(n), max_swap_stack(n)),
        );
    }
    for (i, opcode) in (opcodes::LOG0..=opcodes::LOG4).enumerate() {
        t.set(
            opcode,
            Operation::new(logging::log_n, 0, i + 2, 0)
                .with_dynamic_gas(dynamic::gas_log)
                .with_memory_size(memory::memory_log),
        );
    }

    t.set(
        opcodes::CREATE,
        Operation::new(system::create, gas::CREATE_GAS, 3, 1)
            .with_dynamic_gas(dynamic::gas_memory_expansion)
            .with_memory_size(memory::memory_create),
    );
    t.set(
        opcodes::CALL,
        Operation::new(system::call, gas::CALL_GAS_FRONTIER, 7, 1)
            .with_dynamic_gas(dynamic::gas_call_frontier)
            .with_memory_size(memory::memory_call),
    );
    t.set(
        opcodes::CALLCODE,
        Operation::new(system::callcode, gas::CALL_GAS_FRONTIER, 7, 1)
            .with_dynamic_gas(dynamic::gas_call_code)
            .with_memory_size(memory::memory_call),
    );
    t.set(
        opcodes::RETURN,
        Operation::new(system::ret, 0, 2, 0)
            .with_dynamic_gas(dynamic::gas_memory_expansion)
            .with_memory_size(memory::memory_return),
    );
    t.set(
        opcodes::SELFDESTRUCT,
        Operation::new(system::selfdestruct, 0, 1, 0)
            .with_dynamic_gas(dynamic::gas_selfdestruct_frontier),
    );

    t
}

fn build(fork: Fork) -> JumpTable {
    let mut table = new_frontier_table();
    for layer in Fork::ALL {
        if layer > fork {
            break;
        }
        apply(&mut table, &patches(layer));
    }
    table.validate();
    table
}

lazy_static! {
    static ref FRONTIER: JumpTable = build(Fork::Frontier);
    static ref HOMESTEAD: JumpTable = build(Fork::Homestead);
    static ref TANGERINE_WHISTLE: JumpTable = build(Fork::TangerineWhistle);
    static ref SPURIOUS_DRAGON: JumpTable = build(Fork::SpuriousDragon);
    static ref BYZANTIUM: JumpTable = build(Fork::Byzantium);
    static ref CONSTANTINOPLE: JumpTable = build(Fork::Constantinople);
    static ref ISTANBUL: JumpTable = build(Fork::Istanbul);
    static ref BERLIN: JumpTable = build(Fork::Berlin);
    static ref LONDON: JumpTable = build(Fork::London);
}

pub(crate) fn table_for(fork: Fork) -> &'static JumpTable {
    match fork {
        Fork::Frontier => &FRONTIER,
        Fork::Homestead => &HOMESTEAD,
        Fork::TangerineWhistle => &TANGERINE_WHISTLE,
        Fork::SpuriousDragon => &SPURIOUS_DRAGON,
        Fork::Byzantium => &BYZANTIUM,
        Fork::Constantinople => &CONSTANTINOPLE,
        Fork::Istanbul => &ISTANBUL,
        Fork::Berlin => &BERLIN,
        Fork::London => &LONDON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_opcode_is_defined_on_london() {
        let table = JumpTable::for_fork(Fork::London);
        for byte in 0u8..=255 {
            let name = opcodes::opcode_name(byte);
            if name == "unknown" || byte == opcodes::INVALID {
                assert!(table.get(byte).is_undefined(), "0x{byte:02x} should be undefined");
            } else {
                assert!(!table.get(byte).is_undefined(), "{name} should be defined");
            }
        }
    }

    #[test]
    fn test_memory_gas_coupling_holds_everywhere() {
        for fork in Fork::ALL {
            let table = JumpTable::for_fork(fork);
            for byte in 0u8..=255 {
                let op = table.get(byte);
                assert!(op.memory_size.is_none() || op.dynamic_gas.is_some());
                assert!(op.min_stack <= op.max_stack);
                assert!(op.max_stack <= super::super::STACK_LIMIT);
            }
        }
    }

    #[test]
    fn test_opcode_addition_is_monotone() {
        for pair in Fork::ALL.windows(2) {
            let before = JumpTable::for_fork(pair[0]);
            let after = JumpTable::for_fork(pair[1]);
            for byte in 0u8..=255 {
                if !before.get(byte).is_undefined() {
                    assert!(
                        !after.get(byte).is_undefined(),
                        "0x{byte:02x} removed between {} and {}",
                        pair[0],
                        pair[1]
                    );
                }
            }
        }
    }

    #[test]
    fn test_patches_only_add_at_undefined_slots() {
        // rebuild layer by layer, asserting Add never clobbers
        let mut table = new_frontier_table();
        for fork in Fork::ALL {
            for patch in patches(fork) {
                if let Patch::Add { opcode, .. } = patch {
                    assert!(table.get(opcode).is_undefined());
                }
            }
            apply(&mut table, &patches(fork));
        }
    }

    #[test]
    fn test_fork_divergence_on_shifts() {
        assert!(JumpTable::for_fork(Fork::Byzantium).get(opcodes::SHL).is_undefined());
        assert!(!JumpTable::for_fork(Fork::Constantinople).get(opcodes::SHL).is_undefined());
    }

    #[test]
    fn test_repricing_schedule_for_sload() {
        let constant = |fork: Fork| JumpTable::for_fork(fork).get(opcodes::SLOAD).constant_gas;
        assert_eq!(constant(Fork::Frontier), 50);
        assert_eq!(constant(Fork::TangerineWhistle), 200);
        assert_eq!(constant(Fork::Istanbul), 800);
        // Berlin moves the whole cost into the access-list dynamic function
        assert_eq!(constant(Fork::Berlin), 0);
        assert!(JumpTable::for_fork(Fork::Berlin).get(opcodes::SLOAD).dynamic_gas.is_some());
    }

    #[test]
    fn test_tables_are_deeply_independent() {
        // mutating a freshly built table must not affect the shared ones
        let mut fresh = build(Fork::London);
        fresh.set(opcodes::ADD, super::super::UNDEFINED);
        assert!(!JumpTable::for_fork(Fork::London).get(opcodes::ADD).is_undefined());
    }
}
