//! End-to-end execution tests: bytecode in, (stack, gas, state, logs) out.

use alloy::primitives::{Address, U256};
use embervm::core::{
    context::{BlockContext, TxContext},
    contract::Contract,
    error::VmError,
    evm::Evm,
    fork::Fork,
    interpreter::{self, Frame, FrameResult},
    state::{InMemoryState, StateDb},
};

const CONTRACT: Address = Address::repeat_byte(0xc0);
const CALLER: Address = Address::repeat_byte(0xee);

fn run_with_state(
    fork: Fork,
    state: &mut InMemoryState,
    code: &[u8],
    gas: u64,
) -> (Frame, FrameResult) {
    let mut evm = Evm::new(state, BlockContext::default(), TxContext::default(), fork);
    let contract = Contract::new(CONTRACT, CALLER, U256::ZERO, code.to_vec());
    let mut frame = Frame::new(contract, gas);
    let result = interpreter::run(&mut evm, &mut frame);
    (frame, result)
}

fn run(fork: Fork, code: &[u8], gas: u64) -> (Frame, FrameResult) {
    let mut state = InMemoryState::new();
    run_with_state(fork, &mut state, code, gas)
}

#[test]
fn test_push_add_stop_on_every_fork() {
    // PUSH1 5, PUSH1 3, ADD, STOP
    let code = hex::decode("6005600301 00".replace(' ', "")).expect("valid hex");
    for fork in Fork::ALL {
        let (frame, result) = run(fork, &code, 1_000_000);
        assert!(result.error.is_none(), "{fork}: {:?}", result.error);
        assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::from(8u8), "{fork}");
        assert_eq!(1_000_000 - frame.gas, 9, "{fork}");
    }
}

#[test]
fn test_division_by_zero_yields_zero() {
    // PUSH1 0, PUSH1 5, DIV, STOP
    let code = [0x60, 0x00, 0x60, 0x05, 0x04, 0x00];
    let (frame, result) = run(Fork::London, &code, 1_000_000);
    assert!(result.error.is_none());
    assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::ZERO);
}

#[test]
fn test_signed_division_by_zero_yields_zero() {
    // PUSH1 0, PUSH32 -1, SDIV, STOP
    let mut code = vec![0x60, 0x00, 0x7f];
    code.extend_from_slice(&[0xff; 32]);
    code.extend_from_slice(&[0x05, 0x00]);
    let (frame, result) = run(Fork::London, &code, 1_000_000);
    assert!(result.error.is_none());
    assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::ZERO);
}

#[test]
fn test_fork_divergence_on_shl() {
    // PUSH1 1, PUSH1 2, SHL, STOP
    let code = [0x60, 0x01, 0x60, 0x02, 0x1b, 0x00];

    let (_, result) = run(Fork::Byzantium, &code, 1_000_000);
    assert_eq!(result.error, Some(VmError::InvalidOpcode(0x1b)));

    for fork in [Fork::Constantinople, Fork::Istanbul, Fork::Berlin, Fork::London] {
        let (frame, result) = run(fork, &code, 1_000_000);
        assert!(result.error.is_none(), "{fork}");
        assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::from(4u8), "{fork}");
    }
}

#[test]
fn test_eip2929_sload_cold_then_warm() {
    // PUSH1 5, SLOAD, POP, PUSH1 5, SLOAD, STOP
    let code = [0x60, 0x05, 0x54, 0x50, 0x60, 0x05, 0x54, 0x00];
    let mut state = InMemoryState::new();
    let (frame, result) = run_with_state(Fork::Berlin, &mut state, &code, 1_000_000);

    assert!(result.error.is_none());
    // 3 + 2100 (cold) + 2 + 3 + 100 (warm)
    assert_eq!(1_000_000 - frame.gas, 2208);
    assert!(state.slot_in_access_list(CONTRACT, U256::from(5u8)));
}

#[test]
fn test_eip2929_balance_cold_then_warm() {
    // PUSH20 addr, BALANCE, POP, PUSH20 addr, BALANCE, STOP
    let mut code = vec![0x73];
    code.extend_from_slice(&[0x11; 20]);
    code.push(0x31);
    code.push(0x50);
    code.push(0x73);
    code.extend_from_slice(&[0x11; 20]);
    code.extend_from_slice(&[0x31, 0x00]);

    let (frame, result) = run(Fork::Berlin, &code, 1_000_000);
    assert!(result.error.is_none());
    // 3 + 2600 (cold) + 2 + 3 + 100 (warm)
    assert_eq!(1_000_000 - frame.gas, 2708);
}

#[test]
fn test_sload_constant_pricing_per_fork() {
    // PUSH1 1, SLOAD, STOP
    let code = [0x60, 0x01, 0x54, 0x00];
    let gas_used = |fork| {
        let (frame, result) = run(fork, &code, 1_000_000);
        assert!(result.error.is_none());
        1_000_000 - frame.gas
    };
    assert_eq!(gas_used(Fork::Frontier), 3 + 50);
    assert_eq!(gas_used(Fork::TangerineWhistle), 3 + 200);
    assert_eq!(gas_used(Fork::Istanbul), 3 + 800);
}

#[test]
fn test_exp_byte_pricing_per_fork() {
    // PUSH1 5 (exponent), PUSH1 2 (base), EXP, STOP
    let code = [0x60, 0x05, 0x60, 0x02, 0x0a, 0x00];

    let (frame, result) = run(Fork::Homestead, &code, 1_000_000);
    assert!(result.error.is_none());
    assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::from(32u8));
    assert_eq!(1_000_000 - frame.gas, 3 + 3 + 10 + 10);

    let (frame, _) = run(Fork::SpuriousDragon, &code, 1_000_000);
    assert_eq!(1_000_000 - frame.gas, 3 + 3 + 10 + 50);
}

#[test]
fn test_keccak256_of_empty_slice() {
    // PUSH1 0, PUSH1 0, KECCAK256, STOP
    let code = [0x60, 0x00, 0x60, 0x00, 0x20, 0x00];
    let (frame, result) = run(Fork::London, &code, 1_000_000);
    assert!(result.error.is_none());
    assert_eq!(
        frame.stack.peek(0).expect("stack empty"),
        U256::from_be_bytes(embervm::core::state::EMPTY_CODE_HASH.0)
    );
    assert_eq!(1_000_000 - frame.gas, 3 + 3 + 30);
}

#[test]
fn test_memory_expansion_is_charged_quadratically() {
    // MSTORE at word 32*32: PUSH1 1, PUSH2 0x0400, MSTORE, STOP
    let code = [0x60, 0x01, 0x61, 0x04, 0x00, 0x52, 0x00];
    let (frame, result) = run(Fork::London, &code, 1_000_000);
    assert!(result.error.is_none());
    assert_eq!(frame.memory.len(), 0x420);
    // 3 + 3 + (3 + expansion to 33 words: 3*33 + 33*33/512 = 101)
    assert_eq!(1_000_000 - frame.gas, 3 + 3 + 3 + 101);
}

#[test]
fn test_out_of_gas_halts() {
    let code = [0x60, 0x01, 0x60, 0x02, 0x01, 0x00];
    let (frame, result) = run(Fork::London, &code, 2);
    assert_eq!(result.error, Some(VmError::OutOfGas));
    assert_eq!(frame.gas, 2);
}

#[test]
fn test_valid_and_invalid_jumps() {
    // PUSH1 3, JUMP, JUMPDEST, STOP
    let code = [0x60, 0x03, 0x56, 0x5b, 0x00];
    let (_, result) = run(Fork::London, &code, 1_000_000);
    assert!(result.error.is_none());

    // PUSH1 4, JUMP, JUMPDEST, STOP - target is the STOP byte
    let code = [0x60, 0x04, 0x56, 0x5b, 0x00];
    let (_, result) = run(Fork::London, &code, 1_000_000);
    assert_eq!(result.error, Some(VmError::InvalidJump));

    // jump into PUSH data: PUSH1 1, JUMP
    let code = [0x60, 0x01, 0x56, 0x00];
    let (_, result) = run(Fork::London, &code, 1_000_000);
    assert_eq!(result.error, Some(VmError::InvalidJump));
}

#[test]
fn test_revert_returns_payload_and_keeps_gas() {
    // PUSH1 0xff, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, REVERT
    let code = [0x60, 0xff, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xfd];
    let (frame, result) = run(Fork::Byzantium, &code, 1_000_000);
    assert_eq!(result.error, Some(VmError::ExecutionReverted));
    assert_eq!(result.output, vec![0xff]);
    assert!(frame.gas > 0);
}

#[test]
fn test_log1_appends_event_record() {
    // PUSH1 0x7f, PUSH1 0, MSTORE8, PUSH1 0xaa, PUSH1 1, PUSH1 0, LOG1, STOP
    let code = [0x60, 0x7f, 0x60, 0x00, 0x53, 0x60, 0xaa, 0x60, 0x01, 0x60, 0x00, 0xa1, 0x00];
    let mut state = InMemoryState::new();
    let (_, result) = run_with_state(Fork::London, &mut state, &code, 1_000_000);

    assert!(result.error.is_none());
    let logs = state.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].address, CONTRACT);
    assert_eq!(logs[0].topics, vec![U256::from(0xaau8)]);
    assert_eq!(logs[0].data, vec![0x7f]);
}

#[test]
fn test_sstore_clearing_refund_schedule() {
    // PUSH1 0 (value), PUSH1 1 (key), SSTORE, STOP
    let code = [0x60, 0x00, 0x60, 0x01, 0x55, 0x00];

    for (fork, refund) in [(Fork::Berlin, 15000u64), (Fork::London, 4800u64)] {
        let mut state = InMemoryState::new();
        state.set_storage(CONTRACT, U256::from(1u8), U256::from(1u8));
        state.commit();

        let (frame, result) = run_with_state(fork, &mut state, &code, 1_000_000);
        assert!(result.error.is_none(), "{fork}");
        assert_eq!(state.refund(), refund, "{fork}");
        // 3 + 3 + cold slot 2100 + reset (5000 - 2100)
        assert_eq!(1_000_000 - frame.gas, 3 + 3 + 2100 + 2900, "{fork}");
    }
}

#[test]
fn test_sstore_net_metering_noop_write() {
    // writing the current value back costs a warm read (Istanbul: 800)
    let code = [0x60, 0x07, 0x60, 0x01, 0x55, 0x00];
    let mut state = InMemoryState::new();
    state.set_storage(CONTRACT, U256::from(1u8), U256::from(7u8));
    state.commit();

    let (frame, result) = run_with_state(Fork::Istanbul, &mut state, &code, 1_000_000);
    assert!(result.error.is_none());
    assert_eq!(1_000_000 - frame.gas, 3 + 3 + 800);
    assert_eq!(state.refund(), 0);
}

#[test]
fn test_sstore_sentry_rejects_low_gas_frames() {
    let code = [0x60, 0x01, 0x60, 0x01, 0x55, 0x00];
    // 6 gas for the pushes, then exactly the sentry threshold remains
    let (_, result) = run(Fork::Istanbul, &code, 6 + 2300);
    assert_eq!(result.error, Some(VmError::OutOfGas));
}

#[test]
fn test_call_forwards_all_but_one_64th() {
    // callee returns its gas counter as a word
    // GAS, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
    let callee_code = vec![0x5a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
    let callee = Address::repeat_byte(0x11);

    // PUSH1 32 (ret_size), PUSH1 0 (ret_off), PUSH1 0, PUSH1 0, PUSH1 0,
    // PUSH20 callee, PUSH3 0xffffff (gas), CALL, POP, MLOAD 0... keep the
    // returned word in memory and load it
    let mut code = vec![0x60, 0x20, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x73];
    code.extend_from_slice(callee.as_slice());
    code.extend_from_slice(&[0x62, 0xff, 0xff, 0xff, 0xf1, 0x50, 0x60, 0x00, 0x51, 0x00]);

    let mut state = InMemoryState::new();
    state.insert_account(callee, U256::ZERO, callee_code);

    let gas_limit = 100_000u64;
    let (frame, result) = run_with_state(Fork::London, &mut state, &code, gas_limit);
    assert!(result.error.is_none(), "{:?}", result.error);

    // replicate the caller-side pipeline: 7 pushes (21), CALL constant
    // (warm cost 100), cold account surcharge (2500), memory expansion for
    // the return area (3); forwarded = g - g/64 since the request is larger
    let available = gas_limit - 21 - 100 - 2500 - 3;
    let forwarded = available - available / 64;
    // the callee spent 2 gas on GAS before reading the counter
    assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::from(forwarded - 2));
}

#[test]
fn test_call_requesting_less_than_cap_gets_exactly_that() {
    let callee_code = vec![0x5a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
    let callee = Address::repeat_byte(0x11);

    // identical shape, but request only 5000 gas
    let mut code = vec![0x60, 0x20, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x73];
    code.extend_from_slice(callee.as_slice());
    code.extend_from_slice(&[0x61, 0x13, 0x88, 0xf1, 0x50, 0x60, 0x00, 0x51, 0x00]);

    let mut state = InMemoryState::new();
    state.insert_account(callee, U256::ZERO, callee_code);

    let (frame, result) = run_with_state(Fork::London, &mut state, &code, 100_000);
    assert!(result.error.is_none());
    assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::from(5000u64 - 2));
}

#[test]
fn test_staticcall_blocks_state_writes() {
    // callee: PUSH1 1, PUSH1 1, SSTORE, STOP
    let callee_code = vec![0x60, 0x01, 0x60, 0x01, 0x55, 0x00];
    let callee = Address::repeat_byte(0x11);

    // PUSH1 0 x4, PUSH20 callee, PUSH2 0xffff, STATICCALL, STOP
    let mut code = vec![0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x73];
    code.extend_from_slice(callee.as_slice());
    code.extend_from_slice(&[0x61, 0xff, 0xff, 0xfa, 0x00]);

    let mut state = InMemoryState::new();
    state.insert_account(callee, U256::ZERO, callee_code);

    let (frame, result) = run_with_state(Fork::London, &mut state, &code, 1_000_000);
    assert!(result.error.is_none());
    // the sub-call failed, pushing 0
    assert_eq!(frame.stack.peek(0).expect("stack empty"), U256::ZERO);
    assert_eq!(state.storage(callee, U256::from(1u8)), U256::ZERO);
}

#[test]
fn test_selfdestruct_moves_balance_and_schedules_refund() {
    let beneficiary = Address::repeat_byte(0x11);
    // PUSH20 beneficiary, SELFDESTRUCT
    let mut code = vec![0x73];
    code.extend_from_slice(beneficiary.as_slice());
    code.push(0xff);

    for (fork, refund) in [(Fork::Berlin, 24000u64), (Fork::London, 0u64)] {
        let mut state = InMemoryState::new();
        state.add_balance(CONTRACT, U256::from(77u8));

        let (frame, result) = run_with_state(fork, &mut state, &code, 1_000_000);
        assert!(result.error.is_none(), "{fork}");
        assert_eq!(state.balance(beneficiary), U256::from(77u8), "{fork}");
        assert!(state.has_self_destructed(CONTRACT), "{fork}");
        assert_eq!(state.refund(), refund, "{fork}");
        // 3 + cold beneficiary 2600 + 5000 + new-account 25000
        assert_eq!(1_000_000 - frame.gas, 3 + 2600 + 5000 + 25000, "{fork}");
    }
}

#[test]
fn test_returndatacopy_faults_out_of_range() {
    // no sub-call was made, so any read is out of range:
    // PUSH1 1, PUSH1 0, PUSH1 0, RETURNDATACOPY
    let code = [0x60, 0x01, 0x60, 0x00, 0x60, 0x00, 0x3e, 0x00];
    let (_, result) = run(Fork::Byzantium, &code, 1_000_000);
    assert_eq!(result.error, Some(VmError::ReturnDataOutOfBounds));
}

#[test]
fn test_stack_underflow_and_overflow_are_pre_checked() {
    // ADD on an empty stack
    let (_, result) = run(Fork::London, &[0x01, 0x00], 1_000_000);
    assert_eq!(result.error, Some(VmError::StackUnderflow));

    // 1025 pushes
    let mut code = Vec::new();
    for _ in 0..1025 {
        code.extend_from_slice(&[0x60, 0x01]);
    }
    let (frame, result) = run(Fork::London, &code, 1_000_000);
    assert_eq!(result.error, Some(VmError::StackOverflow));
    assert_eq!(frame.stack.len(), 1024);
}

#[test]
fn test_execution_is_deterministic() {
    let code = [0x60, 0x05, 0x60, 0x03, 0x01, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
    let (frame_a, result_a) = run(Fork::London, &code, 1_000_000);
    let (frame_b, result_b) = run(Fork::London, &code, 1_000_000);

    assert_eq!(result_a.output, result_b.output);
    assert_eq!(frame_a.gas, frame_b.gas);
    assert_eq!(frame_a.stack, frame_b.stack);
}

#[test]
fn test_undefined_opcode_consumes_frame() {
    let (_, result) = run(Fork::London, &[0xef, 0x00], 1_000_000);
    assert_eq!(result.error, Some(VmError::InvalidOpcode(0xef)));
}
