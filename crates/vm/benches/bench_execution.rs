//! Benchmark for the dispatch loop on a tight countdown cycle.

use alloy::primitives::{Address, U256};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use embervm::core::{
    context::{BlockContext, TxContext},
    contract::Contract,
    evm::Evm,
    fork::Fork,
    interpreter::{self, Frame},
    state::InMemoryState,
};

// PUSH2 1000, JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH1 3, JUMPI, STOP
const COUNTDOWN: &[u8] =
    &[0x61, 0x03, 0xe8, 0x5b, 0x60, 0x01, 0x90, 0x03, 0x80, 0x60, 0x03, 0x57, 0x00];

fn bench_countdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("embervm");

    group.sample_size(200);
    group.bench_function(BenchmarkId::from_parameter("countdown_1000"), |b| {
        b.iter(|| {
            let mut state = InMemoryState::new();
            let mut evm = Evm::new(
                &mut state,
                BlockContext::default(),
                TxContext::default(),
                Fork::London,
            );

            let contract =
                Contract::new(Address::ZERO, Address::ZERO, U256::ZERO, COUNTDOWN.to_vec());
            let mut frame = Frame::new(contract, 10_000_000);
            let result = interpreter::run(&mut evm, &mut frame);
            assert!(result.error.is_none());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_countdown);
criterion_main!(benches);
