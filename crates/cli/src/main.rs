use alloy::primitives::{Address, U256};
use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use embervm::core::{
    context::{BlockContext, TxContext},
    evm::Evm,
    fork::Fork,
    state::{InMemoryState, StateDb},
};

const CONTRACT: Address = Address::repeat_byte(0xc0);
const CALLER: Address = Address::repeat_byte(0xee);

#[derive(Debug, Parser)]
#[clap(
    name = "embervm",
    about = "Run EVM bytecode against a fresh in-memory state",
    version
)]
pub struct Arguments {
    /// Runtime bytecode, hex encoded (with or without 0x prefix)
    pub code: String,

    /// Call data, hex encoded
    #[clap(long, default_value = "")]
    pub calldata: String,

    /// Hard fork to execute under (frontier, homestead, tangerine,
    /// spurious, byzantium, constantinople, istanbul, berlin, london)
    #[clap(long, default_value = "london")]
    pub fork: Fork,

    /// Gas available to the call
    #[clap(long, default_value_t = 10_000_000)]
    pub gas: u64,

    /// Wei sent with the call
    #[clap(long, default_value = "0")]
    pub value: U256,

    /// Verbosity (-v for debug, -vv for per-step tracing)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let stripped = input.trim().trim_start_matches("0x");
    hex::decode(stripped).wrap_err_with(|| format!("invalid hex input: {input}"))
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    // setup logging
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let code = decode_hex(&args.code).wrap_err("failed to decode bytecode")?;
    let calldata = decode_hex(&args.calldata).wrap_err("failed to decode calldata")?;

    let mut state = InMemoryState::new();
    state.insert_account(CONTRACT, U256::ZERO, code);
    state.add_balance(CALLER, U256::MAX);

    let tx = TxContext { origin: CALLER, gas_price: U256::from(1u8) };
    let mut evm = Evm::new(&mut state, BlockContext::default(), tx, args.fork);
    let result = evm.call(CALLER, CONTRACT, calldata, args.gas, args.value);

    match &result.error {
        None => println!("status:   success"),
        Some(error) => println!("status:   {error}"),
    }
    println!("fork:     {}", args.fork);
    println!("gas used: {}", args.gas - result.gas_left);
    println!("returned: 0x{}", hex::encode(&result.return_data));

    for (index, log) in state.logs().iter().enumerate() {
        println!(
            "log {index}:   address={} topics=[{}] data=0x{}",
            log.address,
            log.topics
                .iter()
                .map(|topic| format!("{topic:#x}"))
                .collect::<Vec<_>>()
                .join(", "),
            hex::encode(&log.data)
        );
    }

    Ok(())
}
