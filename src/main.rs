use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::error::Error;
use std::path::Path;
use stock_rebalancer::io::{input, reporting, sample};
use stock_rebalancer::{BalancingConfig, BalancingEngine};
use tracing_subscriber::EnvFilter;

const SAMPLE_BRANCHES: [&str; 6] = ["central", "north", "south", "east", "west", "airport"];
const SAMPLE_PRODUCTS: usize = 40;
const SAMPLE_SEED: u64 = 2024;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Branch Stock Rebalancing ===");

    // 1. CONFIGURATION
    // Defaults, overridable through REBALANCE_* environment variables.
    let engine = BalancingEngine::new(BalancingConfig::from_env()?)?;
    let config = engine.config();
    println!(
        "Period: {} days, coverage: {} days, balance cap: {}",
        config.period_days, config.coverage_days, config.max_balance_for_need
    );

    // 2. LOAD THE NETWORK
    // usage: stock-rebalancer [input.csv] [output_dir]
    let args: Vec<String> = env::args().collect();
    let network = match args.get(1) {
        Some(path) => {
            println!("Reading branch records from {}", path);
            input::read_network_from_path(path, None)?
        }
        None => {
            println!("No input given, generating a sample network");
            let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
            sample::generate_sample_network(
                &SAMPLE_BRANCHES,
                SAMPLE_PRODUCTS,
                sample::SampleProfile::default(),
                &mut rng,
            )?
        }
    };

    // 3. RUN BOTH MATCHING ROUNDS
    let outcome = engine.run(&network);

    // 4. EXPORT RESULTS
    let output_dir = Path::new(args.get(2).map(String::as_str).unwrap_or("."));
    std::fs::create_dir_all(output_dir)?;
    let allocation_path = output_dir.join("allocation.csv");
    let withdrawals_path = output_dir.join("withdrawals.csv");
    reporting::write_allocation_table_to_path(&allocation_path.to_string_lossy(), &outcome)?;
    reporting::write_withdrawal_log_to_path(&withdrawals_path.to_string_lossy(), &outcome)?;

    // 5. SUMMARY
    println!("\n=== Summary ===");
    println!("{}", outcome.summary());

    println!("\nRebalancing Complete.");
    Ok(())
}
