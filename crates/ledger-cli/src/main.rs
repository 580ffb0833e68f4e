use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ledger_core::{
    encoding::{abbreviate, unix_timestamp},
    Block, Chain, ChainConfig, Difficulty, MiningOrder, Payload,
};
use serde_json::{json, Value};
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Build, mine, tamper with and validate an in-memory hash-linked ledger")]
struct Cli {
    /// Log at DEBUG unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a chain of transfers, tamper with block 1 and show what validation sees
    Demo {
        #[command(flatten)]
        mining: MiningArgs,
        /// Print chain dumps as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Mine a run of blocks and report attempts and time per block
    Mine {
        #[command(flatten)]
        mining: MiningArgs,
        /// Number of blocks to mine after genesis
        #[arg(long, default_value_t = 2)]
        blocks: u64,
        /// Payload prefix; block i carries "<data> i"
        #[arg(long, default_value = "Transaction Data")]
        data: String,
    },
}

#[derive(Args, Debug, Default)]
struct MiningArgs {
    /// JSON file with `difficulty`, `order` and `parallel` keys
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leading hex zeros required of a mined hash
    #[arg(long, allow_negative_numbers = true)]
    difficulty: Option<i64>,
    /// mine-then-link or link-then-mine
    #[arg(long)]
    order: Option<MiningOrder>,
    /// Search nonces on all cores
    #[arg(long)]
    parallel: bool,
}

impl MiningArgs {
    /// File values first, then flags on top.
    fn resolve(&self) -> Result<ChainConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => ChainConfig::default(),
        };
        if let Some(d) = self.difficulty {
            config.difficulty = Difficulty::try_from(d)?;
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if self.parallel {
            config.parallel = true;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    match cli.cmd {
        Command::Demo { mining, json } => demo(&mining.resolve()?, json),
        Command::Mine {
            mining,
            blocks,
            data,
        } => mine_run(&mining.resolve()?, blocks, &data),
    }
}

fn print_chain<D: Payload + serde::Serialize>(
    title: &str,
    chain: &Chain<D>,
    json: bool,
) -> Result<()> {
    println!("\n--- {title} ---");
    if json {
        println!("{}", serde_json::to_string_pretty(chain)?);
    } else {
        for block in chain {
            println!("{block}");
            println!("{}", "-".repeat(20));
        }
    }
    Ok(())
}

fn report_validity<D: Payload>(label: &str, chain: &Chain<D>) {
    match chain.verify() {
        Ok(()) => println!("{label}: valid"),
        Err(err) => println!("{label}: {err}"),
    }
}

fn demo(config: &ChainConfig, json: bool) -> Result<()> {
    info!(
        "demo with difficulty {} ({}, parallel: {})",
        config.difficulty, config.order, config.parallel
    );
    let mut chain: Chain<Value> = Chain::new();
    let transfers = [
        json!({"amount": 10, "to": "Alice", "from": "Bob"}),
        json!({"amount": 5, "to": "Charlie", "from": "Alice"}),
        json!({"amount": 12, "to": "Bob", "from": "Charlie"}),
    ];
    for (i, data) in transfers.into_iter().enumerate() {
        let index = i as u64 + 1;
        println!("Creating block {index}...");
        let report = chain.mine_and_append(Block::unlinked(index, data), config)?;
        println!(
            "  {} attempts in {:.4}s",
            report.attempts,
            report.elapsed.as_secs_f64()
        );
    }
    print_chain("Blockchain", &chain, json)?;
    report_validity("Initial chain", &chain);

    println!("\n--- Tampering with block 1 ---");
    let tampered = chain.get_mut(1).context("chain has no block 1")?;
    let original = std::mem::replace(
        &mut tampered.data,
        json!({"amount": 1000, "to": "Alice", "from": "Bob"}),
    );
    println!("Original data: {original}");
    println!("Tampered data: {}", tampered.data);
    report_validity("After editing data only", &chain);

    let tampered = chain.get_mut(1).context("chain has no block 1")?;
    tampered.rehash();
    println!("Recomputed hash for block 1: {}", abbreviate(&tampered.hash));
    print_chain("Blockchain after tampering", &chain, json)?;
    report_validity("After rehashing block 1", &chain);

    let resealed = chain.reseal_from(2);
    println!("\nRelinked and rehashed {resealed} following block(s)");
    print_chain("Blockchain after resealing", &chain, json)?;
    report_validity("After resealing", &chain);
    Ok(())
}

fn mine_run(config: &ChainConfig, blocks: u64, data: &str) -> Result<()> {
    let mut chain: Chain<String> = Chain::new();
    println!(
        "Mining {blocks} block(s) at difficulty {} ({}, parallel: {})",
        config.difficulty, config.order, config.parallel
    );
    for index in 1..=blocks {
        let block = Block::new(index, unix_timestamp(), format!("{data} {index}"), "", 0);
        let report = chain.mine_and_append(block, config)?;
        let stored = chain.latest()?;
        println!("Block {index} mined: {}", stored.hash);
        println!("  Nonce attempts needed: {}", report.attempts);
        println!("  Time taken: {:.4} seconds", report.elapsed.as_secs_f64());
        println!("  Hash rate: {:.0} H/s", report.hash_rate());
    }
    report_validity("Chain", &chain);
    Ok(())
}
