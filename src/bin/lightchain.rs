#![forbid(unsafe_code)]
//! Bootstraps a ledger, appends blocks and prints the resulting chain.

use clap::Parser;
use colored::*;
use lightchain::blockchain::{Block, Ledger};
use lightchain::config::{load_config, load_config_from};
use lightchain::crypto::signing_service_for;
use lightchain::rng::OsRandomness;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_DATA: &str = "Some transaction data";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to ./lightchain.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the chain as JSON
    #[arg(long)]
    json: bool,

    /// Transaction payloads; each one becomes a block
    data: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    tracing_subscriber::fmt()
        .with_max_level(config.logging.tracing_level()?)
        .with_writer(std::io::stderr)
        .init();

    let signing_service = signing_service_for(config.signing.algorithm);
    let randomness = Arc::new(OsRandomness::new());
    let mut ledger = Ledger::with_config(signing_service, randomness, &config.ledger)?;

    let payloads = if cli.data.is_empty() {
        vec![DEFAULT_DATA.to_string()]
    } else {
        cli.data
    };
    for data in payloads {
        ledger.append(data)?;
    }
    ledger.validate_chain()?;

    let keypair = ledger.signing_service().generate_key_pair()?;
    let tip = Arc::clone(ledger.last_block());
    let signature = ledger.attest_block(&tip, &keypair.private_key)?;
    let attested = ledger.verify_attestation(&tip, &signature, &keypair.public_key);
    info!(height = tip.index, attested, "ledger ready");

    if cli.json {
        let blocks: Vec<&Block> = ledger.blocks().iter().map(|b| b.as_ref()).collect();
        let output = serde_json::json!({
            "blocks": blocks,
            "attestation": {
                "algorithm": keypair.public_key.algorithm(),
                "block_hash": tip.hash,
                "public_key": keypair.public_key.to_hex(),
                "signature": signature.to_hex(),
                "valid": attested,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "LightChain".bright_cyan().bold());
    println!("{}", "----------".bright_cyan());
    for block in ledger.blocks() {
        println!("{}", block.to_string().white());
        println!();
    }

    println!("{}", "Tip attestation".bright_green().underline());
    println!("  Algorithm:  {}", keypair.public_key.algorithm());
    println!("  Public key: {}", keypair.public_key.to_hex());
    println!("  Signature:  {}", signature.to_hex());
    let status = if attested {
        "valid".green().bold()
    } else {
        "INVALID".red().bold()
    };
    println!("  Status:     {}", status);
    println!();
    println!(
        "{}",
        format!("Ledger holds {} blocks.", ledger.len()).bright_white()
    );

    Ok(())
}
