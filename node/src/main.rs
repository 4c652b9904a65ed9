// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # hashchain CLI
//!
//! Entry point for the `hashchain` binary. Parses CLI arguments, initializes
//! logging, opens the on-disk chain and runs one subcommand against it.
//!
//! Command output goes to stdout; logs go to stderr.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::Path;

use hashchain::storage::{Block, Chain, SledStore};
use hashchain::ChainService;

use cli::{Commands, HashchainCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = HashchainCli::parse();

    match cli.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        command => {
            logging::init_logging(&cli.log_level, cli.log_format);
            run_command(command, &cli.data_dir).await
        }
    }
}

/// Open the chain under `data_dir` and run one subcommand against it.
async fn run_command(command: Commands, data_dir: &Path) -> Result<()> {
    let mut chain = open_chain(data_dir)?;

    match command {
        Commands::Init => {
            println!("chain ready at {}", data_dir.display());
            println!("  height : {}", chain.height());
            println!("  tip    : {}", chain.tip().hash);
        }
        Commands::Append { payload } => {
            let block = chain
                .append(parse_payload(&payload))
                .context("failed to append block")?;
            println!("{}", to_json(&block)?);
        }
        Commands::Height => println!("{}", chain.height()),
        Commands::Get { height } => {
            let block = chain.get_block(height)?;
            println!("{}", to_json(&block)?);
        }
        Commands::ValidateBlock { height } => {
            let valid = chain.validate_block_at(height)?;
            println!("Block at {} validate status: {}", height, valid);
            if !valid {
                bail!("block {} failed validation", height);
            }
        }
        Commands::Validate => {
            let failed = chain.validate_chain()?;
            println!("{}", validation_report(&failed));
            if !failed.is_empty() {
                bail!("chain validation found {} errors", failed.len());
            }
        }
        Commands::Dump => {
            for block in chain.blocks()? {
                println!("{}", to_json(&block)?);
            }
        }
        Commands::Demo => return run_demo(chain).await,
        Commands::Version => unreachable!("version is handled before the chain is opened"),
    }

    chain.close().context("failed to flush chain store")?;
    Ok(())
}

/// Open the sled store under `data_dir` and load the chain from it.
fn open_chain(data_dir: &Path) -> Result<Chain<SledStore>> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let store = SledStore::open(data_dir)
        .with_context(|| format!("failed to open chain store at {}", data_dir.display()))?;
    let chain = Chain::open(store).context("failed to load chain")?;
    tracing::info!(path = %data_dir.display(), height = chain.height(), "chain opened");
    Ok(chain)
}

/// Walk the chain through the sample sequence via the chain service.
async fn run_demo(chain: Chain<SledStore>) -> Result<()> {
    let handle = ChainService::spawn(chain);

    println!("1. Get genesis block data");
    let genesis = handle.get_block(0).await?;
    println!("{}", to_json(&genesis)?);

    println!("2. Add new block");
    let body = format!("New test block at {}", chrono::Utc::now().to_rfc2822());
    handle.append(body).await?;

    println!("3. Get current block height");
    let height = handle.height().await?;
    println!("blockchain height: {}", height);
    let tip = u64::try_from(height).context("chain has no blocks")?;

    println!("4. Validate block at {}", tip);
    let valid = handle.validate_block_at(tip).await?;
    println!("Block at {} validate status: {}", tip, valid);

    println!("5. Get block data at {}", tip);
    let block = handle.get_block(tip).await?;
    println!("Block at {}: {}", tip, to_json(&block)?);

    println!("6. Validate entire block chain");
    let failed = handle.validate_chain().await?;
    println!("{}", validation_report(&failed));

    handle.shutdown().await?;
    Ok(())
}

/// Interpret a CLI payload: JSON when it parses, a plain string otherwise.
fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn to_json(block: &Block) -> Result<String> {
    serde_json::to_string(block).context("failed to encode block")
}

fn validation_report(failed: &[u64]) -> String {
    if failed.is_empty() {
        return "No errors detected".to_string();
    }
    let list: Vec<String> = failed.iter().map(u64::to_string).collect();
    format!("Block errors = {}\nBlocks: {}", failed.len(), list.join(","))
}

/// Prints version information to stdout.
fn print_version() {
    println!("hashchain {}", env!("CARGO_PKG_VERSION"));
    println!(
        "format    {} ({})",
        hashchain::config::FORMAT_VERSION,
        hashchain::config::HASH_ALGORITHM
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_json_is_kept_structured() {
        assert_eq!(parse_payload(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_payload("42"), json!(42));
        assert_eq!(parse_payload(r#""quoted""#), json!("quoted"));
    }

    #[test]
    fn payload_text_becomes_string() {
        assert_eq!(parse_payload("A"), json!("A"));
        assert_eq!(parse_payload("hello world"), json!("hello world"));
        assert_eq!(parse_payload(""), json!(""));
    }

    #[test]
    fn report_lists_indices() {
        assert_eq!(validation_report(&[]), "No errors detected");
        assert_eq!(
            validation_report(&[0, 1, 1]),
            "Block errors = 3\nBlocks: 0,1,1"
        );
    }

    #[test]
    fn open_chain_creates_directory_and_genesis() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_dir = dir.path().join("nested").join("chaindata");

        let chain = open_chain(&data_dir).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(chain.height(), 0);
        chain.close().unwrap();

        let mut reopened = open_chain(&data_dir).unwrap();
        reopened.append(parse_payload("A")).unwrap();
        assert_eq!(reopened.height(), 1);
        assert!(reopened.validate_chain().unwrap().is_empty());
    }

    #[tokio::test]
    async fn demo_runs_against_fresh_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let chain = open_chain(dir.path()).unwrap();
        run_demo(chain).await.unwrap();

        let chain = open_chain(dir.path()).unwrap();
        assert_eq!(chain.height(), 1);
        assert!(chain.validate_chain().unwrap().is_empty());
    }
}
