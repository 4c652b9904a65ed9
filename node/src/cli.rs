//! # CLI Interface
//!
//! Command-line structure for the `hashchain` binary, via `clap` derive.
//! Every chain operation has a subcommand; `demo` replays the full
//! open / append / inspect / validate sequence in one go.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hashchain::config::DEFAULT_DATA_DIR;

use crate::logging::LogFormat;

/// Append-only, hash-linked block chain on local disk.
#[derive(Parser, Debug)]
#[command(
    name = "hashchain",
    about = "Append-only, hash-linked block chain on local disk",
    version,
    propagate_version = true
)]
pub struct HashchainCli {
    /// Directory holding the chain database. Created on first use.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "HASHCHAIN_DATA_DIR",
        default_value = DEFAULT_DATA_DIR
    )]
    pub data_dir: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(
        long,
        global = true,
        env = "HASHCHAIN_LOG",
        default_value = "hashchain=info,hashchain_node=info"
    )]
    pub log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open (or create) the chain, adding the genesis block if needed.
    Init,
    /// Append a block. The payload is parsed as JSON when it is valid JSON
    /// and stored as a plain string otherwise.
    Append {
        /// Block payload.
        payload: String,
    },
    /// Print the height of the last block.
    Height,
    /// Print the block at a height.
    Get {
        /// Block height.
        height: u64,
    },
    /// Check one block's stored hash against its contents.
    ValidateBlock {
        /// Block height.
        height: u64,
    },
    /// Check every block and every link. Exits non-zero on any finding.
    Validate,
    /// Print every block, one JSON object per line.
    Dump,
    /// Run the sample sequence: genesis, append, height, validate, read back.
    Demo,
    /// Print version information and exit.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        HashchainCli::command().debug_assert();
    }

    #[test]
    fn parses_height_argument() {
        let cli = HashchainCli::try_parse_from(["hashchain", "get", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Get { height: 3 }));
    }

    #[test]
    fn version_needs_no_data_dir() {
        let cli = HashchainCli::try_parse_from(["hashchain", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn rejects_negative_height() {
        assert!(HashchainCli::try_parse_from(["hashchain", "get", "-1"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = HashchainCli::try_parse_from([
            "hashchain",
            "validate",
            "--data-dir",
            "/tmp/chain",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/chain"));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Validate));
    }
}
