//! CLI argument definitions using clap
//!
//! Commands:
//! - zipstore build
//! - zipstore lookup <KEY>...
//! - zipstore export --output <path>
//! - zipstore extremes
//! - zipstore info
//!
//! Every command takes `--config` plus flags overriding the file's paths.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// zipstore - length-prefixed postal code store with an offset index
#[derive(Parser, Debug)]
#[command(name = "zipstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Configuration file and path overrides shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Delimited source dataset
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Store file
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Index file
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert the source dataset into a store and write its index
    Build {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Look up one or more postal codes
    Lookup {
        #[command(flatten)]
        paths: PathArgs,

        /// Keys to look up
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Write the store back out as CSV
    Export {
        #[command(flatten)]
        paths: PathArgs,

        /// Output CSV file
        #[arg(long)]
        output: PathBuf,
    },

    /// Report the furthest postal codes in each direction, per state
    Extremes {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Show the store header and index size
    Info {
        #[command(flatten)]
        paths: PathArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup_keys() {
        let cli = Cli::try_parse_from(["zipstore", "lookup", "--store", "z.dat", "00501", "99950"])
            .unwrap();
        match cli.command {
            Command::Lookup { paths, keys } => {
                assert_eq!(keys, vec!["00501", "99950"]);
                assert_eq!(paths.store, Some(PathBuf::from("z.dat")));
                assert!(paths.config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_requires_a_key() {
        assert!(Cli::try_parse_from(["zipstore", "lookup"]).is_err());
    }

    #[test]
    fn test_export_requires_output() {
        assert!(Cli::try_parse_from(["zipstore", "export"]).is_err());
        assert!(Cli::try_parse_from(["zipstore", "export", "--output", "out.csv"]).is_ok());
    }
}
