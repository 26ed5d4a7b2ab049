//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroql query <database_dir> <input_file> <output_file> [--config <path>]
//! - aeroql explain <database_dir> <input_file> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AeroQL - a deterministic, pull-based SQL engine over CSV tables
#[derive(Parser, Debug)]
#[command(name = "aeroql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute the query in a file and write its result
    Query {
        /// Directory holding schema.txt and data/
        database_dir: PathBuf,

        /// File holding one SQL SELECT statement
        input_file: PathBuf,

        /// Result file, written only if the query succeeds
        output_file: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the plan for the query in a file as JSON
    Explain {
        /// Directory holding schema.txt and data/
        database_dir: PathBuf,

        /// File holding one SQL SELECT statement
        input_file: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
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
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "aeroql", "query", "db", "q.sql", "out.csv", "--config", "c.json",
        ])
        .unwrap();
        match cli.command {
            Command::Query {
                database_dir,
                output_file,
                config,
                ..
            } => {
                assert_eq!(database_dir, PathBuf::from("db"));
                assert_eq!(output_file, PathBuf::from("out.csv"));
                assert_eq!(config, Some(PathBuf::from("c.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_explain_requires_input() {
        assert!(Cli::try_parse_from(["aeroql", "explain", "db"]).is_err());
        let cli = Cli::try_parse_from(["aeroql", "explain", "db", "q.sql"]).unwrap();
        assert!(matches!(cli.command, Command::Explain { config: None, .. }));
    }
}
