//! CLI argument definitions using clap
//!
//! Commands:
//! - txtdb tables
//! - txtdb count --table <name>
//! - txtdb get --table <name> <row>
//! - txtdb select --table <name> [FIELD=NEEDLE]...
//! - txtdb insert --table <name> FIELD=VALUE...
//! - txtdb update --table <name> <row> FIELD=VALUE...

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// txtdb - fixed-width text file tables
#[derive(Parser, Debug)]
#[command(name = "txtdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./txtdb.json")]
    pub config: PathBuf,

    /// Log to stderr (-v info, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured tables
    Tables,

    /// Print the number of rows in a table
    Count {
        #[arg(long, short)]
        table: String,
    },

    /// Print one row
    Get {
        #[arg(long, short)]
        table: String,

        /// 1-based row number
        row: usize,
    },

    /// Print rows whose fields contain every given needle
    Select {
        #[arg(long, short)]
        table: String,

        #[arg(value_name = "FIELD=NEEDLE")]
        filters: Vec<String>,
    },

    /// Append a row and commit it
    Insert {
        #[arg(long, short)]
        table: String,

        #[arg(value_name = "FIELD=VALUE", required = true)]
        values: Vec<String>,
    },

    /// Overwrite fields of one row and commit
    Update {
        #[arg(long, short)]
        table: String,

        /// 1-based row number
        row: usize,

        #[arg(value_name = "FIELD=VALUE", required = true)]
        values: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
