use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use ecom_athena::reports::DEFAULT_TOP_CUSTOMERS;
use ecom_athena::Report;

/// Operator tool for the transaction pipeline.
#[derive(Parser, Debug)]
#[command(name = "ecom", about = "Transform, generate and report on e-commerce transactions")]
pub struct CliArgs {
    /// Config profile; `PROD` reads `PROD_<KEY>` before `<KEY>`
    #[arg(long, env = "ECOM_PROFILE", default_value = "", global = true)]
    pub profile: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transform a raw object in the configured storage backend
    Transform {
        /// Key of the raw JSON object, e.g. raw/date=2024-03-15/transactions_1.json
        key: String,
    },
    /// Transform a local JSON file into a local Parquet file
    TransformFile {
        #[arg(long, short)]
        input: PathBuf,
        /// Defaults to the input path with raw/ and .json swapped for processed/ and .parquet
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write random transactions to the configured storage backend
    Generate {
        #[arg(long, short, default_value_t = 1)]
        count: u32,
    },
    /// Print a report's SQL, or run it on Athena
    Report {
        kind: ReportKind,
        /// Rows for top-customers (1..=1000)
        #[arg(long, default_value_t = DEFAULT_TOP_CUSTOMERS)]
        limit: u32,
        /// Execute on Athena instead of printing the SQL
        #[arg(long)]
        run: bool,
        /// With --run, print typed rows as JSON instead of a table
        #[arg(long, requires = "run")]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    SalesByCategory,
    TopCustomers,
}

impl ReportKind {
    pub fn report(self, limit: u32) -> Report {
        match self {
            ReportKind::SalesByCategory => Report::SalesByCategory,
            ReportKind::TopCustomers => Report::TopCustomers { limit },
        }
    }
}
