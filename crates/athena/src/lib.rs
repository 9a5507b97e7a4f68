//! Analytic reports over the processed transactions table, run on AWS Athena.

pub mod client;
pub mod config;
pub mod error;
pub mod reports;
pub mod result;

pub use client::AthenaClient;
pub use config::AthenaConfig;
pub use error::AthenaError;
pub use reports::{CategorySales, CustomerValue, Report, ReportTarget};
pub use result::{AthenaColumn, AthenaQueryResult, QueryMetadata};
