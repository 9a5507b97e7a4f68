//! Synthetic e-commerce transactions for feeding the pipeline.

pub mod error;
pub mod generator;

pub use error::GeneratorError;
pub use generator::{raw_key, TransactionGenerator};
