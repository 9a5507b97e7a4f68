pub mod config;
pub mod error;
pub mod transaction;

pub use config::Config;
pub use error::*;
pub use transaction::*;
