use std::time::Duration;

use serde::{Deserialize, Serialize};

use ecom_core::config::{active_profile, profiled_env_opt, profiled_env_or};

use crate::reports::ReportTarget;

/// Default S3 output location for Athena query results.
const DEFAULT_OUTPUT_LOCATION: &str = "s3://ecommerce-athena-results/";

/// 10 GB (10 * 1024^3).
const DEFAULT_MAX_SCAN_BYTES: u64 = 10_737_418_240;

const DEFAULT_REGION: &str = "us-east-1";

fn parsed<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Where and how the report queries run.
///
/// Every key honours the `ECOM_PROFILE` prefix, so `PROD_ATHENA_DATABASE`
/// wins over `ATHENA_DATABASE` when `ECOM_PROFILE=prod`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    pub enabled: bool,
    /// `ATHENA_REGION`, then `AWS_REGION`, then us-east-1.
    pub region: String,
    pub database: String,
    /// Table the processed Parquet objects are registered as.
    pub table: String,
    pub workgroup: String,
    /// S3 prefix Athena writes result sets to.
    pub output_location: String,
    /// Queries whose scan exceeds this are cancelled (0 = unlimited).
    pub max_scan_bytes: u64,
    pub timeout_seconds: u32,
}

impl AthenaConfig {
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    pub fn from_env_profiled(profile: &str) -> Self {
        let region = profiled_env_opt(profile, "ATHENA_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let enabled = matches!(
            profiled_env_opt(profile, "ATHENA_ENABLED").as_deref(),
            Some("true" | "1")
        );

        Self {
            enabled,
            region,
            database: profiled_env_or(profile, "ATHENA_DATABASE", "ecommerce_db"),
            table: profiled_env_or(profile, "ATHENA_TABLE", "transactions"),
            workgroup: profiled_env_or(profile, "ATHENA_WORKGROUP", "primary"),
            output_location: profiled_env_or(
                profile,
                "ATHENA_OUTPUT_LOCATION",
                DEFAULT_OUTPUT_LOCATION,
            ),
            max_scan_bytes: parsed(profile, "ATHENA_MAX_SCAN_BYTES", DEFAULT_MAX_SCAN_BYTES),
            timeout_seconds: parsed(profile, "ATHENA_TIMEOUT_SECONDS", 300),
        }
    }

    /// Enabled, with an output location other than the placeholder.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.output_location != DEFAULT_OUTPUT_LOCATION
    }

    pub fn target(&self) -> ReportTarget {
        ReportTarget::new(&self.database, &self.table)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}
