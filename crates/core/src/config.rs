use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
pub fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

pub fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

/// Upper-cased value of `ECOM_PROFILE`, or empty for the default profile.
pub fn active_profile() -> String {
    env_or("ECOM_PROFILE", "").to_uppercase()
}

/// Default categories used by the synthetic transaction generator.
pub const DEFAULT_CATEGORIES: &[&str] = &["Electronics", "Clothing", "Books"];

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub storage: StorageConfig,
    pub aws: AwsConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ECOM_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::for_profile(&active_profile())
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, CoreError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let aws = AwsConfig::from_env_profiled(p);
        let storage = StorageConfig::from_env_profiled(p, &aws)?;
        Ok(Self {
            profile: p.to_string(),
            storage,
            aws,
            generator: GeneratorConfig::from_env_profiled(p),
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  storage:     backend={}, data_dir={}",
            self.storage.backend,
            self.storage.data_dir.display()
        );
        tracing::info!(
            "  aws:         region={}, bucket={}, credentials={}",
            self.aws.region,
            self.aws.s3_bucket.as_deref().unwrap_or("(none)"),
            if self.aws.access_key_id.is_some() { "static" } else { "default chain" }
        );
        tracing::info!("  generator:   categories={}", self.generator.categories.join(","));
    }
}

// ── Storage ───────────────────────────────────────────────────

/// Which object store the pipeline reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    S3,
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::S3 => write!(f, "s3"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "fs" => Ok(BackendKind::Local),
            "s3" => Ok(BackendKind::S3),
            "memory" | "mem" => Ok(BackendKind::Memory),
            other => Err(CoreError::Config(format!(
                "unknown STORAGE_BACKEND '{other}' (expected local, s3 or memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Root directory for the local backend.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str, aws: &AwsConfig) -> Result<Self, CoreError> {
        let backend = match profiled_env_opt(p, "STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None if aws.s3_bucket.is_some() => BackendKind::S3,
            None => BackendKind::Local,
        };
        Ok(Self {
            backend,
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
        })
    }
}

// ── AWS / S3 ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub s3_bucket: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            region: profiled_env_or(p, "AWS_REGION", "us-east-1"),
            access_key_id: profiled_env_opt(p, "AWS_ACCESS_KEY_ID"),
            secret_access_key: profiled_env_opt(p, "AWS_SECRET_ACCESS_KEY"),
            session_token: profiled_env_opt(p, "AWS_SESSION_TOKEN"),
            s3_bucket: profiled_env_opt(p, "S3_BUCKET"),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }

    /// Same credentials and region, different bucket. Used when an event
    /// names the bucket the object lives in.
    pub fn with_bucket(&self, bucket: &str) -> Self {
        Self {
            s3_bucket: Some(bucket.to_string()),
            ..self.clone()
        }
    }
}

// ── Generator ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub categories: Vec<String>,
}

impl GeneratorConfig {
    fn from_env_profiled(p: &str) -> Self {
        let categories = match profiled_env_opt(p, "GENERATOR_CATEGORIES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        };
        Self { categories }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
