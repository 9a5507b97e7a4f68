use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;

use ecom_athena::{AthenaClient, AthenaConfig, CategorySales, CustomerValue, Report};
use ecom_core::{Config, RawTransaction};
use ecom_generator::TransactionGenerator;
use ecom_storage::{ObjectRef, ObjectStoreAccessor, StorageBackend};
use ecom_transform::{derive_output_key, transform, write_parquet, RecordTransformer};

fn accessor(config: &Config) -> Result<ObjectStoreAccessor> {
    let backend = StorageBackend::from_config(config).context("failed to open storage backend")?;
    Ok(ObjectStoreAccessor::new(&backend))
}

pub async fn transform_object(config: &Config, key: &str) -> Result<()> {
    let transformer = RecordTransformer::new(Arc::new(accessor(config)?));
    let output = transformer
        .process(&ObjectRef::new(key))
        .await
        .with_context(|| format!("failed to transform {key}"))?;
    println!("{output}");
    Ok(())
}

/// Output path for `input` when none is given.
pub fn default_output(input: &Path) -> Result<PathBuf> {
    let input = input
        .to_str()
        .with_context(|| format!("{} is not valid UTF-8", input.display()))?;
    Ok(PathBuf::from(derive_output_key(input)?))
}

pub fn transform_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let output = match output {
        Some(p) => p.to_path_buf(),
        None => default_output(input)?,
    };
    if output == input {
        bail!("refusing to overwrite input {}", input.display());
    }

    let body = std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let raw = RawTransaction::from_json(&body)?;
    let enriched = transform(&raw)?;
    write_parquet(&enriched, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        transaction_id = %enriched.transaction_id,
        "transformed file"
    );
    Ok(output)
}

pub async fn generate(config: &Config, count: u32) -> Result<Vec<ObjectRef>> {
    let storage = accessor(config)?;
    let mut generator = TransactionGenerator::new(&config.generator)?;
    let mut keys = Vec::with_capacity(count as usize);
    for _ in 0..count {
        keys.push(generator.emit(&storage, Utc::now().naive_utc()).await?);
    }
    info!(count, location = %storage.location(), "generated transactions");
    Ok(keys)
}

/// Refuse to submit queries that would write results to the placeholder bucket.
fn ensure_runnable(athena: &AthenaConfig) -> Result<()> {
    if !athena.is_configured() {
        bail!(
            "Athena is not configured: set ATHENA_ENABLED=true and ATHENA_OUTPUT_LOCATION \
             (current output location: {})",
            athena.output_location
        );
    }
    Ok(())
}

pub async fn report(profile: &str, report: Report, run: bool, json: bool) -> Result<()> {
    let athena = AthenaConfig::from_env_profiled(&profile.to_uppercase());
    if !run {
        println!("{}", report.render(&athena.target())?);
        return Ok(());
    }

    ensure_runnable(&athena)?;
    let client = AthenaClient::new(athena).await?;
    let result = client.run_report(&report).await?;
    if !json {
        println!("{result}");
        return Ok(());
    }

    let rows = match report {
        Report::SalesByCategory => serde_json::to_string_pretty(&CategorySales::from_result(&result)?)?,
        Report::TopCustomers { .. } => {
            serde_json::to_string_pretty(&CustomerValue::from_result(&result)?)?
        }
    };
    println!("{rows}");
    Ok(())
}
