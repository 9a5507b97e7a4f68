mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecom_core::config::load_dotenv;
use ecom_core::Config;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    match args.command {
        Command::TransformFile { input, output } => {
            let written = commands::transform_file(&input, output.as_deref())?;
            println!("{}", written.display());
        }
        Command::Report { kind, limit, run, json } => {
            commands::report(&args.profile, kind.report(limit), run, json).await?;
        }
        Command::Transform { key } => {
            let config = load_config(&args.profile)?;
            commands::transform_object(&config, &key).await?;
        }
        Command::Generate { count } => {
            let config = load_config(&args.profile)?;
            for key in commands::generate(&config, count).await? {
                println!("{key}");
            }
        }
    }
    Ok(())
}

fn load_config(profile: &str) -> Result<Config> {
    let config = Config::for_profile(profile).context("failed to load configuration")?;
    config.log_summary();
    Ok(config)
}
