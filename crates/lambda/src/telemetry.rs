use tracing_subscriber::EnvFilter;

/// JSON logs without ANSI colours or timestamps; CloudWatch stamps each line.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();
}
