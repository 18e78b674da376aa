use tracing_subscriber::{EnvFilter, fmt};

/// Diagnostics go to stderr and are off unless `SECRETSUB_LOG` is set,
/// e.g. `SECRETSUB_LOG=debug`.
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SECRETSUB_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging();
    secretsub::cli::main()
}
