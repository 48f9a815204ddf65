use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Pick the default level from the `--verbose` / `--quiet` flags.
#[must_use]
pub fn log_level(verbose: bool, quiet: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    }
}

/// Install the stderr subscriber. `RUST_LOG` directives still apply on top
/// of the default level.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(log_level(verbose, quiet).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
