//! Diagnostics are written to stderr so `--json` output on stdout stays parseable.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, filter::Targets, fmt, prelude::*};

const APP_TARGET: &str = "countryfx";

fn app_targets(verbose: bool) -> Targets {
    if verbose {
        Targets::new()
            .with_target(APP_TARGET, LevelFilter::DEBUG)
            .with_target("reqwest", LevelFilter::INFO)
    } else {
        Targets::new().with_target(APP_TARGET, LevelFilter::OFF)
    }
}

/// Installs the global subscriber. `RUST_LOG` narrows what `--verbose` enables.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_targets(verbose))
        .with(env_filter)
        .init();
}
