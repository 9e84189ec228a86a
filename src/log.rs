//! Logging initialization for the CLI.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Quiet by default; `--verbose` surfaces the pipeline's debug events.
/// `RUST_LOG` overrides either way.
pub fn init_logging(verbose: bool) {
    let (app_level, fallback) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    let app_filter = Targets::new().with_target("fxsync", app_level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().compact().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}
