//! Log output for the command-line binary.
//!
//! Library crates log through the `log` facade; this installs a
//! tracing-subscriber fmt layer on stderr that also picks those records up.
//! `RUST_LOG` wins over `--verbose`:
//! - `RUST_LOG=debug` - everything
//! - `RUST_LOG=tabtab_provider=debug` - provider requests only

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
