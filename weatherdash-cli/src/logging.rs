use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "weatherdash=info,weatherdash_core=info,tower_http=info";

/// Install the global subscriber; `RUST_LOG` overrides the default filter.
///
/// Logs go to stderr so `weatherdash show` output stays pipeable.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
