use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Structured JSON logs, filtered by `RUST_LOG` when set. Board internals
/// default to debug so moderation decisions stay visible in dev.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,board_server=debug"));

    let format = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init();
}
