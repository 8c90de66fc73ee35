//! Observability middleware.
//!
//! Sets up structured logging through tracing-subscriber.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` controls the filter (default: info). Logs go to stderr without
/// ANSI colors; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
