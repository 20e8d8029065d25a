//! Diagnostics go to stderr; stdout is reserved for command output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `QUIZRANK_LOG=debug`.
pub const LOG_ENV: &str = "QUIZRANK_LOG";

/// Install the stderr subscriber. `default_directive` applies when
/// [`LOG_ENV`] is unset or unparsable.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
