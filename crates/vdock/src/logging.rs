//! Log output for the `vdock` binary.

/// Install the global subscriber.
///
/// Logs go to stderr so stdout carries only JSON. `RUST_LOG` adjusts the
/// filter on top of the INFO default.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
