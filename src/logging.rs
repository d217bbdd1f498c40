//! Subscriber setup for the binary. Library code only emits events.

/// Install the global `fmt` subscriber. Later calls are ignored.
pub fn init(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
