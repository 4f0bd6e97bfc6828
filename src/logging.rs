//! Log output for the leaselock CLI.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary (or to the embedding application).

use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is not set.
///
/// `verbosity` is the number of `-v` flags: none shows warnings, then info,
/// debug and trace.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "leaselock=warn",
        1 => "leaselock=info",
        2 => "leaselock=debug",
        _ => "leaselock=trace",
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. Calling this twice is
/// harmless: the second subscriber is simply not installed.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}
