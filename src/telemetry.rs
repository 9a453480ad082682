//! Logging setup
//!
//! The resolver produces a verbosity counter; this module maps it onto a
//! `tracing` level and installs the global subscriber. The framework holds
//! no other logging state.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Map the repeatable `-v` counter onto a log level.
///
/// Saturating: zero occurrences never drop below warnings, and anything
/// past two stays at debug.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Install the global fmt subscriber at the level for `verbosity`.
///
/// A second call in the same process keeps the first subscriber; one
/// invocation only ever dispatches once.
pub fn init(verbosity: u8) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_for(verbosity))
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
