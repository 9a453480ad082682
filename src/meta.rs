//! Framework identity constants

/// Program name, as used for the CLI surface, the version report and the
/// config file scope layout.
pub const PROG: &str = "certbot-deployer";

/// Framework version, reported alongside every plugin's by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DESCRIPTION: &str = "Pluggable certbot deploy hook framework";
