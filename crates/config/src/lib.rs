//! config: layered configuration file support for certbot-deployer
//!
//! This crate provides the JSON scope-to-options configuration model, its
//! discovery under the standard user and system paths, and the typed error
//! surfaced when a file exists but cannot be read or parsed.

pub mod config;

pub use config::*;
