//! Error types for the deployer contract

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the framework while resolving arguments, building the
/// certificate bundle, or dispatching to a deployer plugin.
#[derive(Debug, Error)]
pub enum DeployerError {
    /// Two or more deployer plugins registered the same subcommand.
    /// Raised before any argument parsing takes place.
    #[error("there are conflicting `subcommand` values among deployer plugins: `{0}`")]
    PluginConflict(String),

    /// No renewal directory was found after merging every configuration
    /// layer. This tool is meant to run as a certbot deploy hook, which
    /// exports `RENEWED_LINEAGE` for us.
    #[error("`RENEWED_LINEAGE` not found in environment. Is this tool not being run by Certbot?")]
    MissingLineage,

    /// An expected certificate component file does not exist.
    #[error("unable to find `{}`", path.display())]
    NotFound { path: PathBuf },

    /// The certificate file is not valid PEM/X.509.
    #[error("failed to parse certificate `{}`: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The certificate carries neither a Subject Common Name nor a DNS-type
    /// Subject Alternative Name.
    #[error(
        "certificate `{}` has no Common Name and no DNS Subject Alternative Name",
        path.display()
    )]
    Metadata { path: PathBuf },

    /// A bundle lookup used a label that is not one of the four known
    /// component labels.
    #[error("unknown certificate component label `{0}`")]
    UnknownLabel(String),

    /// A plugin required an argument that was not present in the merged
    /// argument set.
    #[error("required argument `{0}` was not supplied")]
    MissingArgument(String),

    /// Command-line parsing failed (or clap handled `-h` itself).
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised by a deployer plugin from `post_validate` or `deploy`.
    /// The framework never interprets these.
    #[error(transparent)]
    Plugin(#[from] anyhow::Error),
}

/// A specialized `Result` for framework and plugin operations.
pub type Result<T> = std::result::Result<T, DeployerError>;
