//! deployer: plugin contract and certificate bundle types for certbot-deployer
//!
//! Deployer plugins build against this crate: implement [`Deployer`], read
//! merged options from [`ResolvedArgs`], and consume the parsed
//! [`CertificateBundle`]. The [`testing`] module generates self-signed
//! bundles for plugin test suites.

pub mod args;
pub mod bundle;
pub mod deployer;
pub mod error;
pub mod testing;

pub use args::ResolvedArgs;
pub use bundle::{
    CertificateBundle, CertificateComponent, CERT, CERT_FILENAME, FULLCHAIN, FULLCHAIN_FILENAME,
    INTERMEDIATES, INTERMEDIATES_FILENAME, KEY, KEY_FILENAME, LABELS,
};
pub use deployer::Deployer;
pub use error::{DeployerError, Result};
