//! certbot-deployer: pluggable certbot deploy hook framework
//!
//! certbot runs this tool once per renewal, exporting `RENEWED_LINEAGE`
//! with the freshly written live directory. The framework resolves which
//! deployer plugin the invocation selects, merges options from plugin
//! defaults, the config file and the command line, builds a
//! [`CertificateBundle`] from that directory, and hands both to the
//! plugin's `deploy`.
//!
//! Plugins implement [`Deployer`] and ship their own binary around
//! [`run`]:
//!
//! ```no_run
//! use certbot_deployer::{run, CertificateBundle, Deployer, DeployerError, ResolvedArgs};
//! use clap::{Arg, Command};
//! use std::process::ExitCode;
//!
//! struct ExampleDeployer;
//!
//! impl Deployer for ExampleDeployer {
//!     fn subcommand(&self) -> &'static str {
//!         "example"
//!     }
//!
//!     fn version(&self) -> &'static str {
//!         "0.1.0"
//!     }
//!
//!     fn register_args(&self, command: Command) -> Command {
//!         command
//!             .about("Minimal example deployer")
//!             .arg(Arg::new("message").long("message").required(true))
//!     }
//!
//!     fn deploy(
//!         &self,
//!         args: &ResolvedArgs,
//!         certificate_bundle: &CertificateBundle,
//!     ) -> Result<(), DeployerError> {
//!         println!(
//!             "deploying {} (expires {}) with message {:?}",
//!             certificate_bundle.common_name(),
//!             certificate_bundle.expires(),
//!             args.get_str("message"),
//!         );
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> ExitCode {
//!     let deployers: Vec<Box<dyn Deployer>> = vec![Box::new(ExampleDeployer)];
//!     let argv: Vec<String> = std::env::args().skip(1).collect();
//!     match run(&argv, &deployers) {
//!         Ok(status) => ExitCode::from(status),
//!         Err(err) => {
//!             eprintln!("error: {err:#}");
//!             ExitCode::FAILURE
//!         }
//!     }
//! }
//! ```

pub mod cli;
pub mod dispatch;
pub mod meta;
pub mod telemetry;

pub use cli::{parse_args, Invocation, Resolution, RENEWED_LINEAGE_VAR};
pub use dispatch::{run, run_with};

pub use deployer::{
    CertificateBundle, CertificateComponent, Deployer, DeployerError, ResolvedArgs, CERT,
    CERT_FILENAME, FULLCHAIN, FULLCHAIN_FILENAME, INTERMEDIATES, INTERMEDIATES_FILENAME, KEY,
    KEY_FILENAME, LABELS,
};
