//! Top-level orchestration
//!
//! One invocation runs exactly one dispatch: resolve the configuration,
//! build the certificate bundle from the renewal directory, invoke the
//! selected plugin's `deploy`, exit. Whatever the plugin raises propagates
//! uncaught to the process boundary; the calling system owns retries.

use anyhow::Context;
use config::Config;
use deployer::{CertificateBundle, Deployer};
use tracing::debug;

use crate::cli::{self, Resolution};
use crate::telemetry;

/// Discover the configuration file and run one dispatch.
///
/// Returns the process exit status: `0` for a completed deployment or the
/// version report, `1` when help was printed because no arguments were
/// supplied.
pub fn run(argv: &[String], deployers: &[Box<dyn Deployer>]) -> anyhow::Result<u8> {
    let config = Config::discover().context("failed to load configuration")?;
    run_with(argv, deployers, &config)
}

/// Run one dispatch against an already-loaded configuration.
pub fn run_with(
    argv: &[String],
    deployers: &[Box<dyn Deployer>],
    config: &Config,
) -> anyhow::Result<u8> {
    match cli::parse_args(argv, deployers, config)? {
        Resolution::Help(help) => {
            println!("{help}");
            Ok(1)
        }
        Resolution::Version(report) => {
            println!("{}", serde_json::to_string(&report)?);
            Ok(0)
        }
        Resolution::Run(invocation) => {
            telemetry::init(invocation.verbosity);
            debug!(
                subcommand = %invocation.subcommand,
                args = ?invocation.args,
                "arguments resolved"
            );

            let bundle = CertificateBundle::new(&invocation.renewed_lineage)?;
            let selected = deployers
                .iter()
                .find(|deployer| deployer.subcommand() == invocation.subcommand)
                .expect("the resolver only selects registered subcommands");

            selected.deploy(&invocation.args, &bundle)?;
            Ok(0)
        }
    }
}
