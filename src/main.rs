//! certbot-deployer binary
//!
//! The stock binary carries no deployer plugins of its own; deployments
//! come from plugin crates that link against the library and pass their
//! `Deployer` implementations to `run`. Shipped as-is it still serves the
//! full framework surface: help, the JSON version report, and usage
//! errors.

use certbot_deployer::{run, Deployer, DeployerError};
use std::process::ExitCode;

fn main() -> ExitCode {
    let deployers: Vec<Box<dyn Deployer>> = Vec::new();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    match run(&argv, &deployers) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            // Let clap render its own usage/help output with its exit code;
            // everything else gets a one-line message and a failure status.
            if let Some(DeployerError::Usage(usage)) = err.downcast_ref::<DeployerError>() {
                let _ = usage.print();
                return ExitCode::from(usage.exit_code().clamp(0, 255) as u8);
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
