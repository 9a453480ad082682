//! The deployer plugin contract

use crate::args::ResolvedArgs;
use crate::bundle::CertificateBundle;
use crate::error::Result;
use clap::Command;

/// Contract every deployer plugin implements.
///
/// The framework holds a collection of `Box<dyn Deployer>` values, exposes
/// one subcommand per plugin, and drives exactly one of them per
/// invocation.
///
/// Note that any argument registered with `.required(true)` must be passed
/// on the command line, no matter what the config file says. For an option
/// that is required but allowed to come from the config file, register it
/// as optional and enforce presence with
/// [`ResolvedArgs::require_str`] from [`post_validate`](Self::post_validate).
pub trait Deployer: Send + Sync {
    /// Unique token selecting this plugin on the command line.
    fn subcommand(&self) -> &'static str;

    /// Plugin version, reported by `--version`.
    fn version(&self) -> &'static str;

    /// Register this plugin's flags onto its subcommand.
    ///
    /// Called once per discovered plugin at startup, whether or not the
    /// plugin ends up selected. Implementations usually set `about` and add
    /// their arguments:
    ///
    /// ```
    /// use clap::{Arg, Command};
    ///
    /// fn register_args(command: Command) -> Command {
    ///     command
    ///         .about("Deploy certificates to the example service")
    ///         .arg(Arg::new("message").long("message").help("A custom message"))
    /// }
    /// ```
    fn register_args(&self, command: Command) -> Command;

    /// Post-process the merged arguments.
    ///
    /// Invoked only for the plugin whose subcommand was selected, after
    /// defaults, config file and command line have been merged. Use it to
    /// enforce conditional requiredness or to derive computed fields. The
    /// default leaves the argument set unchanged.
    fn post_validate(&self, _args: &mut ResolvedArgs) -> Result<()> {
        Ok(())
    }

    /// Perform the deployment.
    ///
    /// Receives the final merged arguments and the certificate bundle built
    /// from the renewal directory. Failures propagate uncaught to the
    /// process boundary; the framework never interprets them.
    fn deploy(&self, args: &ResolvedArgs, certificate_bundle: &CertificateBundle) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MinimalDeployer;

    impl Deployer for MinimalDeployer {
        fn subcommand(&self) -> &'static str {
            "minimal"
        }

        fn version(&self) -> &'static str {
            "0.0.0"
        }

        fn register_args(&self, command: Command) -> Command {
            command
        }

        fn deploy(&self, _args: &ResolvedArgs, _bundle: &CertificateBundle) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_post_validate_is_a_noop() {
        let deployer = MinimalDeployer;
        let mut args = ResolvedArgs::new();
        args.insert("dummy", json!("value"));

        deployer.post_validate(&mut args).unwrap();

        assert_eq!(args.get_str("dummy"), Some("value"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_trait_objects_dispatch_by_subcommand() {
        let deployers: Vec<Box<dyn Deployer>> = vec![Box::new(MinimalDeployer)];
        assert_eq!(deployers[0].subcommand(), "minimal");
        assert_eq!(deployers[0].version(), "0.0.0");
    }
}
