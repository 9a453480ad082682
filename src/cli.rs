//! Configuration resolution and command-line composition
//!
//! One invocation merges three layers into a single option set, lowest to
//! highest precedence: per-plugin defaults registered with the parser, the
//! matching config file scopes, and the actual command line. The resolver
//! also owns the framework-level surface: the repeatable verbosity flag,
//! the JSON `--version` report, the hidden renewal-directory flag fed by
//! certbot's `RENEWED_LINEAGE`, and one subcommand per discovered plugin.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use config::{Config, ScopeValues, GLOBAL_SCOPE};
use deployer::{Deployer, DeployerError, ResolvedArgs, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::meta;

/// Environment variable certbot exports to deploy hooks, naming the live
/// directory of the certificate that was just renewed.
pub const RENEWED_LINEAGE_VAR: &str = "RENEWED_LINEAGE";

const EPILOG_WITH_PLUGINS: &str =
    "Try `certbot-deployer <subcommand> -h`. This tool only functions via its plugins.";
const EPILOG_NO_PLUGINS: &str =
    "Warning: no deployer plugins discovered. This tool only functions via its plugins.";

/// Outcome of resolving one invocation.
#[derive(Debug)]
pub enum Resolution {
    /// Dispatch to the selected plugin.
    Run(Invocation),
    /// Print the version report as JSON and exit successfully.
    Version(BTreeMap<String, String>),
    /// No arguments at all were supplied: print help and exit with status 1.
    Help(String),
}

/// Everything the dispatcher needs to drive one deployment.
#[derive(Debug)]
pub struct Invocation {
    /// Subcommand of the selected plugin.
    pub subcommand: String,
    /// Merged verbosity counter (0 warn, 1 info, 2+ debug).
    pub verbosity: u8,
    /// Renewal directory the certificate bundle is built from.
    pub renewed_lineage: PathBuf,
    /// The full merged option set, as handed to the plugin.
    pub args: ResolvedArgs,
}

/// Resolve `argv` against the discovered plugins and the loaded config.
///
/// Fails with [`DeployerError::PluginConflict`] before any parsing when two
/// plugins share a subcommand, with [`DeployerError::Usage`] for parse
/// errors, and with [`DeployerError::MissingLineage`] when no renewal
/// directory survives the merge.
pub fn parse_args(
    argv: &[String],
    deployers: &[Box<dyn Deployer>],
    config: &Config,
) -> Result<Resolution> {
    ensure_unique_subcommands(deployers)?;

    // `--version` bypasses all other validation, including the renewal
    // directory requirement.
    if argv.iter().any(|token| token == "--version" || token == "-V") {
        return Ok(Resolution::Version(version_report(deployers)));
    }

    let mut command = build_command(deployers);

    if argv.is_empty() {
        return Ok(Resolution::Help(command.render_help().to_string()));
    }

    let mut full_argv = Vec::with_capacity(argv.len() + 1);
    full_argv.push(meta::PROG.to_string());
    full_argv.extend(argv.iter().cloned());
    let matches = command.clone().try_get_matches_from(full_argv)?;

    let (subcommand, sub_matches) = matches
        .subcommand()
        .expect("subcommand presence is enforced by the parser");
    let selected = deployers
        .iter()
        .find(|deployer| deployer.subcommand() == subcommand)
        .expect("the parser only accepts registered subcommands");
    let sub_command = command
        .find_subcommand(subcommand)
        .expect("every registered subcommand has a parser");

    let mut args = ResolvedArgs::new();
    merge_scope(&mut args, &command, &matches, config.scope(GLOBAL_SCOPE));
    merge_scope(&mut args, sub_command, sub_matches, config.scope(subcommand));

    // CLI > config file > environment, so the env var only fills the gap.
    if args.get_str("renewed_lineage").is_none() {
        if let Ok(lineage) = std::env::var(RENEWED_LINEAGE_VAR) {
            args.insert("renewed_lineage", Value::String(lineage));
        }
    }
    let renewed_lineage = match args.get_str("renewed_lineage") {
        Some(lineage) if !lineage.is_empty() => PathBuf::from(lineage),
        _ => return Err(DeployerError::MissingLineage),
    };

    // Only the plugin that will actually run gets to post-process.
    selected.post_validate(&mut args)?;

    let verbosity = args.get_count("verbosity").min(u8::MAX as u64) as u8;

    Ok(Resolution::Run(Invocation {
        subcommand: subcommand.to_string(),
        verbosity,
        renewed_lineage,
        args,
    }))
}

fn ensure_unique_subcommands(deployers: &[Box<dyn Deployer>]) -> Result<()> {
    let mut seen = HashSet::new();
    for deployer in deployers {
        if !seen.insert(deployer.subcommand()) {
            return Err(DeployerError::PluginConflict(
                deployer.subcommand().to_string(),
            ));
        }
    }
    Ok(())
}

fn build_command(deployers: &[Box<dyn Deployer>]) -> Command {
    let epilog = if deployers.is_empty() {
        EPILOG_NO_PLUGINS
    } else {
        EPILOG_WITH_PLUGINS
    };

    let mut command = Command::new(meta::PROG)
        .about(meta::DESCRIPTION)
        .after_help(epilog)
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Set output verbosity (-v: info, -vv: debug)"),
        )
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print the framework and plugin versions as JSON and exit"),
        )
        .arg(
            // Hidden because this tool is meant to run exclusively as a
            // certbot deploy hook, which supplies the documented
            // RENEWED_LINEAGE environment variable instead.
            Arg::new("renewed_lineage")
                .long("renewed-lineage")
                .value_name("DIR")
                .global(true)
                .hide(true),
        );

    for deployer in deployers {
        let sub_command = deployer.register_args(Command::new(deployer.subcommand()));
        command = command.subcommand(sub_command);
    }

    command
}

fn version_report(deployers: &[Box<dyn Deployer>]) -> BTreeMap<String, String> {
    let mut report = BTreeMap::new();
    report.insert(meta::PROG.to_string(), meta::VERSION.to_string());
    for deployer in deployers {
        report.insert(
            deployer.subcommand().to_string(),
            deployer.version().to_string(),
        );
    }
    report
}

/// Merge one scope's worth of arguments into `args`.
///
/// Registered arguments take their command-line value when one was given,
/// else the config scope value, else whatever default the registration
/// produced. Config keys that match no registered argument are injected
/// as-is, never overriding a key that was already merged.
fn merge_scope(
    args: &mut ResolvedArgs,
    command: &Command,
    matches: &ArgMatches,
    scope: Option<&ScopeValues>,
) {
    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        if id == "help" || id == "version" {
            continue;
        }

        let from_cli = matches!(matches.value_source(id), Some(ValueSource::CommandLine));
        if !from_cli {
            if let Some(value) = scope.and_then(|scope| scope.get(id)) {
                args.insert(id, value.clone());
                continue;
            }
        }
        if let Some(value) = value_from_matches(arg, matches) {
            args.insert(id, value);
        }
    }

    if let Some(scope) = scope {
        for (key, value) in scope {
            if !args.contains(key) {
                args.insert(key.clone(), value.clone());
            }
        }
    }
}

fn value_from_matches(arg: &Arg, matches: &ArgMatches) -> Option<Value> {
    let id = arg.get_id().as_str();
    match arg.get_action() {
        ArgAction::SetTrue | ArgAction::SetFalse => Some(Value::Bool(matches.get_flag(id))),
        ArgAction::Count => Some(Value::from(matches.get_count(id))),
        ArgAction::Append => {
            let values = string_values(matches, id)?;
            Some(Value::Array(values.into_iter().map(Value::String).collect()))
        }
        _ => string_values(matches, id)?.pop().map(Value::String),
    }
}

fn string_values(matches: &ArgMatches, id: &str) -> Option<Vec<String>> {
    match matches.try_get_many::<String>(id) {
        Ok(values) => Some(values?.cloned().collect()),
        // The plugin registered a typed value parser; fall back to the raw
        // command-line tokens.
        Err(_) => Some(
            matches
                .get_raw(id)?
                .map(|raw| raw.to_string_lossy().into_owned())
                .collect(),
        ),
    }
}
