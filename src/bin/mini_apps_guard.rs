//! mini-apps-guard: evaluate guard contexts and compare platform versions
//!
//! Usage:
//!   mini-apps-guard check --method <name> [options]   Evaluate one guarded call
//!   mini-apps-guard compare <a> <b>                   Compare two versions (-1, 0, 1)
//!   mini-apps-guard supported <min> [--version <v>]   Capability predicate

use anyhow::{anyhow, bail, Context};
use mini_apps_guard::{
    compare_versions, CallSite, Environment, GuardContext, MountSignal, Scope, SdkConfig,
    Version, VersionRequirement,
};
use std::cmp::Ordering;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "compare" => cmd_compare(&args[2..]),
        "supported" => cmd_supported(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("mini-apps-guard {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            Ok(ExitCode::from(1))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"mini-apps-guard: Mini Apps SDK guard chain tool

USAGE:
    mini-apps-guard <COMMAND> [OPTIONS]

COMMANDS:
    check --method <name>           Evaluate a guarded call
        [--component <name>]        Owning component (makes it a method)
        [--min-version <v>]         Minimum platform version
        [--mounted <true|false>]    Component mount state (needs --min-version)
        [--env <state>]             mini_app | server | unknown_browser
        [--version <v>]             Initialized platform version
        [--config <path>]           YAML/JSON config file
    compare <a> <b>                 Compare two versions, prints -1, 0 or 1
    supported <min> [--version <v>] Print whether <min> is supported
    version                         Show version information
    help                            Show this help message

ENVIRONMENT:
    MINI_APPS_ENV                   Default execution environment
    MINI_APPS_VERSION               Default initialized version
    RUST_LOG                        Log filter (default: warn)

EXIT STATUS:
    check exits 0 when the call is allowed and 2 when it is rejected."#
    );
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_version(raw: &str, what: &str) -> anyhow::Result<Version> {
    Version::parse(raw).with_context(|| format!("invalid {what}"))
}

/// Env vars, then the config file, then explicit flags.
fn load_config(args: &[String]) -> anyhow::Result<SdkConfig> {
    let mut config = SdkConfig::from_env()?;
    if let Some(path) = flag(args, "--config") {
        config = config.merge(SdkConfig::from_path(path)?);
    }
    if let Some(env) = flag(args, "--env") {
        config.environment = Some(env.parse::<Environment>()?);
    }
    if let Some(v) = flag(args, "--version") {
        config.version = Some(parse_version(v, "--version")?);
    }
    Ok(config)
}

/// Exit status of `check` when the guard rejects the call.
const EXIT_REJECTED: u8 = 2;

/// Build the guard context described by `check` flags.
fn build_context(args: &[String]) -> anyhow::Result<GuardContext> {
    let method = flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let site = match flag(args, "--component") {
        Some(component) => CallSite::method(component, method),
        None => CallSite::function(method),
    };

    let mounted = match flag(args, "--mounted") {
        Some(raw) => Some(
            raw.parse::<bool>()
                .with_context(|| format!("--mounted expects true or false, got '{raw}'"))?,
        ),
        None => None,
    };

    let context = match flag(args, "--min-version") {
        Some(raw) => {
            let mut requirement = VersionRequirement::new(parse_version(raw, "--min-version")?);
            if let Some(state) = mounted {
                let signal = MountSignal::new();
                signal.set(state);
                requirement = requirement.with_mount_signal(signal);
            }
            GuardContext::versioned(site, requirement)
        }
        None => {
            if mounted.is_some() {
                bail!("--mounted only applies to version-gated calls; pass --min-version");
            }
            GuardContext::basic(site)
        }
    };
    Ok(context)
}

/// Evaluate `check` flags into the line to print and the exit status.
fn run_check(args: &[String]) -> anyhow::Result<(String, u8)> {
    let context = build_context(args)?;
    let scope = Scope::from_config(&load_config(args)?);
    tracing::debug!(scope = ?scope, "evaluating guard");

    Ok(match scope.evaluate(&context) {
        Ok(()) => ("ok".to_string(), 0),
        Err(e) => (format!("{}: {}", e.code(), e), EXIT_REJECTED),
    })
}

fn cmd_check(args: &[String]) -> anyhow::Result<ExitCode> {
    let (line, status) = run_check(args)?;
    println!("{line}");
    Ok(ExitCode::from(status))
}

fn cmd_compare(args: &[String]) -> anyhow::Result<ExitCode> {
    let (a, b) = match args {
        [a, b, ..] => (a, b),
        _ => bail!("usage: mini-apps-guard compare <a> <b>"),
    };
    let n = match compare_versions(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };
    println!("{n}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_supported(args: &[String]) -> anyhow::Result<ExitCode> {
    let min = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow!("usage: mini-apps-guard supported <min> [--version <v>]"))?;
    let min = parse_version(min, "minimum version")?;
    let scope = Scope::from_config(&load_config(args)?);
    println!("{}", scope.is_supported(&min));
    Ok(ExitCode::SUCCESS)
}
