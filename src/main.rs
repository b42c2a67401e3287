//! planfw - declarative firewall plan compiler
//!
//! Reads user-authored rule fragments, validates and partitions them by
//! packet-filter family, assembles ordered command plans with policy
//! enforcement, and drives the live subsystem's chain lifecycle.
//!
//! # Usage
//!
//! ```bash
//! planfw compile                       # Show the compiled plans, touch nothing
//! planfw start                         # Teardown, compile, load
//! planfw restart --ipv6                # Same, with the IPv6 family active
//! planfw stop                          # Teardown only
//! planfw start --policy-mode pseudo --input reject
//! ```
//!
//! # Security
//!
//! `compile` never mutates live state and needs no privileges. The lifecycle
//! subcommands spawn the packet-filter binaries directly with argv; root (or
//! CAP_NET_ADMIN) is required for them to succeed.

use clap::{Parser, Subcommand};
use planfw::audit;
use planfw::config::{self, RunConfig};
use planfw::core::compile;
use planfw::core::error::{Error, Result, SubsystemErrorPattern};
use planfw::core::executor::{self, SystemExecutor};
use planfw::core::family::{PolicyAction, PolicyMode};
use planfw::core::lifecycle;
use planfw::core::plan::RolePolicies;
use planfw::utils;
use shadow_rs::shadow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info, warn};

shadow!(build);

#[derive(Parser)]
#[command(name = "planfw")]
#[command(about = "Declarative firewall plan compiler and lifecycle manager", long_about = None)]
#[command(version = build::PKG_VERSION, long_version = build::CLAP_LONG_VERSION)]
struct Cli {
    /// Configuration directory (default: /etc/planfw, XDG fallback)
    #[arg(long, value_name = "DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Activate the IPv6 family for this run
    #[arg(long, global = true)]
    ipv6: bool,

    /// Activate the bridge family for this run
    #[arg(long, global = true)]
    bridge: bool,

    /// Policy enforcement mode: 'true' (native default policy) or 'pseudo'
    /// (terminal jump rules)
    #[arg(long, value_name = "MODE", global = true)]
    policy_mode: Option<String>,

    /// Default action for the INPUT chain (accept, drop, reject, queue)
    #[arg(long, value_name = "ACTION", global = true)]
    input: Option<String>,

    /// Default action for the OUTPUT chain
    #[arg(long, value_name = "ACTION", global = true)]
    output: Option<String>,

    /// Default action for the FORWARD chain
    #[arg(long, value_name = "ACTION", global = true)]
    forward: Option<String>,

    /// Report each illegal fragment line before dropping it
    #[arg(long, global = true)]
    report_illegal: bool,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the rule fragments and display the plans without applying them
    Compile,
    /// Tear down live state, compile, and load the plans
    Start,
    /// Alias of start: tear down live state, compile, and load the plans
    Restart,
    /// Tear down live state only
    Stop,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Ok(level) = tracing::Level::from_str(&cli.log_level) else {
        eprintln!(
            "Error: invalid log level '{}' (expected error, warn, info, debug or trace)",
            cli.log_level
        );
        return ExitCode::FAILURE;
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let _ = utils::ensure_dirs();

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    match runtime.block_on(handle_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

/// Parses a per-role action flag, falling back to the defaults-file value
fn parse_action(raw: Option<&str>, fallback: PolicyAction, role: &str) -> Result<PolicyAction> {
    match raw {
        Some(raw) => PolicyAction::from_str(raw).map_err(|_| {
            Error::config(format!(
                "invalid {role} action '{raw}' (expected accept, drop, reject or queue)"
            ))
        }),
        None => Ok(fallback),
    }
}

/// Resolves CLI flags and the optional defaults file into a [`RunConfig`].
///
/// Precedence: CLI flag over `planfw.json` value over built-in default.
async fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(utils::default_config_dir);
    let defaults = config::load_defaults(&config_dir).await?;

    let policy_mode = match cli.policy_mode.as_deref() {
        Some(raw) => PolicyMode::from_str(raw).map_err(|_| {
            Error::config(format!(
                "invalid policy mode '{raw}' (expected 'true' or 'pseudo')"
            ))
        })?,
        None => defaults.policy_mode,
    };

    let policies = RolePolicies {
        input: parse_action(cli.input.as_deref(), defaults.input_policy, "input")?,
        output: parse_action(cli.output.as_deref(), defaults.output_policy, "output")?,
        forward: parse_action(cli.forward.as_deref(), defaults.forward_policy, "forward")?,
    };

    Ok(RunConfig {
        config_dir,
        ipv6: cli.ipv6 || defaults.ipv6,
        bridge: cli.bridge || defaults.bridge,
        policy_mode,
        policies,
        report_illegal: cli.report_illegal || defaults.report_illegal,
    })
}

async fn handle_cli(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli).await?;
    let executor = SystemExecutor;

    match cli.command {
        Commands::Compile => {
            let plans = compile::compile(&config).await?;
            print!("{}", compile::render(&plans));
        }
        Commands::Stop => {
            warn_if_unprivileged();
            teardown_all(&executor, &config).await?;
        }
        Commands::Start | Commands::Restart => {
            warn_if_unprivileged();
            teardown_all(&executor, &config).await?;

            let plans = compile::compile(&config).await?;
            for family in config.enabled_families() {
                let plan = plans.get(family);
                if plan.is_empty() {
                    continue;
                }
                info!(family = family.id(), entries = plan.len(), "loading plan");
                match executor::apply_plan(&executor, family, plan).await {
                    Ok(()) => audit::log_apply(family, plan.len(), true, None).await,
                    Err(e) => {
                        audit::log_apply(family, plan.len(), false, Some(e.to_string())).await;
                        return Err(e);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Tears down every active family in order, aborting on the first failure
async fn teardown_all(executor: &SystemExecutor, config: &RunConfig) -> Result<()> {
    for family in config.enabled_families() {
        match lifecycle::teardown(executor, config, family).await {
            Ok(report) => {
                audit::log_teardown(
                    family,
                    report.deleted.len(),
                    report.preserved.len(),
                    true,
                    None,
                )
                .await;
            }
            Err(e) => {
                audit::log_teardown(family, 0, 0, false, Some(e.to_string())).await;
                return Err(e);
            }
        }
    }
    Ok(())
}

fn warn_if_unprivileged() {
    if !nix::unistd::getuid().is_root() {
        warn!("not running as root; live packet-filter mutations will likely fail");
    }
}

fn report_fatal(err: &Error) {
    error!("{err}");
    eprintln!("Error: {err}");
    if let Error::Subsystem {
        stderr: Some(stderr),
        ..
    } = err
    {
        let translation = SubsystemErrorPattern::match_error(stderr);
        eprintln!("{}", translation.user_message);
        for suggestion in &translation.suggestions {
            eprintln!("  hint: {suggestion}");
        }
    }
}
