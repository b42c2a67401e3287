//! Executor interface to the live packet-filter subsystem
//!
//! The core emits typed plan entries; this module is the only place where
//! they meet a real process. [`SystemExecutor`] spawns the family's binary
//! with argv directly - no shell is ever involved, so a validated plan entry
//! cannot be re-interpreted a second time.
//!
//! Every call can fail with a subsystem-level error that the core treats as
//! fatal: the run aborts immediately, with no retry and no partial-state
//! repair.

use crate::core::error::{Error, Result};
use crate::core::family::Family;
use crate::core::plan::{CommandPlan, PlanEntry};
use std::process::Stdio;
use tracing::debug;

/// Operations the core needs from the live subsystem
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Lists every currently-existing chain name for the family
    async fn enumerate_chains(&self, family: Family) -> Result<Vec<String>>;

    /// Empties a chain in the filter table
    async fn flush(&self, family: Family, chain: &str) -> Result<()>;

    /// Deletes a (previously flushed) user chain
    async fn delete(&self, family: Family, chain: &str) -> Result<()>;

    /// Empties a built-in chain of a non-filter table
    async fn flush_table(&self, family: Family, table: &str, chain: &str) -> Result<()>;

    /// Applies one compiled plan entry
    async fn apply(&self, family: Family, entry: &PlanEntry) -> Result<()>;
}

/// Executor backed by the real iptables/ip6tables/ebtables binaries
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    async fn run(&self, family: Family, args: &[&str]) -> Result<std::process::Output> {
        let output = tokio::process::Command::new(family.binary())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(Error::Subsystem {
                command: format!("{} {}", family.binary(), args.join(" ")),
                stderr: if stderr.is_empty() { None } else { Some(stderr) },
                exit_code: output.status.code(),
            })
        }
    }
}

impl Executor for SystemExecutor {
    async fn enumerate_chains(&self, family: Family) -> Result<Vec<String>> {
        let output = self.run(family, &["-S"]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_chain_listing(&stdout))
    }

    async fn flush(&self, family: Family, chain: &str) -> Result<()> {
        self.run(family, &["-F", chain]).await?;
        Ok(())
    }

    async fn delete(&self, family: Family, chain: &str) -> Result<()> {
        self.run(family, &["-X", chain]).await?;
        Ok(())
    }

    async fn flush_table(&self, family: Family, table: &str, chain: &str) -> Result<()> {
        self.run(family, &["-t", table, "-F", chain]).await?;
        Ok(())
    }

    async fn apply(&self, family: Family, entry: &PlanEntry) -> Result<()> {
        let args = entry.args();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(family, &refs).await?;
        Ok(())
    }
}

/// Extracts chain names from `-S` ruleset listing output.
///
/// Built-in chains appear as `-P <name> <policy>` lines, user chains as
/// `-N <name>` lines.
pub fn parse_chain_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("-P") | Some("-N") => tokens.next().map(String::from),
                _ => None,
            }
        })
        .collect()
}

/// Applies a family's plan entry by entry, in plan order.
///
/// Stops at the first subsystem failure; earlier entries stay applied, which
/// is an accepted risk given the packet-filter tools' lack of transactional
/// semantics.
///
/// # Errors
///
/// Returns the first subsystem error encountered.
pub async fn apply_plan<E: Executor>(
    executor: &E,
    family: Family,
    plan: &CommandPlan,
) -> Result<()> {
    for entry in plan.entries() {
        debug!(family = family.id(), command = %entry.render(), "applying plan entry");
        executor.apply(family, entry).await?;
    }
    Ok(())
}
