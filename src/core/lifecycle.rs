//! Chain lifecycle management
//!
//! Teardown guarantees a clean slate before a fresh rule load: built-in
//! chains and the standard non-filter tables are flushed unconditionally,
//! and every other live chain is flushed then deleted unless it is named in
//! the family's exclusion list.
//!
//! Excluded chains are untouched entirely - they may retain stale rules,
//! which allows coexistence with externally-managed chains (container
//! runtimes, VPN daemons) on the same host.

use crate::config::RunConfig;
use crate::core::error::{Error, Result};
use crate::core::executor::Executor;
use crate::core::family::{BUILTIN_CHAINS, Family};
use std::collections::HashSet;
use tracing::{debug, info};

/// Outcome summary of one family teardown, used for audit logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub deleted: Vec<String>,
    pub preserved: Vec<String>,
}

/// Loads the family's exclusion set from its exclusion-list file.
///
/// One chain name per line; blank lines and `#` comments are ignored. An
/// absent file is equivalent to an empty explicit set. The three built-in
/// chain names are always added regardless of file contents.
///
/// # Errors
///
/// Returns `Err` only for I/O failures other than the file being absent.
pub async fn load_exclusions(config: &RunConfig, family: Family) -> Result<HashSet<String>> {
    let path = config.exclusion_file(family);
    let mut set: HashSet<String> = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
        Err(e) => return Err(e.into()),
    };

    for chain in BUILTIN_CHAINS {
        set.insert(chain.to_string());
    }
    Ok(set)
}

/// Tears down one family's live state.
///
/// 1. The family must be an active management target this run.
/// 2. Enumerate all currently-existing chains.
/// 3. Load the exclusion set (built-ins always included).
/// 4. Flush the built-in chains and the standard extra tables
///    unconditionally - built-ins can never be deleted and must start clean.
/// 5. Flush then delete every other chain not in the exclusion set.
///
/// After teardown, every non-excluded non-built-in chain that existed at
/// step 2 is gone; every excluded chain is untouched. Each chain's flush
/// happens before its own delete.
///
/// # Errors
///
/// Returns a configuration error for an inactive family, or the first
/// subsystem error, which aborts the remainder of the teardown.
pub async fn teardown<E: Executor>(
    executor: &E,
    config: &RunConfig,
    family: Family,
) -> Result<TeardownReport> {
    if !config.is_enabled(family) {
        return Err(Error::config(format!(
            "family '{}' is not an active management target",
            family.id()
        )));
    }

    info!(family = family.id(), "tearing down live chains");

    let chains = executor.enumerate_chains(family).await?;
    let exclusions = load_exclusions(config, family).await?;

    for chain in BUILTIN_CHAINS {
        executor.flush(family, chain).await?;
    }
    for (table, table_chains) in family.extra_tables() {
        for chain in *table_chains {
            executor.flush_table(family, table, chain).await?;
        }
    }

    let mut report = TeardownReport::default();
    for chain in &chains {
        if BUILTIN_CHAINS.contains(&chain.as_str()) {
            // Implicitly excluded, not noteworthy
            continue;
        }
        if exclusions.contains(chain) {
            info!(family = family.id(), %chain, "preserving excluded chain");
            report.preserved.push(chain.clone());
            continue;
        }
        debug!(family = family.id(), %chain, "flushing and deleting chain");
        executor.flush(family, chain).await?;
        executor.delete(family, chain).await?;
        report.deleted.push(chain.clone());
    }

    info!(
        family = family.id(),
        deleted = report.deleted.len(),
        preserved = report.preserved.len(),
        "teardown complete"
    );
    Ok(report)
}
