//! Rule compilation
//!
//! Turns a configuration directory of rule fragments into three per-family
//! [`CommandPlan`]s. Fragments are enumerated in sorted directory order and
//! lines keep their within-file order, so a compile is deterministic for an
//! unchanged directory. Every call starts from empty plans; nothing
//! accumulates across calls.
//!
//! Policy injection brackets the user rules according to the run's policy
//! mode: native default policies go first (they are non-orderable), terminal
//! jump rules go last (they are positionally significant).
//!
//! Nothing at this layer is fatal except a missing rules directory:
//! malformed lines are dropped, not rejected, to keep the compiler resilient
//! to partially-malformed config directories.

use crate::config::{RULES_EXTENSION, RunConfig};
use crate::core::error::{Error, Result};
use crate::core::family::{Family, PolicyMode};
use crate::core::plan::{CommandPlan, PlanEntry, policy_entries};
use crate::validators;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

/// The three per-family plans produced by one compile run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyPlans {
    pub ipv4: CommandPlan,
    pub ipv6: CommandPlan,
    pub bridge: CommandPlan,
}

impl FamilyPlans {
    pub fn get(&self, family: Family) -> &CommandPlan {
        match family {
            Family::Ipv4 => &self.ipv4,
            Family::Ipv6 => &self.ipv6,
            Family::Bridge => &self.bridge,
        }
    }

    fn get_mut(&mut self, family: Family) -> &mut CommandPlan {
        match family {
            Family::Ipv4 => &mut self.ipv4,
            Family::Ipv6 => &mut self.ipv6,
            Family::Bridge => &mut self.bridge,
        }
    }
}

/// Enumerates rule fragment files (`*.rules`) in sorted directory order.
///
/// # Errors
///
/// A missing rules directory is a fatal configuration error; other I/O
/// failures surface as-is.
async fn fragment_files(rules_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dir = match tokio::fs::read_dir(rules_dir).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::config(format!(
                "rules directory not found: {}",
                rules_dir.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(RULES_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Compiles the configuration directory into three ordered per-family plans.
///
/// Each fragment line passes the metacharacter screen, then family
/// classification; lines for families not active this run are skipped.
/// Illegal lines are dropped and, when reporting is enabled, logged
/// individually; a fragment containing metacharacters anywhere additionally
/// gets one warning per file.
///
/// # Errors
///
/// Returns `Err` for a missing rules directory or unreadable fragment;
/// malformed content is never an error.
pub async fn compile(config: &RunConfig) -> Result<FamilyPlans> {
    let mut plans = FamilyPlans::default();

    if config.policy_mode == PolicyMode::True {
        for family in config.enabled_families() {
            if family.has_policy_chains() {
                plans
                    .get_mut(family)
                    .extend(policy_entries(PolicyMode::True, &config.policies));
            }
        }
    }

    for path in fragment_files(&config.rules_dir()).await? {
        let content = tokio::fs::read_to_string(&path).await?;

        if validators::file_has_illegal(&content) {
            warn!(file = %path.display(), "fragment contains shell metacharacters");
        }

        for line in content.lines() {
            let line = line.trim();
            if !validators::is_candidate(line) {
                continue;
            }
            if let Some(pattern) = validators::illegal_pattern(line) {
                if config.report_illegal {
                    warn!(file = %path.display(), pattern, line, "dropping illegal line");
                }
                continue;
            }
            let Some(family) = validators::classify_family(line) else {
                debug!(file = %path.display(), line, "discarding unclassified line");
                continue;
            };
            if !config.is_enabled(family) {
                debug!(family = family.id(), line, "skipping line for inactive family");
                continue;
            }
            plans
                .get_mut(family)
                .push(PlanEntry::user_rule(line.split_whitespace().skip(1)));
        }
    }

    if config.policy_mode == PolicyMode::Pseudo {
        for family in config.enabled_families() {
            if family.has_policy_chains() {
                plans
                    .get_mut(family)
                    .extend(policy_entries(PolicyMode::Pseudo, &config.policies));
            }
        }
    }

    Ok(plans)
}

/// Renders all plans grouped by family: a `# <family>` header, one command
/// per line, a trailing blank line. Families with an empty plan are omitted
/// entirely.
pub fn render(plans: &FamilyPlans) -> String {
    let mut out = String::new();
    for family in Family::iter() {
        let plan = plans.get(family);
        if plan.is_empty() {
            continue;
        }
        out.push_str("# ");
        out.push_str(family.id());
        out.push('\n');
        for entry in plan.entries() {
            out.push_str(&entry.render());
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
