//! Command plans and policy injection
//!
//! A [`CommandPlan`] is the ordered sequence of validated operations compiled
//! for one family in a single run. Every entry is a strongly-typed
//! [`PlanEntry`], never free-form text re-interpreted by a shell: user lines
//! are tokenized once at classification time and handed to the executor as
//! argv.
//!
//! Policy injection follows the run's [`PolicyMode`]:
//! - True mode prepends native default-policy entries before any user rule
//! - Pseudo mode appends terminal jump entries after every user rule
//!
//! Both emit chain roles in the fixed order Input, Output, Forward.

use crate::core::family::{ChainRole, PolicyAction, PolicyMode};

/// A single validated operation in a family's plan
///
/// Entries are rendered to text only for display; execution passes
/// [`PlanEntry::args`] directly to the packet-filter binary, which removes
/// the second injection surface a deferred shell evaluation would open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEntry {
    /// Set a built-in chain's native default policy (True mode prefix)
    SetPolicy {
        role: ChainRole,
        action: PolicyAction,
    },
    /// Append an explicit terminal jump rule to a built-in chain
    /// (Pseudo mode suffix)
    TerminalJump {
        role: ChainRole,
        action: PolicyAction,
    },
    /// A user-supplied rule line, placeholder stripped, tokens in original
    /// order
    UserRule { args: Vec<String> },
}

impl PlanEntry {
    /// Builds a user-rule entry from the tokens following the placeholder
    pub fn user_rule<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlanEntry::UserRule {
            args: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the argv handed to the executor (without the binary name)
    pub fn args(&self) -> Vec<String> {
        match self {
            PlanEntry::SetPolicy { role, action } => vec![
                "-P".to_string(),
                role.chain_name().to_string(),
                action.target().to_string(),
            ],
            PlanEntry::TerminalJump { role, action } => vec![
                "-A".to_string(),
                role.chain_name().to_string(),
                "-j".to_string(),
                action.target().to_string(),
            ],
            PlanEntry::UserRule { args } => args.clone(),
        }
    }

    /// Renders the entry as a single display line
    pub fn render(&self) -> String {
        self.args().join(" ")
    }
}

/// Ordered sequence of operations for one family, built fresh per compile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
    entries: Vec<PlanEntry>,
}

impl CommandPlan {
    pub fn push(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = PlanEntry>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The run-wide verdicts per chain role, shared across policy-bearing
/// families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolePolicies {
    pub input: PolicyAction,
    pub output: PolicyAction,
    pub forward: PolicyAction,
}

impl RolePolicies {
    pub const fn action_for(&self, role: ChainRole) -> PolicyAction {
        match role {
            ChainRole::Input => self.input,
            ChainRole::Output => self.output,
            ChainRole::Forward => self.forward,
        }
    }
}

/// Produces the three policy entries for one policy-bearing family.
///
/// The caller places them: prefix for [`PolicyMode::True`], suffix for
/// [`PolicyMode::Pseudo`].
pub fn policy_entries(mode: PolicyMode, policies: &RolePolicies) -> Vec<PlanEntry> {
    ChainRole::ALL
        .iter()
        .map(|&role| {
            let action = policies.action_for(role);
            match mode {
                PolicyMode::True => PlanEntry::SetPolicy { role, action },
                PolicyMode::Pseudo => PlanEntry::TerminalJump { role, action },
            }
        })
        .collect()
}
