//! Packet-filter families, chain roles, and policy enums
//!
//! This module defines the three filtering domains managed by planfw and the
//! run-wide policy knobs applied to them:
//!
//! - [`Family`]: which packet-filter a compiled rule targets (iptables,
//!   ip6tables, or ebtables)
//! - [`ChainRole`]: the three built-in chains that always exist
//! - [`PolicyAction`]: default/fallback verdict per chain role
//! - [`PolicyMode`]: whether the verdict is enforced as a native default
//!   policy or as an explicit terminal jump rule

use serde::{Deserialize, Serialize};

/// Built-in chain names shared by all families.
///
/// These chains always exist and can never be deleted, only flushed or have
/// their default policy set. They are implicitly excluded from teardown
/// deletion regardless of any exclusion-list contents.
pub const BUILTIN_CHAINS: [&str; 3] = ["INPUT", "OUTPUT", "FORWARD"];

/// Packet-filtering domain a rule fragment line targets
///
/// IPv4 is always active; IPv6 and bridge filtering are opt-in per run.
/// `Copy` trait allows efficient passing by value for this small enum.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum Family {
    /// IPv4 filter managed via iptables
    #[strum(serialize = "ipv4")]
    Ipv4,
    /// IPv6 filter managed via ip6tables
    #[strum(serialize = "ipv6")]
    Ipv6,
    /// Bridge-layer filter managed via ebtables
    #[strum(serialize = "bridge")]
    Bridge,
}

impl Family {
    /// Returns the family identifier used in file names and plan headers
    pub const fn id(self) -> &'static str {
        match self {
            Family::Ipv4 => "ipv4",
            Family::Ipv6 => "ipv6",
            Family::Bridge => "bridge",
        }
    }

    /// Returns the placeholder token that selects this family in a fragment
    pub const fn placeholder(self) -> &'static str {
        match self {
            Family::Ipv4 => "${ipt4}",
            Family::Ipv6 => "${ipt6}",
            Family::Bridge => "${ebt}",
        }
    }

    /// Returns the packet-filter binary that applies this family's commands
    pub const fn binary(self) -> &'static str {
        match self {
            Family::Ipv4 => "iptables",
            Family::Ipv6 => "ip6tables",
            Family::Bridge => "ebtables",
        }
    }

    /// Whether the family participates in default-policy / terminal-jump
    /// injection.
    ///
    /// The bridge filter has no default-policy or terminal-jump concept in
    /// this design; its plan is built solely from user-supplied lines.
    pub const fn has_policy_chains(self) -> bool {
        !matches!(self, Family::Bridge)
    }

    /// Standard non-filter tables flushed unconditionally at teardown,
    /// with their built-in chains.
    pub const fn extra_tables(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            Family::Ipv4 | Family::Ipv6 => &[
                ("nat", &["PREROUTING", "INPUT", "OUTPUT", "POSTROUTING"]),
                (
                    "mangle",
                    &["PREROUTING", "INPUT", "FORWARD", "OUTPUT", "POSTROUTING"],
                ),
            ],
            Family::Bridge => &[],
        }
    }

    /// Maps a fragment's leading placeholder token to its family
    pub fn from_placeholder(token: &str) -> Option<Family> {
        match token {
            "${ipt4}" => Some(Family::Ipv4),
            "${ipt6}" => Some(Family::Ipv6),
            "${ebt}" => Some(Family::Bridge),
            _ => None,
        }
    }
}

/// Built-in chain role
///
/// Policy commands are always emitted in the fixed order Input, Output,
/// Forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum ChainRole {
    #[strum(serialize = "input")]
    Input,
    #[strum(serialize = "output")]
    Output,
    #[strum(serialize = "forward")]
    Forward,
}

impl ChainRole {
    /// Fixed emission order for policy commands
    pub const ALL: [ChainRole; 3] = [ChainRole::Input, ChainRole::Output, ChainRole::Forward];

    /// Returns the built-in chain name for this role
    pub const fn chain_name(self) -> &'static str {
        match self {
            ChainRole::Input => "INPUT",
            ChainRole::Output => "OUTPUT",
            ChainRole::Forward => "FORWARD",
        }
    }
}

/// Default/fallback verdict configured per chain role
///
/// One set of role actions applies to the whole run, shared by the IPv4 and
/// IPv6 families.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    #[strum(serialize = "accept")]
    Accept,
    #[default]
    #[strum(serialize = "drop")]
    Drop,
    #[strum(serialize = "reject")]
    Reject,
    #[strum(serialize = "queue")]
    Queue,
}

impl PolicyAction {
    /// Returns the verdict target as the packet-filter spells it
    pub const fn target(self) -> &'static str {
        match self {
            PolicyAction::Accept => "ACCEPT",
            PolicyAction::Drop => "DROP",
            PolicyAction::Reject => "REJECT",
            PolicyAction::Queue => "QUEUE",
        }
    }
}

/// How the configured [`PolicyAction`]s are enforced
///
/// The two modes differ in both placement and primitive, deliberately:
/// a native default policy is non-orderable relative to user rules, so it is
/// set before any rule is loaded; a terminal jump rule is positionally
/// significant, so it is appended after every user rule.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Set the built-in chains' native default policy directly; policy
    /// commands are the first entries of a family's plan
    #[default]
    #[strum(serialize = "true")]
    True,
    /// Leave built-in chains at ACCEPT and append an explicit terminal jump
    /// rule per chain; policy commands are the last entries of a family's plan
    #[strum(serialize = "pseudo")]
    Pseudo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_placeholder_round_trip() {
        for family in Family::iter() {
            assert_eq!(Family::from_placeholder(family.placeholder()), Some(family));
        }
        assert_eq!(Family::from_placeholder("${ipt}"), None);
        assert_eq!(Family::from_placeholder("iptables"), None);
    }

    #[test]
    fn test_family_identifiers() {
        assert_eq!(Family::Ipv4.id(), "ipv4");
        assert_eq!(Family::Ipv6.binary(), "ip6tables");
        assert_eq!(Family::Bridge.binary(), "ebtables");
        assert_eq!(Family::from_str("bridge").unwrap(), Family::Bridge);
    }

    #[test]
    fn test_bridge_has_no_policy_chains() {
        assert!(Family::Ipv4.has_policy_chains());
        assert!(Family::Ipv6.has_policy_chains());
        assert!(!Family::Bridge.has_policy_chains());
        assert!(Family::Bridge.extra_tables().is_empty());
    }

    #[test]
    fn test_chain_role_order() {
        let names: Vec<&str> = ChainRole::ALL.iter().map(|r| r.chain_name()).collect();
        assert_eq!(names, ["INPUT", "OUTPUT", "FORWARD"]);
    }

    #[test]
    fn test_policy_action_parsing() {
        assert_eq!(PolicyAction::from_str("drop").unwrap(), PolicyAction::Drop);
        assert_eq!(
            PolicyAction::from_str("queue").unwrap(),
            PolicyAction::Queue
        );
        assert!(PolicyAction::from_str("DENY").is_err());
        assert_eq!(PolicyAction::Reject.target(), "REJECT");
    }

    #[test]
    fn test_policy_mode_parsing() {
        assert_eq!(PolicyMode::from_str("true").unwrap(), PolicyMode::True);
        assert_eq!(PolicyMode::from_str("pseudo").unwrap(), PolicyMode::Pseudo);
        assert!(PolicyMode::from_str("fake").is_err());
    }
}
