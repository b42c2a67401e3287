//! planfw - declarative firewall plan compiler
//!
//! Compiles a directory of user-authored rule fragments into ordered
//! per-family command plans for iptables, ip6tables and ebtables, and drives
//! the lifecycle of the live packet-filter (flush, chain removal with
//! exclusions, rule loading).
//!
//! # Architecture
//!
//! - [`core`] - Rule compilation, policy injection, chain lifecycle, executor seam
//! - [`validators`] - Metacharacter screening and family classification
//! - [`config`] - Resolved run configuration and defaults file
//! - [`audit`] - Audit logging for all privileged operations
//! - [`utils`] - Utility functions (XDG directories, etc.)
//!
//! # Safety Features
//!
//! - Shell-metacharacter screen on every fragment line
//! - Typed plan entries executed as argv, never re-parsed by a shell
//! - Built-in chains and user-listed exclusions protected during teardown
//! - Audit trail of teardown and apply operations

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

pub mod audit;
pub mod config;
pub mod core;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use crate::core::error::{Error, Result};
pub use crate::core::family::{ChainRole, Family, PolicyAction, PolicyMode};
pub use crate::core::plan::{CommandPlan, PlanEntry, RolePolicies};
