//! Core rule compilation and chain lifecycle functionality
//!
//! This module contains the engine that turns rule fragments into ordered
//! command plans and manages the live packet-filter's chain lifecycle:
//!
//! - [`family`]: packet-filter families, chain roles, policy enums
//! - [`plan`]: typed plan entries, per-family command plans, policy injection
//! - [`compile`]: fragment enumeration and plan assembly
//! - [`lifecycle`]: teardown with exclusion handling
//! - [`executor`]: the seam to the live iptables/ip6tables/ebtables binaries
//! - [`error`]: error types for engine operations

pub mod compile;
pub mod error;
pub mod executor;
pub mod family;
pub mod lifecycle;
pub mod plan;
