//! Resolved run configuration
//!
//! The CLI layer resolves flags and the optional `planfw.json` defaults file
//! into a [`RunConfig`] record; the core never sees raw flags. Precedence is
//! CLI flag over file value over built-in default.

use crate::core::error::{Error, Result};
use crate::core::family::{Family, PolicyAction, PolicyMode};
use crate::core::plan::RolePolicies;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional defaults file inside the configuration directory
pub const DEFAULTS_FILE: &str = "planfw.json";

/// Subdirectory holding rule fragments
pub const RULES_SUBDIR: &str = "rules.d";

/// Recognized rule fragment extension
pub const RULES_EXTENSION: &str = "rules";

/// Complete resolved configuration for one engine run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub config_dir: PathBuf,
    /// Whether the IPv6 family is active this run (IPv4 always is)
    pub ipv6: bool,
    /// Whether the bridge family is active this run
    pub bridge: bool,
    pub policy_mode: PolicyMode,
    pub policies: RolePolicies,
    /// Report each illegal fragment line individually before dropping it
    pub report_illegal: bool,
}

impl RunConfig {
    /// Families active this run, in fixed application order
    pub fn enabled_families(&self) -> Vec<Family> {
        let mut families = vec![Family::Ipv4];
        if self.ipv6 {
            families.push(Family::Ipv6);
        }
        if self.bridge {
            families.push(Family::Bridge);
        }
        families
    }

    pub fn is_enabled(&self, family: Family) -> bool {
        match family {
            Family::Ipv4 => true,
            Family::Ipv6 => self.ipv6,
            Family::Bridge => self.bridge,
        }
    }

    /// Directory enumerated for `*.rules` fragments
    pub fn rules_dir(&self) -> PathBuf {
        self.config_dir.join(RULES_SUBDIR)
    }

    /// Per-family exclusion-list file (absent file means no explicit
    /// exclusions; built-in chains are always excluded regardless)
    pub fn exclusion_file(&self, family: Family) -> PathBuf {
        self.config_dir.join(format!("exclude-{}.list", family.id()))
    }
}

/// Defaults loadable from `planfw.json`, all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDefaults {
    #[serde(default)]
    pub ipv6: bool,
    #[serde(default)]
    pub bridge: bool,
    #[serde(default)]
    pub policy_mode: PolicyMode,
    #[serde(default)]
    pub input_policy: PolicyAction,
    #[serde(default = "default_accept")]
    pub output_policy: PolicyAction,
    #[serde(default)]
    pub forward_policy: PolicyAction,
    #[serde(default)]
    pub report_illegal: bool,
}

impl Default for FileDefaults {
    fn default() -> Self {
        Self {
            ipv6: false,
            bridge: false,
            policy_mode: PolicyMode::True,
            input_policy: PolicyAction::Drop,
            output_policy: PolicyAction::Accept,
            forward_policy: PolicyAction::Drop,
            report_illegal: false,
        }
    }
}

fn default_accept() -> PolicyAction {
    PolicyAction::Accept
}

impl FileDefaults {
    pub fn policies(&self) -> RolePolicies {
        RolePolicies {
            input: self.input_policy,
            output: self.output_policy,
            forward: self.forward_policy,
        }
    }
}

/// Loads `planfw.json` from the configuration directory.
///
/// An absent file yields the built-in defaults; a malformed file is a fatal
/// configuration error rather than a silent fallback, since a typo here
/// changes what a security tool does.
///
/// # Errors
///
/// Returns `Err` if the file exists but cannot be read or parsed.
pub async fn load_defaults(config_dir: &Path) -> Result<FileDefaults> {
    let path = config_dir.join(DEFAULTS_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(json) => serde_json::from_str(&json)
            .map_err(|e| Error::config(format!("invalid {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileDefaults::default()),
        Err(e) => Err(e.into()),
    }
}
