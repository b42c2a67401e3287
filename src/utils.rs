//! Utility functions for directory management
//!
//! Configuration lives in the system config root when planfw is installed
//! system-wide, with an XDG fallback for per-user setups. Runtime state
//! (audit log) always follows the XDG Base Directory specification.
//!
//! # Directory Structure
//!
//! - Config: `/etc/planfw/` or `~/.config/planfw/` - rule fragments,
//!   exclusion lists, defaults file
//! - State: `~/.local/state/planfw/` - audit log

use directories::ProjectDirs;
use std::path::PathBuf;

/// System-wide configuration root, preferred when it exists
pub const SYSTEM_CONFIG_DIR: &str = "/etc/planfw";

/// Resolves the configuration directory used when `--config-dir` is absent.
///
/// The system root wins when present so a root invocation manages the
/// machine-wide rule set; otherwise the XDG config dir applies.
pub fn default_config_dir() -> PathBuf {
    let system = PathBuf::from(SYSTEM_CONFIG_DIR);
    if system.is_dir() {
        return system;
    }
    get_config_dir().unwrap_or(system)
}

pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "planfw", "planfw").map(|pd| pd.config_dir().to_path_buf())
}

pub fn get_state_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "planfw", "planfw")
        .and_then(|pd| pd.state_dir().map(std::path::Path::to_path_buf))
}

/// Creates the state directory with restrictive permissions
pub fn ensure_dirs() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;

        let mut builder = DirBuilder::new();
        builder.mode(0o700); // User read/write/execute only
        builder.recursive(true);

        if let Some(dir) = get_state_dir() {
            builder.create(dir)?;
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(dir) = get_state_dir() {
            std::fs::create_dir_all(dir)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dir_is_absolute() {
        assert!(default_config_dir().is_absolute());
    }
}
