use thiserror::Error;

/// Core error types for planfw
///
/// Validation findings (illegal characters in a fragment line) are not
/// errors: they are logged and the offending line is dropped. Everything
/// here is fatal and aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or missing configuration, detected before any mutation
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A packet-filter subsystem call failed
    #[error("Subsystem error: {command} failed")]
    Subsystem {
        command: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },
}

impl Error {
    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Database of packet-filter error patterns and their translations
pub struct SubsystemErrorPattern;

impl SubsystemErrorPattern {
    /// Matches a subsystem stderr message against known patterns and returns
    /// a user-friendly translation.
    pub fn match_error(msg: &str) -> ErrorTranslation {
        let lower = msg.to_lowercase();

        // Permission errors
        if lower.contains("permission denied") || lower.contains("operation not permitted") {
            return ErrorTranslation::new("Insufficient permissions to modify firewall rules")
                .with_suggestion("Run planfw as root (start/restart/stop mutate live state)")
                .with_suggestion("Check if CAP_NET_ADMIN capability is available");
        }

        // Missing binary
        if lower.contains("no such file") || lower.contains("command not found") {
            return ErrorTranslation::new("Packet-filter binary not installed or not in PATH")
                .with_suggestion("Install iptables: sudo apt install iptables  (Debian/Ubuntu)")
                .with_suggestion("Or: sudo dnf install iptables  (Fedora/RHEL)")
                .with_suggestion("Bridge filtering additionally requires the ebtables binary");
        }

        // Chain errors (re-deleting an already-deleted chain lands here too;
        // that is a hard failure by design, never retried)
        if lower.contains("no chain") || lower.contains("chain/target/match by that name") {
            return ErrorTranslation::new("Referenced chain or target does not exist")
                .with_suggestion("A rule fragment may jump to a chain that was never created")
                .with_suggestion("List live chains: iptables -S");
        }

        // Kernel module errors
        if lower.contains("modprobe") || lower.contains("no such device") {
            return ErrorTranslation::new("Kernel netfilter support unavailable")
                .with_suggestion("Check kernel modules: lsmod | grep ip_tables")
                .with_suggestion("Load the module: sudo modprobe ip_tables");
        }

        // Generic fallback
        ErrorTranslation::new(format!("Packet-filter error: {msg}"))
            .with_suggestion("Check the detailed error message for more information")
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_error_translation() {
        let translation = SubsystemErrorPattern::match_error("iptables: Permission denied");
        assert!(translation.user_message.contains("permissions"));
        assert!(translation.suggestions.iter().any(|s| s.contains("root")));
    }

    #[test]
    fn test_missing_binary_translation() {
        let translation = SubsystemErrorPattern::match_error("ebtables: command not found");
        assert!(translation.user_message.contains("not installed"));
        assert!(
            translation
                .suggestions
                .iter()
                .any(|s| s.contains("ebtables"))
        );
    }

    #[test]
    fn test_missing_chain_translation() {
        let translation =
            SubsystemErrorPattern::match_error("iptables: No chain/target/match by that name.");
        assert!(translation.user_message.contains("does not exist"));
    }

    #[test]
    fn test_generic_fallback() {
        let translation = SubsystemErrorPattern::match_error("something unexpected");
        assert!(translation.user_message.contains("something unexpected"));
        assert!(!translation.suggestions.is_empty());
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config("rules directory not found: /etc/planfw/rules.d");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("rules.d"));
    }
}
