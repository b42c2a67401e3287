//! Candidate-line screening for rule fragments
//!
//! This module provides centralized validation for all fragment lines before
//! they can reach a command plan, preventing shell-style injection from
//! reaching the privileged packet-filter stage.
//!
//! The screen is a defense-in-depth filter, not a grammar check: it rejects
//! lines carrying shell metacharacters and says nothing about whether the
//! remaining flags are valid packet-filter syntax.

use crate::core::family::Family;

/// Metacharacter blacklist.
///
/// A line matching any of these is illegal and never enters a plan:
/// statement separator, command substitution, pipe, background/sequencing
/// operator, back-tick substitution.
pub const ILLEGAL_PATTERNS: [&str; 5] = [";", "$(", "|", "&", "`"];

/// Returns the first blacklisted pattern found in the line, if any.
///
/// The family placeholders (`${ipt4}` etc.) use brace expansion syntax and
/// do not trip the `$(` check.
pub fn illegal_pattern(line: &str) -> Option<&'static str> {
    ILLEGAL_PATTERNS
        .iter()
        .find(|pattern| line.contains(*pattern))
        .copied()
}

/// Classifies a single line as safe for plan inclusion
pub fn line_is_safe(line: &str) -> bool {
    illegal_pattern(line).is_none()
}

/// Whole-file detection: true if any blacklisted pattern occurs anywhere in
/// the fragment, including comment lines that never become candidates.
pub fn file_has_illegal(content: &str) -> bool {
    illegal_pattern(content).is_some()
}

/// Whether a line is a candidate rule at all.
///
/// The source reader only forwards lines whose first non-whitespace
/// character is the placeholder sigil; comments and blanks are expected and
/// skipped silently.
pub fn is_candidate(line: &str) -> bool {
    line.trim_start().starts_with('$')
}

/// Assigns a safe candidate line to a family via its leading token.
///
/// Returns `None` for a malformed or unknown placeholder, which is a
/// defensive discard rather than an error: only sigil-prefixed lines reach
/// this point, so an unknown name means a typo in the fragment.
pub fn classify_family(line: &str) -> Option<Family> {
    let token = line.split_whitespace().next()?;
    Family::from_placeholder(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_rule_line_is_safe() {
        assert!(line_is_safe("${ipt4} -A INPUT -s 10.0.0.1 -j ACCEPT"));
    }

    #[test]
    fn test_statement_separator_is_illegal() {
        let line = "${ipt4} -A INPUT -j DROP; rm -rf /";
        assert_eq!(illegal_pattern(line), Some(";"));
    }

    #[test]
    fn test_command_substitution_is_illegal() {
        assert_eq!(
            illegal_pattern("${ipt4} -A INPUT -s $(cat /etc/shadow) -j DROP"),
            Some("$(")
        );
        assert_eq!(
            illegal_pattern("${ipt4} -A INPUT -m comment --comment `id`"),
            Some("`")
        );
    }

    #[test]
    fn test_pipe_and_background_are_illegal() {
        assert!(!line_is_safe("${ipt4} -A INPUT | tee /tmp/x"));
        assert!(!line_is_safe("${ipt4} -A INPUT & disown"));
        assert!(!line_is_safe("${ipt4} -A INPUT && true"));
    }

    #[test]
    fn test_placeholder_braces_do_not_trip_substitution_check() {
        assert!(line_is_safe("${ipt6} -A FORWARD -j ACCEPT"));
        assert!(line_is_safe("${ebt} -A INPUT -p ARP -j DROP"));
    }

    #[test]
    fn test_whole_file_detection_covers_comments() {
        let content = "# setup | teardown notes\n${ipt4} -A INPUT -j ACCEPT\n";
        assert!(file_has_illegal(content));
        assert!(!file_has_illegal("# plain notes\n${ipt4} -A INPUT -j DROP\n"));
    }

    #[test]
    fn test_candidate_detection() {
        assert!(is_candidate("${ipt4} -A INPUT -j ACCEPT"));
        assert!(is_candidate("  ${ebt} -A FORWARD -j DROP"));
        assert!(!is_candidate("# comment"));
        assert!(!is_candidate(""));
        assert!(!is_candidate("iptables -A INPUT -j ACCEPT"));
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            classify_family("${ipt4} -A INPUT -j ACCEPT"),
            Some(Family::Ipv4)
        );
        assert_eq!(
            classify_family("${ipt6} -A OUTPUT -j DROP"),
            Some(Family::Ipv6)
        );
        assert_eq!(
            classify_family("${ebt} -A FORWARD -j DROP"),
            Some(Family::Bridge)
        );
        // Unknown placeholder name: defensive discard, not an error
        assert_eq!(classify_family("${ipt5} -A INPUT -j DROP"), None);
        assert_eq!(classify_family(""), None);
    }

    proptest! {
        /// Any line containing a blacklisted metacharacter is rejected,
        /// no matter what surrounds it.
        #[test]
        fn prop_metacharacters_never_pass(
            prefix in "[a-zA-Z0-9 ./_{}$-]{0,40}",
            suffix in "[a-zA-Z0-9 ./_{}$-]{0,40}",
            idx in 0usize..ILLEGAL_PATTERNS.len(),
        ) {
            let line = format!("{prefix}{}{suffix}", ILLEGAL_PATTERNS[idx]);
            prop_assert!(illegal_pattern(&line).is_some());
        }

        /// Lines drawn from the safe rule alphabet always pass the screen.
        #[test]
        fn prop_safe_alphabet_always_passes(line in "[a-zA-Z0-9 ./_{}$-]{0,80}") {
            // The alphabet above cannot form any blacklisted pattern:
            // no ';', '|', '&', '`', and '(' is excluded so '$(' cannot occur
            prop_assert!(line_is_safe(&line));
        }
    }
}
