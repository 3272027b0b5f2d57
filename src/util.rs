//! Shell quoting helpers for preview rendering.
//!
//! Execution itself passes discrete argv tokens to the OS; these helpers only
//! matter when a command line is shown to a human (dry-run, verbose logging)
//! or embedded into a shell script by a caller.

/// Quote a single string so a POSIX shell reproduces it verbatim.
///
/// Plain words (alphanumerics plus `-_=./:@`) pass through unquoted; anything
/// else is wrapped in single quotes with embedded quotes spliced as `'"'"'`.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}

/// Render an argv as one shell-safe command line.
pub fn shell_join<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| shell_escape(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escape_simple() {
        assert_eq!(shell_escape("abc-123_./:@"), "abc-123_./:@");
    }

    #[test]
    fn test_shell_escape_empty() {
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_shell_escape_with_spaces_and_quotes() {
        assert_eq!(shell_escape("a b c"), "'a b c'");
        assert_eq!(shell_escape("O'Reilly"), "'O'\"'\"'Reilly'");
    }

    #[test]
    fn test_shell_escape_metacharacters() {
        assert_eq!(shell_escape("$(rm -rf /)"), "'$(rm -rf /)'");
        assert_eq!(shell_escape("a;b|c"), "'a;b|c'");
    }

    #[test]
    fn test_shell_join() {
        let args = ["a", "b c", "d"];
        assert_eq!(shell_join(&args), "a 'b c' d");
    }
}
