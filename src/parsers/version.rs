//! Version specifier normalization.
//!
//! Manifests declare either an exact version or some kind of range. Ranges
//! cannot be reported as a single version, so they collapse to [`LATEST`].

/// Sentinel reported for any version that is not an exact pin
pub const LATEST: &str = "latest";

/// Explicit range syntax (NuGet/Maven intervals, property braces)
const RANGE_CHARS: &[char] = &['[', ']', '(', ')', '{', '}'];

/// Wildcards, caret/tilde requirements and comparators
const SPECIFIER_CHARS: &[char] = &['*', '^', '~', '>', '<'];

/// Checks whether a version string is an exact pin.
///
/// Multi-segment numeric versions such as `1.0.0.345` and prerelease
/// versions such as `2.0.0-beta.1` are exact.
pub fn is_exact(version: &str) -> bool {
    let version = version.trim();
    !version.is_empty() && !version.contains(RANGE_CHARS) && !version.contains(SPECIFIER_CHARS)
}

/// Returns the version unchanged if it is an exact pin, otherwise [`LATEST`].
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    if is_exact(raw) {
        raw.to_string()
    } else {
        LATEST.to_string()
    }
}

/// Checks whether an npm version specifier pins a single version.
///
/// Besides the generic specifier characters this rejects the literal tag
/// `latest`, x-ranges (`1.x`, `1.2.X`), unions (`||`) and hyphen ranges.
pub fn is_exact_npm(spec: &str) -> bool {
    let spec = spec.trim();
    if spec.is_empty() || spec == LATEST || spec.contains(SPECIFIER_CHARS) {
        return false;
    }
    if spec.contains("||") || spec.contains(" - ") {
        return false;
    }
    !spec
        .trim_start_matches(['v', '='])
        .split('.')
        .any(|part| matches!(part, "x" | "X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_versions_unchanged() {
        assert_eq!(normalize("13.0.1"), "13.0.1");
        assert_eq!(normalize("1.0.0.345"), "1.0.0.345");
        assert_eq!(normalize("2.0.0-beta.1"), "2.0.0-beta.1");
        assert_eq!(normalize("v1.2.3"), "v1.2.3");
        assert_eq!(normalize("  5.3.0 "), "5.3.0");
    }

    #[test]
    fn test_empty_is_latest() {
        assert_eq!(normalize(""), LATEST);
        assert_eq!(normalize("   "), LATEST);
    }

    #[test]
    fn test_ranges_are_latest() {
        for raw in ["[1.0.0,2.0.0)", "(,1.0]", "[1.0]", "${missing}"] {
            assert_eq!(normalize(raw), LATEST, "{raw}");
        }
    }

    #[test]
    fn test_specifiers_are_latest() {
        for raw in ["1.*", "*", "^1.2.3", "~1.2", ">=1.0", "<2", "> 1"] {
            assert_eq!(normalize(raw), LATEST, "{raw}");
        }
    }

    #[test]
    fn test_is_exact_npm() {
        assert!(is_exact_npm("4.17.21"));
        assert!(is_exact_npm("1.0.0-rc.1"));
        assert!(is_exact_npm("=1.2.3"));
        assert!(!is_exact_npm("^4.17.21"));
        assert!(!is_exact_npm("~1.0.0"));
        assert!(!is_exact_npm("*"));
        assert!(!is_exact_npm(">=1.0.0 <2.0.0"));
        assert!(!is_exact_npm("latest"));
        assert!(!is_exact_npm(""));
        assert!(!is_exact_npm("1.x"));
        assert!(!is_exact_npm("1.2.X"));
        assert!(!is_exact_npm("1.0.0 || 2.0.0"));
        assert!(!is_exact_npm("1.0.0 - 2.0.0"));
    }
}
