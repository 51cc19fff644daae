//! Configuration management for the manifest parsers

use serde::Deserialize;

/// Default number of lines scanned after an opening tag for its closing tag
pub const DEFAULT_SCAN_WINDOW: usize = 15;

/// Parser configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Location recovery configuration
    pub location: LocationConfig,
    /// npm configuration
    pub npm: NpmConfig,
    /// .NET configuration
    pub dotnet: DotnetConfig,
}

/// Location recovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Lines searched after a multi-line element's opening line
    pub scan_window: usize,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

/// npm configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NpmConfig {
    /// Resolve non-exact specifiers through a sibling package-lock.json
    pub resolve_lockfile: bool,
}

impl Default for NpmConfig {
    fn default() -> Self {
        Self {
            resolve_lockfile: true,
        }
    }
}

/// .NET configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DotnetConfig {
    /// Resolve versionless PackageReference items through Directory.Packages.props
    pub resolve_central_versions: bool,
}

impl Default for DotnetConfig {
    fn default() -> Self {
        Self {
            resolve_central_versions: true,
        }
    }
}

impl Config {
    /// Parse configuration from a JSON value, falling back to defaults
    pub fn from_json(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::warn!("Ignoring invalid configuration: {}", err);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.scan_window, DEFAULT_SCAN_WINDOW);
        assert!(config.npm.resolve_lockfile);
        assert!(config.dotnet.resolve_central_versions);
    }

    #[test]
    fn test_parse_from_json() {
        let json = json!({
            "location": {
                "scan_window": 10
            },
            "npm": {
                "resolve_lockfile": false
            },
            "dotnet": {
                "resolve_central_versions": false
            }
        });

        let config = Config::from_json(Some(json));
        assert_eq!(config.location.scan_window, 10);
        assert!(!config.npm.resolve_lockfile);
        assert!(!config.dotnet.resolve_central_versions);
    }

    #[test]
    fn test_partial_config() {
        let json = json!({
            "npm": {
                "resolve_lockfile": false
            }
        });

        let config = Config::from_json(Some(json));
        assert!(!config.npm.resolve_lockfile);
        // Other fields should use defaults
        assert_eq!(config.location.scan_window, DEFAULT_SCAN_WINDOW);
        assert!(config.dotnet.resolve_central_versions);
    }

    #[test]
    fn test_from_json_none() {
        let config = Config::from_json(None);
        assert!(config.npm.resolve_lockfile);
    }

    #[test]
    fn test_from_json_invalid() {
        let json = json!("invalid");
        let config = Config::from_json(Some(json));
        assert_eq!(config.location.scan_window, DEFAULT_SCAN_WINDOW);
    }
}
