//! Parsers for dependency manifests (csproj, pom.xml, package.json, etc.)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

pub mod csharp;
pub mod go;
pub mod location;
pub mod lockfile;
pub mod maven;
pub mod npm;
pub mod packages_config;
pub mod props;
pub mod python;
pub mod version;
pub mod xml;

/// Package manager a dependency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// .NET packages (csproj, packages.config, Directory.Packages.props)
    Nuget,
    /// Maven artifacts (pom.xml)
    Maven,
    /// npm packages (package.json)
    Npm,
    /// Python packages (requirements.txt)
    Pypi,
    /// Go modules (go.mod)
    Go,
}

impl Ecosystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Nuget => "nuget",
            Ecosystem::Maven => "maven",
            Ecosystem::Npm => "npm",
            Ecosystem::Pypi => "pypi",
            Ecosystem::Go => "go",
        }
    }
}

/// A span of text on one line of a manifest.
///
/// `line` is 0-indexed; `start_index` and `end_index` are byte columns with
/// `end_index` exclusive, so `&line_text[start_index..end_index]` is the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub line: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl Location {
    pub fn new(line: usize, start_index: usize, end_index: usize) -> Self {
        Self {
            line,
            start_index,
            end_index,
        }
    }

    /// The text this span covers, if it lies within `lines`
    pub fn slice<'a>(&self, lines: &[&'a str]) -> Option<&'a str> {
        lines.get(self.line)?.get(self.start_index..self.end_index)
    }
}

/// Represents a dependency extracted from a manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Package manager tag
    #[serde(rename = "packageManager")]
    pub ecosystem: Ecosystem,
    /// Package name (`groupId:artifactId` for Maven)
    #[serde(rename = "packageName")]
    pub name: String,
    /// Exact version, or `"latest"` when the declaration is not pinned
    pub version: String,
    /// Path of the manifest the dependency was read from
    pub file_path: String,
    /// Spans covering the declaration, in document order
    pub locations: Vec<Location>,
}

impl Dependency {
    /// Builds a record, or `None` when the declaration could not be located.
    pub fn new(
        ecosystem: Ecosystem,
        name: impl Into<String>,
        version: impl Into<String>,
        file_path: &str,
        locations: Vec<Location>,
    ) -> Option<Self> {
        if locations.is_empty() {
            return None;
        }
        let version = version.into();
        Some(Self {
            ecosystem,
            name: name.into(),
            version: if version.is_empty() {
                version::LATEST.to_string()
            } else {
                version
            },
            file_path: file_path.to_string(),
            locations,
        })
    }

    /// First line of the declaration
    pub fn line(&self) -> usize {
        self.locations[0].line
    }
}

/// Trait for parsing dependency files
pub trait Parser: Send + Sync {
    /// Parse already loaded manifest content.
    ///
    /// `file_path` is recorded on every dependency and used to find sibling
    /// files such as package-lock.json.
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>>;

    /// Read the manifest at `path` and extract its dependencies
    fn parse(&self, path: &Path) -> Result<Vec<Dependency>> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        self.parse_content(&path.display().to_string(), &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_requires_location() {
        let dep = Dependency::new(Ecosystem::Npm, "react", "18.2.0", "package.json", vec![]);
        assert!(dep.is_none());
    }

    #[test]
    fn test_empty_version_becomes_latest() {
        let dep = Dependency::new(
            Ecosystem::Pypi,
            "flask",
            "",
            "requirements.txt",
            vec![Location::new(0, 0, 5)],
        )
        .unwrap();
        assert_eq!(dep.version, "latest");
        assert_eq!(dep.line(), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let dep = Dependency::new(
            Ecosystem::Maven,
            "org.slf4j:slf4j-api",
            "2.0.9",
            "pom.xml",
            vec![Location::new(3, 4, 17)],
        )
        .unwrap();
        let value = serde_json::to_value(&dep).unwrap();
        assert_eq!(value["packageManager"], "maven");
        assert_eq!(value["packageName"], "org.slf4j:slf4j-api");
        assert_eq!(value["version"], "2.0.9");
        assert_eq!(value["filePath"], "pom.xml");
        assert_eq!(value["locations"][0]["line"], 3);
        assert_eq!(value["locations"][0]["startIndex"], 4);
        assert_eq!(value["locations"][0]["endIndex"], 17);
    }

    #[test]
    fn test_location_slice() {
        let lines = vec!["  <a/>", "x"];
        assert_eq!(Location::new(0, 2, 6).slice(&lines), Some("<a/>"));
        assert_eq!(Location::new(1, 0, 5).slice(&lines), None);
        assert_eq!(Location::new(4, 0, 1).slice(&lines), None);
    }

    #[test]
    fn test_ecosystem_tags() {
        assert_eq!(Ecosystem::Nuget.as_str(), "nuget");
        assert_eq!(Ecosystem::Go.as_str(), "go");
        assert_eq!(serde_json::to_value(Ecosystem::Pypi).unwrap(), "pypi");
    }
}
