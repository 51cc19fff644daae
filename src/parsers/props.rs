//! Parser for Directory.Packages.props (NuGet central package management)

use std::collections::HashMap;
use std::path::Path;

use super::location::{Anchor, locate_element};
use super::version::normalize;
use super::xml::{Element, parse_document};
use super::{Dependency, Ecosystem, Parser};
use crate::config::Config;
use crate::error::{ParseError, Result};
use crate::utils::{line_starts, split_lines};

/// File name MSBuild looks for when central package management is enabled
pub const CENTRAL_PROPS_FILE: &str = "Directory.Packages.props";

/// Elements in a props file that declare a package
const PACKAGE_ELEMENTS: [&str; 2] = ["PackageVersion", "GlobalPackageReference"];

/// Parser for Directory.Packages.props files
#[derive(Debug, Default)]
pub struct PropsParser {
    config: Config,
}

impl PropsParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

impl Parser for PropsParser {
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>> {
        if content.trim().is_empty() {
            return Err(ParseError::EmptyFile {
                path: file_path.into(),
            });
        }

        let root = parse_document(content)?;
        let lines = split_lines(content);
        let starts = line_starts(content);
        let mut dependencies = Vec::new();

        for element in root
            .descendants()
            .into_iter()
            .filter(|e| PACKAGE_ELEMENTS.contains(&e.name.as_str()))
        {
            let Some(name) = element.attr("Include").filter(|n| !n.is_empty()) else {
                continue;
            };
            let version = normalize(declared_version(element).unwrap_or_default());
            let anchor = Anchor::from_offset(&starts, element.offset);
            let locations = locate_element(
                &lines,
                anchor,
                &element.name,
                self.config.location.scan_window,
            );

            match Dependency::new(Ecosystem::Nuget, name, version, file_path, locations) {
                Some(dep) => dependencies.push(dep),
                None => tracing::debug!(
                    "Skipping {}: declaration not found on line {}",
                    name,
                    anchor.line
                ),
            }
        }

        Ok(dependencies)
    }
}

/// Version from the `Version` attribute or a nested `<Version>` element
pub(crate) fn declared_version(element: &Element) -> Option<&str> {
    element
        .attr("Version")
        .or_else(|| element.child_text("Version"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Package versions declared in a props file, keyed by lowercased id.
///
/// NuGet ids are case-insensitive, so lookups must lowercase too.
pub fn central_versions(content: &str) -> Result<HashMap<String, String>> {
    let root = parse_document(content)?;
    let mut versions = HashMap::new();
    for element in root.descendants_named("PackageVersion") {
        if let Some(name) = element.attr("Include")
            && let Some(version) = declared_version(element)
        {
            versions.insert(name.to_lowercase(), version.to_string());
        }
    }
    Ok(versions)
}

/// Nearest Directory.Packages.props in the manifest's directory or above
pub fn find_central_props(manifest: &Path) -> Option<std::path::PathBuf> {
    manifest
        .parent()?
        .ancestors()
        .map(|dir| dir.join(CENTRAL_PROPS_FILE))
        .find(|candidate| candidate.is_file())
}
