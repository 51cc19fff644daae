//! Parser for C# .csproj files (NuGet PackageReference format)

use std::collections::HashMap;
use std::path::Path;

use super::location::{Anchor, locate_element};
use super::props::{central_versions, declared_version, find_central_props};
use super::version::normalize;
use super::xml::{Element, parse_document};
use super::{Dependency, Ecosystem, Parser};
use crate::config::Config;
use crate::error::{ParseError, Result};
use crate::utils::{line_starts, split_lines};

/// XML element that declares a package in a project file
const PACKAGE_REFERENCE: &str = "PackageReference";

/// Parser for C# .csproj files
#[derive(Debug, Default)]
pub struct CsharpParser {
    config: Config,
}

impl CsharpParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Versions from the nearest Directory.Packages.props, if any.
    ///
    /// The props file is optional, so failures only produce a warning.
    fn load_central_versions(&self, file_path: &str) -> HashMap<String, String> {
        if !self.config.dotnet.resolve_central_versions {
            return HashMap::new();
        }
        let Some(props_path) = find_central_props(Path::new(file_path)) else {
            return HashMap::new();
        };
        let parsed = std::fs::read_to_string(&props_path)
            .map_err(|e| ParseError::io(&props_path, e))
            .and_then(|content| central_versions(&content));
        match parsed {
            Ok(versions) => {
                tracing::debug!(
                    "Loaded {} central versions from {}",
                    versions.len(),
                    props_path.display()
                );
                versions
            }
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", props_path.display(), e);
                HashMap::new()
            }
        }
    }
}

impl Parser for CsharpParser {
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>> {
        let root = parse_document(content)?;
        let lines = split_lines(content);
        let starts = line_starts(content);
        let mut central: Option<HashMap<String, String>> = None;
        let mut dependencies = Vec::new();

        for element in root.descendants_named(PACKAGE_REFERENCE) {
            let Some(name) = element.attr("Include").filter(|n| !n.is_empty()) else {
                continue;
            };

            let version = match package_reference_version(element) {
                Some(version) => normalize(version),
                None => {
                    let table =
                        central.get_or_insert_with(|| self.load_central_versions(file_path));
                    normalize(table.get(&name.to_lowercase()).map_or("", String::as_str))
                }
            };

            let anchor = Anchor::from_offset(&starts, element.offset);
            let locations = locate_element(
                &lines,
                anchor,
                PACKAGE_REFERENCE,
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

/// Version declared on the reference itself, including `VersionOverride`
fn package_reference_version(element: &Element) -> Option<&str> {
    declared_version(element).or_else(|| {
        element
            .attr("VersionOverride")
            .or_else(|| element.child_text("VersionOverride"))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}
