//! Parser for Maven pom.xml files
//!
//! Only direct dependencies (`project/dependencies/dependency`) are reported.
//! Versions go through `${...}` property substitution first; a dependency
//! without a version takes the one from `dependencyManagement`.

use std::collections::HashMap;

use super::location::{Anchor, locate_element};
use super::version::{LATEST, normalize};
use super::xml::{Element, parse_document};
use super::{Dependency, Ecosystem, Parser};
use crate::config::Config;
use crate::error::Result;
use crate::utils::{line_starts, split_lines};

const DEPENDENCY: &str = "dependency";

/// Parser for Maven pom.xml files
#[derive(Debug, Default)]
pub struct MavenParser {
    config: Config,
}

impl MavenParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

/// Dependency coordinates as declared, after property substitution
struct Coordinates {
    group_id: String,
    artifact_id: String,
    version: String,
}

impl Coordinates {
    fn from_element(element: &Element, properties: &HashMap<String, String>) -> Self {
        let field = |name: &str| {
            substitute_properties(element.child_text(name).unwrap_or(""), properties)
        };
        Self {
            group_id: field("groupId"),
            artifact_id: field("artifactId"),
            version: field("version"),
        }
    }
}

impl Parser for MavenParser {
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>> {
        let root = parse_document(content)?;
        let Some(project) = root.child("project") else {
            return Ok(Vec::new());
        };

        let properties = collect_properties(project);
        let managed = managed_versions(project, &properties);
        let lines = split_lines(content);
        let starts = line_starts(content);
        let mut dependencies = Vec::new();

        let Some(direct) = project.child("dependencies") else {
            return Ok(dependencies);
        };

        for element in direct.children_named(DEPENDENCY) {
            let coords = Coordinates::from_element(element, &properties);
            if coords.artifact_id.is_empty() {
                continue;
            }
            let name = format!("{}:{}", coords.group_id, coords.artifact_id);
            let version = resolve_version(&coords, &managed);

            let anchor = Anchor::from_offset(&starts, element.offset);
            let locations =
                locate_element(&lines, anchor, DEPENDENCY, self.config.location.scan_window);

            match Dependency::new(Ecosystem::Maven, &name, version, file_path, locations) {
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

/// `<properties>` entries plus the project's own coordinates.
///
/// Explicit properties take precedence over the built-in ones.
fn collect_properties(project: &Element) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    let parent = project.child("parent");
    let coordinate = |name: &str| {
        project
            .child_text(name)
            .filter(|v| !v.is_empty())
            .or_else(|| parent.and_then(|p| p.child_text(name)))
            .filter(|v| !v.is_empty())
    };

    for key in ["groupId", "artifactId", "version"] {
        if let Some(value) = coordinate(key) {
            properties.insert(format!("project.{key}"), value.to_string());
            if key != "artifactId" {
                properties.insert(key.to_string(), value.to_string());
            }
        }
    }

    if let Some(declared) = project.child("properties") {
        for entry in &declared.children {
            properties.insert(entry.name.clone(), entry.text.trim().to_string());
        }
    }
    properties
}

/// Versions declared under `dependencyManagement`, keyed by (groupId, artifactId)
fn managed_versions(
    project: &Element,
    properties: &HashMap<String, String>,
) -> HashMap<(String, String), String> {
    let Some(managed) = project.find_path(&["dependencyManagement", "dependencies"]) else {
        return HashMap::new();
    };
    managed
        .children_named(DEPENDENCY)
        .map(|element| Coordinates::from_element(element, properties))
        .filter(|coords| !coords.version.is_empty())
        .map(|coords| ((coords.group_id, coords.artifact_id), coords.version))
        .collect()
}

/// Replaces every `${key}` that has a property value, in a single pass.
///
/// Substituted values are not expanded again and unknown keys stay literal.
fn substitute_properties(raw: &str, properties: &HashMap<String, String>) -> String {
    let raw = raw.trim();
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let key = &rest[start + 2..start + 2 + len];
        result.push_str(&rest[..start]);
        match properties.get(key) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..start + 3 + len]),
        }
        rest = &rest[start + 3 + len..];
    }
    result.push_str(rest);
    result
}

/// Final version for a direct dependency.
///
/// An unresolved property reference is reported as written. Managed entries
/// are consulted only for an empty version and are not chained further.
fn resolve_version(coords: &Coordinates, managed: &HashMap<(String, String), String>) -> String {
    let version = if coords.version.is_empty() {
        let key = (coords.group_id.clone(), coords.artifact_id.clone());
        match managed.get(&key) {
            Some(version) => version.as_str(),
            None => return LATEST.to_string(),
        }
    } else {
        coords.version.as_str()
    };

    if version.contains("${") {
        version.to_string()
    } else {
        normalize(version)
    }
}
