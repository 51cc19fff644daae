//! Parser for requirements.txt files

use std::sync::LazyLock;

use regex::Regex;

use super::version::{LATEST, normalize};
use super::{Dependency, Ecosystem, Location, Parser};
use crate::error::Result;
use crate::utils::split_lines;

/// Project name, optional extras, then an optional version specifier.
///
/// Options (`-r`, `--index-url`), local paths and VCS URLs do not match.
static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[[^\]]*\])?\s*([=<>!~@(].*)?$",
    )
    .expect("requirement pattern is valid")
});

/// Parser for Python requirements files
#[derive(Debug, Default)]
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for PythonParser {
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>> {
        let mut dependencies = Vec::new();

        for (line_idx, line) in split_lines(content).into_iter().enumerate() {
            let code = line.split(['#', ';']).next().unwrap_or_default();
            let requirement = strip_options(code.trim());
            if requirement.is_empty() {
                continue;
            }

            let Some(captures) = REQUIREMENT.captures(requirement) else {
                tracing::debug!("Skipping line {}: not a requirement: {}", line_idx, requirement);
                continue;
            };
            let name = &captures[1];
            let version = captures
                .get(2)
                .map_or_else(|| LATEST.to_string(), |spec| pinned_version(spec.as_str()));

            let start = code.len() - code.trim_start().len();
            let location = Location::new(line_idx, start, start + requirement.len());

            if let Some(dep) =
                Dependency::new(Ecosystem::Pypi, name, version, file_path, vec![location])
            {
                tracing::trace!("{}=={} on line {}", dep.name, dep.version, line_idx);
                dependencies.push(dep);
            }
        }

        Ok(dependencies)
    }
}

/// Cuts per-requirement options (`--hash=...`) and a trailing `\` continuation.
fn strip_options(requirement: &str) -> &str {
    let end = requirement
        .match_indices("--")
        .map(|(idx, _)| idx)
        .find(|&idx| requirement[..idx].ends_with(char::is_whitespace))
        .unwrap_or(requirement.len());
    requirement[..end]
        .trim_end()
        .trim_end_matches('\\')
        .trim_end()
}

/// `==` and `===` pins are exact; every other specifier is a range.
fn pinned_version(spec: &str) -> String {
    let spec: String = spec.split_whitespace().collect();
    match spec.strip_prefix("===").or_else(|| spec.strip_prefix("==")) {
        Some(version) if !version.is_empty() && !version.contains(',') => normalize(version),
        _ => LATEST.to_string(),
    }
}
