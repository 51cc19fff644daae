//! Parser for package.json files

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::location::locate_range;
use super::lockfile::LockFile;
use super::version::{LATEST, is_exact_npm};
use super::{Dependency, Ecosystem, Parser};
use crate::config::Config;
use crate::error::Result;
use crate::utils::{line_starts, split_lines};

/// Dependency sections, in the order they are reported
const SECTIONS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<Map<String, Value>>,
    #[serde(default)]
    dev_dependencies: Option<Map<String, Value>>,
    #[serde(default)]
    peer_dependencies: Option<Map<String, Value>>,
    #[serde(default)]
    optional_dependencies: Option<Map<String, Value>>,
}

impl PackageJson {
    fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        match name {
            "dependencies" => self.dependencies.as_ref(),
            "devDependencies" => self.dev_dependencies.as_ref(),
            "peerDependencies" => self.peer_dependencies.as_ref(),
            "optionalDependencies" => self.optional_dependencies.as_ref(),
            _ => None,
        }
    }
}

/// Parser for npm package.json dependency files
#[derive(Debug, Default)]
pub struct NpmParser {
    config: Config,
}

impl NpmParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Parses package.json content, resolving ranges through `lock` when given
    pub fn parse_with_lockfile(
        &self,
        file_path: &str,
        content: &str,
        lock: Option<&LockFile>,
    ) -> Result<Vec<Dependency>> {
        let manifest: PackageJson = serde_json::from_str(content)?;
        let spans = section_spans(content);
        let lines = split_lines(content);
        let starts = line_starts(content);
        let mut dependencies = Vec::new();

        for section in SECTIONS {
            let Some(entries) = manifest.section(section) else {
                continue;
            };
            let positions = spans.get(section);

            for (name, spec) in entries {
                let Some(spec) = spec.as_str() else {
                    tracing::debug!("Skipping {} in {}: version is not a string", name, section);
                    continue;
                };
                let locations = positions
                    .and_then(|members| members.get(name))
                    .map(|&(start, end)| locate_range(&lines, &starts, start, end))
                    .unwrap_or_default();
                let version = resolve_version(name, spec, lock);

                match Dependency::new(Ecosystem::Npm, name, version, file_path, locations) {
                    Some(dep) => dependencies.push(dep),
                    None => tracing::debug!("Skipping {} in {}: key not found", name, section),
                }
            }
        }

        Ok(dependencies)
    }
}

impl Parser for NpmParser {
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>> {
        let lock = if self.config.npm.resolve_lockfile {
            LockFile::load_sibling(Path::new(file_path))
        } else {
            None
        };
        self.parse_with_lockfile(file_path, content, lock.as_ref())
    }
}

/// Exact specifiers are reported as written; anything else is looked up in
/// the lock file and falls back to [`LATEST`].
fn resolve_version(name: &str, spec: &str, lock: Option<&LockFile>) -> String {
    let spec = spec.trim();
    if is_exact_npm(spec) {
        return spec.to_string();
    }
    lock.and_then(|lock| lock.resolve(name, spec))
        .map_or_else(|| LATEST.to_string(), str::to_string)
}

/// Byte range of each dependency entry (`"name": "spec"`), per section
type SectionSpans = HashMap<String, HashMap<String, (usize, usize)>>;

fn section_spans(content: &str) -> SectionSpans {
    let mut scanner = Scanner::new(content);
    let mut sections = HashMap::new();
    scanner.skip_whitespace();
    let Some(top) = scanner.object_members() else {
        return sections;
    };

    for member in top {
        if !SECTIONS.contains(&member.key.as_str()) {
            continue;
        }
        let mut inner = Scanner::at(content, member.value_start);
        let Some(entries) = inner.object_members() else {
            continue;
        };
        let ranges = entries
            .into_iter()
            .map(|entry| (entry.key, (entry.key_start, entry.value_end)))
            .collect();
        sections.insert(member.key, ranges);
    }
    sections
}

/// One `"key": value` pair of a JSON object
#[derive(Debug)]
struct Member {
    key: String,
    key_start: usize,
    value_start: usize,
    value_end: usize,
}

/// Structural JSON scanner that records byte offsets.
///
/// Runs only on documents serde_json has already accepted, so it tracks
/// nesting and strings and nothing else.
struct Scanner<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Self::at(content, 0)
    }

    fn at(content: &'a str, pos: usize) -> Self {
        Self { content, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.content.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Skips a string starting at the current `"`, returning its end (exclusive)
    fn skip_string(&mut self) -> Option<usize> {
        if self.peek() != Some(b'"') {
            return None;
        }
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some(self.pos);
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skips any value, returning its end (exclusive)
    fn skip_value(&mut self) -> Option<usize> {
        match self.peek()? {
            b'"' => self.skip_string(),
            b'{' | b'[' => {
                let mut depth = 0usize;
                loop {
                    match self.peek()? {
                        b'"' => {
                            self.skip_string()?;
                            continue;
                        }
                        b'{' | b'[' => depth += 1,
                        b'}' | b']' => {
                            depth -= 1;
                            if depth == 0 {
                                self.pos += 1;
                                return Some(self.pos);
                            }
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
            }
            _ => {
                while !matches!(
                    self.peek(),
                    None | Some(b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r')
                ) {
                    self.pos += 1;
                }
                Some(self.pos)
            }
        }
    }

    /// Members of the object starting at the current `{`
    fn object_members(&mut self) -> Option<Vec<Member>> {
        if self.peek() != Some(b'{') {
            return None;
        }
        self.pos += 1;
        let mut members = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'}' => return Some(members),
                b',' => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let key_start = self.pos;
            let key_end = self.skip_string()?;
            let key: String = serde_json::from_str(&self.content[key_start..key_end]).ok()?;
            self.skip_whitespace();
            if self.peek()? != b':' {
                return None;
            }
            self.pos += 1;
            self.skip_whitespace();
            let value_start = self.pos;
            let value_end = self.skip_value()?;

            members.push(Member {
                key,
                key_start,
                value_start,
                value_end,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str, lock: Option<&LockFile>) -> Vec<Dependency> {
        NpmParser::new()
            .parse_with_lockfile("package.json", content, lock)
            .unwrap()
    }

    #[test]
    fn test_parse_sections_in_order() {
        let content = r#"{
  "name": "test-package",
  "version": "1.0.0",
  "dependencies": {
    "express": "4.18.2",
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "jest": "29.7.0"
  },
  "peerDependencies": {
    "react": "18.2.0"
  },
  "optionalDependencies": {
    "fsevents": "2.3.3"
  }
}"#;
        let deps = parse(content, None);
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["express", "lodash", "jest", "react", "fsevents"]);
        assert_eq!(deps[0].version, "4.18.2");
        assert_eq!(deps[0].ecosystem, Ecosystem::Npm);
        assert_eq!(deps[1].version, "latest");

        let lines = split_lines(content);
        assert_eq!(deps[0].locations.len(), 1);
        assert_eq!(deps[0].locations[0].line, 4);
        assert_eq!(deps[0].locations[0].start_index, 4);
        assert_eq!(deps[0].locations[0].slice(&lines), Some(r#""express": "4.18.2""#));
        assert_eq!(deps[2].locations[0].line, 8);
    }

    #[test]
    fn test_lockfile_resolution() {
        let content = r#"{
  "dependencies": {
    "caret-dep": "^2.0.0",
    "tilde-dep": "~3.0.0",
    "star-dep": "*",
    "exact-dep": "1.0.0",
    "missing-dep": "^9.0.0"
  }
}"#;
        let lock = LockFile::from_json(
            r#"{
  "lockfileVersion": 2,
  "packages": {
    "node_modules/caret-dep": { "version": "2.3.4" },
    "node_modules/tilde-dep": { "version": "3.0.9" },
    "node_modules/star-dep": { "version": "4.5.0" },
    "node_modules/exact-dep": { "version": "1.0.5" }
  }
}"#,
        )
        .unwrap();

        let deps = parse(content, Some(&lock));
        let versions: Vec<&str> = deps.iter().map(|d| d.version.as_str()).collect();
        assert_eq!(versions, vec!["2.3.4", "3.0.9", "4.5.0", "1.0.0", "latest"]);
    }

    #[test]
    fn test_without_lockfile_ranges_are_latest() {
        let content = r#"{"dependencies": {"a": "^1.0.0", "b": "1.x", "c": "latest", "d": "2.0.0"}}"#;
        let deps = parse(content, None);
        let versions: Vec<&str> = deps.iter().map(|d| d.version.as_str()).collect();
        assert_eq!(versions, vec!["latest", "latest", "latest", "2.0.0"]);
    }

    #[test]
    fn test_inline_sections_get_columns() {
        let content = r#"{"dependencies": {"a": "1.0.0", "b": "2.0.0"}}"#;
        let deps = parse(content, None);
        let lines = split_lines(content);
        assert_eq!(deps[0].locations[0].slice(&lines), Some(r#""a": "1.0.0""#));
        assert_eq!(deps[1].locations[0].slice(&lines), Some(r#""b": "2.0.0""#));
    }

    #[test]
    fn test_keys_scoped_to_section() {
        let content = r#"{
  "scripts": {
    "jest": "jest --coverage"
  },
  "jest": {
    "testEnvironment": "node"
  },
  "devDependencies": {
    "jest": "29.7.0"
  }
}"#;
        let deps = parse(content, None);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].locations[0].line, 8);
    }

    #[test]
    fn test_same_package_in_two_sections() {
        let content = r#"{
  "dependencies": { "react": "18.2.0" },
  "peerDependencies": { "react": "18.2.0" }
}"#;
        let deps = parse(content, None);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].locations[0].line, 1);
        assert_eq!(deps[1].locations[0].line, 2);
    }

    #[test]
    fn test_strings_with_braces_and_escapes() {
        let content = r#"{
  "description": "uses { and } and \" quotes",
  "dependencies": {
    "@scope/pkg": "1.2.3"
  }
}"#;
        let deps = parse(content, None);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "@scope/pkg");
        assert_eq!(deps[0].locations[0].line, 3);
    }

    #[test]
    fn test_non_string_versions_skipped() {
        let content = r#"{"dependencies": {"a": {"version": "1.0.0"}, "b": "1.0.0"}}"#;
        let deps = parse(content, None);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "b");
    }

    #[test]
    fn test_no_sections() {
        assert!(parse(r#"{"name": "empty"}"#, None).is_empty());
        assert!(parse(r#"{"dependencies": null}"#, None).is_empty());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let parser = NpmParser::new();
        assert!(parser.parse_with_lockfile("package.json", r#"{"dependencies": {"#, None).is_err());
        assert!(parser.parse_with_lockfile("package.json", "[1, 2]", None).is_err());
    }

    #[test]
    fn test_scanner_members() {
        let content = r#"{ "a" : [1, {"x": "}"}], "b": true, "c": -1.5e3 }"#;
        let members = Scanner::new(content).object_members().unwrap();
        let keys: Vec<&str> = members.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(&content[members[0].value_start..members[0].value_end], r#"[1, {"x": "}"}]"#);
        assert_eq!(&content[members[2].value_start..members[2].value_end], "-1.5e3");
    }
}
