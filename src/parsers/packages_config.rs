//! Parser for legacy NuGet packages.config files

use super::location::{Anchor, locate_element};
use super::version::normalize;
use super::xml::parse_document;
use super::{Dependency, Ecosystem, Parser};
use crate::config::Config;
use crate::error::{ParseError, Result};
use crate::utils::{line_starts, split_lines};

const PACKAGE: &str = "package";

/// Parser for packages.config files
#[derive(Debug, Default)]
pub struct PackagesConfigParser {
    config: Config,
}

impl PackagesConfigParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

impl Parser for PackagesConfigParser {
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

        for element in root.descendants_named(PACKAGE) {
            let Some(id) = element.attr("id").filter(|id| !id.is_empty()) else {
                continue;
            };
            let raw = element
                .attr("version")
                .filter(|v| !v.trim().is_empty())
                .or_else(|| element.child_text("version"))
                .unwrap_or_default();

            let anchor = Anchor::from_offset(&starts, element.offset);
            let locations =
                locate_element(&lines, anchor, PACKAGE, self.config.location.scan_window);

            match Dependency::new(Ecosystem::Nuget, id, normalize(raw), file_path, locations) {
                Some(dep) => dependencies.push(dep),
                None => tracing::debug!(
                    "Skipping {}: declaration not found on line {}",
                    id,
                    anchor.line
                ),
            }
        }

        Ok(dependencies)
    }
}
