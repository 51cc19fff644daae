//! Manifest Parser - dependency extraction for package manifests
//!
//! This crate reads dependency manifests (csproj, packages.config,
//! Directory.Packages.props, pom.xml, package.json, requirements.txt and
//! go.mod) and reports every declared dependency with its resolved version
//! and the exact text spans that declare it.

use std::path::Path;

pub mod config;
pub mod error;
pub mod file_types;
pub mod parsers;
pub mod utils;

pub use config::Config;
pub use error::{ParseError, Result};
pub use file_types::FileType;
pub use parsers::{Dependency, Ecosystem, Location, Parser};

/// Parses the manifest at `path` with the parser its file name selects.
pub fn parse_manifest(path: &Path) -> Result<Vec<Dependency>> {
    parse_manifest_with_config(path, Config::default())
}

/// Like [`parse_manifest`], with explicit parser configuration.
pub fn parse_manifest_with_config(path: &Path, config: Config) -> Result<Vec<Dependency>> {
    let Some(file_type) = FileType::detect(path) else {
        return Err(ParseError::Unsupported {
            path: path.to_path_buf(),
        });
    };
    tracing::debug!(
        "Parsing {} as {:?} ({:?})",
        path.display(),
        file_type,
        file_type.ecosystem()
    );
    file_type.parser(config).parse(path)
}
