//! File type detection and parser selection
//!
//! Detection looks at the file name only, never at directory names or
//! content.

use std::path::Path;

use crate::config::Config;
use crate::parsers::csharp::CsharpParser;
use crate::parsers::go::GoParser;
use crate::parsers::maven::MavenParser;
use crate::parsers::npm::NpmParser;
use crate::parsers::packages_config::PackagesConfigParser;
use crate::parsers::props::{CENTRAL_PROPS_FILE, PropsParser};
use crate::parsers::python::PythonParser;
use crate::parsers::{Ecosystem, Parser};

/// Supported manifest file types.
///
/// Each variant selects one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// C#/.NET project files (*.csproj)
    Csproj,
    /// Legacy NuGet package lists (packages.config)
    PackagesConfig,
    /// NuGet central package management (Directory.Packages.props)
    Props,
    /// Maven projects (pom.xml)
    Maven,
    /// JavaScript/Node.js packages (package.json)
    Npm,
    /// Python requirements (requirements*.txt, packages*.txt)
    Python,
    /// Go modules (go.mod)
    Go,
}

impl FileType {
    /// Detect the file type from a manifest path.
    ///
    /// Returns `None` if the file name does not match a known manifest.
    pub fn detect(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;
        let extension = path.extension().and_then(|ext| ext.to_str());

        match filename {
            "pom.xml" => Some(FileType::Maven),
            "package.json" => Some(FileType::Npm),
            "packages.config" => Some(FileType::PackagesConfig),
            "go.mod" => Some(FileType::Go),
            CENTRAL_PROPS_FILE => Some(FileType::Props),
            _ if extension == Some("csproj") => Some(FileType::Csproj),
            _ if extension == Some("txt")
                && (filename.starts_with("requirement") || filename.starts_with("packages")) =>
            {
                Some(FileType::Python)
            }
            _ => None,
        }
    }

    /// Ecosystem tag carried by the records this file type produces
    pub fn ecosystem(self) -> Ecosystem {
        match self {
            FileType::Csproj | FileType::PackagesConfig | FileType::Props => Ecosystem::Nuget,
            FileType::Maven => Ecosystem::Maven,
            FileType::Npm => Ecosystem::Npm,
            FileType::Python => Ecosystem::Pypi,
            FileType::Go => Ecosystem::Go,
        }
    }

    /// Parser for this file type
    pub fn parser(self, config: Config) -> Box<dyn Parser> {
        match self {
            FileType::Csproj => Box::new(CsharpParser::with_config(config)),
            FileType::PackagesConfig => Box::new(PackagesConfigParser::with_config(config)),
            FileType::Props => Box::new(PropsParser::with_config(config)),
            FileType::Maven => Box::new(MavenParser::with_config(config)),
            FileType::Npm => Box::new(NpmParser::with_config(config)),
            FileType::Python => Box::new(PythonParser::new()),
            FileType::Go => Box::new(GoParser::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(path: &str) -> Option<FileType> {
        FileType::detect(Path::new(path))
    }

    #[test]
    fn test_detect_dotnet() {
        assert_eq!(detect("/project/App.csproj"), Some(FileType::Csproj));
        assert_eq!(detect("example.csproj"), Some(FileType::Csproj));
        assert_eq!(detect("/project/packages.config"), Some(FileType::PackagesConfig));
        assert_eq!(detect("/repo/Directory.Packages.props"), Some(FileType::Props));
    }

    #[test]
    fn test_detect_maven_npm_go() {
        assert_eq!(detect("/project/pom.xml"), Some(FileType::Maven));
        assert_eq!(detect("/project/package.json"), Some(FileType::Npm));
        assert_eq!(detect("/project/go.mod"), Some(FileType::Go));
    }

    #[test]
    fn test_detect_python_requirements() {
        assert_eq!(detect("/project/requirements.txt"), Some(FileType::Python));
        assert_eq!(detect("requirement-dev.txt"), Some(FileType::Python));
        assert_eq!(detect("requirements-test.txt"), Some(FileType::Python));
        assert_eq!(detect("packages.txt"), Some(FileType::Python));
    }

    #[test]
    fn test_no_false_positive_requirements_dir() {
        assert_eq!(detect("/project/requirements/notes.txt"), None);
        assert_eq!(detect("/project/dev-requirements.txt"), None);
        assert_eq!(detect("/project/requirements.in"), None);
    }

    #[test]
    fn test_unknown_files() {
        assert_eq!(detect("/project/Cargo.toml"), None);
        assert_eq!(detect("/project/package-lock.json"), None);
        assert_eq!(detect("/project/Other.props"), None);
        assert_eq!(detect("/project/pom.xml.bak"), None);
        assert_eq!(detect("/"), None);
    }

    #[test]
    fn test_ecosystem_mapping() {
        assert_eq!(FileType::Csproj.ecosystem(), Ecosystem::Nuget);
        assert_eq!(FileType::Props.ecosystem(), Ecosystem::Nuget);
        assert_eq!(FileType::Python.ecosystem(), Ecosystem::Pypi);
        assert_eq!(FileType::Go.ecosystem(), Ecosystem::Go);
    }

    #[test]
    fn test_parser_selection() {
        let parser = FileType::Go.parser(Config::default());
        let deps = parser
            .parse_content("go.mod", "require example.com/foo v1.2.3\n")
            .unwrap();
        assert_eq!(deps[0].ecosystem, FileType::Go.ecosystem());

        let parser = FileType::Python.parser(Config::default());
        let deps = parser.parse_content("requirements.txt", "flask==1.1.2\n").unwrap();
        assert_eq!(deps[0].ecosystem, Ecosystem::Pypi);
    }
}
