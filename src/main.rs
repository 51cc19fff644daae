use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use manifest_parser::{Config, parse_manifest_with_config};

#[derive(Parser)]
#[command(name = "manifest-parser")]
#[command(about = "Extract dependencies and their source locations from package manifests")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the manifest file (pom.xml, package.json, *.csproj, ...)
    manifest: PathBuf,

    /// JSON file with parser options (location, npm, dotnet sections)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config file {}", path.display()))?;
    Ok(Config::from_json(Some(value)))
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(cli.config.as_ref())?;
    let dependencies = parse_manifest_with_config(&cli.manifest, config)
        .with_context(|| format!("Error parsing manifest file {}", cli.manifest.display()))?;
    tracing::info!(
        "Found {} dependencies in {}",
        dependencies.len(),
        cli.manifest.display()
    );
    serde_json::to_string_pretty(&dependencies).context("Failed to serialize dependencies")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        assert!(load_config(None).unwrap().npm.resolve_lockfile);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"npm": {"resolve_lockfile": false}}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(!config.npm.resolve_lockfile);
        assert!(config.dotnet.resolve_central_versions);

        std::fs::write(&path, "not json").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
