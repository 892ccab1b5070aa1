use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use asset_roots::{
    Artifact, AssetCollection, AssetResolver, Label, ResolverConfig, RuleSnapshot, TreeArtifact,
};

/// Resolve rule asset declarations into files and asset roots.
#[derive(Debug, Parser)]
#[command(name = "asset-roots", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the assets of a rule described by a JSON snapshot.
    Resolve {
        /// Path to the rule snapshot JSON.
        snapshot: PathBuf,
        /// Explicit configuration file; discovered next to the snapshot when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Describe the assets of a pre-built directory output.
    Prebuilt {
        /// Label of the target owning the directory.
        owner: Label,
        /// Directory path relative to its source or output root.
        path: String,
        /// Directory path relative to the execution root.
        exec_path: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Plain,
}

#[derive(Debug, Serialize)]
struct AssetReport {
    owner: String,
    exec_path: String,
    root: String,
    asset_path: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (collection, format) = match cli.command {
        Commands::Resolve {
            snapshot,
            config,
            format,
        } => (resolve_snapshot(&snapshot, config.as_deref())?, format),
        Commands::Prebuilt {
            owner,
            path,
            exec_path,
            format,
        } => (prebuilt_collection(owner, &path, &exec_path)?, format),
    };

    println!("{}", render_reports(&build_reports(&collection), format)?);
    Ok(())
}

fn resolve_snapshot(snapshot: &Path, config: Option<&Path>) -> Result<AssetCollection> {
    let config = match config {
        Some(path) => ResolverConfig::from_path(path)
            .ok_or_else(|| anyhow!("failed to load configuration {}", path.display()))?,
        None => ResolverConfig::discover(snapshot.parent().unwrap_or(Path::new("."))),
    };

    let mut rule = RuleSnapshot::load(snapshot)?;
    let resolver = AssetResolver::new(config.into_attributes());
    let result = resolver.resolve_rule(&mut rule);

    for line in diagnostic_lines(&rule) {
        eprintln!("{line}");
    }

    result.with_context(|| format!("failed to resolve assets of {}", rule.label))
}

fn diagnostic_lines(rule: &RuleSnapshot) -> Vec<String> {
    rule.diagnostics()
        .iter()
        .map(|diagnostic| match &diagnostic.attribute {
            Some(attribute) => format!(
                "error: in {attribute} attribute of {}: {}",
                rule.label, diagnostic.message
            ),
            None => format!("error: in {}: {}", rule.label, diagnostic.message),
        })
        .collect()
}

fn prebuilt_collection(owner: Label, path: &str, exec_path: &str) -> Result<AssetCollection> {
    let directory = Artifact::tree(owner, path, exec_path)?;
    let tree = TreeArtifact::try_from(directory)?;
    Ok(AssetCollection::from_prebuilt_directory(tree))
}

fn build_reports(collection: &AssetCollection) -> Vec<AssetReport> {
    collection
        .entries()
        .map(|entry| AssetReport {
            owner: entry.file.owner().to_string(),
            exec_path: entry.file.exec_path().to_string(),
            root: entry.root.to_string(),
            asset_path: entry.asset_path().map(|path| path.to_string()),
        })
        .collect()
}

fn render_reports(reports: &[AssetReport], format: Format) -> Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(reports).context("failed to serialise assets"),
        Format::Plain => Ok(reports
            .iter()
            .map(|report| format!("{}\t{}", report.exec_path, report.root))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
