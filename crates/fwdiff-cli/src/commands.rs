use anyhow::Context;
use fwdiff_sdk::{FirmwareDiff, FwdiffConfig};

use crate::cli::{Cli, OutputFormat};
use crate::render;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = resolve_config(&cli)?;
    let diff = FirmwareDiff::new(&config).context("invalid extractor configuration")?;
    let comparison = diff.compare(&cli.file1, &cli.file2)?;

    let report = match cli.format {
        OutputFormat::Text => render::text(&comparison),
        OutputFormat::Json => render::json(&comparison)?,
    };
    print!("{report}");
    Ok(())
}

/// Config file (if any) with command-line overrides applied.
/// One-line rendering of an error and all of its causes.
pub fn error_message(err: &anyhow::Error) -> String {
    format!("error: {err:#}")
}

fn resolve_config(cli: &Cli) -> anyhow::Result<FwdiffConfig> {
    let mut config = match &cli.config {
        Some(path) => FwdiffConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FwdiffConfig::default(),
    };

    if let Some(tool) = &cli.tool {
        config.extract.tool = tool.clone();
    }
    if let Some(algorithm) = cli.algorithm {
        config.diff.algorithm = algorithm;
    }
    if let Some(policy) = cli.on_type_conflict {
        config.diff.type_conflict = policy;
    }
    if cli.expand {
        config.diff.expand_one_sided = true;
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}
