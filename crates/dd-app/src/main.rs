use anyhow::Result;
use clap::Parser;
use dd_core::config::{DeditherConfig, load_config};
use dd_core::frame::ColorMode;

pub mod batch;
pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.level_filter())
        .init();

    // 3. Config fichier + overrides CLI
    let config = resolve_config(&cli)?;

    // 4. Développer les jokers
    let inputs = batch::expand_inputs(&cli.inputs)?;
    cli.validate_out(inputs.len())?;

    // 5. Traitement séquentiel
    batch::run_batch(&inputs, &config, cli.out.as_deref(), cli.analyze)
}

/// Charge le TOML éventuel puis applique les overrides CLI.
fn resolve_config(cli: &cli::Cli) -> Result<DeditherConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DeditherConfig::default(),
    };

    if let Some(size) = cli.size {
        config.input.size = Some(size);
    }
    if let Some(crop) = cli.crop {
        config.input.crop = Some(crop);
    }
    if let Some(ref mode) = cli.mode {
        config.input.mode = Some(ColorMode::parse(mode)?);
    }
    if let Some(ref dir) = cli.target_dir {
        config.output.target_dir = Some(dir.clone());
    }

    config.validate()?;
    log::debug!("Configuration : {config:?}");
    Ok(config)
}
