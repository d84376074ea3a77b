mod analyzer;
mod cli;
mod config;
mod error;
mod loader;
mod plot;

use crate::cli::Cli;
use crate::config::RunConfig;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = RunConfig::from_cli(&cli)?;

    println!("\n{}\n", config.echo());

    run(&config)
}

fn run(config: &RunConfig) -> Result<()> {
    let events = loader::load_streaming_history(&config.data_dir, &config.stub, config.group)
        .with_context(|| {
            format!(
                "Failed to load streaming history from {}",
                config.data_dir.display()
            )
        })?;

    let (table, summary) = analyzer::analyze_year(config, &events)?;
    println!("{}", analyzer::report::render_summary(&summary));

    let summary_path = analyzer::report::save_summary(&summary, &config.output_dir)?;
    println!("Summary saved: {}", summary_path.display());

    let chart_path = plot::render_share_chart(&table, config)?;
    println!("Chart saved: {}", chart_path.display());

    Ok(())
}
