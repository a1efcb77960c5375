use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use inquire::{Password, PasswordDisplayMode, Text};
use locinfo_core::{
    CollectorId, Collectors, Config, LocationInfo, Pipeline, TzfTimezoneResolver, render,
};

use crate::table::ascii_table;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "locinfo",
    version,
    about = "Country facts, weather, exchange rates and news for a location",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Country and/or city; prompted for when omitted.
    #[arg(short, long)]
    pub location: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a collector.
    Configure {
        /// Collector short name, e.g. "openweather" or "newsapi".
        collector: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure { collector }) => configure(&collector),
            None => show(self.location).await,
        }
    }
}

fn configure(collector: &str) -> anyhow::Result<()> {
    let id = CollectorId::try_from(collector)?;
    let mut config = Config::load_file()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.upsert_api_key(id, api_key.to_string());
    config.save()?;

    println!("Saved API key for {id} to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(location: Option<String>) -> anyhow::Result<()> {
    let query = match location {
        Some(location) => location,
        None => Text::new("Страна и/или город:").prompt().context("Failed to read location")?,
    };

    let config = Config::load()?;
    let collectors = Collectors::from_config(&config)?;
    let pipeline = Pipeline::new(collectors, Box::new(TzfTimezoneResolver::new()));

    let info = pipeline.run(&query).await?;
    println!("{}", output(info.as_ref()));

    Ok(())
}

/// Green table for a found location, yellow warning otherwise.
fn output(info: Option<&LocationInfo>) -> String {
    match info {
        Some(info) => ascii_table(&render(info)).green().to_string(),
        None => "Информация отсутствует.".yellow().to_string(),
    }
}
