use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::Confirm;
use tracing::info;

use cards_core::{
    CardRenderer, Config, DisplayArea, Grid, HtmlPage, OpenMeteoSource, Refresher,
    display::render_page,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-cards", version, about = "Weather cards for a fixed list of cities")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh the page now and then on every interval, until Ctrl-C.
    Run {
        /// HTML file to keep up to date; overrides `output` from the config.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Refresh once. Prints the page when no output file is set.
    Once {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List configured cities.
    Cities,

    /// Write a config file with the default cities.
    Init {
        /// Overwrite an existing file without asking.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Run { output } => {
                let config = load_config(self.config.as_deref())?;
                let output = output.or_else(|| config.output.clone()).context(
                    "No output file configured.\nHint: pass `--output index.html` or set `output` in the config.",
                )?;
                run_loop(&config, output).await
            }
            Command::Once { output } => {
                let config = load_config(self.config.as_deref())?;
                match output.or_else(|| config.output.clone()) {
                    Some(path) => {
                        let refresher = refresher(&config, HtmlPage::new(&path))?;
                        refresh_and_report(refresher).await?;
                        println!("Wrote {}", path.display());
                    }
                    None => {
                        let grid = refresh_and_report(refresher(&config, Grid::new())?).await?;
                        print!("{}", render_page(grid.nodes()));
                    }
                }
                Ok(())
            }
            Command::Cities => {
                let config = load_config(self.config.as_deref())?;
                for city in &config.cities {
                    let tz = city.timezone.as_deref().unwrap_or("auto");
                    println!("{:<16} {:>9.3} {:>9.3}  {tz}", city.name, city.latitude, city.longitude);
                }
                Ok(())
            }
            Command::Init { force } => init_config(self.config, force),
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn refresher<D: DisplayArea>(config: &Config, display: D) -> Result<Refresher<D>> {
    let source = OpenMeteoSource::from_config(config)?;
    Ok(Refresher::new(
        config.cities.clone(),
        Arc::new(source),
        CardRenderer::from_config(config),
        display,
    ))
}

async fn refresh_and_report<D: DisplayArea>(mut refresher: Refresher<D>) -> Result<D> {
    let report = refresher.refresh_once().await?;
    if report.failed > 0 {
        eprintln!("{} of {} cities failed to load", report.failed, report.total());
    }
    Ok(refresher.into_display())
}

async fn run_loop(config: &Config, output: PathBuf) -> Result<()> {
    info!(
        output = %output.display(),
        interval_secs = config.refresh_interval_secs,
        "starting weather refresh"
    );

    let handle = refresher(config, HtmlPage::new(output))?.spawn(config.refresh_interval());

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("shutting down");

    handle.stop().await.context("Refresh task panicked")?;
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::config_file_path()?,
    };

    if path.exists() && !force {
        let overwrite = Confirm::new(&format!("{} exists. Overwrite?", path.display()))
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if !overwrite {
            bail!("Left existing config untouched");
        }
    }

    Config::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["weather-cards", "once", "--config", "my.toml"])
            .expect("parses");

        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(cli.command, Command::Once { output: None }));
    }

    #[test]
    fn init_writes_default_config_to_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        init_config(Some(path.clone()), true).expect("init");

        let cfg = load_config(Some(path.as_path())).expect("load");
        assert_eq!(cfg.cities.len(), 3);
    }
}
