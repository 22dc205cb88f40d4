#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `delitos`: runs the crime reconciliation pipeline, loads the income
//! tables, and prints the dashboard's map and income views.
//!
//! Without a subcommand an interactive menu is shown.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use delitos_geography_models::GeoLevel;
use delitos_reconcile::config::PipelineConfig;
use delitos_reconcile::views::MapPeriod;

#[derive(Parser)]
#[command(name = "delitos", about = "Spanish crime and income data pipeline")]
struct Cli {
    /// Pipeline configuration file (defaults to the built-in one)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the input and output files (overrides
    /// `DELITOS_DATA_DIR` and the configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the four cumulative crime exports into the long and wide
    /// tables
    Crime,
    /// Load the per-province income tables and print the community summary
    Income {
        /// Number of municipalities in the ranking
        #[arg(long, default_value = "10")]
        top: usize,
        /// Ranking metric column (defaults to net income per person for the
        /// current year)
        #[arg(long)]
        metric: Option<String>,
    },
    /// Print a choropleth layer from the persisted wide table
    Map {
        /// Administrative level of the layer
        #[arg(long, value_enum, default_value = "community")]
        level: MapLevel,
        /// Crime-type label (see `types`)
        #[arg(long, default_value = "III. TOTAL INFRACCIONES PENALES")]
        crime_type: String,
        /// Quarter label (e.g. "Abril-Junio") or "Total"
        #[arg(long, default_value = "Total")]
        period: String,
    },
    /// List the known crime-type labels
    Types,
}

#[derive(Clone, Copy, ValueEnum)]
enum MapLevel {
    Community,
    Province,
}

impl From<MapLevel> for GeoLevel {
    fn from(level: MapLevel) -> Self {
        match level {
            MapLevel::Community => Self::Community,
            MapLevel::Province => Self::Province,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = delitos_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = PipelineConfig::load(cli.config.as_deref())?
        .with_env_overrides()
        .with_data_dir(cli.data_dir);
    log::debug!("Data directory: {}", config.data_dir.display());

    let Some(command) = cli.command else {
        return interactive::run(&config, &multi);
    };

    match command {
        Commands::Crime => commands::crime(&config, &multi)?,
        Commands::Income { top, metric } => {
            commands::income(&config, &multi, top, metric.as_deref())?;
        }
        Commands::Map {
            level,
            crime_type,
            period,
        } => {
            let period: MapPeriod = period.parse()?;
            commands::map(&config, level.into(), &crime_type, period)?;
        }
        Commands::Types => commands::types(),
    }

    Ok(())
}
