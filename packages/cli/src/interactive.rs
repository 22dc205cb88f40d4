//! Menu shown when `delitos` runs without a subcommand.

use delitos_cli_utils::MultiProgress;
use delitos_crime_models::{CRIME_TYPES, Quarter, ReservedCategory};
use delitos_geography_models::GeoLevel;
use delitos_reconcile::config::PipelineConfig;
use delitos_reconcile::views::MapPeriod;
use delitos_source::income::IncomeIndicator;
use dialoguer::{Input, Select};

use crate::commands;

enum Action {
    RunCrime,
    LoadIncome,
    ShowMap,
    ListTypes,
}

impl Action {
    const ALL: &[Self] = &[
        Self::RunCrime,
        Self::LoadIncome,
        Self::ShowMap,
        Self::ListTypes,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::RunCrime => "Reconcile crime exports",
            Self::LoadIncome => "Summarize income tables",
            Self::ShowMap => "Show crime map layer",
            Self::ListTypes => "List crime types",
        }
    }
}

/// Prompts for an action and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub fn run(
    config: &PipelineConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Delitos y Renta");
    println!("Data directory: {}", config.data_dir.display());
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::RunCrime => commands::crime(config, multi)?,
        Action::LoadIncome => income(config, multi)?,
        Action::ShowMap => map(config)?,
        Action::ListTypes => commands::types(),
    }

    Ok(())
}

fn income(
    config: &PipelineConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics: Vec<String> = [config.years.current, config.years.prior]
        .into_iter()
        .flat_map(|year| IncomeIndicator::ALL.map(|i| i.column(year)))
        .collect();

    let metric = Select::new()
        .with_prompt("Ranking metric")
        .items(&metrics)
        .default(0)
        .interact()?;

    let top: usize = Input::<usize>::new()
        .with_prompt("Municipalities to rank")
        .default(10)
        .interact_text()?;

    commands::income(config, multi, top, Some(&metrics[metric]))?;
    Ok(())
}

fn map(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let levels = [GeoLevel::Community, GeoLevel::Province];
    let level_labels: Vec<&str> = levels.iter().map(|l| l.label()).collect();
    let level = Select::new()
        .with_prompt("Level")
        .items(&level_labels)
        .default(0)
        .interact()?;

    let total = CRIME_TYPES
        .iter()
        .position(|t| *t == ReservedCategory::TotalInfracciones.as_ref())
        .unwrap_or(0);
    let crime_type = Select::new()
        .with_prompt("Crime type")
        .items(CRIME_TYPES)
        .default(total)
        .max_length(20)
        .interact()?;

    let periods: Vec<MapPeriod> = std::iter::once(MapPeriod::Total)
        .chain(Quarter::ALL.map(MapPeriod::Quarter))
        .collect();
    let period_labels: Vec<String> = periods.iter().map(ToString::to_string).collect();
    let period = Select::new()
        .with_prompt("Period")
        .items(&period_labels)
        .default(0)
        .interact()?;

    commands::map(
        config,
        levels[level],
        CRIME_TYPES[crime_type],
        periods[period],
    )?;
    Ok(())
}
