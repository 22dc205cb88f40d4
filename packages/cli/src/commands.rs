//! Subcommand bodies shared by the argument parser and the interactive
//! menu.

use std::time::Instant;

use delitos_cli_utils::{BarKind, MultiProgress, progress};
use delitos_crime_models::{CRIME_TYPES, ReservedCategory};
use delitos_geography_models::GeoLevel;
use delitos_reconcile::config::PipelineConfig;
use delitos_reconcile::output::read_wide;
use delitos_reconcile::views::{
    MapPeriod, SUMMARY_INDICATORS, income_by_community, map_rows, summarize, top_municipalities,
};
use delitos_reconcile::{ReconcileError, run_crime_pipeline, run_income};
use delitos_source::income::IncomeIndicator;

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// Runs the crime pipeline and prints where the tables went.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the pipeline fails.
pub fn crime(config: &PipelineConfig, multi: &MultiProgress) -> Result<(), ReconcileError> {
    let start = Instant::now();
    let reporter = progress(multi, "Crime pipeline", BarKind::Stages);

    let tables = run_crime_pipeline(config, &reporter)?;

    log::info!("Crime pipeline finished in {:.1?}", start.elapsed());
    println!("Keys:      {}", tables.wide.len());
    println!("Long rows: {}", tables.long.len());
    println!("Long:      {}", config.long_output_path().display());
    println!("Wide:      {}", config.wide_output_path().display());
    Ok(())
}

/// Loads the income tables and prints the per-community summary plus the
/// top `top` municipalities by `metric`.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the manifest check fails or no income
/// file loads.
pub fn income(
    config: &PipelineConfig,
    multi: &MultiProgress,
    top: usize,
    metric: Option<&str>,
) -> Result<(), ReconcileError> {
    let reporter = progress(multi, "Income tables", BarKind::Files);
    let rows = run_income(config, &reporter)?;

    let year = config.years.current;
    println!();
    println!(
        "{:<28} {:>6} {}",
        "COMUNIDAD",
        "MUNIC.",
        SUMMARY_INDICATORS
            .iter()
            .map(|i| format!("{:>12}", short_label(*i)))
            .collect::<String>()
    );
    println!("{}", "-".repeat(88));
    for community in income_by_community(&rows, year) {
        println!(
            "{:<28} {:>6} {}",
            community.comunidad,
            community.municipalities,
            community
                .means
                .iter()
                .map(|m| format!("{:>12}", cell(*m)))
                .collect::<String>()
        );
    }

    let metric = metric.map_or_else(
        || IncomeIndicator::NetPerPerson.column(year),
        ToString::to_string,
    );

    if let Some(summary) = summarize(&rows, &metric) {
        println!();
        println!(
            "{metric}: mean {:.1}, median {:.1} over {} municipalities",
            summary.mean, summary.median, summary.count
        );
    } else {
        log::warn!("No municipality has a value for {metric:?}");
    }

    println!();
    for (rank, entry) in top_municipalities(&rows, &[], &metric, top)
        .iter()
        .enumerate()
    {
        println!(
            "{:>3}. {:<40} {:>12.1}",
            rank + 1,
            entry.row.municipality,
            entry.value
        );
    }

    Ok(())
}

const fn short_label(indicator: IncomeIndicator) -> &'static str {
    match indicator {
        IncomeIndicator::NetPerPerson => "NETA/PERS",
        IncomeIndicator::NetPerHousehold => "NETA/HOGAR",
        IncomeIndicator::MeanPerConsumptionUnit => "MEDIA/UC",
        IncomeIndicator::MedianPerConsumptionUnit => "MEDIANA/UC",
        IncomeIndicator::GrossPerPerson => "BRUTA/PERS",
        IncomeIndicator::GrossPerHousehold => "BRUTA/HOGAR",
    }
}

/// Prints one choropleth layer read back from the wide table.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the wide table is missing or unreadable.
pub fn map(
    config: &PipelineConfig,
    level: GeoLevel,
    crime_type: &str,
    period: MapPeriod,
) -> Result<(), ReconcileError> {
    let wide = read_wide(&config.wide_output_path(), config.years)?;
    let rows = map_rows(&wide, level, crime_type, period);

    if rows.is_empty() {
        log::warn!(
            "No {} rows for {crime_type:?}; run `delitos types` for the known labels",
            level.label()
        );
        return Ok(());
    }

    println!("{} / {crime_type} / {period}", level.label());
    println!(
        "{:<30} {:<30} {:>10} {:>10} {:>8}",
        "REGION",
        "POLYGON",
        config.years.current,
        config.years.prior,
        "VAR %"
    );
    println!("{}", "-".repeat(92));
    for row in &rows {
        println!(
            "{:<30} {:<30} {:>10} {:>10} {:>8}",
            row.region,
            row.polygon,
            cell(row.current),
            cell(row.prior),
            cell(row.variation)
        );
    }

    Ok(())
}

/// Prints the crime-type labels, marking the aggregate categories.
pub fn types() {
    for label in CRIME_TYPES {
        let marker = if label.parse::<ReservedCategory>().is_ok() {
            "*"
        } else {
            " "
        };
        println!("{marker} {label}");
    }
    println!();
    println!("* aggregate category");
}
