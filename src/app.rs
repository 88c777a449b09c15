//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env`
//! - installs logging
//! - loads the dataset once
//! - runs the dashboard pipeline for the requested selection
//! - prints reports and writes optional exports

use std::path::{Path, PathBuf};

use chrono::Datelike;
use clap::Parser;
use tracing::info;

use crate::cli::{Command, DATA_PATH_ENV, DEFAULT_DATA_PATH, ExportArgs, FilterArgs, GroupArgs, ReportArgs, SampleArgs};
use crate::domain::{DashboardConfig, DateRange, FilterCriteria, GroupKey, RankMetric};
use crate::error::AppError;
use crate::io::cache::DatasetCache;
use crate::io::ingest::Dataset;

pub mod pipeline;

use pipeline::{DashboardView, build_dashboard};

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want bare `sales` and `sales -r East` to behave like `sales report ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::init(cli.verbose);

    let mut cache = DatasetCache::new();
    match cli.command {
        Command::Report(args) => handle_report(&mut cache, args),
        Command::Group(args) => handle_group(&mut cache, args),
        Command::Trend(args) => handle_trend(&mut cache, args),
        Command::Top(args) => handle_top(&mut cache, args),
        Command::Export(args) => handle_export(&mut cache, args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Loaded dataset plus the run configuration derived from flags.
struct Session {
    dataset: std::sync::Arc<Dataset>,
    config: DashboardConfig,
}

impl Session {
    fn open(cache: &mut DatasetCache, config: DashboardConfig) -> Result<Self, AppError> {
        // Dropped rows are reported by the loader's `warn!` event.
        let dataset = cache.get_or_load(&config.data_path)?;
        Ok(Self { dataset, config })
    }

    fn view(&self) -> DashboardView {
        build_dashboard(
            &self.dataset,
            &self.config.criteria,
            self.config.top_n,
            self.config.rank_by,
        )
    }
}

fn handle_report(cache: &mut DatasetCache, args: ReportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.filter, args.top, args.rank_by, GroupKey::Category)?;
    let session = Session::open(cache, config)?;
    let view = session.view();

    println!("{}", crate::report::format_dashboard(&session.dataset, &view));
    Ok(())
}

fn handle_group(cache: &mut DatasetCache, args: GroupArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.filter, 0, RankMetric::Profit, args.group_by)?;
    let session = Session::open(cache, config)?;
    let view = session.view();

    print!("{}", crate::report::format_header(&session.dataset, view.criteria()));
    println!();
    match view.output() {
        Some(output) => {
            let grouped = crate::analytics::group_by_key(&output.records, session.config.group_by);
            let title = format!("Sales by {}", session.config.group_by.display_name().to_lowercase());
            print!("{}", crate::report::format_grouped(&title, session.config.group_by, &grouped));
        }
        None => println!("{}", crate::report::EMPTY_SELECTION_MESSAGE),
    }
    Ok(())
}

fn handle_trend(cache: &mut DatasetCache, args: FilterArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args, 0, RankMetric::Profit, GroupKey::Period)?;
    let session = Session::open(cache, config)?;
    let view = session.view();

    print!("{}", crate::report::format_header(&session.dataset, view.criteria()));
    println!();
    match view.output() {
        Some(output) => print!("{}", crate::report::format_trend(&output.trend)),
        None => println!("{}", crate::report::EMPTY_SELECTION_MESSAGE),
    }
    Ok(())
}

fn handle_top(cache: &mut DatasetCache, args: ReportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.filter, args.top, args.rank_by, GroupKey::Category)?;
    let session = Session::open(cache, config)?;
    let view = session.view();

    match view.output() {
        Some(output) => print!(
            "{}",
            crate::report::format_top(&output.top_performers, output.rank_by)
        ),
        None => println!("{}", crate::report::EMPTY_SELECTION_MESSAGE),
    }
    Ok(())
}

fn handle_export(cache: &mut DatasetCache, args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.trend_csv.is_none() && args.json.is_none() {
        return Err(AppError::new(
            2,
            "Nothing to export: pass --csv, --trend-csv and/or --json.",
        ));
    }

    let mut config = dashboard_config_from_args(
        &args.report.filter,
        args.report.top,
        args.report.rank_by,
        args.group_by,
    )?;
    config.export_csv = args.csv.clone();
    config.export_json = args.json.clone();

    let session = Session::open(cache, config)?;
    let view = session.view();

    let Some(output) = view.output() else {
        // Exporting zeros would be indistinguishable from real data.
        println!("{}", crate::report::EMPTY_SELECTION_MESSAGE);
        return Ok(());
    };

    if let Some(path) = &session.config.export_csv {
        let grouped = crate::analytics::group_by_key(&output.records, session.config.group_by);
        crate::io::export::write_grouped_csv(path, &grouped)?;
        info!(path = %path.display(), "Wrote grouped CSV");
    }
    if let Some(path) = &args.trend_csv {
        crate::io::export::write_trend_csv(path, &output.trend)?;
        info!(path = %path.display(), "Wrote trend CSV");
    }
    if let Some(path) = &session.config.export_json {
        crate::io::export::write_dashboard_json(path, output, session.dataset.source.as_deref())?;
        info!(path = %path.display(), "Wrote dashboard JSON");
    }

    println!("Exported {} order(s).", output.summary.order_count);
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        rows: args.rows,
        seed: args.seed,
        start: args.start.with_day(1).unwrap_or(args.start),
        months: args.months,
    };
    let records = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&args.out, &records)?;

    println!("Wrote {} order(s) to {}", records.len(), args.out.display());
    Ok(())
}

/// Resolve flags, environment and defaults into a run configuration.
pub fn dashboard_config_from_args(
    filter: &FilterArgs,
    top_n: usize,
    rank_by: RankMetric,
    group_by: GroupKey,
) -> Result<DashboardConfig, AppError> {
    let data_path = resolve_data_path(filter.file.as_deref(), std::env::var(DATA_PATH_ENV).ok());
    let criteria = criteria_from_args(filter)?;

    Ok(DashboardConfig {
        data_path,
        criteria,
        top_n,
        rank_by,
        group_by,
        export_csv: None,
        export_json: None,
    })
}

/// Build a fresh selection from the filter flags.
pub fn criteria_from_args(filter: &FilterArgs) -> Result<FilterCriteria, AppError> {
    let date_range = DateRange::from_bounds(filter.from, filter.to)?;
    Ok(FilterCriteria::new()
        .with_regions(filter.regions.iter().map(|s| s.trim()))
        .with_categories(filter.categories.iter().map(|s| s.trim()))
        .with_date_range(date_range))
}

/// `--file` wins, then the environment, then the default file name.
fn resolve_data_path(flag: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    env.filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

/// Rewrite argv so `sales` defaults to `sales report`.
///
/// Rules:
/// - `sales`                       -> `sales report`
/// - `sales -r East ...`           -> `sales report -r East ...`
/// - `sales --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "report" | "group" | "trend" | "top" | "export" | "sample"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}
