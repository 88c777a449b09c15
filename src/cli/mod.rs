//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analytics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{GroupKey, RankMetric};

/// Environment variable consulted for the default dataset path.
pub const DATA_PATH_ENV: &str = "SALES_DATA_PATH";

/// Dataset path used when neither `--file` nor `SALES_DATA_PATH` is set.
pub const DEFAULT_DATA_PATH: &str = "sales_data.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales insights dashboard (terminal edition)")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the full dashboard: KPIs, category/region tables, trend, top orders.
    Report(ReportArgs),
    /// Print one grouped summary.
    Group(GroupArgs),
    /// Print the month-over-month trend.
    Trend(FilterArgs),
    /// Print the top orders by profit or sales.
    Top(ReportArgs),
    /// Export grouped/trend CSV and a full JSON snapshot.
    Export(ExportArgs),
    /// Generate a synthetic sales CSV.
    Sample(SampleArgs),
}

/// Dataset and selection options shared by every view.
#[derive(Debug, Args, Clone)]
pub struct FilterArgs {
    /// Sales CSV (defaults to $SALES_DATA_PATH, then `sales_data.csv`).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Keep only these regions (repeatable; default: all).
    #[arg(short = 'r', long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Keep only these categories (repeatable; default: all).
    #[arg(short = 'c', long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// First order date to include (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last order date to include (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

/// Options for views that rank orders.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// How many top orders to show.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub top: usize,

    /// Metric used to rank top orders.
    #[arg(long = "by", value_enum, default_value_t = RankMetric::Profit)]
    pub rank_by: RankMetric,
}

/// Options for `sales group`.
#[derive(Debug, Args, Clone)]
pub struct GroupArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Grouping dimension.
    #[arg(long = "by", value_enum, default_value_t = GroupKey::Category)]
    pub group_by: GroupKey,
}

/// Options for `sales export`.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Dimension written to the grouped CSV.
    #[arg(long = "group-by", value_enum, default_value_t = GroupKey::Category)]
    pub group_by: GroupKey,

    /// Write the grouped summary to this CSV.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Write the month-over-month trend to this CSV.
    #[arg(long = "trend-csv", value_name = "CSV")]
    pub trend_csv: Option<PathBuf>,

    /// Write the full dashboard snapshot to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

/// Options for `sales sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of orders to generate.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub rows: usize,

    /// Random seed (same seed, same file).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First month covered (YYYY-MM-DD, day is ignored).
    #[arg(long, default_value = "2023-01-01")]
    pub start: NaiveDate,

    /// Number of months covered.
    #[arg(long, default_value_t = 12)]
    pub months: u32,

    /// Output CSV path.
    #[arg(short = 'o', long, default_value = DEFAULT_DATA_PATH)]
    pub out: PathBuf,
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
    fn parses_repeated_filters() {
        let cli = Cli::parse_from([
            "sales", "report", "-r", "East", "--region", "South", "-c", "Technology", "--from", "2023-01-01",
            "-n", "3", "--by", "sales",
        ]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.filter.regions, vec!["East", "South"]);
        assert_eq!(args.filter.categories, vec!["Technology"]);
        assert_eq!(args.filter.from, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(args.top, 3);
        assert_eq!(args.rank_by, RankMetric::Sales);
    }

    #[test]
    fn group_dimension_uses_kebab_case() {
        let cli = Cli::parse_from(["sales", "group", "--by", "region-category"]);
        let Command::Group(args) = cli.command else {
            panic!("expected group");
        };
        assert_eq!(args.group_by, GroupKey::RegionCategory);
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert!(Cli::try_parse_from(["sales", "trend", "--from", "01/2023"]).is_err());
    }
}
