//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use covenant_domain::{ExclusionScope, FilterParams};
use std::path::PathBuf;

/// Covenant CLI - Aggregate restrictive-covenant deed reviews.
#[derive(Debug, Parser)]
#[command(name = "covenant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(short, long, global = true, env = "COVENANT_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the five headline counts
    Counts,

    /// Rank grantors
    TopGrantors(TopGrantorsArgs),

    /// Rank exclusion types
    TopExclusionTypes(TopExclusionTypesArgs),

    /// Distinct deeds per year, exclusion type and county
    TimeSeries(FilterArgs),

    /// List the exclusion type vocabulary
    ExclusionTypes,

    /// Check that the store answers
    Health,

    /// Compute every dashboard panel at once
    Dashboard(FilterArgs),
}

/// Arguments for the top-grantors command.
#[derive(Debug, Args)]
pub struct TopGrantorsArgs {
    /// How grantors are keyed and counted
    #[arg(short, long, value_enum, default_value = "deduped")]
    pub mode: GrantorMode,

    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Grantor ranking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GrantorMode {
    /// Raw grantor text, counted per review
    Exact,
    /// Normalized grantor, counted per review
    Normalized,
    /// Normalized grantor, counted per distinct deed (top 20)
    Deduped,
}

/// Arguments for the top-exclusion-types command.
#[derive(Debug, Args)]
pub struct TopExclusionTypesArgs {
    /// Which associations to count
    #[arg(short, long, value_enum, default_value = "pre-identified")]
    pub scope: ScopeArg,
}

/// Exclusion type scope argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScopeArg {
    /// Types attached to system-identified deeds
    PreIdentified,
    /// Types assigned on reviews that confirmed a covenant
    ReviewConfirmed,
}

/// Time-series filter arguments, in query-string form.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Comma-separated exclusion type ids (empty means all)
    #[arg(short, long)]
    pub types: Option<String>,

    /// First deed year, inclusive (default 1800)
    #[arg(long)]
    pub start_year: Option<String>,

    /// Last deed year, inclusive (default 1970)
    #[arg(long)]
    pub end_year: Option<String>,

    /// Comma-separated counties (default from the county catalog)
    #[arg(long)]
    pub counties: Option<String>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ScopeArg> for ExclusionScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::PreIdentified => ExclusionScope::PreIdentified,
            ScopeArg::ReviewConfirmed => ExclusionScope::ReviewConfirmed,
        }
    }
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        FilterParams {
            types: args.types,
            start_year: args.start_year,
            end_year: args.end_year,
            counties: args.counties,
        }
    }
}
