//! Time-series command implementation.

use super::Engine;
use crate::cli::FilterArgs;
use crate::error::Result;
use crate::output::Formatter;
use covenant_domain::{CountyCatalog, FilterParams, QueryFilterSpec};

/// Execute the time-series command.
pub async fn execute_time_series(
    args: FilterArgs,
    catalog: &CountyCatalog,
    engine: &Engine,
    formatter: &Formatter,
) -> Result<()> {
    let filter = parse_filter(args, catalog)?;
    let rows = engine.exclusion_time_series(&filter)?;
    println!("{}", formatter.format_time_series(&rows)?);
    Ok(())
}

/// Validate filter flags against the county catalog.
pub fn parse_filter(args: FilterArgs, catalog: &CountyCatalog) -> Result<QueryFilterSpec> {
    Ok(QueryFilterSpec::from_params(&FilterParams::from(args), catalog)?)
}
