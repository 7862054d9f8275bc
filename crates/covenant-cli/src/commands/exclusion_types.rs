//! Exclusion type command implementations.

use super::Engine;
use crate::cli::TopExclusionTypesArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the top-exclusion-types command.
pub async fn execute_top_exclusion_types(
    args: TopExclusionTypesArgs,
    engine: &Engine,
    formatter: &Formatter,
) -> Result<()> {
    let rows = engine.top_exclusion_types(args.scope.into())?;
    println!("{}", formatter.format_exclusion_type_counts(&rows)?);
    Ok(())
}

/// Execute the exclusion-types command.
pub async fn execute_exclusion_types(engine: &Engine, formatter: &Formatter) -> Result<()> {
    let types = engine.exclusion_types()?;
    println!("{}", formatter.format_exclusion_types(&types)?);
    Ok(())
}
