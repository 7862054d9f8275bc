//! Top-grantors command implementation.

use super::Engine;
use crate::cli::{GrantorMode, TopGrantorsArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use covenant_domain::GrantorCount;

/// Execute the top-grantors command.
pub async fn execute_top_grantors(args: TopGrantorsArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let rows = rank(&args, engine)?;
    println!("{}", formatter.format_grantors(&rows)?);
    Ok(())
}

fn rank(args: &TopGrantorsArgs, engine: &Engine) -> Result<Vec<GrantorCount>> {
    if args.limit == Some(0) {
        return Err(CliError::InvalidInput("Limit must be at least 1".to_string()));
    }

    let rows = match args.mode {
        GrantorMode::Exact => {
            let mut rows = engine.top_grantors_exact()?;
            if let Some(limit) = args.limit {
                rows.truncate(limit);
            }
            rows
        }
        GrantorMode::Normalized => engine.top_grantors_normalized(false, args.limit)?,
        GrantorMode::Deduped => engine.top_grantors_normalized(true, args.limit)?,
    };
    Ok(rows)
}
