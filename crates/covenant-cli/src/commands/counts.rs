//! Counts command implementation.

use super::Engine;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the counts command.
pub async fn execute_counts(engine: &Engine, formatter: &Formatter) -> Result<()> {
    let counts = engine.headline_counts()?;
    println!("{}", formatter.format_counts(&counts)?);
    Ok(())
}
