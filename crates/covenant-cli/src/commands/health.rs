//! Health command implementation.

use super::Engine;
use crate::error::Result;
use crate::output::Formatter;
use tracing::info;

/// Execute the health command.
pub async fn execute_health(engine: &Engine, formatter: &Formatter) -> Result<()> {
    let health = engine.health()?;
    info!(checked_at = %health.checked_at, "store health probe");
    println!("{}", formatter.format_health(&health)?);
    Ok(())
}
