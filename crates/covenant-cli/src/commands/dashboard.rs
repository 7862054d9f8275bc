//! Dashboard command implementation.
//!
//! Every panel runs on a blocking worker with its own read-only SQLite
//! handle, and the panels are awaited together. An in-memory database
//! cannot be shared this way; point `--database` at a file.

use super::time_series::parse_filter;
use crate::cli::FilterArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use covenant_domain::{AggregationEngine, Dashboard, ExclusionScope};
use covenant_store::SqliteStore;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::debug;

/// Execute the dashboard command.
pub async fn execute_dashboard(
    args: FilterArgs,
    config: &Config,
    database: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let filter = parse_filter(args, &config.counties)?;
    let dashboard = build_dashboard(database.to_path_buf(), filter).await?;
    println!("{}", formatter.format_dashboard(&dashboard)?);
    Ok(())
}

/// Compute every panel concurrently.
pub async fn build_dashboard(database: PathBuf, filter: covenant_domain::QueryFilterSpec) -> Result<Dashboard> {
    let counts = panel(&database, |e| e.headline_counts());
    let top_grantors = panel(&database, |e| e.top_grantors_exact());
    let top_grantors_normalized = panel(&database, |e| e.top_grantors_normalized(false, None));
    let top_grantors_deduped = panel(&database, |e| e.top_grantors_normalized(true, None));
    let top_exclusion_types = panel(&database, |e| e.top_exclusion_types(ExclusionScope::PreIdentified));
    let top_exclusion_types_reviewed = panel(&database, |e| e.top_exclusion_types(ExclusionScope::ReviewConfirmed));
    let time_series = panel(&database, move |e| e.exclusion_time_series(&filter));
    let exclusion_types = panel(&database, |e| e.exclusion_types());

    let (
        counts,
        top_grantors,
        top_grantors_normalized,
        top_grantors_deduped,
        top_exclusion_types,
        top_exclusion_types_reviewed,
        time_series,
        exclusion_types,
    ) = tokio::try_join!(
        counts,
        top_grantors,
        top_grantors_normalized,
        top_grantors_deduped,
        top_exclusion_types,
        top_exclusion_types_reviewed,
        time_series,
        exclusion_types,
    )?;

    debug!("all dashboard panels finished");
    Ok(Dashboard {
        counts: counts?,
        top_grantors: top_grantors?,
        top_grantors_normalized: top_grantors_normalized?,
        top_grantors_deduped: top_grantors_deduped?,
        top_exclusion_types: top_exclusion_types?,
        top_exclusion_types_reviewed: top_exclusion_types_reviewed?,
        time_series: time_series?,
        exclusion_types: exclusion_types?,
    })
}

/// Run one query on a blocking worker with a fresh store handle.
fn panel<T, F>(database: &Path, query: F) -> JoinHandle<Result<T>>
where
    T: Send + 'static,
    F: FnOnce(&AggregationEngine<SqliteStore>) -> covenant_domain::error::Result<T> + Send + 'static,
{
    let database = database.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let engine = AggregationEngine::new(SqliteStore::open(&database)?);
        Ok(query(&engine)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::write_sample_database;
    use crate::error::CliError;
    use covenant_domain::QueryFilterSpec;

    #[tokio::test]
    async fn test_dashboard_matches_sequential_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("covenants.db");
        write_sample_database(&path);

        let filter = QueryFilterSpec::unfiltered();
        let concurrent = build_dashboard(path.clone(), filter.clone()).await.unwrap();
        let sequential = AggregationEngine::new(SqliteStore::open(&path).unwrap())
            .dashboard(&filter)
            .unwrap();
        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.counts.identified, 2);
        assert_eq!(concurrent.counts.confirmed, 1);
        assert_eq!(concurrent.counts.pending_reviews, 1);
        assert_eq!(concurrent.time_series.len(), 1);
        assert_eq!(concurrent.time_series[0].deed_count, 2);
    }

    #[tokio::test]
    async fn test_missing_database_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_dashboard(dir.path().join("absent.db"), QueryFilterSpec::unfiltered()).await;
        assert!(matches!(result, Err(CliError::Store(_))));
    }
}
