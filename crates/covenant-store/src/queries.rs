//! Aggregate queries compiled to SQL

use crate::{SqliteStore, StoreError, NORMALIZE_GRANTOR_FN};
use chrono::NaiveDateTime;
use covenant_domain::traits::{
    CountMode, CovenantStore, ExclusionScope, ExclusionTypeQuery, GrantorKey, GrantorQuery, ReviewPredicate,
};
use covenant_domain::{
    ConsensusRule, ExclusionType, ExclusionTypeCount, GrantorCount, QueryFilterSpec, StoreHealth, TimeSeriesRow,
    Verdict,
};
use rusqlite::{params, ToSql};
use tracing::debug;

/// SQLite reads `LIMIT -1` as "no limit"
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX))
}

fn to_count(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::InvalidData(format!("Negative count: {}", value)))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl SqliteStore {
    fn scalar_count(&self, sql: &str, params: &[&dyn ToSql]) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        to_count(n)
    }
}

impl CovenantStore for SqliteStore {
    type Error = StoreError;

    fn count_deeds(&self) -> Result<u64, Self::Error> {
        self.scalar_count("SELECT COUNT(*) FROM deeds", &[])
    }

    fn count_deeds_with_verdict(&self, rule: ConsensusRule, verdict: Verdict) -> Result<u64, Self::Error> {
        let min_agreeing = i64::try_from(rule.min_agreeing).unwrap_or(i64::MAX);
        let max_dissenting = i64::try_from(rule.max_dissenting).unwrap_or(i64::MAX);
        self.scalar_count(
            "SELECT COUNT(*) FROM (
                 SELECT deed_id,
                        SUM(CASE WHEN is_restrictive_covenant = 1 THEN 1 ELSE 0 END) AS positive,
                        SUM(CASE WHEN is_restrictive_covenant = 0 THEN 1 ELSE 0 END) AS negative
                 FROM deed_reviews
                 GROUP BY deed_id
             )
             WHERE CASE
                       WHEN positive >= ?1 AND negative <= ?2 THEN 'confirmed'
                       WHEN negative >= ?1 AND positive <= ?2 THEN 'false_positive'
                       ELSE 'unresolved'
                   END = ?3",
            &[&min_agreeing, &max_dissenting, &verdict.as_str()],
        )
    }

    fn count_reviews(&self, predicate: ReviewPredicate) -> Result<u64, Self::Error> {
        let sql = match predicate {
            ReviewPredicate::Pending => "SELECT COUNT(*) FROM deed_reviews WHERE is_restrictive_covenant IS NULL",
            ReviewPredicate::ReviewRequested => "SELECT COUNT(*) FROM deed_reviews WHERE review_required = 1",
        };
        self.scalar_count(sql, &[])
    }

    fn rank_grantors(&self, query: &GrantorQuery) -> Result<Vec<GrantorCount>, Self::Error> {
        let key = match query.key {
            GrantorKey::Exact => "grantors".to_string(),
            GrantorKey::Normalized => format!("{}(grantors)", NORMALIZE_GRANTOR_FN),
        };
        let count = match query.count {
            CountMode::Rows => "COUNT(*)",
            CountMode::DistinctDeeds => "COUNT(DISTINCT deed_id)",
        };
        let sql = format!(
            "SELECT grantor, {count} AS n
             FROM (SELECT {key} AS grantor, deed_id FROM deed_reviews)
             WHERE grantor IS NOT NULL
             GROUP BY grantor
             ORDER BY n DESC, grantor ASC
             LIMIT ?1"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![sql_limit(query.limit)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(key = ?query.key, count = ?query.count, rows = rows.len(), "grantor ranking query");
        rows.into_iter()
            .map(|(grantor, n)| to_count(n).map(|count| GrantorCount { grantor, count }))
            .collect()
    }

    fn rank_exclusion_types(&self, query: &ExclusionTypeQuery) -> Result<Vec<ExclusionTypeCount>, Self::Error> {
        let (source, count) = match (query.scope, query.count) {
            (ExclusionScope::PreIdentified, mode) => (
                "deed_exclusion_types det
                 JOIN deeds d ON d.id = det.deed_id
                 JOIN exclusion_types et ON det.exclusion_type_id = et.id",
                match mode {
                    CountMode::Rows => "COUNT(*)",
                    CountMode::DistinctDeeds => "COUNT(DISTINCT det.deed_id)",
                },
            ),
            (ExclusionScope::ReviewConfirmed, mode) => (
                "deed_review_exclusion_types dret
                 JOIN exclusion_types et ON dret.exclusion_type_id = et.id
                 JOIN deed_reviews dr ON dret.deed_review_id = dr.id
                 WHERE dr.is_restrictive_covenant = 1",
                match mode {
                    CountMode::Rows => "COUNT(*)",
                    CountMode::DistinctDeeds => "COUNT(DISTINCT dr.deed_id)",
                },
            ),
        };
        let sql = format!(
            "SELECT et.id, et.title, {count} AS n
             FROM {source}
             GROUP BY et.id, et.title
             ORDER BY n DESC, et.title ASC
             LIMIT ?1"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![sql_limit(query.limit)], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(scope = ?query.scope, rows = rows.len(), "exclusion type ranking query");
        rows.into_iter()
            .map(|(exclusion_type_id, title, n)| {
                to_count(n).map(|count| ExclusionTypeCount {
                    exclusion_type_id,
                    title,
                    count,
                })
            })
            .collect()
    }

    fn exclusion_time_series(&self, filter: &QueryFilterSpec) -> Result<Vec<TimeSeriesRow>, Self::Error> {
        let mut sql = String::from(
            "WITH per_deed_exclusion AS (
                 SELECT DISTINCT
                     dr.deed_id,
                     et.id AS exclusion_type_id,
                     et.title,
                     CAST(strftime('%Y', dr.deed_date) AS INTEGER) AS year,
                     bp.county
                 FROM deed_review_exclusion_types dret
                 JOIN exclusion_types et ON dret.exclusion_type_id = et.id
                 JOIN deed_reviews dr ON dret.deed_review_id = dr.id
                 JOIN deeds d ON dr.deed_id = d.id
                 JOIN deed_review_book_pages drbp ON dr.id = drbp.deed_review_id
                 JOIN book_pages bp ON bp.id = drbp.book_page_id
                 WHERE dr.deed_date IS NOT NULL
                   AND CAST(strftime('%Y', dr.deed_date) AS INTEGER) BETWEEN ? AND ?",
        );
        let mut params: Vec<Box<dyn ToSql>> = vec![
            Box::new(filter.year_range().start()),
            Box::new(filter.year_range().end()),
        ];

        let type_ids = filter.exclusion_type_ids();
        if !type_ids.is_empty() {
            sql.push_str(&format!(" AND et.id IN ({})", placeholders(type_ids.len())));
            params.extend(type_ids.iter().map(|id| Box::new(*id) as Box<dyn ToSql>));
        }

        let counties = filter.counties();
        if !counties.is_empty() {
            sql.push_str(&format!(" AND bp.county IN ({})", placeholders(counties.len())));
            params.extend(counties.iter().map(|c| Box::new(c.clone()) as Box<dyn ToSql>));
        }

        sql.push_str(
            ")
             SELECT year, exclusion_type_id, title, county, COUNT(*) AS deed_count
             FROM per_deed_exclusion
             GROUP BY year, exclusion_type_id, title, county
             ORDER BY year, exclusion_type_id, county",
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(&param_refs[..], |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(rows = rows.len(), "exclusion time series query");
        rows.into_iter()
            .map(|(year, exclusion_type_id, title, county, n)| {
                to_count(n).map(|deed_count| TimeSeriesRow {
                    year,
                    exclusion_type_id,
                    title,
                    county,
                    deed_count,
                })
            })
            .collect()
    }

    fn exclusion_types(&self) -> Result<Vec<ExclusionType>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT id, title FROM exclusion_types ORDER BY id")?;
        let types = stmt
            .query_map([], |row| {
                Ok(ExclusionType {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(types)
    }

    fn health(&self) -> Result<StoreHealth, Self::Error> {
        let checked_at: NaiveDateTime = self
            .conn
            .query_row("SELECT datetime('now')", [], |row| row.get(0))?;
        Ok(StoreHealth { ok: true, checked_at })
    }
}
