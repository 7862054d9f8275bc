//! Aggregation engine
//!
//! Turns dashboard questions into store queries. The engine holds no mutable
//! state; every method borrows the store immutably, so independent calls can
//! run side by side on separate store handles.

use crate::consensus::{ConsensusRule, Verdict};
use crate::error::{EngineError, Result};
use crate::filter::QueryFilterSpec;
use crate::record::ExclusionType;
use crate::stats::{Dashboard, ExclusionTypeCount, GrantorCount, HeadlineCounts, StoreHealth, TimeSeriesRow};
use crate::traits::{
    CountMode, CovenantStore, ExclusionScope, ExclusionTypeQuery, GrantorKey, GrantorQuery, ReviewPredicate,
};
use tracing::debug;

/// Cap applied to the deduplicated grantor ranking and the reviewed
/// exclusion-type ranking
pub const TOP_RANK_LIMIT: usize = 20;

/// Read-only aggregate queries over a [`CovenantStore`]
#[derive(Debug, Clone)]
pub struct AggregationEngine<S> {
    store: S,
    rule: ConsensusRule,
}

impl<S> AggregationEngine<S>
where
    S: CovenantStore,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    /// Create an engine using the default consensus rule
    pub fn new(store: S) -> Self {
        Self::with_rule(store, ConsensusRule::DEFAULT)
    }

    /// Create an engine with an explicit consensus rule
    pub fn with_rule(store: S, rule: ConsensusRule) -> Self {
        Self { store, rule }
    }

    /// Number of system-identified deeds
    pub fn count_identified(&self) -> Result<u64> {
        self.store.count_deeds().map_err(EngineError::data_access)
    }

    /// Number of deeds confirmed by reviewer consensus
    pub fn count_confirmed(&self) -> Result<u64> {
        self.store
            .count_deeds_with_verdict(self.rule, Verdict::Confirmed)
            .map_err(EngineError::data_access)
    }

    /// Number of unanswered review rows (not deeds)
    pub fn count_pending(&self) -> Result<u64> {
        self.store
            .count_reviews(ReviewPredicate::Pending)
            .map_err(EngineError::data_access)
    }

    /// Number of review rows asking for a second opinion (not deeds)
    pub fn count_review_requested(&self) -> Result<u64> {
        self.store
            .count_reviews(ReviewPredicate::ReviewRequested)
            .map_err(EngineError::data_access)
    }

    /// Number of deeds rejected by reviewer consensus
    pub fn count_false_positive(&self) -> Result<u64> {
        self.store
            .count_deeds_with_verdict(self.rule, Verdict::FalsePositive)
            .map_err(EngineError::data_access)
    }

    /// All five headline figures
    pub fn headline_counts(&self) -> Result<HeadlineCounts> {
        let counts = HeadlineCounts {
            identified: self.count_identified()?,
            confirmed: self.count_confirmed()?,
            pending_reviews: self.count_pending()?,
            review_requested: self.count_review_requested()?,
            false_positives: self.count_false_positive()?,
        };
        debug!(?counts, "computed headline counts");
        Ok(counts)
    }

    /// Raw grantor text ranked by review rows, unlimited
    ///
    /// Over-counts deeds with several reviews and never merges spelling
    /// variants; kept as a baseline for the normalized ranking.
    pub fn top_grantors_exact(&self) -> Result<Vec<GrantorCount>> {
        self.grantors(GrantorQuery {
            key: GrantorKey::Exact,
            count: CountMode::Rows,
            limit: None,
        })
    }

    /// Normalized grantors ranked by distinct deeds (`dedupe`) or by review rows
    ///
    /// The deduplicated ranking never exceeds [`TOP_RANK_LIMIT`] rows; `limit`
    /// can only shrink it further.
    pub fn top_grantors_normalized(&self, dedupe: bool, limit: Option<usize>) -> Result<Vec<GrantorCount>> {
        let (count, limit) = if dedupe {
            let cap = limit.map_or(TOP_RANK_LIMIT, |l| l.min(TOP_RANK_LIMIT));
            (CountMode::DistinctDeeds, Some(cap))
        } else {
            (CountMode::Rows, limit)
        };
        self.grantors(GrantorQuery {
            key: GrantorKey::Normalized,
            count,
            limit,
        })
    }

    fn grantors(&self, query: GrantorQuery) -> Result<Vec<GrantorCount>> {
        let mut rows = self.store.rank_grantors(&query).map_err(EngineError::data_access)?;
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        debug!(key = ?query.key, count = ?query.count, rows = rows.len(), "ranked grantors");
        Ok(rows)
    }

    /// Exclusion types ranked by association rows (`PreIdentified`, unlimited)
    /// or by distinct confirmed deeds (`ReviewConfirmed`, top 20)
    pub fn top_exclusion_types(&self, scope: ExclusionScope) -> Result<Vec<ExclusionTypeCount>> {
        let query = match scope {
            ExclusionScope::PreIdentified => ExclusionTypeQuery {
                scope,
                count: CountMode::Rows,
                limit: None,
            },
            ExclusionScope::ReviewConfirmed => ExclusionTypeQuery {
                scope,
                count: CountMode::DistinctDeeds,
                limit: Some(TOP_RANK_LIMIT),
            },
        };
        let mut rows = self
            .store
            .rank_exclusion_types(&query)
            .map_err(EngineError::data_access)?;
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        debug!(?scope, rows = rows.len(), "ranked exclusion types");
        Ok(rows)
    }

    /// Distinct deeds per (year, exclusion type, county) under a filter
    pub fn exclusion_time_series(&self, filter: &QueryFilterSpec) -> Result<Vec<TimeSeriesRow>> {
        let rows = self
            .store
            .exclusion_time_series(filter)
            .map_err(EngineError::data_access)?;
        debug!(
            types = filter.exclusion_type_ids().len(),
            start = filter.year_range().start(),
            end = filter.year_range().end(),
            counties = filter.counties().len(),
            rows = rows.len(),
            "computed exclusion time series"
        );
        Ok(rows)
    }

    /// The exclusion type vocabulary
    pub fn exclusion_types(&self) -> Result<Vec<ExclusionType>> {
        self.store.exclusion_types().map_err(EngineError::data_access)
    }

    /// Probe the store
    pub fn health(&self) -> Result<StoreHealth> {
        self.store.health().map_err(EngineError::data_access)
    }

    /// Every dashboard panel, computed one after another
    pub fn dashboard(&self, filter: &QueryFilterSpec) -> Result<Dashboard> {
        Ok(Dashboard {
            counts: self.headline_counts()?,
            top_grantors: self.top_grantors_exact()?,
            top_grantors_normalized: self.top_grantors_normalized(false, None)?,
            top_grantors_deduped: self.top_grantors_normalized(true, None)?,
            top_exclusion_types: self.top_exclusion_types(ExclusionScope::PreIdentified)?,
            top_exclusion_types_reviewed: self.top_exclusion_types(ExclusionScope::ReviewConfirmed)?,
            time_series: self.exclusion_time_series(filter)?,
            exclusion_types: self.exclusion_types()?,
        })
    }
}
