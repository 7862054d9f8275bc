//! Trait definitions for external interactions
//!
//! The deed/review store is owned by other systems. These traits describe the
//! read-only queries the aggregation engine needs from it. Each method is a
//! grouping or filtering query, so implementations can push the work down to
//! the database instead of materializing whole tables.

use crate::consensus::{ConsensusRule, Verdict};
use crate::filter::QueryFilterSpec;
use crate::record::ExclusionType;
use crate::stats::{ExclusionTypeCount, GrantorCount, StoreHealth, TimeSeriesRow};

/// Per-review predicates counted row by row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewPredicate {
    /// Covenant flag not yet answered
    Pending,

    /// Reviewer asked for a second opinion
    ReviewRequested,
}

/// How a grantor ranking groups review rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantorKey {
    /// Raw grantor text, exact string equality
    Exact,

    /// Output of the grantor normalizer
    Normalized,
}

/// What a ranking counts per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountMode {
    /// Every matching row
    Rows,

    /// Distinct deed ids
    DistinctDeeds,
}

/// Which exclusion-type associations a ranking reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionScope {
    /// Types attached to the deed by the identification system
    PreIdentified,

    /// Types attached during review, on reviews answering yes
    ReviewConfirmed,
}

/// Grantor ranking request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantorQuery {
    /// Grouping key
    pub key: GrantorKey,

    /// Counting mode
    pub count: CountMode,

    /// Maximum rows returned
    pub limit: Option<usize>,
}

/// Exclusion type ranking request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionTypeQuery {
    /// Association source
    pub scope: ExclusionScope,

    /// Counting mode
    pub count: CountMode,

    /// Maximum rows returned
    pub limit: Option<usize>,
}

/// Read-only access to a point-in-time view of the deed/review store
///
/// Implemented by the infrastructure layer (covenant-store) and by
/// [`crate::snapshot::MemorySnapshot`].
///
/// Rankings must be ordered by count descending, then label ascending, and
/// capped at the requested limit. Grantor rankings skip rows whose key is
/// missing (`NULL` text, or text that normalizes to nothing).
pub trait CovenantStore {
    /// Error type for store operations
    type Error;

    /// Number of system-identified deeds
    fn count_deeds(&self) -> Result<u64, Self::Error>;

    /// Number of deeds whose reviews reach the given verdict under `rule`
    fn count_deeds_with_verdict(&self, rule: ConsensusRule, verdict: Verdict) -> Result<u64, Self::Error>;

    /// Number of review rows matching a predicate
    fn count_reviews(&self, predicate: ReviewPredicate) -> Result<u64, Self::Error>;

    /// Rank grantors
    fn rank_grantors(&self, query: &GrantorQuery) -> Result<Vec<GrantorCount>, Self::Error>;

    /// Rank exclusion types
    fn rank_exclusion_types(&self, query: &ExclusionTypeQuery) -> Result<Vec<ExclusionTypeCount>, Self::Error>;

    /// Distinct deeds per (year, exclusion type, county), ordered by year,
    /// type id, then county
    fn exclusion_time_series(&self, filter: &QueryFilterSpec) -> Result<Vec<TimeSeriesRow>, Self::Error>;

    /// The exclusion type vocabulary, ordered by id
    fn exclusion_types(&self) -> Result<Vec<ExclusionType>, Self::Error>;

    /// Connectivity probe
    fn health(&self) -> Result<StoreHealth, Self::Error>;
}

impl<T: CovenantStore + ?Sized> CovenantStore for &T {
    type Error = T::Error;

    fn count_deeds(&self) -> Result<u64, Self::Error> {
        (**self).count_deeds()
    }

    fn count_deeds_with_verdict(&self, rule: ConsensusRule, verdict: Verdict) -> Result<u64, Self::Error> {
        (**self).count_deeds_with_verdict(rule, verdict)
    }

    fn count_reviews(&self, predicate: ReviewPredicate) -> Result<u64, Self::Error> {
        (**self).count_reviews(predicate)
    }

    fn rank_grantors(&self, query: &GrantorQuery) -> Result<Vec<GrantorCount>, Self::Error> {
        (**self).rank_grantors(query)
    }

    fn rank_exclusion_types(&self, query: &ExclusionTypeQuery) -> Result<Vec<ExclusionTypeCount>, Self::Error> {
        (**self).rank_exclusion_types(query)
    }

    fn exclusion_time_series(&self, filter: &QueryFilterSpec) -> Result<Vec<TimeSeriesRow>, Self::Error> {
        (**self).exclusion_time_series(filter)
    }

    fn exclusion_types(&self) -> Result<Vec<ExclusionType>, Self::Error> {
        (**self).exclusion_types()
    }

    fn health(&self) -> Result<StoreHealth, Self::Error> {
        (**self).health()
    }
}
