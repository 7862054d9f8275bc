//! Covenant Domain Layer
//!
//! Core logic for the restrictive-covenant dashboard: turning noisy human
//! review of historical deeds into the figures the public dashboard shows.
//!
//! ## Key Concepts
//!
//! - **Deed**: a system-identified conveyance record, the unit of classification
//! - **Review**: one rater's vote on whether a deed carries covenant language
//! - **Verdict**: reviewer consensus (confirmed, false positive, unresolved)
//! - **Normalized grantor**: a canonical key that merges spelling variants
//! - **Query filter**: exclusion types, deed years and counties for the time series
//!
//! ## Architecture
//!
//! - Pure logic only; the store is reached through [`traits::CovenantStore`]
//! - Infrastructure implementations (SQLite) live in other crates
//! - [`snapshot::MemorySnapshot`] is the in-memory reference store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregation;
pub mod consensus;
pub mod county;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod record;
pub mod snapshot;
pub mod stats;
pub mod traits;

// Re-exports for convenience
pub use aggregation::{AggregationEngine, TOP_RANK_LIMIT};
pub use consensus::{classify, ConsensusRule, DeedDisposition, Disposition, ReviewTally, ReviewVote, Verdict};
pub use county::CountyCatalog;
pub use error::{EngineError, ValidationError};
pub use filter::{FilterParams, QueryFilterSpec, YearRange};
pub use normalize::{normalize_grantor, normalize_grantor_str};
pub use record::{BookPage, CovenantFlag, Deed, DeedId, ExclusionType, Review};
pub use snapshot::MemorySnapshot;
pub use stats::{Dashboard, ExclusionTypeCount, GrantorCount, HeadlineCounts, StoreHealth, TimeSeriesRow};
pub use traits::{CovenantStore, ExclusionScope};
