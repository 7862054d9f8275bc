//! In-memory snapshot of the deed/review store
//!
//! Implements [`CovenantStore`] directly with the classifier and normalizer,
//! which makes it the reference behaviour for database-backed stores and a
//! convenient test double. Everything is held in memory, so it suits small
//! embedded datasets rather than a full registry.

use crate::consensus::{classify_with, ConsensusRule, DeedDisposition, ReviewVote, Verdict};
use crate::filter::QueryFilterSpec;
use crate::normalize::normalize_grantor;
use crate::record::{CovenantFlag, Deed, DeedId, ExclusionType, Review};
use crate::stats::{rank_by_count, ExclusionTypeCount, GrantorCount, StoreHealth, TimeSeriesRow};
use crate::traits::{
    CountMode, CovenantStore, ExclusionScope, ExclusionTypeQuery, GrantorKey, GrantorQuery, ReviewPredicate,
};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

/// Point-in-time copy of deeds, reviews and their associations
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    deeds: BTreeMap<DeedId, Deed>,
    reviews: Vec<Review>,
    exclusion_types: BTreeMap<i64, String>,
    book_pages: BTreeMap<i64, String>,
}

impl MemorySnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system-identified deed
    ///
    /// Repeated exclusion type ids are stored once, as the association
    /// tables do.
    pub fn add_deed(&mut self, mut deed: Deed) {
        dedup_ids(&mut deed.exclusion_type_ids);
        self.deeds.insert(deed.id, deed);
    }

    /// Add a review, storing repeated exclusion type and book page ids once
    pub fn add_review(&mut self, mut review: Review) {
        dedup_ids(&mut review.exclusion_type_ids);
        dedup_ids(&mut review.book_page_ids);
        self.reviews.push(review);
    }

    /// Add an exclusion type to the vocabulary
    pub fn add_exclusion_type(&mut self, id: i64, title: impl Into<String>) {
        self.exclusion_types.insert(id, title.into());
    }

    /// Add a book page with its county
    pub fn add_book_page(&mut self, id: i64, county: impl Into<String>) {
        self.book_pages.insert(id, county.into());
    }

    /// Votes grouped by deed, for every deed that has at least one review
    fn votes_by_deed(&self) -> BTreeMap<DeedId, Vec<ReviewVote>> {
        let mut grouped: BTreeMap<DeedId, Vec<ReviewVote>> = BTreeMap::new();
        for review in &self.reviews {
            grouped.entry(review.deed_id).or_default().push(ReviewVote::from(review));
        }
        grouped
    }

    /// Disposition of every reviewed deed under a consensus rule
    pub fn dispositions(&self, rule: ConsensusRule) -> BTreeMap<DeedId, DeedDisposition> {
        self.votes_by_deed()
            .into_iter()
            .map(|(deed_id, votes)| {
                let identified = self.deeds.contains_key(&deed_id);
                (deed_id, classify_with(rule, identified, &votes))
            })
            .collect()
    }

    fn grantor_key(&self, review: &Review, key: GrantorKey) -> Option<String> {
        match key {
            GrantorKey::Exact => review.grantors.clone(),
            GrantorKey::Normalized => normalize_grantor(review.grantors.as_deref()),
        }
    }
}

fn dedup_ids(ids: &mut Vec<i64>) {
    ids.sort_unstable();
    ids.dedup();
}

/// Per-group tally that can count rows or distinct deeds
#[derive(Default)]
struct GroupCount {
    rows: u64,
    deeds: BTreeSet<DeedId>,
}

impl GroupCount {
    fn add(&mut self, deed_id: DeedId) {
        self.rows += 1;
        self.deeds.insert(deed_id);
    }

    fn get(&self, mode: CountMode) -> u64 {
        match mode {
            CountMode::Rows => self.rows,
            CountMode::DistinctDeeds => self.deeds.len() as u64,
        }
    }
}

impl CovenantStore for MemorySnapshot {
    type Error = Infallible;

    fn count_deeds(&self) -> Result<u64, Self::Error> {
        Ok(self.deeds.len() as u64)
    }

    fn count_deeds_with_verdict(&self, rule: ConsensusRule, verdict: Verdict) -> Result<u64, Self::Error> {
        Ok(self
            .dispositions(rule)
            .values()
            .filter(|d| d.verdict == verdict)
            .count() as u64)
    }

    fn count_reviews(&self, predicate: ReviewPredicate) -> Result<u64, Self::Error> {
        let matches = |r: &&Review| match predicate {
            ReviewPredicate::Pending => r.is_restrictive_covenant == CovenantFlag::Unknown,
            ReviewPredicate::ReviewRequested => r.review_required,
        };
        Ok(self.reviews.iter().filter(matches).count() as u64)
    }

    fn rank_grantors(&self, query: &GrantorQuery) -> Result<Vec<GrantorCount>, Self::Error> {
        let mut groups: BTreeMap<String, GroupCount> = BTreeMap::new();
        for review in &self.reviews {
            if let Some(key) = self.grantor_key(review, query.key) {
                groups.entry(key).or_default().add(review.deed_id);
            }
        }

        let mut rows: Vec<GrantorCount> = groups
            .into_iter()
            .map(|(grantor, group)| GrantorCount {
                grantor,
                count: group.get(query.count),
            })
            .collect();
        rank_by_count(&mut rows, |r| r.count, |r| r.grantor.as_str(), query.limit);
        Ok(rows)
    }

    fn rank_exclusion_types(&self, query: &ExclusionTypeQuery) -> Result<Vec<ExclusionTypeCount>, Self::Error> {
        let mut groups: BTreeMap<i64, GroupCount> = BTreeMap::new();
        match query.scope {
            ExclusionScope::PreIdentified => {
                for deed in self.deeds.values() {
                    for type_id in &deed.exclusion_type_ids {
                        groups.entry(*type_id).or_default().add(deed.id);
                    }
                }
            }
            ExclusionScope::ReviewConfirmed => {
                let confirmed = self
                    .reviews
                    .iter()
                    .filter(|r| r.is_restrictive_covenant == CovenantFlag::Yes);
                for review in confirmed {
                    for type_id in &review.exclusion_type_ids {
                        groups.entry(*type_id).or_default().add(review.deed_id);
                    }
                }
            }
        }

        let mut rows: Vec<ExclusionTypeCount> = groups
            .into_iter()
            .filter_map(|(type_id, group)| {
                self.exclusion_types.get(&type_id).map(|title| ExclusionTypeCount {
                    exclusion_type_id: type_id,
                    title: title.clone(),
                    count: group.get(query.count),
                })
            })
            .collect();
        rank_by_count(&mut rows, |r| r.count, |r| r.title.as_str(), query.limit);
        Ok(rows)
    }

    fn exclusion_time_series(&self, filter: &QueryFilterSpec) -> Result<Vec<TimeSeriesRow>, Self::Error> {
        let mut buckets: BTreeMap<(i32, i64, String), BTreeSet<DeedId>> = BTreeMap::new();

        for review in self.reviews.iter().filter(|r| self.deeds.contains_key(&r.deed_id)) {
            let Some(year) = review.deed_year() else {
                continue;
            };
            if !filter.year_range().contains(year) {
                continue;
            }
            let counties = review
                .book_page_ids
                .iter()
                .filter_map(|page| self.book_pages.get(page))
                .filter(|county| filter.matches_county(county));
            for county in counties {
                for type_id in review
                    .exclusion_type_ids
                    .iter()
                    .filter(|t| filter.matches_type(**t) && self.exclusion_types.contains_key(*t))
                {
                    buckets
                        .entry((year, *type_id, county.clone()))
                        .or_default()
                        .insert(review.deed_id);
                }
            }
        }

        let mut rows: Vec<TimeSeriesRow> = buckets
            .into_iter()
            .map(|((year, type_id, county), deeds)| TimeSeriesRow {
                year,
                exclusion_type_id: type_id,
                title: self.exclusion_types[&type_id].clone(),
                county,
                deed_count: deeds.len() as u64,
            })
            .collect();
        rows.sort_by(TimeSeriesRow::series_order);
        Ok(rows)
    }

    fn exclusion_types(&self) -> Result<Vec<ExclusionType>, Self::Error> {
        Ok(self
            .exclusion_types
            .iter()
            .map(|(id, title)| ExclusionType {
                id: *id,
                title: title.clone(),
            })
            .collect())
    }

    fn health(&self) -> Result<StoreHealth, Self::Error> {
        Ok(StoreHealth {
            ok: true,
            checked_at: chrono::Utc::now().naive_utc(),
        })
    }
}
