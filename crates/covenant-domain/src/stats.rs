//! Result rows handed to the presentation layer

use crate::record::ExclusionType;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

/// A grantor (raw or normalized) with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantorCount {
    /// Grantor text or normalized key
    pub grantor: String,

    /// Review rows or distinct deeds, depending on the query
    pub count: u64,
}

/// An exclusion type with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionTypeCount {
    /// Exclusion type id
    pub exclusion_type_id: i64,

    /// Exclusion type title
    pub title: String,

    /// Association rows or distinct deeds, depending on the scope
    pub count: u64,
}

/// One point of the exclusion time series
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesRow {
    /// Deed year
    pub year: i32,

    /// Exclusion type id
    pub exclusion_type_id: i64,

    /// Exclusion type title
    pub title: String,

    /// Registry county
    pub county: String,

    /// Distinct deeds in this bucket
    pub deed_count: u64,
}

impl TimeSeriesRow {
    /// Ordering used for the series: year, then type id, then county
    pub fn series_order(a: &TimeSeriesRow, b: &TimeSeriesRow) -> Ordering {
        a.year
            .cmp(&b.year)
            .then(a.exclusion_type_id.cmp(&b.exclusion_type_id))
            .then_with(|| a.county.cmp(&b.county))
    }
}

/// The five headline figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineCounts {
    /// System-identified deeds
    pub identified: u64,
    /// Deeds confirmed by consensus
    pub confirmed: u64,
    /// Unanswered review rows
    pub pending_reviews: u64,
    /// Review rows asking for a second opinion
    pub review_requested: u64,
    /// Deeds rejected by consensus
    pub false_positives: u64,
}

/// Store connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    /// Store answered
    pub ok: bool,

    /// Store clock at the time of the probe
    pub checked_at: NaiveDateTime,
}

/// Every dashboard panel in one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Headline figures
    pub counts: HeadlineCounts,
    /// Raw grantor text ranking
    pub top_grantors: Vec<GrantorCount>,
    /// Normalized grantor ranking by review rows
    pub top_grantors_normalized: Vec<GrantorCount>,
    /// Normalized grantor ranking by distinct deeds
    pub top_grantors_deduped: Vec<GrantorCount>,
    /// Pre-identified exclusion types
    pub top_exclusion_types: Vec<ExclusionTypeCount>,
    /// Exclusion types on confirmed reviews
    pub top_exclusion_types_reviewed: Vec<ExclusionTypeCount>,
    /// Filtered time series
    pub time_series: Vec<TimeSeriesRow>,
    /// Exclusion type vocabulary
    pub exclusion_types: Vec<ExclusionType>,
}

/// Sort a ranking by count descending, then label ascending, and cap it
pub fn rank_by_count<T, F>(rows: &mut Vec<T>, count: F, label: fn(&T) -> &str, limit: Option<usize>)
where
    F: Fn(&T) -> u64,
{
    rows.sort_by(|a, b| count(b).cmp(&count(a)).then_with(|| label(a).cmp(label(b))));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grantor(name: &str, count: u64) -> GrantorCount {
        GrantorCount {
            grantor: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_rank_by_count_breaks_ties_by_label() {
        let mut rows = vec![grantor("b", 2), grantor("c", 5), grantor("a", 2)];
        rank_by_count(&mut rows, |r| r.count, |r| r.grantor.as_str(), None);
        let names: Vec<_> = rows.iter().map(|r| r.grantor.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_rank_by_count_caps() {
        let mut rows: Vec<_> = (0..30).map(|i| grantor(&format!("g{i:02}"), i)).collect();
        rank_by_count(&mut rows, |r| r.count, |r| r.grantor.as_str(), Some(20));
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].count, 29);
    }

    #[test]
    fn test_time_series_json_field_names() {
        let row = TimeSeriesRow {
            year: 1925,
            exclusion_type_id: 3,
            title: "Race".to_string(),
            county: "Worcester".to_string(),
            deed_count: 4,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["exclusionTypeId"], 3);
        assert_eq!(json["deedCount"], 4);
    }
}
