//! Record module - read-only snapshots of the deed/review store
//!
//! These types mirror the rows owned by the ingestion and review-workflow
//! systems. The engine never creates or mutates them; it only derives views.

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Identifier of a deed as assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeedId(i64);

impl DeedId {
    /// Wrap a raw store identifier
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw store identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deed#{}", self.0)
    }
}

/// Tri-state restrictive-covenant flag recorded by a reviewer
///
/// The store keeps this as a nullable boolean; `NULL` means the reviewer has
/// not answered yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CovenantFlag {
    /// Reviewer found restrictive covenant language
    Yes,

    /// Reviewer found no restrictive covenant language
    No,

    /// Not yet answered
    #[default]
    Unknown,
}

impl CovenantFlag {
    /// Build from the store's nullable boolean
    pub fn from_nullable(value: Option<bool>) -> Self {
        match value {
            Some(true) => CovenantFlag::Yes,
            Some(false) => CovenantFlag::No,
            None => CovenantFlag::Unknown,
        }
    }

    /// Convert back to the store's nullable boolean
    pub fn to_nullable(self) -> Option<bool> {
        match self {
            CovenantFlag::Yes => Some(true),
            CovenantFlag::No => Some(false),
            CovenantFlag::Unknown => None,
        }
    }

    /// Get the flag name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CovenantFlag::Yes => "yes",
            CovenantFlag::No => "no",
            CovenantFlag::Unknown => "unknown",
        }
    }
}

impl From<Option<bool>> for CovenantFlag {
    fn from(value: Option<bool>) -> Self {
        Self::from_nullable(value)
    }
}

/// A system-identified deed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deed {
    /// Store identifier
    pub id: DeedId,

    /// Exclusion types pre-identified on the deed, outside human review
    pub exclusion_type_ids: Vec<i64>,
}

impl Deed {
    /// Create a deed with no pre-identified exclusion types
    pub fn new(id: DeedId) -> Self {
        Self {
            id,
            exclusion_type_ids: Vec::new(),
        }
    }
}

/// One human rater's assessment of a deed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Store identifier
    pub id: i64,

    /// Deed under review
    pub deed_id: DeedId,

    /// Free-text grantor field as typed by the reviewer
    pub grantors: Option<String>,

    /// The reviewer's covenant answer
    pub is_restrictive_covenant: CovenantFlag,

    /// Reviewer asked for a second opinion
    pub review_required: bool,

    /// Date written on the deed
    pub deed_date: Option<NaiveDate>,

    /// Exclusion types tagged during review
    pub exclusion_type_ids: Vec<i64>,

    /// Book pages the review was read from (county provenance)
    pub book_page_ids: Vec<i64>,
}

impl Review {
    /// Create an unanswered review with no grantor, date, tags or provenance
    pub fn new(id: i64, deed_id: DeedId) -> Self {
        Self {
            id,
            deed_id,
            grantors: None,
            is_restrictive_covenant: CovenantFlag::Unknown,
            review_required: false,
            deed_date: None,
            exclusion_type_ids: Vec::new(),
            book_page_ids: Vec::new(),
        }
    }

    /// Calendar year of the deed date, if recorded
    pub fn deed_year(&self) -> Option<i32> {
        self.deed_date.map(|d| d.year())
    }
}

/// Entry of the closed exclusion-type vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ExclusionType {
    /// Store identifier
    pub id: i64,

    /// Display title
    pub title: String,
}

/// A scanned registry book page, carrying county provenance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookPage {
    /// Store identifier
    pub id: i64,

    /// Registry county name
    pub county: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covenant_flag_nullable_mapping() {
        assert_eq!(CovenantFlag::from_nullable(Some(true)), CovenantFlag::Yes);
        assert_eq!(CovenantFlag::from_nullable(Some(false)), CovenantFlag::No);
        assert_eq!(CovenantFlag::from_nullable(None), CovenantFlag::Unknown);

        for flag in [CovenantFlag::Yes, CovenantFlag::No, CovenantFlag::Unknown] {
            assert_eq!(CovenantFlag::from(flag.to_nullable()), flag);
        }
    }

    #[test]
    fn test_review_defaults_to_unknown() {
        let review = Review::new(1, DeedId::from_value(7));
        assert_eq!(review.is_restrictive_covenant, CovenantFlag::Unknown);
        assert!(!review.review_required);
        assert_eq!(review.deed_year(), None);
    }

    #[test]
    fn test_deed_year() {
        let mut review = Review::new(1, DeedId::from_value(7));
        review.deed_date = NaiveDate::from_ymd_opt(1923, 5, 14);
        assert_eq!(review.deed_year(), Some(1923));
    }

    #[test]
    fn test_deed_id_display() {
        assert_eq!(DeedId::from_value(42).to_string(), "deed#42");
    }
}
