//! Query filters for the exclusion time series
//!
//! A [`QueryFilterSpec`] is validated once at construction and never changes
//! afterwards. Empty type-id and county sets mean "no filter", never "match
//! nothing".

use crate::county::CountyCatalog;
use crate::error::ValidationError;
use std::collections::BTreeSet;
use tracing::debug;

/// Earliest deed year shown by default
pub const DEFAULT_START_YEAR: i32 = 1800;

/// Latest deed year shown by default
pub const DEFAULT_END_YEAR: i32 = 1970;

/// Inclusive range of deed years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: i32, end: i32) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First year in the range
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Last year in the range
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Whether a year falls inside the range
    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_YEAR,
            end: DEFAULT_END_YEAR,
        }
    }
}

/// Raw, unparsed filter parameters as they arrive from a query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Comma-separated exclusion-type ids, e.g. `"1,2,5"`
    pub types: Option<String>,

    /// Start year
    pub start_year: Option<String>,

    /// End year
    pub end_year: Option<String>,

    /// Comma-separated county names
    pub counties: Option<String>,
}

/// Validated filter for the exclusion time series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilterSpec {
    exclusion_type_ids: BTreeSet<i64>,
    year_range: YearRange,
    counties: BTreeSet<String>,
}

impl QueryFilterSpec {
    /// Build from typed values
    pub fn new<I, C>(exclusion_type_ids: I, year_range: YearRange, counties: C) -> Self
    where
        I: IntoIterator<Item = i64>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            exclusion_type_ids: exclusion_type_ids.into_iter().filter(|id| *id > 0).collect(),
            year_range,
            counties: counties.into_iter().map(Into::into).collect(),
        }
    }

    /// Match everything within the default year range
    pub fn unfiltered() -> Self {
        Self::new(std::iter::empty(), YearRange::default(), std::iter::empty::<String>())
    }

    /// Parse raw query parameters
    ///
    /// Type-id tokens that are not positive integers are dropped silently. A
    /// missing or blank county parameter falls back to the catalog's default
    /// selection.
    ///
    /// # Errors
    /// Returns an error if a year is not an integer or the range is inverted.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_domain::{CountyCatalog, FilterParams, QueryFilterSpec};
    ///
    /// let params = FilterParams {
    ///     types: Some("1, 2,x,-4".to_string()),
    ///     ..Default::default()
    /// };
    /// let spec = QueryFilterSpec::from_params(&params, &CountyCatalog::default()).unwrap();
    /// assert_eq!(spec.exclusion_type_ids().len(), 2);
    /// assert_eq!(spec.year_range().start(), 1800);
    /// ```
    pub fn from_params(params: &FilterParams, catalog: &CountyCatalog) -> Result<Self, ValidationError> {
        let exclusion_type_ids = params
            .types
            .as_deref()
            .map(parse_type_ids)
            .unwrap_or_default();

        let start = parse_year(params.start_year.as_deref())?.unwrap_or(DEFAULT_START_YEAR);
        let end = parse_year(params.end_year.as_deref())?.unwrap_or(DEFAULT_END_YEAR);
        let year_range = YearRange::new(start, end)?;

        let counties = match params.counties.as_deref().map(parse_counties) {
            Some(counties) if !counties.is_empty() => counties,
            _ => catalog.default_set(),
        };

        for county in counties.iter().filter(|c| !catalog.contains(c)) {
            debug!(county = %county, "county not in catalog");
        }

        Ok(Self {
            exclusion_type_ids,
            year_range,
            counties,
        })
    }

    /// Selected exclusion types; empty means all
    pub fn exclusion_type_ids(&self) -> &BTreeSet<i64> {
        &self.exclusion_type_ids
    }

    /// Selected deed years
    pub fn year_range(&self) -> YearRange {
        self.year_range
    }

    /// Selected counties; empty means all
    pub fn counties(&self) -> &BTreeSet<String> {
        &self.counties
    }

    /// Whether an exclusion type passes the filter
    pub fn matches_type(&self, exclusion_type_id: i64) -> bool {
        self.exclusion_type_ids.is_empty() || self.exclusion_type_ids.contains(&exclusion_type_id)
    }

    /// Whether a county passes the filter
    pub fn matches_county(&self, county: &str) -> bool {
        self.counties.is_empty() || self.counties.contains(county)
    }

    /// Same filter restricted to a single exclusion type
    pub fn with_single_type(&self, exclusion_type_id: i64) -> Self {
        Self {
            exclusion_type_ids: BTreeSet::from([exclusion_type_id]),
            ..self.clone()
        }
    }
}

impl Default for QueryFilterSpec {
    fn default() -> Self {
        Self::unfiltered()
    }
}

fn parse_type_ids(raw: &str) -> BTreeSet<i64> {
    raw.split(',')
        .filter_map(|token| {
            let token = token.trim();
            match token.parse::<i64>() {
                Ok(id) if id > 0 => Some(id),
                _ => {
                    if !token.is_empty() {
                        debug!(token, "dropping exclusion type id");
                    }
                    None
                }
            }
        })
        .collect()
}

fn parse_year(raw: Option<&str>) -> Result<Option<i32>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(token) => token
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ValidationError::InvalidYear(token.to_string())),
    }
}

fn parse_counties(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
