//! County catalog
//!
//! The one place the registry counties are named. Filter parsing and the
//! presentation layer's default selection both read from the same catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counties covered by the dashboard
const DEFAULT_COUNTIES: [&str; 3] = ["Worcester", "Norfolk_LR", "Northern Middlesex"];

/// Known registry counties and the default filter selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyCatalog {
    /// Every county that can be selected
    pub known: Vec<String>,

    /// Counties selected when the caller does not say otherwise.
    /// Empty means "all counties".
    #[serde(default)]
    pub default_selection: Vec<String>,
}

impl CountyCatalog {
    /// Build a catalog whose default selection is every known county
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known: Vec<String> = known.into_iter().map(Into::into).collect();
        Self {
            default_selection: known.clone(),
            known,
        }
    }

    /// Default selection as a filter set
    pub fn default_set(&self) -> BTreeSet<String> {
        self.default_selection.iter().cloned().collect()
    }

    /// Whether a county name is in the catalog
    pub fn contains(&self, county: &str) -> bool {
        self.known.iter().any(|c| c == county)
    }
}

impl Default for CountyCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTIES)
    }
}
