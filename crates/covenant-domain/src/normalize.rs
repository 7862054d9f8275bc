//! Grantor name normalization
//!
//! Reviewers type grantor names freehand, so the same developer shows up as
//! "The Smith Land Co.", "smith land company" and "Smith Land Co, and others".
//! This module folds those variants onto one identity key so rankings can
//! count them together.
//!
//! The pipeline is an ordered list of named stages, each a pure function over
//! `Option<String>`. Once a stage leaves the value empty, the rest of the
//! pipeline short-circuits to `None`.
//!
//! Distinct legal entities whose names coincide after normalization are
//! merged. That imprecision is accepted.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_ARTICLE: Regex = Regex::new(r"^\s*the\s+").unwrap();

    // Everything from the first joint-grantor separator onward.
    static ref JOINT_GRANTOR_TAIL: Regex = Regex::new(r"(?s)\s*(;|,| and | & ).*$").unwrap();

    // Periods are already gone by the time this runs, so "co." / "inc." /
    // "corp." are matched by their bare forms.
    static ref ENTITY_SUFFIX: Regex = Regex::new(
        r"\s+(company|co|incorporated|inc|corp|corporation|co-?operative|cooperative|trust|society|bank|shores?|improvement\s+society)\s*$"
    ).unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// A single normalization stage
pub type Stage = fn(Option<String>) -> Option<String>;

/// The pipeline, in application order
pub const STAGES: [(&str, Stage); 7] = [
    ("trim_and_lowercase", trim_and_lowercase),
    ("strip_leading_article", strip_leading_article),
    ("truncate_joint_grantors", truncate_joint_grantors),
    ("remove_periods", remove_periods),
    ("strip_entity_suffix", strip_entity_suffix),
    ("collapse_whitespace", collapse_whitespace),
    ("title_case", title_case),
];

/// Normalize a nullable grantor field into its identity key
///
/// # Examples
///
/// ```
/// use covenant_domain::normalize::normalize_grantor;
///
/// assert_eq!(
///     normalize_grantor(Some(" The Smith & Jones Co. ")),
///     Some("Smith".to_string())
/// );
/// assert_eq!(normalize_grantor(None), None);
/// ```
pub fn normalize_grantor(raw: Option<&str>) -> Option<String> {
    STAGES
        .iter()
        .fold(raw.map(str::to_owned), |value, (_, stage)| stage(value))
}

/// Normalize a grantor string; empty or blank input yields `None`
pub fn normalize_grantor_str(raw: &str) -> Option<String> {
    normalize_grantor(Some(raw))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn trim_and_lowercase(value: Option<String>) -> Option<String> {
    non_empty(value?.trim().to_lowercase())
}

fn strip_leading_article(value: Option<String>) -> Option<String> {
    let value = value?;
    non_empty(LEADING_ARTICLE.replace(&value, "").into_owned())
}

fn truncate_joint_grantors(value: Option<String>) -> Option<String> {
    let value = value?;
    non_empty(JOINT_GRANTOR_TAIL.replace(&value, "").into_owned())
}

fn remove_periods(value: Option<String>) -> Option<String> {
    non_empty(value?.replace('.', ""))
}

fn strip_entity_suffix(value: Option<String>) -> Option<String> {
    let value = value?;
    non_empty(ENTITY_SUFFIX.replace(&value, "").into_owned())
}

fn collapse_whitespace(value: Option<String>) -> Option<String> {
    let value = value?;
    non_empty(WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned())
}

fn title_case(value: Option<String>) -> Option<String> {
    let value = value?;
    let titled = value
        .split(' ')
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => capitalize(first).chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(titled)
}

/// Upper-case a leading character unless that would expand it ("ß" -> "SS")
fn capitalize(first: char) -> impl Iterator<Item = char> {
    let mut upper = first.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => Some(single),
        _ => Some(first),
    }
    .into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_grantors_and_suffix() {
        assert_eq!(
            normalize_grantor_str(" The Smith & Jones Co. "),
            Some("Smith".to_string())
        );
    }

    #[test]
    fn test_improvement_society_is_one_suffix() {
        assert_eq!(
            normalize_grantor_str("ABC Improvement Society"),
            Some("Abc".to_string())
        );
    }

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(normalize_grantor(None), None);
        assert_eq!(normalize_grantor_str(""), None);
        assert_eq!(normalize_grantor_str("   \t "), None);
    }

    #[test]
    fn test_separators_keep_primary_party() {
        assert_eq!(
            normalize_grantor_str("Worcester Land Co; John Doe"),
            Some("Worcester Land".to_string())
        );
        assert_eq!(
            normalize_grantor_str("John Doe, Mary Doe"),
            Some("John Doe".to_string())
        );
        assert_eq!(
            normalize_grantor_str("John Doe and Mary Doe"),
            Some("John Doe".to_string())
        );
        // "and" inside a word is not a separator
        assert_eq!(
            normalize_grantor_str("Sandy Brandon"),
            Some("Sandy Brandon".to_string())
        );
    }

    #[test]
    fn test_suffix_vocabulary() {
        for raw in [
            "Smith Company",
            "Smith Co.",
            "Smith Inc.",
            "Smith Incorporated",
            "Smith Corp.",
            "Smith Corporation",
            "Smith Co-operative",
            "Smith Cooperative",
            "Smith Trust",
            "Smith Society",
            "Smith Bank",
            "Smith Shore",
            "Smith Shores",
        ] {
            assert_eq!(normalize_grantor_str(raw), Some("Smith".to_string()), "{raw}");
        }
    }

    #[test]
    fn test_only_one_suffix_is_stripped() {
        assert_eq!(
            normalize_grantor_str("Smith Trust Co"),
            Some("Smith Trust".to_string())
        );
    }

    #[test]
    fn test_suffix_requires_word_boundary() {
        assert_eq!(normalize_grantor_str("Fairbank"), Some("Fairbank".to_string()));
        assert_eq!(normalize_grantor_str("Bank"), Some("Bank".to_string()));
    }

    #[test]
    fn test_leading_article_only_once() {
        assert_eq!(
            normalize_grantor_str("the theodore land co"),
            Some("Theodore Land".to_string())
        );
        assert_eq!(normalize_grantor_str("The"), Some("The".to_string()));
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(
            normalize_grantor_str("  Olde   Towne \t Realty  "),
            Some("Olde Towne Realty".to_string())
        );
        assert_eq!(normalize_grantor_str("J. P. ."), Some("J P".to_string()));
    }

    #[test]
    fn test_leading_character_never_expands() {
        let once = normalize_grantor_str("ßmith Land");
        assert_eq!(once.as_deref(), Some("ßmith Land"));
        assert_eq!(once.as_deref().and_then(normalize_grantor_str), once);

        assert_eq!(normalize_grantor_str("émile realty"), Some("Émile Realty".to_string()));
        assert_eq!(normalize_grantor_str("ǆordan"), Some("Ǆordan".to_string()));
    }

    #[test]
    fn test_punctuation_only_collapses_to_none() {
        assert_eq!(normalize_grantor_str("..."), None);
        assert_eq!(normalize_grantor_str(", and others"), None);
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let names: Vec<&str> = STAGES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "trim_and_lowercase",
                "strip_leading_article",
                "truncate_joint_grantors",
                "remove_periods",
                "strip_entity_suffix",
                "collapse_whitespace",
                "title_case",
            ]
        );
    }
}
