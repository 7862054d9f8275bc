//! Integration tests for covenant-store
//!
//! These tests load one fixture into both SQLite and the in-memory snapshot
//! and check that every aggregate agrees, plus a few hand-computed figures.

use chrono::NaiveDate;
use covenant_domain::{
    AggregationEngine, BookPage, CovenantFlag, Deed, DeedId, ExclusionScope, ExclusionType, MemorySnapshot,
    QueryFilterSpec, Review, TimeSeriesRow, YearRange,
};
use covenant_store::SqliteStore;
use std::collections::BTreeSet;

struct Fixture {
    exclusion_types: Vec<ExclusionType>,
    book_pages: Vec<BookPage>,
    deeds: Vec<Deed>,
    reviews: Vec<Review>,
}

fn review(
    id: i64,
    deed: i64,
    grantor: Option<&str>,
    flag: Option<bool>,
    date: Option<(i32, u32, u32)>,
    tags: &[i64],
    pages: &[i64],
) -> Review {
    let mut review = Review::new(id, DeedId::from_value(deed));
    review.grantors = grantor.map(str::to_string);
    review.is_restrictive_covenant = CovenantFlag::from_nullable(flag);
    review.deed_date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
    review.exclusion_type_ids = tags.to_vec();
    review.book_page_ids = pages.to_vec();
    review
}

fn fixture() -> Fixture {
    let exclusion_types = vec![
        ExclusionType { id: 1, title: "Race".to_string() },
        ExclusionType { id: 2, title: "Religion".to_string() },
        ExclusionType { id: 3, title: "Nationality".to_string() },
    ];
    let book_pages = vec![
        BookPage { id: 10, county: "Worcester".to_string() },
        BookPage { id: 11, county: "Norfolk_LR".to_string() },
        BookPage { id: 12, county: "Northern Middlesex".to_string() },
    ];

    let deeds = (1..=8)
        .map(|id| {
            let mut deed = Deed::new(DeedId::from_value(id));
            deed.exclusion_type_ids = match id {
                1 | 2 => vec![1],
                3 => vec![1, 2],
                4 => vec![3],
                _ => Vec::new(),
            };
            deed
        })
        .collect();

    let mut reviews = Vec::new();
    let mut next = 0;
    let mut push = |deed, grantor, flag, date, tags: &[i64], pages: &[i64]| {
        next += 1;
        reviews.push(review(next, deed, grantor, flag, date, tags, pages));
    };

    // deed 1: confirmed, two reviews in the same bucket
    push(1, Some("The Worcester Land Co."), Some(true), Some((1925, 4, 2)), &[1], &[10]);
    push(1, Some("Worcester Land Company"), Some(true), Some((1925, 4, 2)), &[1], &[10]);
    // deed 2: confirmed with a pending third opinion and a review request
    push(2, Some("Worcester Land Co, and others"), Some(true), Some((1931, 1, 1)), &[1, 2], &[10, 11]);
    push(2, Some("worcester land co"), Some(true), Some((1931, 1, 1)), &[2], &[11]);
    push(2, None, None, Some((1931, 1, 1)), &[], &[11]);
    // deed 3: false positive
    push(3, Some("Smith & Jones Inc."), Some(false), Some((1948, 7, 7)), &[], &[12]);
    push(3, Some("Smith"), Some(false), Some((1948, 7, 7)), &[], &[12]);
    // deed 4: split vote
    push(4, Some("Olde Towne Improvement Society"), Some(true), Some((1902, 2, 2)), &[3], &[12]);
    push(4, Some("Olde Towne"), Some(false), Some((1902, 2, 2)), &[3], &[12]);
    // deed 5: single positive, undated
    push(5, Some("Smith"), Some(true), None, &[1], &[10]);
    // deed 6: positive, no provenance
    push(6, Some("Jones Trust"), Some(true), Some((1955, 3, 3)), &[2], &[]);
    // deed 7: pending reviews asking for help, outside the default year range
    push(7, Some("   "), None, Some((1975, 1, 1)), &[1], &[10]);
    push(7, Some("Jones"), None, Some((1975, 1, 1)), &[1], &[10]);
    // deed 8: no reviews

    for r in reviews.iter_mut().filter(|r| r.deed_id.value() == 7) {
        r.review_required = true;
    }

    Fixture {
        exclusion_types,
        book_pages,
        deeds,
        reviews,
    }
}

fn load_sqlite(f: &Fixture) -> SqliteStore {
    let mut store = SqliteStore::new(":memory:").unwrap();
    for t in &f.exclusion_types {
        store.insert_exclusion_type(t).unwrap();
    }
    for p in &f.book_pages {
        store.insert_book_page(p).unwrap();
    }
    for d in &f.deeds {
        store.insert_deed(d).unwrap();
    }
    for r in &f.reviews {
        store.insert_review(r).unwrap();
    }
    store
}

fn load_memory(f: &Fixture) -> MemorySnapshot {
    let mut snapshot = MemorySnapshot::new();
    for t in &f.exclusion_types {
        snapshot.add_exclusion_type(t.id, t.title.clone());
    }
    for p in &f.book_pages {
        snapshot.add_book_page(p.id, p.county.clone());
    }
    for d in &f.deeds {
        snapshot.add_deed(d.clone());
    }
    for r in &f.reviews {
        snapshot.add_review(r.clone());
    }
    snapshot
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_headline_counts() {
    let f = fixture();
    let store = load_sqlite(&f);
    let engine = AggregationEngine::new(&store);

    assert_eq!(engine.count_identified().unwrap(), 8);
    assert_eq!(engine.count_confirmed().unwrap(), 2);
    assert_eq!(engine.count_false_positive().unwrap(), 1);
    assert_eq!(engine.count_pending().unwrap(), 3);
    assert_eq!(engine.count_review_requested().unwrap(), 2);
}

#[test]
fn test_grantor_rankings() {
    let f = fixture();
    let store = load_sqlite(&f);
    let engine = AggregationEngine::new(&store);

    let exact = engine.top_grantors_exact().unwrap();
    let smith = exact.iter().find(|r| r.grantor == "Smith").unwrap();
    assert_eq!(smith.count, 2);
    assert!(exact.iter().any(|r| r.grantor == "   "));

    let normalized = engine.top_grantors_normalized(false, None).unwrap();
    assert_eq!(normalized[0].grantor, "Worcester Land");
    assert_eq!(normalized[0].count, 4);
    assert!(normalized.iter().all(|r| !r.grantor.trim().is_empty()));

    // "Smith & Jones Inc." and "Smith" on deed 3 plus "Smith" on deed 5 count
    // two deeds; ties fall back to alphabetical order
    let deduped = engine.top_grantors_normalized(true, None).unwrap();
    assert_eq!(
        deduped.iter().map(|r| (r.grantor.as_str(), r.count)).collect::<Vec<_>>(),
        vec![("Jones", 2), ("Smith", 2), ("Worcester Land", 2), ("Olde Towne", 1)]
    );
}

#[test]
fn test_exclusion_type_rankings() {
    let f = fixture();
    let store = load_sqlite(&f);
    let engine = AggregationEngine::new(&store);

    let pre = engine.top_exclusion_types(ExclusionScope::PreIdentified).unwrap();
    assert_eq!(
        pre.iter().map(|r| (r.title.as_str(), r.count)).collect::<Vec<_>>(),
        vec![("Race", 3), ("Nationality", 1), ("Religion", 1)]
    );

    let reviewed = engine.top_exclusion_types(ExclusionScope::ReviewConfirmed).unwrap();
    assert_eq!(
        reviewed.iter().map(|r| (r.title.as_str(), r.count)).collect::<Vec<_>>(),
        vec![("Race", 3), ("Religion", 2), ("Nationality", 1)]
    );
}

#[test]
fn test_time_series_default_filter() {
    let f = fixture();
    let store = load_sqlite(&f);
    let engine = AggregationEngine::new(&store);

    let rows = engine.exclusion_time_series(&QueryFilterSpec::unfiltered()).unwrap();
    let row = |year, type_id, county: &str, deed_count| TimeSeriesRow {
        year,
        exclusion_type_id: type_id,
        title: f.exclusion_types.iter().find(|t| t.id == type_id).unwrap().title.clone(),
        county: county.to_string(),
        deed_count,
    };
    assert_eq!(
        rows,
        vec![
            row(1902, 3, "Northern Middlesex", 1),
            row(1925, 1, "Worcester", 1),
            row(1931, 1, "Norfolk_LR", 1),
            row(1931, 1, "Worcester", 1),
            row(1931, 2, "Norfolk_LR", 1),
            row(1931, 2, "Worcester", 1),
        ]
    );
}

#[test]
fn test_time_series_filters() {
    let f = fixture();
    let store = load_sqlite(&f);
    let engine = AggregationEngine::new(&store);

    let filter = QueryFilterSpec::new([2], YearRange::new(1930, 1980).unwrap(), ["Norfolk_LR"]);
    let rows = engine.exclusion_time_series(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].year, 1931);
    assert_eq!(rows[0].deed_count, 1);

    let late = QueryFilterSpec::new([], YearRange::new(1970, 1980).unwrap(), Vec::<String>::new());
    let rows = engine.exclusion_time_series(&late).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].year, 1975);
    // two reviews of deed 7 in the same bucket
    assert_eq!(rows[0].deed_count, 1);
}

#[test]
fn test_time_series_union_of_single_types() {
    let f = fixture();
    let store = load_sqlite(&f);
    let engine = AggregationEngine::new(&store);

    let all: BTreeSet<TimeSeriesRow> = engine
        .exclusion_time_series(&QueryFilterSpec::unfiltered())
        .unwrap()
        .into_iter()
        .collect();
    let mut union = BTreeSet::new();
    for t in &f.exclusion_types {
        let single = QueryFilterSpec::unfiltered().with_single_type(t.id);
        union.extend(engine.exclusion_time_series(&single).unwrap());
    }
    assert_eq!(all, union);
}

#[test]
fn test_sqlite_matches_memory_snapshot() {
    let f = fixture();
    let store = load_sqlite(&f);
    let snapshot = load_memory(&f);
    let sql = AggregationEngine::new(&store);
    let mem = AggregationEngine::new(&snapshot);

    assert_eq!(sql.headline_counts().unwrap(), mem.headline_counts().unwrap());
    assert_eq!(sql.top_grantors_exact().unwrap(), mem.top_grantors_exact().unwrap());
    for dedupe in [false, true] {
        assert_eq!(
            sql.top_grantors_normalized(dedupe, None).unwrap(),
            mem.top_grantors_normalized(dedupe, None).unwrap()
        );
    }
    for scope in [ExclusionScope::PreIdentified, ExclusionScope::ReviewConfirmed] {
        assert_eq!(
            sql.top_exclusion_types(scope).unwrap(),
            mem.top_exclusion_types(scope).unwrap()
        );
    }
    for filter in [
        QueryFilterSpec::unfiltered(),
        QueryFilterSpec::new([1, 3], YearRange::new(1900, 1940).unwrap(), ["Worcester", "Northern Middlesex"]),
        QueryFilterSpec::new([], YearRange::new(1800, 2000).unwrap(), Vec::<String>::new()),
    ] {
        assert_eq!(
            sql.exclusion_time_series(&filter).unwrap(),
            mem.exclusion_time_series(&filter).unwrap()
        );
    }
    assert_eq!(sql.exclusion_types().unwrap(), mem.exclusion_types().unwrap());
}

#[test]
fn test_deduped_grantors_capped_at_twenty() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    for id in 1..=40 {
        store.insert_deed(&Deed::new(DeedId::from_value(id))).unwrap();
        let mut r = Review::new(id, DeedId::from_value(id));
        r.grantors = Some(format!("Developer {} Realty Co.", id));
        store.insert_review(&r).unwrap();
    }
    let engine = AggregationEngine::new(&store);
    assert_eq!(engine.top_grantors_normalized(true, None).unwrap().len(), 20);
    assert_eq!(engine.top_grantors_normalized(false, None).unwrap().len(), 40);
    assert_eq!(engine.top_grantors_normalized(false, Some(7)).unwrap().len(), 7);
}

#[test]
fn test_reopen_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covenants.db");
    {
        let mut store = SqliteStore::new(&path).unwrap();
        store.insert_deed(&Deed::new(DeedId::from_value(1))).unwrap();
    }

    let mut store = SqliteStore::open(&path).unwrap();
    let engine = AggregationEngine::new(&store);
    assert_eq!(engine.count_identified().unwrap(), 1);
    assert!(engine.health().unwrap().ok);

    assert!(store.insert_deed(&Deed::new(DeedId::from_value(2))).is_err());
}

#[test]
fn test_repeated_association_ids_agree() {
    let mut f = fixture();
    f.deeds[0].exclusion_type_ids = vec![1, 1];
    f.reviews[0].exclusion_type_ids = vec![1, 1];
    f.reviews[0].book_page_ids = vec![10, 10];

    let store = load_sqlite(&f);
    let snapshot = load_memory(&f);
    let sql = AggregationEngine::new(&store);
    let mem = AggregationEngine::new(&snapshot);

    for scope in [ExclusionScope::PreIdentified, ExclusionScope::ReviewConfirmed] {
        assert_eq!(
            sql.top_exclusion_types(scope).unwrap(),
            mem.top_exclusion_types(scope).unwrap()
        );
    }
    let pre = sql.top_exclusion_types(ExclusionScope::PreIdentified).unwrap();
    assert_eq!(pre[0].title, "Race");
    assert_eq!(pre[0].count, 3);
    assert_eq!(
        sql.exclusion_time_series(&QueryFilterSpec::unfiltered()).unwrap(),
        mem.exclusion_time_series(&QueryFilterSpec::unfiltered()).unwrap()
    );
}
