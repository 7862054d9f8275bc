//! Covenant Storage Layer
//!
//! Implements the `CovenantStore` trait on top of SQLite.
//!
//! # Architecture
//!
//! - Every aggregate is compiled to a single SQL grouping query
//! - The grantor normalizer is registered as the deterministic scalar
//!   function `normalize_grantor`, so grantor rankings group inside SQLite
//! - Consensus thresholds are bound as query parameters from the domain's
//!   `ConsensusRule`
//!
//! # Examples
//!
//! ```no_run
//! use covenant_store::SqliteStore;
//!
//! let store = SqliteStore::open("covenants.db").unwrap();
//! // Store is now ready for aggregate queries
//! ```

#![warn(missing_docs)]

mod queries;

use covenant_domain::normalize::normalize_grantor;
use covenant_domain::{BookPage, Deed, ExclusionType, Review};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Name of the SQL function wrapping the grantor normalizer
pub const NORMALIZE_GRANTOR_FN: &str = "normalize_grantor";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of CovenantStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; open one handle per concurrent query.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a writable store, creating the schema if needed
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use covenant_store::SqliteStore;
    ///
    /// let store = SqliteStore::new(":memory:").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self::from_connection(conn)?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an existing database read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.create_scalar_function(
            NORMALIZE_GRANTOR_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let raw: Option<String> = ctx.get(0)?;
                Ok(normalize_grantor(raw.as_deref()))
            },
        )?;
        Ok(Self { conn })
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        info!("covenant store schema ready");
        Ok(())
    }

    /// Insert a deed and its pre-identified exclusion types
    pub fn insert_deed(&mut self, deed: &Deed) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO deeds (id) VALUES (?1)", params![deed.id.value()])?;
        for type_id in &deed.exclusion_type_ids {
            tx.execute(
                "INSERT OR IGNORE INTO deed_exclusion_types (deed_id, exclusion_type_id) VALUES (?1, ?2)",
                params![deed.id.value(), type_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert a review with its exclusion types and book pages
    pub fn insert_review(&mut self, review: &Review) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO deed_reviews (id, deed_id, grantors, is_restrictive_covenant, review_required, deed_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                review.id,
                review.deed_id.value(),
                &review.grantors,
                review.is_restrictive_covenant.to_nullable(),
                review.review_required,
                review.deed_date,
            ],
        )?;
        for type_id in &review.exclusion_type_ids {
            tx.execute(
                "INSERT OR IGNORE INTO deed_review_exclusion_types (deed_review_id, exclusion_type_id)
                 VALUES (?1, ?2)",
                params![review.id, type_id],
            )?;
        }
        for page_id in &review.book_page_ids {
            tx.execute(
                "INSERT OR IGNORE INTO deed_review_book_pages (deed_review_id, book_page_id) VALUES (?1, ?2)",
                params![review.id, page_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert an exclusion type into the vocabulary
    pub fn insert_exclusion_type(&mut self, exclusion_type: &ExclusionType) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO exclusion_types (id, title) VALUES (?1, ?2)",
            params![exclusion_type.id, &exclusion_type.title],
        )?;
        Ok(())
    }

    /// Insert a book page
    pub fn insert_book_page(&mut self, page: &BookPage) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO book_pages (id, county) VALUES (?1, ?2)",
            params![page.id, &page.county],
        )?;
        Ok(())
    }
}
