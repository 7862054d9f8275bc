//! Command implementations.

pub mod counts;
pub mod dashboard;
pub mod exclusion_types;
pub mod grantors;
pub mod health;
pub mod time_series;

pub use self::counts::execute_counts;
pub use self::dashboard::execute_dashboard;
pub use self::exclusion_types::{execute_exclusion_types, execute_top_exclusion_types};
pub use self::grantors::execute_top_grantors;
pub use self::health::execute_health;
pub use self::time_series::execute_time_series;

use covenant_domain::AggregationEngine;
use covenant_store::SqliteStore;

/// Engine over a read-only SQLite handle.
pub type Engine = AggregationEngine<SqliteStore>;
