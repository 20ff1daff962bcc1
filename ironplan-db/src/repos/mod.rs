//! Repository modules for database operations
//!
//! Repositories borrow a [`rusqlite::Connection`], so they work the same on a
//! plain connection and inside a transaction.

pub mod exercises;
pub mod workouts;

pub use exercises::ExerciseRepository;
pub use workouts::WorkoutRepository;

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Parse a stored RFC 3339 timestamp
pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidData(format!("Invalid {} timestamp: {}", column, e)))
}
