//! Error types for Ironplan

use thiserror::Error;

use crate::workout::GenerationSummary;

/// Result type alias for Ironplan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by a persistence backend
///
/// Boxed so any store implementation can report its own error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for Ironplan operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A store call failed while materializing one day of a plan.
    ///
    /// Days before `day` are committed; `partial` counts them.
    #[error(
        "Workout generation failed for plan {plan_id} at day {day} \
         ({partial} before failure): {source}"
    )]
    Generation {
        plan_id: i64,
        day: u32,
        partial: GenerationSummary,
        #[source]
        source: StoreError,
    },

    /// Pruning removed days failed
    #[error("Workout cleanup failed for plan {plan_id}: {source}")]
    Cleanup {
        plan_id: i64,
        #[source]
        source: StoreError,
    },
}

impl Error {
    /// Counts committed before a generation failure, if this is one
    pub fn partial_summary(&self) -> Option<GenerationSummary> {
        match self {
            Error::Generation { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}
